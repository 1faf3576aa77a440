use super::get_header;
use crate::helpers::JsonResponse;
use crate::models;
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use std::future::{ready, Ready};

pub const USER_ID_HEADER: &str = "x-user-id";
const USER_EMAIL_HEADER: &str = "x-user-email";
const USER_FIRST_NAME_HEADER: &str = "x-user-first-name";
const USER_LAST_NAME_HEADER: &str = "x-user-last-name";
const USER_IMAGE_HEADER: &str = "x-user-profile-image-url";

/// Identity forwarded by the upstream auth layer. Requests without the
/// header are not scoped to a user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserScope {
    user: Option<models::User>,
}

impl UserScope {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn id(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.id.as_str())
    }

    pub fn user(&self) -> Option<&models::User> {
        self.user.as_ref()
    }

    fn from_request_headers(req: &HttpRequest) -> Result<Self, String> {
        let Some(id) = get_header::<String>(req, USER_ID_HEADER)? else {
            return Ok(Self::anonymous());
        };

        let mut user = models::User::new(id);
        user.email = get_header(req, USER_EMAIL_HEADER)?;
        user.first_name = get_header(req, USER_FIRST_NAME_HEADER)?;
        user.last_name = get_header(req, USER_LAST_NAME_HEADER)?;
        user.profile_image_url = get_header(req, USER_IMAGE_HEADER)?;

        Ok(Self { user: Some(user) })
    }
}

impl FromRequest for UserScope {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Self::from_request_headers(req).map_err(|err| {
            tracing::debug!("Rejecting identity headers: {}", err);
            JsonResponse::<String>::bad_request(err)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn missing_header_is_anonymous() {
        let req = TestRequest::default().to_http_request();
        let scope = UserScope::from_request_headers(&req).unwrap();
        assert_eq!(scope.id(), None);
    }

    #[test]
    fn reads_identity_headers() {
        let req = TestRequest::default()
            .insert_header(("X-User-Id", "user-42"))
            .insert_header(("X-User-Email", "ada@example.com"))
            .to_http_request();
        let scope = UserScope::from_request_headers(&req).unwrap();
        assert_eq!(scope.id(), Some("user-42"));
        assert_eq!(
            scope.user().and_then(|u| u.email.as_deref()),
            Some("ada@example.com")
        );
    }

    #[test]
    fn blank_header_is_anonymous() {
        let req = TestRequest::default()
            .insert_header(("X-User-Id", "  "))
            .to_http_request();
        assert_eq!(UserScope::from_request_headers(&req).unwrap().id(), None);
    }
}
