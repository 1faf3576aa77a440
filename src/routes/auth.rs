use crate::helpers::JsonResponse;
use crate::middleware::authentication::UserScope;
use crate::models;
use crate::storage::ReviewStore;
use actix_web::{get, web, Responder, Result};
use std::sync::Arc;

/// The caller's user row, created or refreshed from the identity headers.
#[tracing::instrument(name = "Current user.", skip(store))]
#[get("/user")]
pub async fn user_handler(
    user: UserScope,
    store: web::Data<Arc<dyn ReviewStore>>,
) -> Result<impl Responder> {
    let Some(user) = user.user() else {
        return Err(JsonResponse::<models::User>::build().unauthorized("Unauthorized"));
    };

    store
        .upsert_user(user.clone())
        .await
        .map_err(|_err| JsonResponse::<models::User>::build().internal_server_error("Failed to fetch user"))
        .map(|user| JsonResponse::build().set_item(user).ok("OK"))
}
