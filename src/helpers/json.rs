use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::{web, Error, HttpResponse};
use serde_derive::Serialize;

#[derive(Serialize)]
pub struct JsonResponse<T> {
    pub(crate) message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) item: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) list: Option<Vec<T>>,
}

pub struct JsonResponseBuilder<T> {
    id: Option<String>,
    item: Option<T>,
    list: Option<Vec<T>>,
}

impl<T> Default for JsonResponseBuilder<T> {
    fn default() -> Self {
        Self {
            id: None,
            item: None,
            list: None,
        }
    }
}

impl<T> JsonResponseBuilder<T>
where
    T: serde::Serialize,
{
    pub(crate) fn set_item(mut self, item: T) -> Self {
        self.item = Some(item);
        self
    }

    pub(crate) fn set_list(mut self, list: Vec<T>) -> Self {
        self.list = Some(list);
        self
    }

    pub(crate) fn set_id(mut self, id: impl ToString) -> Self {
        self.id = Some(id.to_string());
        self
    }

    fn to_json_response(self, message: String) -> JsonResponse<T> {
        JsonResponse {
            message,
            id: self.id,
            item: self.item,
            list: self.list,
        }
    }

    pub(crate) fn ok<I: Into<String>>(self, msg: I) -> web::Json<JsonResponse<T>> {
        web::Json(self.to_json_response(msg.into()))
    }

    fn to_error<I: Into<String>>(self, msg: I, status: StatusCode) -> Error {
        let message = msg.into();
        let body = self.to_json_response(message.clone());
        InternalError::from_response(message, HttpResponse::build(status).json(body)).into()
    }

    pub(crate) fn bad_request<I: Into<String>>(self, msg: I) -> Error {
        self.to_error(msg, StatusCode::BAD_REQUEST)
    }

    pub(crate) fn form_error<I: Into<String>>(self, msg: I) -> Error {
        self.to_error(msg, StatusCode::UNPROCESSABLE_ENTITY)
    }

    pub(crate) fn not_found<I: Into<String>>(self, msg: I) -> Error {
        self.to_error(msg, StatusCode::NOT_FOUND)
    }

    pub(crate) fn unauthorized<I: Into<String>>(self, msg: I) -> Error {
        self.to_error(msg, StatusCode::UNAUTHORIZED)
    }

    pub(crate) fn internal_server_error<I: Into<String>>(self, msg: I) -> Error {
        self.to_error(msg, StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub(crate) fn bad_gateway<I: Into<String>>(self, msg: I) -> Error {
        self.to_error(msg, StatusCode::BAD_GATEWAY)
    }

    pub(crate) fn service_unavailable<I: Into<String>>(self, msg: I) -> Error {
        self.to_error(msg, StatusCode::SERVICE_UNAVAILABLE)
    }
}

impl<T> JsonResponse<T>
where
    T: serde::Serialize,
{
    pub(crate) fn build() -> JsonResponseBuilder<T> {
        JsonResponseBuilder::default()
    }
}

impl JsonResponse<String> {
    pub(crate) fn bad_request<I: Into<String>>(msg: I) -> Error {
        JsonResponse::<String>::build().bad_request(msg)
    }

    pub(crate) fn not_found<I: Into<String>>(msg: I) -> Error {
        JsonResponse::<String>::build().not_found(msg)
    }
}
