use super::parse_id;
use crate::forms::ReviewQuery;
use crate::helpers::JsonResponse;
use crate::middleware::authentication::UserScope;
use crate::models;
use crate::services::build_board;
use crate::storage::ReviewStore;
use actix_web::{get, web, Responder, Result};
use std::sync::Arc;

#[tracing::instrument(name = "List reviews.", skip(store, user))]
#[get("")]
pub async fn list_handler(
    query: web::Query<ReviewQuery>,
    user: UserScope,
    store: web::Data<Arc<dyn ReviewStore>>,
) -> Result<impl Responder> {
    let filter = query
        .to_filter()
        .map_err(|err| JsonResponse::<models::Review>::build().bad_request(err))?;

    store
        .list_reviews(&filter, user.id())
        .await
        .map_err(|_err| JsonResponse::<models::Review>::build().internal_server_error(""))
        .map(|reviews| JsonResponse::build().set_list(reviews).ok("OK"))
}

/// Only rows that came in through a marketplace or mailbox import.
#[tracing::instrument(name = "List imported reviews.", skip(store, user))]
#[get("/imported")]
pub async fn imported_handler(
    query: web::Query<ReviewQuery>,
    user: UserScope,
    store: web::Data<Arc<dyn ReviewStore>>,
) -> Result<impl Responder> {
    let mut filter = query
        .to_filter()
        .map_err(|err| JsonResponse::<models::Review>::build().bad_request(err))?;
    filter.imported_only = true;

    store
        .list_reviews(&filter, user.id())
        .await
        .map_err(|_err| JsonResponse::<models::Review>::build().internal_server_error(""))
        .map(|reviews| JsonResponse::build().set_list(reviews).ok("OK"))
}

#[tracing::instrument(name = "Review board.", skip(store, user))]
#[get("/board")]
pub async fn board_handler(
    query: web::Query<ReviewQuery>,
    user: UserScope,
    store: web::Data<Arc<dyn ReviewStore>>,
) -> Result<impl Responder> {
    let mut filter = query
        .to_filter()
        .map_err(|err| JsonResponse::<String>::bad_request(err))?;
    // the board always shows every column
    filter.status = None;

    store
        .list_reviews(&filter, user.id())
        .await
        .map_err(|_err| JsonResponse::<String>::build().internal_server_error(""))
        .map(|reviews| JsonResponse::build().set_list(build_board(&reviews)).ok("OK"))
}

#[tracing::instrument(name = "Get review.", skip(store, user))]
#[get("/{id}")]
pub async fn item_handler(
    path: web::Path<(String,)>,
    user: UserScope,
    store: web::Data<Arc<dyn ReviewStore>>,
) -> Result<impl Responder> {
    let id = parse_id(&path.0)?;

    store
        .get_review(id, user.id())
        .await
        .map_err(|_err| JsonResponse::<models::Review>::build().internal_server_error(""))
        .and_then(|review| match review {
            Some(review) => Ok(JsonResponse::build().set_item(review).ok("OK")),
            None => Err(JsonResponse::<models::Review>::build().not_found("Review not found")),
        })
}
