use super::parse_id;
use crate::forms::{ReplyForm, StatusForm};
use crate::helpers::JsonResponse;
use crate::middleware::authentication::UserScope;
use crate::models;
use crate::storage::ReviewStore;
use actix_web::{put, web, Responder, Result};
use serde_valid::Validate;
use std::sync::Arc;
use uuid::Uuid;

async fn fetch_updated(
    store: &dyn ReviewStore,
    id: Uuid,
    user_id: Option<&str>,
) -> Result<web::Json<JsonResponse<models::Review>>> {
    store
        .get_review(id, user_id)
        .await
        .map_err(|_err| JsonResponse::<models::Review>::build().internal_server_error(""))?
        .map(|review| JsonResponse::build().set_item(review).ok("Updated"))
        .ok_or_else(|| JsonResponse::<models::Review>::build().not_found("Review not found"))
}

/// Moves a review between workflow columns. Any transition is allowed.
#[tracing::instrument(name = "Update review status.", skip(store, user))]
#[put("/{id}/status")]
pub async fn status_handler(
    path: web::Path<(String,)>,
    form: web::Json<StatusForm>,
    user: UserScope,
    store: web::Data<Arc<dyn ReviewStore>>,
) -> Result<impl Responder> {
    let id = parse_id(&path.0)?;
    if let Err(errors) = form.validate() {
        return Err(JsonResponse::<models::Review>::build().bad_request(errors.to_string()));
    }
    let status = form
        .status()
        .map_err(|err| JsonResponse::<models::Review>::build().bad_request(err))?;

    let updated = store
        .update_review_status(id, status, user.id())
        .await
        .map_err(|_err| JsonResponse::<models::Review>::build().internal_server_error(""))?;
    if !updated {
        return Err(JsonResponse::<models::Review>::build().not_found("Review not found"));
    }

    tracing::info!("Review {} moved to {}", id, status);
    fetch_updated(store.get_ref().as_ref(), id, user.id()).await
}

#[tracing::instrument(name = "Save review reply.", skip(store, user))]
#[put("/{id}/reply")]
pub async fn reply_handler(
    path: web::Path<(String,)>,
    form: web::Json<ReplyForm>,
    user: UserScope,
    store: web::Data<Arc<dyn ReviewStore>>,
) -> Result<impl Responder> {
    let id = parse_id(&path.0)?;
    if let Err(errors) = form.validate() {
        return Err(JsonResponse::<models::Review>::build().bad_request(errors.to_string()));
    }

    let updated = store
        .update_review_reply(id, form.reply.trim(), user.id())
        .await
        .map_err(|_err| JsonResponse::<models::Review>::build().internal_server_error(""))?;
    if !updated {
        return Err(JsonResponse::<models::Review>::build().not_found("Review not found"));
    }

    fetch_updated(store.get_ref().as_ref(), id, user.id()).await
}
