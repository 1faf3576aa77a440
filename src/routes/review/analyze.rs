use super::parse_id;
use crate::helpers::JsonResponse;
use crate::middleware::authentication::UserScope;
use crate::models;
use crate::services::ReviewImporter;
use crate::storage::ReviewStore;
use actix_web::{post, web, Responder, Result};
use std::sync::Arc;

/// Re-runs classification and reply drafting for a stored review. Unlike
/// the import path, completion failures are reported to the caller.
#[tracing::instrument(name = "Re-analyze review.", skip(store, importer, user))]
#[post("/{id}/analyze")]
pub async fn analyze_handler(
    path: web::Path<(String,)>,
    user: UserScope,
    store: web::Data<Arc<dyn ReviewStore>>,
    importer: web::Data<ReviewImporter>,
) -> Result<impl Responder> {
    let id = parse_id(&path.0)?;

    let review = store
        .get_review(id, user.id())
        .await
        .map_err(|_err| JsonResponse::<models::Review>::build().internal_server_error(""))?
        .ok_or_else(|| JsonResponse::<models::Review>::build().not_found("Review not found"))?;

    let review = importer.reanalyze(&review).await?;

    store
        .update_review_classification(&review)
        .await
        .map_err(|_err| JsonResponse::<models::Review>::build().internal_server_error(""))?;

    Ok(JsonResponse::build().set_item(review).ok("OK"))
}
