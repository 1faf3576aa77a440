use crate::connectors::Connectors;
use crate::forms::AmazonPreviewForm;
use crate::helpers::JsonResponse;
use actix_web::{post, web, HttpResponse, Responder, Result};
use serde_json::json;
use serde_valid::Validate;

const DEFAULT_PREVIEW_LIMIT: u32 = 10;

/// Fetches reviews for an ASIN without storing anything.
#[tracing::instrument(name = "Preview Amazon reviews.", skip(connectors))]
#[post("/amazon/reviews")]
pub async fn amazon_preview_handler(
    form: web::Json<AmazonPreviewForm>,
    connectors: web::Data<Connectors>,
) -> Result<impl Responder> {
    if form.asin.trim().is_empty() {
        return Err(JsonResponse::<String>::bad_request("ASIN is required"));
    }
    if let Err(errors) = form.validate() {
        return Err(JsonResponse::<String>::build().form_error(errors.to_string()));
    }

    let fetched = connectors
        .amazon
        .preview(&form.asin, form.limit.unwrap_or(DEFAULT_PREVIEW_LIMIT))
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "asin": fetched.product_id,
        "productName": fetched.product_name,
        "total": fetched.reviews.len(),
        "reviews": fetched.reviews,
    })))
}
