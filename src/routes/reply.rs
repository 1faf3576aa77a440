use crate::connectors::ConnectorError;
use crate::forms::GenerateReplyForm;
use crate::helpers::JsonResponse;
use crate::models::{Sentiment, Severity};
use crate::services::ReviewAnalyzer;
use actix_web::{post, web, HttpResponse, Responder, Result};
use serde_json::json;
use serde_valid::Validate;

fn reply_error(err: ConnectorError) -> actix_web::Error {
    tracing::error!("Failed to generate reply: {}", err);
    match err {
        ConnectorError::NotConfigured(msg) => JsonResponse::<String>::build().service_unavailable(msg),
        _ => JsonResponse::<String>::build().bad_gateway("Failed to generate reply"),
    }
}

/// Drafts a reply for pasted review text. With a customer name the stored
/// review prompt is used, otherwise the short free-form one.
#[tracing::instrument(name = "Generate reply.", skip(analyzer, form))]
#[post("/generate-reply")]
pub async fn generate_reply_handler(
    form: web::Json<GenerateReplyForm>,
    analyzer: web::Data<ReviewAnalyzer>,
) -> Result<impl Responder> {
    if form.validate().is_err() || form.review_content.trim().is_empty() {
        return Err(JsonResponse::<String>::bad_request("Review content is required"));
    }

    let sentiment = form.sentiment.as_deref().unwrap_or("neutral");
    let category = form.category.as_deref().unwrap_or("general");

    let reply = match form.customer_name.as_deref().filter(|name| !name.trim().is_empty()) {
        Some(customer_name) => analyzer
            .generate_reply(
                &form.review_content,
                customer_name,
                form.marketplace.as_deref().unwrap_or("our store"),
                Sentiment::parse_lenient(sentiment),
                Severity::parse_lenient(form.severity.as_deref().unwrap_or("medium")),
            )
            .await
            .map_err(reply_error)?,
        None => analyzer
            .quick_reply(&form.review_content, sentiment, category)
            .await
            .map_err(reply_error)?,
    };

    Ok(HttpResponse::Ok().json(json!({ "reply": reply })))
}
