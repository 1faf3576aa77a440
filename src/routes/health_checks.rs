use crate::storage::ReviewStore;
use actix_web::{get, web, HttpResponse};
use serde_json::json;
use std::sync::Arc;

#[tracing::instrument(name = "Health check.", skip(store))]
#[get("")]
pub async fn health_check(store: web::Data<Arc<dyn ReviewStore>>) -> HttpResponse {
    match store.ping().await {
        Ok(()) => HttpResponse::Ok().json(json!({ "status": "ok" })),
        Err(err) => {
            tracing::error!("Health check storage probe failed: {}", err);
            HttpResponse::ServiceUnavailable().json(json!({ "status": "unavailable" }))
        }
    }
}
