use crate::helpers::JsonResponse;
use crate::middleware::authentication::UserScope;
use crate::models;
use crate::storage::ReviewStore;
use actix_web::{get, web, Responder, Result};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedProduct {
    #[serde(flatten)]
    pub product: models::Product,
    pub review_count: i64,
}

/// Tracked products, most recently imported first, with their stored review counts.
#[tracing::instrument(name = "List tracked products.", skip(store, user))]
#[get("/tracked")]
pub async fn tracked_handler(
    user: UserScope,
    store: web::Data<Arc<dyn ReviewStore>>,
) -> Result<impl Responder> {
    let products = store
        .list_products(user.id())
        .await
        .map_err(|_err| JsonResponse::<TrackedProduct>::build().internal_server_error(""))?;

    let mut tracked = Vec::with_capacity(products.len());
    for product in products {
        let review_count = store
            .count_reviews_for_product(&product.platform, &product.product_id, user.id())
            .await
            .map_err(|_err| JsonResponse::<TrackedProduct>::build().internal_server_error(""))?;
        tracked.push(TrackedProduct {
            product,
            review_count,
        });
    }

    Ok(JsonResponse::build().set_list(tracked).ok("OK"))
}
