use crate::connectors::Connectors;
use crate::forms::LimitQuery;
use crate::helpers::JsonResponse;
use actix_web::{get, web, Responder, Result};

#[tracing::instrument(name = "List Shopify products.", skip(connectors))]
#[get("/shopify/products")]
pub async fn shopify_products_handler(
    query: web::Query<LimitQuery>,
    connectors: web::Data<Connectors>,
) -> Result<impl Responder> {
    let products = connectors
        .shopify
        .list_products(query.limit.unwrap_or(50).clamp(1, 250))
        .await?;

    Ok(JsonResponse::build().set_list(products).ok("OK"))
}
