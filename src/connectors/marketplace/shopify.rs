use super::{
    parse_review_date, review_fingerprint, ConnectionStatus, FetchedProduct, MarketplaceConnector,
    RawReview,
};
use crate::connectors::config::ShopifyConfig;
use crate::connectors::errors::ConnectorError;
use crate::connectors::http;
use crate::models::Platform;
use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::OnceLock;

const PRODUCT_GID_PREFIX: &str = "gid://shopify/Product/";
const REVIEW_BLOCK: &str = r#"<div class="spr-review">"#;

const PRODUCT_BY_ID: &str = r#"
query GetProductReviews($id: ID!) {
  product(id: $id) {
    id
    title
    handle
    reviewsMetafield: metafield(namespace: "spr", key: "reviews") { value }
  }
}"#;

const PRODUCT_BY_HANDLE: &str = r#"
query GetProductByHandle($handle: String!) {
  productByHandle(handle: $handle) {
    id
    title
    handle
    reviewsMetafield: metafield(namespace: "spr", key: "reviews") { value }
  }
}"#;

const PRODUCTS: &str = r#"
query GetProducts($first: Int!) {
  products(first: $first) {
    edges {
      node {
        id
        title
        handle
        reviewsMetafield: metafield(namespace: "spr", key: "reviews") { value }
      }
    }
  }
}"#;

const SHOP: &str = "query { shop { name email myshopifyDomain } }";

/// How a product was referred to by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductRef {
    Gid(String),
    Handle(String),
}

impl ProductRef {
    pub fn parse(reference: &str) -> Result<Self, ConnectorError> {
        let value = reference.trim();
        if value.starts_with(PRODUCT_GID_PREFIX) {
            return Ok(Self::Gid(value.to_string()));
        }
        // A path segment is always a handle, even when it is all digits.
        if let Some((_, rest)) = value.split_once("/products/") {
            let handle = rest
                .split(|c| c == '/' || c == '?' || c == '#')
                .next()
                .unwrap_or_default();
            if !handle.is_empty() {
                return Ok(Self::Handle(handle.to_string()));
            }
        }
        if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
            return Ok(Self::Gid(format!("{}{}", PRODUCT_GID_PREFIX, value)));
        }
        if !value.is_empty() && !value.contains('/') {
            return Ok(Self::Handle(value.to_string()));
        }
        Err(ConnectorError::InvalidInput(
            "Provide a Shopify product URL, handle, numeric id or product GID".to_string(),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopifyProduct {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub total_reviews: usize,
}

struct Patterns {
    rating: Regex,
    title: Regex,
    body: Regex,
    byline: Regex,
    date: Regex,
    tags: Regex,
}

fn patterns() -> Option<&'static Patterns> {
    static PATTERNS: OnceLock<Option<Patterns>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            Some(Patterns {
                rating: Regex::new(r#"aria-label="(\d+) out of 5 stars""#).ok()?,
                title: Regex::new(r#"(?s)<h3 class="spr-review-header-title">(.*?)</h3>"#).ok()?,
                body: Regex::new(r#"(?s)<div class="spr-review-content-body">(.*?)</div>"#).ok()?,
                byline: Regex::new(r#"(?s)<strong class="spr-review-header-byline">(.*?)</strong>"#)
                    .ok()?,
                date: Regex::new(r#"(?s)<span class="spr-review-header-date">(.*?)</span>"#).ok()?,
                tags: Regex::new(r"<[^>]*>").ok()?,
            })
        })
        .as_ref()
}

fn capture(pattern: &Regex, html: &str) -> Option<String> {
    pattern
        .captures(html)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Reviews embedded by the Shopify Product Reviews app in the `spr.reviews`
/// metafield. Blocks whose body is empty are dropped.
pub fn parse_reviews_from_metafield(html: &str, product_id: &str) -> Vec<RawReview> {
    let Some(p) = patterns() else {
        return Vec::new();
    };

    html.split(REVIEW_BLOCK)
        .skip(1)
        .filter_map(|block| {
            let content = capture(&p.body, block)
                .map(|body| p.tags.replace_all(&body, "").trim().to_string())
                .filter(|body| !body.is_empty())?;
            let title = capture(&p.title, block).unwrap_or_default();
            let customer_name = capture(&p.byline, block)
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "Anonymous".to_string());
            let raw_date = capture(&p.date, block);
            let rating = capture(&p.rating, block)
                .and_then(|r| r.parse::<i32>().ok())
                .unwrap_or(0);

            Some(RawReview {
                external_review_id: Some(review_fingerprint(
                    Platform::Shopify,
                    product_id,
                    &customer_name,
                    raw_date.as_deref().unwrap_or_default(),
                    &title,
                    &content,
                )),
                customer_name,
                rating: Some(rating),
                title,
                content,
                review_date: parse_review_date(raw_date.as_deref()),
                verified: block.contains("spr-badge-caption-verified"),
            })
        })
        .collect()
}

fn metafield_value(node: &Value) -> &str {
    node["reviewsMetafield"]["value"].as_str().unwrap_or_default()
}

pub struct ShopifyClient {
    endpoint: Option<String>,
    access_token: Option<String>,
    http_client: reqwest::Client,
}

impl ShopifyClient {
    pub fn new(config: &ShopifyConfig) -> Result<Self, ConnectorError> {
        let origin = config
            .base_url
            .clone()
            .or_else(|| config.shop.as_ref().map(|shop| format!("https://{}", shop)));
        let endpoint = origin.map(|origin| {
            format!(
                "{}/admin/api/{}/graphql.json",
                origin.trim_end_matches('/'),
                config.api_version
            )
        });

        Ok(Self {
            endpoint,
            access_token: config.access_token.clone(),
            http_client: http::build_client(config.timeout_secs)?,
        })
    }

    async fn graphql(&self, query: &str, variables: Value) -> Result<Value, ConnectorError> {
        let (Some(endpoint), Some(token)) = (&self.endpoint, &self.access_token) else {
            return Err(ConnectorError::NotConfigured(
                "Shopify not configured. Add SHOPIFY_SHOP and SHOPIFY_ACCESS_TOKEN to environment variables."
                    .to_string(),
            ));
        };

        let span = tracing::info_span!("shopify_graphql");
        let builder = self
            .http_client
            .post(endpoint)
            .header("X-Shopify-Access-Token", token)
            .json(&json!({ "query": query, "variables": variables }));
        let mut payload = http::send_json("Shopify", builder, span).await?;

        if let Some(errors) = payload.get("errors").filter(|e| !e.is_null()) {
            tracing::error!("Shopify GraphQL error: {}", errors);
            return Err(ConnectorError::InvalidResponse(format!(
                "Shopify GraphQL error: {}",
                errors
            )));
        }

        Ok(payload["data"].take())
    }

    /// Products with the number of reviews found in their metafield.
    pub async fn list_products(&self, limit: u32) -> Result<Vec<ShopifyProduct>, ConnectorError> {
        let data = self.graphql(PRODUCTS, json!({ "first": limit.max(1) })).await?;
        let edges = data["products"]["edges"].as_array().cloned().unwrap_or_default();

        Ok(edges
            .iter()
            .map(|edge| {
                let node = &edge["node"];
                let id = node["id"].as_str().unwrap_or_default().to_string();
                let total_reviews = parse_reviews_from_metafield(metafield_value(node), &id).len();
                ShopifyProduct {
                    title: node["title"].as_str().unwrap_or_default().to_string(),
                    handle: node["handle"].as_str().unwrap_or_default().to_string(),
                    id,
                    total_reviews,
                }
            })
            .collect())
    }
}

#[async_trait]
impl MarketplaceConnector for ShopifyClient {
    fn platform(&self) -> Platform {
        Platform::Shopify
    }

    fn is_configured(&self) -> bool {
        self.endpoint.is_some() && self.access_token.is_some()
    }

    fn extract_product_id(&self, reference: &str) -> Result<String, ConnectorError> {
        Ok(match ProductRef::parse(reference)? {
            ProductRef::Gid(gid) => gid,
            ProductRef::Handle(handle) => handle,
        })
    }

    async fn fetch_reviews(&self, reference: &str) -> Result<FetchedProduct, ConnectorError> {
        let product_ref = ProductRef::parse(reference)?;
        let (query, variables, field) = match &product_ref {
            ProductRef::Gid(gid) => (PRODUCT_BY_ID, json!({ "id": gid }), "product"),
            ProductRef::Handle(handle) => {
                (PRODUCT_BY_HANDLE, json!({ "handle": handle }), "productByHandle")
            }
        };
        let mut data = self.graphql(query, variables).await?;
        let product = data[field].take();

        if product.is_null() {
            return Err(ConnectorError::NotFound(format!(
                "Shopify product not found: {}",
                reference.trim()
            )));
        }

        let product_id = product["id"].as_str().unwrap_or_default().to_string();
        let reviews = parse_reviews_from_metafield(metafield_value(&product), &product_id);
        tracing::info!(
            product_id = %product_id,
            "Shopify: parsed {} reviews from metafield",
            reviews.len()
        );

        Ok(FetchedProduct {
            product_name: product["title"]
                .as_str()
                .filter(|t| !t.is_empty())
                .unwrap_or("Unknown Product")
                .to_string(),
            product_id,
            reviews,
        })
    }

    async fn test_connection(&self) -> ConnectionStatus {
        if !self.is_configured() {
            return ConnectionStatus {
                configured: false,
                connected: false,
                details: "Shop domain and access token not configured".to_string(),
            };
        }

        match self.graphql(SHOP, json!({})).await {
            Ok(data) => ConnectionStatus {
                configured: true,
                connected: true,
                details: format!(
                    "Connected to {} ({})",
                    data["shop"]["name"].as_str().unwrap_or_default(),
                    data["shop"]["myshopifyDomain"].as_str().unwrap_or_default()
                ),
            },
            Err(err) => ConnectionStatus {
                configured: true,
                connected: false,
                details: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOB: &str = r#"<div class="spr-reviews">
<div class="spr-review">
  <div class="spr-review-header">
    <span class="spr-starratings" aria-label="4 out of 5 stars"></span>
    <h3 class="spr-review-header-title">Solid kettle</h3>
    <span class="spr-review-header-byline"><strong class="spr-review-header-byline">Dana</strong></span>
    <span class="spr-review-header-date">2024-05-02</span>
    <span class="spr-badge-caption-verified">Verified</span>
  </div>
  <div class="spr-review-content"><div class="spr-review-content-body">Boils <b>fast</b>, lid is a bit loose.</div></div>
</div>
<div class="spr-review">
  <div class="spr-review-header">
    <span class="spr-starratings" aria-label="1 out of 5 stars"></span>
    <h3 class="spr-review-header-title">Title only</h3>
  </div>
</div>
</div>"#;

    #[test]
    fn parses_metafield_and_skips_blocks_without_body() {
        let reviews = parse_reviews_from_metafield(BLOB, "gid://shopify/Product/1");
        assert_eq!(reviews.len(), 1);

        let review = &reviews[0];
        assert_eq!(review.rating, Some(4));
        assert_eq!(review.title, "Solid kettle");
        assert_eq!(review.content, "Boils fast, lid is a bit loose.");
        assert_eq!(review.customer_name, "Dana");
        assert!(review.verified);
        assert_eq!(review.review_date.format("%Y-%m-%d").to_string(), "2024-05-02");
        assert!(review.external_review_id.as_deref().unwrap().starts_with("shopify-"));
    }

    #[test]
    fn missing_byline_defaults_to_anonymous() {
        let html = r#"<div class="spr-review"><div class="spr-review-content-body">Nice</div></div>"#;
        let reviews = parse_reviews_from_metafield(html, "p");
        assert_eq!(reviews[0].customer_name, "Anonymous");
        assert_eq!(reviews[0].rating, Some(0));
        assert!(!reviews[0].verified);
    }

    #[test]
    fn empty_metafield_yields_nothing() {
        assert!(parse_reviews_from_metafield("", "p").is_empty());
    }

    #[test]
    fn product_reference_forms() {
        assert_eq!(
            ProductRef::parse("gid://shopify/Product/42").unwrap(),
            ProductRef::Gid("gid://shopify/Product/42".into())
        );
        assert_eq!(
            ProductRef::parse("42").unwrap(),
            ProductRef::Gid("gid://shopify/Product/42".into())
        );
        assert_eq!(
            ProductRef::parse("https://shop.example.com/products/blue-kettle?variant=1").unwrap(),
            ProductRef::Handle("blue-kettle".into())
        );
        assert_eq!(
            ProductRef::parse("blue-kettle").unwrap(),
            ProductRef::Handle("blue-kettle".into())
        );
        assert_eq!(
            ProductRef::parse("https://shop.example.com/products/1984").unwrap(),
            ProductRef::Handle("1984".into())
        );
        assert!(ProductRef::parse("https://shop.example.com/collections/all").is_err());
        assert!(ProductRef::parse("").is_err());
    }

    #[tokio::test]
    async fn unconfigured_client_reports_status() {
        let client = ShopifyClient::new(&ShopifyConfig::default()).unwrap();
        let status = client.test_connection().await;
        assert!(!status.configured);
        assert!(!status.connected);
        assert!(matches!(
            client.fetch_reviews("42").await,
            Err(ConnectorError::NotConfigured(_))
        ));
    }
}
