use super::{
    parse_review_date, review_fingerprint, ConnectionStatus, FetchedProduct, MarketplaceConnector,
    RawReview,
};
use crate::connectors::config::OutscraperConfig;
use crate::connectors::errors::ConnectorError;
use crate::connectors::http::{self, bool_field, f64_field, str_field};
use crate::models::Platform;
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

const DEFAULT_AUTHOR: &str = "Amazon Customer";

fn asin_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?i)/dp/([A-Z0-9]{10})",
            r"(?i)/gp/product/([A-Z0-9]{10})",
            r"(?i)/product/([A-Z0-9]{10})",
            r"(?i)/ASIN/([A-Z0-9]{10})",
        ]
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
    })
}

/// ASIN embedded in an Amazon URL. Values without a `/` are taken to be the
/// ASIN already; URLs without a known path shape are returned unchanged.
pub fn extract_asin(url_or_asin: &str) -> String {
    let value = url_or_asin.trim();
    if !value.contains('/') {
        return value.to_string();
    }

    asin_patterns()
        .iter()
        .find_map(|pattern| pattern.captures(value))
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| value.to_string())
}

/// Amazon reviews through the Outscraper scraping API.
pub struct OutscraperClient {
    base_url: String,
    api_key: Option<String>,
    reviews_limit: u32,
    sort: String,
    http_client: reqwest::Client,
}

impl OutscraperClient {
    pub fn new(config: &OutscraperConfig) -> Result<Self, ConnectorError> {
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            reviews_limit: config.reviews_limit.max(1),
            sort: config.sort.clone(),
            http_client: http::build_client(config.timeout_secs)?,
        })
    }

    fn api_key(&self) -> Result<&str, ConnectorError> {
        self.api_key.as_deref().ok_or_else(|| {
            ConnectorError::NotConfigured(
                "Outscraper API key not configured. Add OUTSCRAPER_API_KEY to secrets.".to_string(),
            )
        })
    }

    async fn request(&self, asin: &str, limit: u32) -> Result<Value, ConnectorError> {
        let api_key = self.api_key()?;
        let span = tracing::info_span!("outscraper_amazon_reviews", asin, limit);
        let builder = self
            .http_client
            .get(format!("{}/amazon-reviews", self.base_url))
            .header("X-API-KEY", api_key)
            .header("Accept", "application/json")
            .query(&[
                ("query", asin.to_string()),
                ("limit", limit.to_string()),
                ("sort", self.sort.clone()),
                ("async", "false".to_string()),
            ]);

        http::send_json("Outscraper", builder, span).await
    }

    /// The first result group holds the reviews for the (single) queried ASIN.
    fn review_items(payload: &Value) -> Vec<Value> {
        ["results", "data"]
            .iter()
            .find_map(|key| payload.get(*key).and_then(|v| v.as_array()))
            .and_then(|groups| groups.first())
            .and_then(|group| group.as_array())
            .cloned()
            .unwrap_or_default()
    }

    fn convert(asin: &str, item: &Value) -> RawReview {
        let customer_name =
            str_field(item, &["author_name", "author_title"]).unwrap_or_else(|| DEFAULT_AUTHOR.to_string());
        let title = str_field(item, &["title"]).unwrap_or_default();
        let content = str_field(item, &["body", "review_text"]).unwrap_or_default();
        let raw_date = str_field(item, &["date", "review_datetime_utc"]);
        let rating = f64_field(item, &["rating", "review_rating"]).map(|r| r.round() as i32);

        let external_review_id = str_field(item, &["id", "review_id"]).or_else(|| {
            Some(review_fingerprint(
                Platform::Amazon,
                asin,
                &customer_name,
                raw_date.as_deref().unwrap_or_default(),
                &title,
                &content,
            ))
        });

        RawReview {
            external_review_id,
            customer_name,
            rating: Some(rating.unwrap_or(0)),
            title,
            content,
            review_date: parse_review_date(raw_date.as_deref()),
            verified: bool_field(item, &["verified_purchase", "is_verified"]).unwrap_or(false),
        }
    }

    /// Reviews without persisting anything, for the preview panel.
    pub async fn preview(&self, asin_or_url: &str, limit: u32) -> Result<FetchedProduct, ConnectorError> {
        let asin = self.extract_product_id(asin_or_url)?;
        tracing::info!("Outscraper: fetching up to {} reviews for ASIN {}", limit, asin);

        let payload = self.request(&asin, limit.max(1)).await?;
        let items = Self::review_items(&payload);
        if items.is_empty() {
            tracing::info!("Outscraper: no reviews found for ASIN {}", asin);
        }

        let product_name = items
            .iter()
            .find_map(|item| str_field(item, &["product_name", "product_title"]))
            .unwrap_or_else(|| format!("Amazon Product {}", asin));
        let reviews: Vec<RawReview> = items.iter().map(|item| Self::convert(&asin, item)).collect();
        tracing::info!("Outscraper: fetched {} reviews for ASIN {}", reviews.len(), asin);

        Ok(FetchedProduct {
            product_id: asin,
            product_name,
            reviews,
        })
    }
}

#[async_trait]
impl MarketplaceConnector for OutscraperClient {
    fn platform(&self) -> Platform {
        Platform::Amazon
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn extract_product_id(&self, reference: &str) -> Result<String, ConnectorError> {
        let asin = extract_asin(reference);
        if asin.is_empty() {
            return Err(ConnectorError::InvalidInput(
                "Amazon product URL or ASIN is required".to_string(),
            ));
        }
        Ok(asin)
    }

    async fn fetch_reviews(&self, reference: &str) -> Result<FetchedProduct, ConnectorError> {
        self.preview(reference, self.reviews_limit).await
    }

    async fn test_connection(&self) -> ConnectionStatus {
        ConnectionStatus {
            configured: self.is_configured(),
            connected: self.is_configured(),
            details: if self.is_configured() {
                "Outscraper API key configured".to_string()
            } else {
                "OUTSCRAPER_API_KEY not configured".to_string()
            },
        }
    }
}
