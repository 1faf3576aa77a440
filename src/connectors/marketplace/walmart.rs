use super::{
    parse_review_date, review_fingerprint, ConnectionStatus, FetchedProduct, MarketplaceConnector,
    RawReview,
};
use crate::connectors::config::AxessoConfig;
use crate::connectors::errors::ConnectorError;
use crate::connectors::http::{self, f64_field, str_field};
use crate::models::Platform;
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn item_id_pattern() -> &'static Option<Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"/ip/(?:[^/?#]+/)?(\d+)").ok())
}

/// Numeric item id from `/ip/<slug>/<id>` or `/ip/<id>`; the URL itself otherwise.
pub fn extract_item_id(product_url: &str) -> String {
    let url = product_url.trim();
    item_id_pattern()
        .as_ref()
        .and_then(|pattern| pattern.captures(url))
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| url.to_string())
}

/// Walmart product lookups through the Axesso data service on RapidAPI.
pub struct AxessoWalmartClient {
    base_url: String,
    host: String,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl AxessoWalmartClient {
    pub fn new(config: &AxessoConfig) -> Result<Self, ConnectorError> {
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            host: config.host.clone(),
            api_key: config.api_key.clone(),
            http_client: http::build_client(config.timeout_secs)?,
        })
    }

    fn api_key(&self) -> Result<&str, ConnectorError> {
        self.api_key.as_deref().ok_or_else(|| {
            ConnectorError::NotConfigured(
                "AXESSO_API_KEY is not configured. Please add it to your environment variables."
                    .to_string(),
            )
        })
    }

    fn lookup_request(&self, api_key: &str, product_url: &str) -> reqwest::RequestBuilder {
        self.http_client
            .get(format!("{}/wlm/walmart-lookup-product", self.base_url))
            .header("x-rapidapi-key", api_key)
            .header("x-rapidapi-host", &self.host)
            .query(&[("url", product_url)])
    }

    fn convert(product_id: &str, item: &Value) -> RawReview {
        let customer_name = str_field(item, &["reviewerName", "userNickname"])
            .unwrap_or_else(|| "Anonymous".to_string());
        let title = str_field(item, &["title", "reviewTitle"]).unwrap_or_default();
        let content = str_field(item, &["reviewText", "text"]).unwrap_or_default();
        let raw_date = str_field(item, &["reviewDate", "date"]);
        let rating = f64_field(item, &["rating"]).map(|r| r.round() as i32).unwrap_or(0);

        let external_review_id = str_field(item, &["reviewId", "id"]).or_else(|| {
            Some(review_fingerprint(
                Platform::Walmart,
                product_id,
                &customer_name,
                raw_date.as_deref().unwrap_or_default(),
                &title,
                &content,
            ))
        });

        RawReview {
            external_review_id,
            customer_name,
            rating: Some(rating),
            title,
            content,
            review_date: parse_review_date(raw_date.as_deref()),
            verified: false,
        }
    }
}

#[async_trait]
impl MarketplaceConnector for AxessoWalmartClient {
    fn platform(&self) -> Platform {
        Platform::Walmart
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn extract_product_id(&self, reference: &str) -> Result<String, ConnectorError> {
        if !reference.contains("walmart.com") {
            return Err(ConnectorError::InvalidInput(
                "Invalid Walmart URL. Please provide a valid walmart.com product URL.".to_string(),
            ));
        }
        Ok(extract_item_id(reference))
    }

    async fn fetch_reviews(&self, reference: &str) -> Result<FetchedProduct, ConnectorError> {
        let api_key = self.api_key()?;
        let product_id = self.extract_product_id(reference)?;
        let product_url = reference.trim();

        let span = tracing::info_span!("axesso_walmart_lookup", product_id = %product_id);
        let (status, text) =
            http::send_text(self.lookup_request(api_key, product_url), span).await?;

        match status {
            200..=299 => {}
            403 => {
                tracing::error!(status, body = %text, "[Walmart] API error response");
                return Err(ConnectorError::Unauthorized(
                    "API authentication failed. Please verify your AXESSO_API_KEY is correct."
                        .to_string(),
                ));
            }
            404 => {
                return Err(ConnectorError::NotFound(
                    "Product not found. Please check the Walmart product URL.".to_string(),
                ))
            }
            status => {
                tracing::error!(status, body = %text, "[Walmart] API error response");
                return Err(ConnectorError::HttpError {
                    service: "Axesso",
                    status,
                    body: text,
                });
            }
        }

        let data: Value =
            serde_json::from_str(&text).map_err(|_| ConnectorError::InvalidResponse(text.clone()))?;
        tracing::debug!("[Walmart] API response: {}", data);

        if data.get("responseStatus").and_then(|v| v.as_str()) == Some("PRODUCT_NOT_FOUND") {
            let message = str_field(&data, &["responseMessage"])
                .unwrap_or_else(|| "The product may not be indexed in Axesso database".to_string());
            return Err(ConnectorError::NotFound(format!("Product not found: {}", message)));
        }

        let reviews = data
            .get("reviews")
            .and_then(|v| v.as_array())
            .map(|items| items.iter().map(|item| Self::convert(&product_id, item)).collect())
            .unwrap_or_default();

        Ok(FetchedProduct {
            product_name: str_field(&data, &["productTitle"])
                .unwrap_or_else(|| "Unknown Product".to_string()),
            product_id,
            reviews,
        })
    }

    async fn test_connection(&self) -> ConnectionStatus {
        let Ok(api_key) = self.api_key() else {
            return ConnectionStatus {
                configured: false,
                connected: false,
                details: "AXESSO_API_KEY not configured".to_string(),
            };
        };

        // Any answer other than 403 means the key was accepted.
        let span = tracing::info_span!("axesso_walmart_ping");
        let probe = self.lookup_request(api_key, "https://www.walmart.com/ip/test");
        match http::send_text(probe, span).await {
            Ok((403, _)) => ConnectionStatus {
                configured: true,
                connected: false,
                details: "API key authentication failed".to_string(),
            },
            Ok(_) => ConnectionStatus {
                configured: true,
                connected: true,
                details: "Successfully connected to Axesso Walmart Data Service".to_string(),
            },
            Err(err) => ConnectionStatus {
                configured: true,
                connected: false,
                details: err.to_string(),
            },
        }
    }
}
