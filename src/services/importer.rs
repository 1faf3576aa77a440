use super::analyzer::{EmailClassification, ReviewAnalysis, ReviewAnalyzer};
use crate::connectors::{ConnectorError, EmailMessage, MarketplaceRegistry, RawReview};
use crate::models::{Platform, Product, Review};
use crate::storage::ReviewStore;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("No connector registered for {0}")]
    UnsupportedPlatform(Platform),
    #[error(transparent)]
    Connector(#[from] ConnectorError),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Product not found")]
    ProductNotFound,
}

impl ResponseError for ImportError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::UnsupportedPlatform(_) => StatusCode::BAD_REQUEST,
            Self::Connector(err) => err.status_code(),
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ProductNotFound => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            Self::Connector(err) => err.error_response(),
            Self::Storage(_) => HttpResponse::build(self.status_code())
                .json(json!({ "error": "Failed to import reviews" })),
            other => HttpResponse::build(self.status_code()).json(json!({ "error": other.to_string() })),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub product: Product,
    pub fetched: usize,
    pub imported: usize,
    pub skipped: usize,
}

/// An email handed in for import, as listed from the mailbox.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEmail {
    pub message_id: Option<String>,
    pub subject: String,
    pub body: String,
    pub sender_name: String,
    pub sender_email: Option<String>,
    pub received_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<EmailMessage> for InboundEmail {
    fn from(message: EmailMessage) -> Self {
        Self {
            message_id: Some(message.id).filter(|id| !id.is_empty()),
            subject: message.subject,
            body: message.body_preview,
            sender_name: message.sender_name,
            sender_email: message.sender_email,
            received_at: message.received_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailImportOutcome {
    /// `None` for duplicates, which are never sent to the model.
    pub classification: Option<EmailClassification>,
    pub review: Option<Review>,
    pub duplicate: bool,
}

/// Fetch, dedup, classify and store reviews for one product at a time.
pub struct ReviewImporter {
    store: Arc<dyn ReviewStore>,
    marketplaces: MarketplaceRegistry,
    analyzer: Arc<ReviewAnalyzer>,
}

impl ReviewImporter {
    pub fn new(
        store: Arc<dyn ReviewStore>,
        marketplaces: MarketplaceRegistry,
        analyzer: Arc<ReviewAnalyzer>,
    ) -> Self {
        Self {
            store,
            marketplaces,
            analyzer,
        }
    }

    pub fn marketplaces(&self) -> &MarketplaceRegistry {
        &self.marketplaces
    }

    /// Nothing is written when the fetch fails. Classification failures only
    /// affect the review concerned, which is stored with default values.
    #[tracing::instrument(name = "Import reviews", skip(self))]
    pub async fn import(
        &self,
        platform: Platform,
        reference: &str,
        user_id: Option<&str>,
    ) -> Result<ImportSummary, ImportError> {
        let connector = self
            .marketplaces
            .get(platform)
            .ok_or(ImportError::UnsupportedPlatform(platform))?;

        let fetched = connector.fetch_reviews(reference).await?;
        tracing::info!(
            product_id = %fetched.product_id,
            "Fetched {} reviews from {}",
            fetched.reviews.len(),
            platform
        );

        let product = self
            .resolve_product(platform, &fetched.product_id, &fetched.product_name, user_id)
            .await?;

        let mut imported = 0;
        let mut skipped = 0;
        for raw in &fetched.reviews {
            if let Some(external_id) = raw.external_review_id.as_deref() {
                let exists = self
                    .store
                    .review_exists(external_id, platform.as_str(), user_id)
                    .await
                    .map_err(ImportError::Storage)?;
                if exists {
                    skipped += 1;
                    continue;
                }
            }

            let review = self
                .classify(platform, &product.product_id, raw, user_id)
                .await;
            self.store
                .insert_review(review)
                .await
                .map_err(ImportError::Storage)?;
            imported += 1;
        }

        self.store
            .touch_product(product.id)
            .await
            .map_err(ImportError::Storage)?;
        tracing::info!(imported, skipped, "Import finished for {}", product.product_id);

        Ok(ImportSummary {
            product,
            fetched: fetched.reviews.len(),
            imported,
            skipped,
        })
    }

    /// Re-imports a tracked product using its stored identifier.
    pub async fn refresh(
        &self,
        product_id: Uuid,
        user_id: Option<&str>,
    ) -> Result<ImportSummary, ImportError> {
        let product = self
            .store
            .get_product(product_id, user_id)
            .await
            .map_err(ImportError::Storage)?
            .ok_or(ImportError::ProductNotFound)?;

        let platform: Platform = product
            .platform
            .parse()
            .map_err(|err: crate::models::UnknownVariant| ImportError::Storage(err.to_string()))?;

        self.import(platform, &refresh_reference(platform, &product.product_id), user_id)
            .await
    }

    /// Classifies an email and stores it as an Outlook review when the model
    /// says it is feedback. Messages already stored are skipped unclassified.
    #[tracing::instrument(name = "Import email", skip(self, email), fields(subject = %email.subject))]
    pub async fn import_email(
        &self,
        email: &InboundEmail,
        user_id: Option<&str>,
    ) -> Result<EmailImportOutcome, ImportError> {
        if let Some(message_id) = email.message_id.as_deref() {
            let exists = self
                .store
                .review_exists(message_id, Platform::Outlook.as_str(), user_id)
                .await
                .map_err(ImportError::Storage)?;
            if exists {
                return Ok(EmailImportOutcome {
                    classification: None,
                    review: None,
                    duplicate: true,
                });
            }
        }

        let classification = self
            .analyzer
            .classify_email(&email.subject, &email.body, &email.sender_name)
            .await?;

        if !classification.should_import() {
            return Ok(EmailImportOutcome {
                classification: Some(classification),
                review: None,
                duplicate: false,
            });
        }

        let raw = RawReview {
            external_review_id: email.message_id.clone(),
            customer_name: email.sender_name.clone(),
            rating: None,
            title: email.subject.clone(),
            content: email.body.clone(),
            review_date: email.received_at.unwrap_or_else(chrono::Utc::now),
            verified: false,
        };
        let mut review = self.classify(Platform::Outlook, "", &raw, user_id).await;
        review.product_id = None;
        review.customer_email = email.sender_email.clone();

        let review = self
            .store
            .insert_review(review)
            .await
            .map_err(ImportError::Storage)?;

        Ok(EmailImportOutcome {
            classification: Some(classification),
            review: Some(review),
            duplicate: false,
        })
    }

    /// Builds the row for one raw review, running analysis and reply drafting.
    async fn classify(
        &self,
        platform: Platform,
        product_id: &str,
        raw: &RawReview,
        user_id: Option<&str>,
    ) -> Review {
        let marketplace = platform.as_str();
        let analysis = match self
            .analyzer
            .analyze(&raw.content, &raw.customer_name, marketplace)
            .await
        {
            Ok(analysis) => analysis,
            Err(err) => {
                tracing::warn!("Review analysis failed, storing defaults: {}", err);
                ReviewAnalysis::failed()
            }
        };

        let reply = match self
            .analyzer
            .generate_reply(
                &raw.content,
                &raw.customer_name,
                marketplace,
                analysis.sentiment,
                analysis.severity,
            )
            .await
        {
            Ok(reply) if !reply.is_empty() => Some(reply),
            Ok(_) => None,
            Err(err) => {
                tracing::warn!("Reply generation failed: {}", err);
                None
            }
        };

        Review {
            user_id: user_id.map(str::to_string),
            external_review_id: raw.external_review_id.clone(),
            marketplace: marketplace.to_string(),
            product_id: Some(product_id.to_string()),
            title: raw.title.clone(),
            content: raw.content.clone(),
            customer_name: raw.customer_name.clone(),
            rating: raw.rating,
            sentiment: analysis.sentiment,
            category: analysis.category.clone(),
            severity: analysis.severity,
            ai_suggested_reply: reply,
            ai_analysis_details: serde_json::to_string(&analysis).ok(),
            verified: raw.verified,
            created_at: raw.review_date,
            ..Default::default()
        }
    }

    /// Re-runs analysis and reply drafting for a stored review.
    pub async fn reanalyze(&self, review: &Review) -> Result<Review, ConnectorError> {
        let analysis = self
            .analyzer
            .analyze(&review.content, &review.customer_name, &review.marketplace)
            .await?;
        let reply = self
            .analyzer
            .generate_reply(
                &review.content,
                &review.customer_name,
                &review.marketplace,
                analysis.sentiment,
                analysis.severity,
            )
            .await?;

        Ok(Review {
            sentiment: analysis.sentiment,
            severity: analysis.severity,
            category: analysis.category.clone(),
            ai_analysis_details: serde_json::to_string(&analysis).ok(),
            ai_suggested_reply: Some(reply).filter(|r| !r.is_empty()),
            ..review.clone()
        })
    }

    async fn resolve_product(
        &self,
        platform: Platform,
        product_id: &str,
        product_name: &str,
        user_id: Option<&str>,
    ) -> Result<Product, ImportError> {
        let existing = self
            .store
            .find_product(platform.as_str(), product_id, user_id)
            .await
            .map_err(ImportError::Storage)?;

        match existing {
            Some(product) => Ok(product),
            None => self
                .store
                .insert_product(Product::new(
                    platform.as_str(),
                    product_id,
                    product_name,
                    user_id.map(str::to_string),
                ))
                .await
                .map_err(ImportError::Storage),
        }
    }
}

/// Reference the adapter accepts for a stored product identifier.
fn refresh_reference(platform: Platform, product_id: &str) -> String {
    match platform {
        Platform::Walmart if !product_id.contains("walmart.com") => {
            format!("https://www.walmart.com/ip/{}", product_id)
        }
        _ => product_id.to_string(),
    }
}
