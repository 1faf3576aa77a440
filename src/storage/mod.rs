//! Storage seam between the HTTP layer and the database.
//!
//! Every read and write takes an optional user id: when present the user
//! predicate is added, when absent the call sees all rows.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::models::{Product, Review, ReviewStatus, Sentiment, Severity, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Optional predicates for listing reviews; `None` fields are not applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewFilter {
    pub marketplace: Option<String>,
    pub status: Option<ReviewStatus>,
    pub sentiment: Option<Sentiment>,
    pub severity: Option<Severity>,
    pub product_id: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// Only rows that came from a marketplace or mailbox import.
    pub imported_only: bool,
}

impl ReviewFilter {
    pub fn matches(&self, review: &Review) -> bool {
        self.marketplace.as_ref().map_or(true, |m| &review.marketplace == m)
            && self.status.map_or(true, |s| review.status == s)
            && self.sentiment.map_or(true, |s| review.sentiment == s)
            && self.severity.map_or(true, |s| review.severity == s)
            && self
                .product_id
                .as_ref()
                .map_or(true, |p| review.product_id.as_ref() == Some(p))
            && self.start_date.map_or(true, |start| review.created_at >= start)
            && self.end_date.map_or(true, |end| review.created_at <= end)
            && (!self.imported_only || review.external_review_id.is_some())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDeletion {
    pub deleted: bool,
    pub reviews_deleted: u64,
}

pub(crate) fn owned_by(row_user: Option<&String>, user_id: Option<&str>) -> bool {
    match user_id {
        Some(user_id) => row_user.map(String::as_str) == Some(user_id),
        None => true,
    }
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Cheap round trip used by the health check.
    async fn ping(&self) -> Result<(), String> {
        Ok(())
    }

    /// Newest import first.
    async fn list_reviews(
        &self,
        filter: &ReviewFilter,
        user_id: Option<&str>,
    ) -> Result<Vec<Review>, String>;

    async fn get_review(&self, id: Uuid, user_id: Option<&str>) -> Result<Option<Review>, String>;

    async fn insert_review(&self, review: Review) -> Result<Review, String>;

    /// `false` when no row with this id is visible to the user.
    async fn update_review_status(
        &self,
        id: Uuid,
        status: ReviewStatus,
        user_id: Option<&str>,
    ) -> Result<bool, String>;

    async fn update_review_reply(
        &self,
        id: Uuid,
        reply: &str,
        user_id: Option<&str>,
    ) -> Result<bool, String>;

    async fn update_review_classification(&self, review: &Review) -> Result<bool, String>;

    async fn review_exists(
        &self,
        external_review_id: &str,
        marketplace: &str,
        user_id: Option<&str>,
    ) -> Result<bool, String>;

    async fn count_reviews_for_product(
        &self,
        platform: &str,
        product_id: &str,
        user_id: Option<&str>,
    ) -> Result<i64, String>;

    async fn delete_reviews_for_product(
        &self,
        platform: &str,
        product_id: &str,
        user_id: Option<&str>,
    ) -> Result<u64, String>;

    /// Most recently imported first.
    async fn list_products(&self, user_id: Option<&str>) -> Result<Vec<Product>, String>;

    async fn get_product(&self, id: Uuid, user_id: Option<&str>) -> Result<Option<Product>, String>;

    async fn find_product(
        &self,
        platform: &str,
        product_id: &str,
        user_id: Option<&str>,
    ) -> Result<Option<Product>, String>;

    async fn insert_product(&self, product: Product) -> Result<Product, String>;

    async fn touch_product(&self, id: Uuid) -> Result<(), String>;

    /// Deletes the product row, and with `cascade` its reviews. The two
    /// deletes are separate statements.
    async fn delete_product(
        &self,
        id: Uuid,
        cascade: bool,
        user_id: Option<&str>,
    ) -> Result<ProductDeletion, String> {
        let Some(product) = self.get_product(id, user_id).await? else {
            return Ok(ProductDeletion::default());
        };

        let reviews_deleted = if cascade {
            self.delete_reviews_for_product(&product.platform, &product.product_id, user_id)
                .await?
        } else {
            0
        };

        Ok(ProductDeletion {
            deleted: self.remove_product(id, user_id).await?,
            reviews_deleted,
        })
    }

    async fn remove_product(&self, id: Uuid, user_id: Option<&str>) -> Result<bool, String>;

    async fn upsert_user(&self, user: User) -> Result<User, String>;

    async fn get_user(&self, id: &str) -> Result<Option<User>, String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn empty_filter_matches_everything() {
        assert!(ReviewFilter::default().matches(&Review::default()));
    }

    #[test]
    fn predicates_combine() {
        let review = Review {
            marketplace: "Walmart".into(),
            status: ReviewStatus::Resolved,
            sentiment: Sentiment::Negative,
            product_id: Some("123".into()),
            ..Default::default()
        };

        let filter = ReviewFilter {
            marketplace: Some("Walmart".into()),
            status: Some(ReviewStatus::Resolved),
            product_id: Some("123".into()),
            ..Default::default()
        };
        assert!(filter.matches(&review));

        let filter = ReviewFilter {
            sentiment: Some(Sentiment::Positive),
            ..filter
        };
        assert!(!filter.matches(&review));

        let filter = ReviewFilter {
            start_date: Some(review.created_at + Duration::days(1)),
            ..Default::default()
        };
        assert!(!filter.matches(&review));

        let filter = ReviewFilter {
            imported_only: true,
            ..Default::default()
        };
        assert!(!filter.matches(&review));
    }

    #[test]
    fn ownership_check() {
        let owner = Some("u1".to_string());
        assert!(owned_by(owner.as_ref(), Some("u1")));
        assert!(!owned_by(owner.as_ref(), Some("u2")));
        assert!(!owned_by(None, Some("u1")));
        assert!(owned_by(None, None));
    }
}
