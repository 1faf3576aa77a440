use super::{owned_by, ReviewFilter, ReviewStore};
use crate::models::{Product, Review, ReviewStatus, User};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local store used by tests and database-less runs.
#[derive(Default)]
pub struct MemoryStore {
    reviews: RwLock<HashMap<Uuid, Review>>,
    products: RwLock<HashMap<Uuid, Product>>,
    users: RwLock<HashMap<String, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn same_product(review: &Review, platform: &str, product_id: &str) -> bool {
    review.marketplace == platform && review.product_id.as_deref() == Some(product_id)
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn list_reviews(
        &self,
        filter: &ReviewFilter,
        user_id: Option<&str>,
    ) -> Result<Vec<Review>, String> {
        let reviews = self.reviews.read().await;
        let mut list: Vec<Review> = reviews
            .values()
            .filter(|r| owned_by(r.user_id.as_ref(), user_id) && filter.matches(r))
            .cloned()
            .collect();
        list.sort_by(|a, b| b.imported_at.cmp(&a.imported_at));
        Ok(list)
    }

    async fn get_review(&self, id: Uuid, user_id: Option<&str>) -> Result<Option<Review>, String> {
        Ok(self
            .reviews
            .read()
            .await
            .get(&id)
            .filter(|r| owned_by(r.user_id.as_ref(), user_id))
            .cloned())
    }

    async fn insert_review(&self, mut review: Review) -> Result<Review, String> {
        review.imported_at = Utc::now();
        self.reviews.write().await.insert(review.id, review.clone());
        Ok(review)
    }

    async fn update_review_status(
        &self,
        id: Uuid,
        status: ReviewStatus,
        user_id: Option<&str>,
    ) -> Result<bool, String> {
        let mut reviews = self.reviews.write().await;
        match reviews.get_mut(&id).filter(|r| owned_by(r.user_id.as_ref(), user_id)) {
            Some(review) => {
                review.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_review_reply(
        &self,
        id: Uuid,
        reply: &str,
        user_id: Option<&str>,
    ) -> Result<bool, String> {
        let mut reviews = self.reviews.write().await;
        match reviews.get_mut(&id).filter(|r| owned_by(r.user_id.as_ref(), user_id)) {
            Some(review) => {
                review.ai_suggested_reply = Some(reply.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_review_classification(&self, update: &Review) -> Result<bool, String> {
        let mut reviews = self.reviews.write().await;
        let user_id = update.user_id.as_deref();
        match reviews
            .get_mut(&update.id)
            .filter(|r| owned_by(r.user_id.as_ref(), user_id))
        {
            Some(review) => {
                review.sentiment = update.sentiment;
                review.severity = update.severity;
                review.category = update.category.clone();
                review.ai_analysis_details = update.ai_analysis_details.clone();
                review.ai_suggested_reply = update.ai_suggested_reply.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn review_exists(
        &self,
        external_review_id: &str,
        marketplace: &str,
        user_id: Option<&str>,
    ) -> Result<bool, String> {
        Ok(self.reviews.read().await.values().any(|r| {
            r.external_review_id.as_deref() == Some(external_review_id)
                && r.marketplace == marketplace
                && owned_by(r.user_id.as_ref(), user_id)
        }))
    }

    async fn count_reviews_for_product(
        &self,
        platform: &str,
        product_id: &str,
        user_id: Option<&str>,
    ) -> Result<i64, String> {
        Ok(self
            .reviews
            .read()
            .await
            .values()
            .filter(|r| same_product(r, platform, product_id) && owned_by(r.user_id.as_ref(), user_id))
            .count() as i64)
    }

    async fn delete_reviews_for_product(
        &self,
        platform: &str,
        product_id: &str,
        user_id: Option<&str>,
    ) -> Result<u64, String> {
        let mut reviews = self.reviews.write().await;
        let before = reviews.len();
        reviews.retain(|_, r| {
            !(same_product(r, platform, product_id) && owned_by(r.user_id.as_ref(), user_id))
        });
        Ok((before - reviews.len()) as u64)
    }

    async fn list_products(&self, user_id: Option<&str>) -> Result<Vec<Product>, String> {
        let mut list: Vec<Product> = self
            .products
            .read()
            .await
            .values()
            .filter(|p| owned_by(p.user_id.as_ref(), user_id))
            .cloned()
            .collect();
        list.sort_by(|a, b| b.last_imported.cmp(&a.last_imported));
        Ok(list)
    }

    async fn get_product(&self, id: Uuid, user_id: Option<&str>) -> Result<Option<Product>, String> {
        Ok(self
            .products
            .read()
            .await
            .get(&id)
            .filter(|p| owned_by(p.user_id.as_ref(), user_id))
            .cloned())
    }

    async fn find_product(
        &self,
        platform: &str,
        product_id: &str,
        user_id: Option<&str>,
    ) -> Result<Option<Product>, String> {
        Ok(self
            .products
            .read()
            .await
            .values()
            .find(|p| {
                p.platform == platform
                    && p.product_id == product_id
                    && owned_by(p.user_id.as_ref(), user_id)
            })
            .cloned())
    }

    async fn insert_product(&self, product: Product) -> Result<Product, String> {
        self.products.write().await.insert(product.id, product.clone());
        Ok(product)
    }

    async fn touch_product(&self, id: Uuid) -> Result<(), String> {
        if let Some(product) = self.products.write().await.get_mut(&id) {
            product.last_imported = Utc::now();
        }
        Ok(())
    }

    async fn remove_product(&self, id: Uuid, user_id: Option<&str>) -> Result<bool, String> {
        let mut products = self.products.write().await;
        let visible = products
            .get(&id)
            .map_or(false, |p| owned_by(p.user_id.as_ref(), user_id));
        Ok(visible && products.remove(&id).is_some())
    }

    async fn upsert_user(&self, user: User) -> Result<User, String> {
        let mut users = self.users.write().await;
        let merged = match users.get(&user.id) {
            Some(existing) => User {
                email: user.email.or_else(|| existing.email.clone()),
                first_name: user.first_name.or_else(|| existing.first_name.clone()),
                last_name: user.last_name.or_else(|| existing.last_name.clone()),
                profile_image_url: user
                    .profile_image_url
                    .or_else(|| existing.profile_image_url.clone()),
                created_at: existing.created_at,
                updated_at: Utc::now(),
                id: user.id,
            },
            None => user,
        };
        users.insert(merged.id.clone(), merged.clone());
        Ok(merged)
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, String> {
        Ok(self.users.read().await.get(id).cloned())
    }
}
