use super::{ReviewFilter, ReviewStore};
use crate::db;
use crate::models::{Product, Review, ReviewStatus, User};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ReviewStore for PgStore {
    async fn ping(&self) -> Result<(), String> {
        db::ping(&self.pool).await
    }

    async fn list_reviews(
        &self,
        filter: &ReviewFilter,
        user_id: Option<&str>,
    ) -> Result<Vec<Review>, String> {
        db::review::fetch_all(&self.pool, filter, user_id).await
    }

    async fn get_review(&self, id: Uuid, user_id: Option<&str>) -> Result<Option<Review>, String> {
        db::review::fetch(&self.pool, id, user_id).await
    }

    async fn insert_review(&self, review: Review) -> Result<Review, String> {
        db::review::insert(&self.pool, review).await
    }

    async fn update_review_status(
        &self,
        id: Uuid,
        status: ReviewStatus,
        user_id: Option<&str>,
    ) -> Result<bool, String> {
        db::review::update_status(&self.pool, id, status, user_id).await
    }

    async fn update_review_reply(
        &self,
        id: Uuid,
        reply: &str,
        user_id: Option<&str>,
    ) -> Result<bool, String> {
        db::review::update_reply(&self.pool, id, reply, user_id).await
    }

    async fn update_review_classification(&self, review: &Review) -> Result<bool, String> {
        db::review::update_classification(&self.pool, review).await
    }

    async fn review_exists(
        &self,
        external_review_id: &str,
        marketplace: &str,
        user_id: Option<&str>,
    ) -> Result<bool, String> {
        db::review::exists(&self.pool, external_review_id, marketplace, user_id).await
    }

    async fn count_reviews_for_product(
        &self,
        platform: &str,
        product_id: &str,
        user_id: Option<&str>,
    ) -> Result<i64, String> {
        db::review::count_for_product(&self.pool, platform, product_id, user_id).await
    }

    async fn delete_reviews_for_product(
        &self,
        platform: &str,
        product_id: &str,
        user_id: Option<&str>,
    ) -> Result<u64, String> {
        db::review::delete_for_product(&self.pool, platform, product_id, user_id).await
    }

    async fn list_products(&self, user_id: Option<&str>) -> Result<Vec<Product>, String> {
        db::product::fetch_all(&self.pool, user_id).await
    }

    async fn get_product(&self, id: Uuid, user_id: Option<&str>) -> Result<Option<Product>, String> {
        db::product::fetch(&self.pool, id, user_id).await
    }

    async fn find_product(
        &self,
        platform: &str,
        product_id: &str,
        user_id: Option<&str>,
    ) -> Result<Option<Product>, String> {
        db::product::fetch_by_identifier(&self.pool, platform, product_id, user_id).await
    }

    async fn insert_product(&self, product: Product) -> Result<Product, String> {
        db::product::insert(&self.pool, product).await
    }

    async fn touch_product(&self, id: Uuid) -> Result<(), String> {
        db::product::touch(&self.pool, id).await
    }

    async fn remove_product(&self, id: Uuid, user_id: Option<&str>) -> Result<bool, String> {
        db::product::delete(&self.pool, id, user_id).await
    }

    async fn upsert_user(&self, user: User) -> Result<User, String> {
        db::user::upsert(&self.pool, user).await
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, String> {
        db::user::fetch(&self.pool, id).await
    }
}
