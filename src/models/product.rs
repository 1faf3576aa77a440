use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};
use uuid::Uuid;

/// A marketplace listing whose reviews are tracked.
/// Created on the first successful import of a (platform, product_id) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub user_id: Option<String>,
    pub platform: String,
    pub product_id: String, // ASIN, Walmart item id, Shopify gid
    pub product_name: String,
    pub last_imported: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        platform: impl Into<String>,
        product_id: impl Into<String>,
        product_name: impl Into<String>,
        user_id: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            platform: platform.into(),
            product_id: product_id.into(),
            product_name: product_name.into(),
            last_imported: now,
            created_at: now,
        }
    }
}
