use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};

/// Identity as handed over by the upstream auth provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            email: None,
            first_name: None,
            last_name: None,
            profile_image_url: None,
            created_at: now,
            updated_at: now,
        }
    }
}
