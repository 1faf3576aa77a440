use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} value: {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }

    /// Model output is free text, anything unrecognised becomes neutral.
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl ReviewStatus {
    pub const ALL: [ReviewStatus; 3] = [
        ReviewStatus::Open,
        ReviewStatus::InProgress,
        ReviewStatus::Resolved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Open => "open",
            ReviewStatus::InProgress => "in_progress",
            ReviewStatus::Resolved => "resolved",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReviewStatus::Open => "Open",
            ReviewStatus::InProgress => "In Progress",
            ReviewStatus::Resolved => "Resolved",
        }
    }
}

impl FromStr for Sentiment {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "neutral" => Ok(Sentiment::Neutral),
            "negative" => Ok(Sentiment::Negative),
            _ => Err(UnknownVariant {
                kind: "sentiment",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for Severity {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(UnknownVariant {
                kind: "severity",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for ReviewStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "open" => Ok(ReviewStatus::Open),
            "in_progress" => Ok(ReviewStatus::InProgress),
            "resolved" => Ok(ReviewStatus::Resolved),
            _ => Err(UnknownVariant {
                kind: "status",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub user_id: Option<String>,
    pub external_review_id: Option<String>, // dedup key together with marketplace
    pub marketplace: String,
    pub product_id: Option<String>,
    pub title: String,
    pub content: String,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub rating: Option<i32>,
    pub sentiment: Sentiment,
    pub category: String,
    pub severity: Severity,
    pub status: ReviewStatus,
    pub ai_suggested_reply: Option<String>,
    pub ai_analysis_details: Option<String>, // JSON encoded analysis
    pub verified: bool,
    pub created_at: DateTime<Utc>,  // as reported by the marketplace
    pub imported_at: DateTime<Utc>, // assigned on insert
}

impl Default for Review {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: None,
            external_review_id: None,
            marketplace: String::new(),
            product_id: None,
            title: String::new(),
            content: String::new(),
            customer_name: String::new(),
            customer_email: None,
            rating: None,
            sentiment: Sentiment::default(),
            category: "general".to_string(),
            severity: Severity::default(),
            status: ReviewStatus::default(),
            ai_suggested_reply: None,
            ai_analysis_details: None,
            verified: false,
            created_at: now,
            imported_at: now,
        }
    }
}

fn decode_column<T>(row: &PgRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = UnknownVariant>,
{
    let raw: String = row.try_get(column)?;
    raw.parse::<T>().map_err(|err| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(err),
    })
}

impl<'r> FromRow<'r, PgRow> for Review {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            external_review_id: row.try_get("external_review_id")?,
            marketplace: row.try_get("marketplace")?,
            product_id: row.try_get("product_id")?,
            title: row.try_get("title")?,
            content: row.try_get("content")?,
            customer_name: row.try_get("customer_name")?,
            customer_email: row.try_get("customer_email")?,
            rating: row.try_get("rating")?,
            sentiment: decode_column(row, "sentiment")?,
            category: row.try_get("category")?,
            severity: decode_column(row, "severity")?,
            status: decode_column(row, "status")?,
            ai_suggested_reply: row.try_get("ai_suggested_reply")?,
            ai_analysis_details: row.try_get("ai_analysis_details")?,
            verified: row.try_get("verified")?,
            created_at: row.try_get("created_at")?,
            imported_at: row.try_get("imported_at")?,
        })
    }
}
