use crate::models::{ReviewStatus, Sentiment, Severity};
use crate::storage::ReviewFilter;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_valid::Validate;

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct StatusForm {
    #[serde(default)]
    #[validate(min_length = 1)]
    #[validate(max_length = 20)]
    pub status: String,
}

impl StatusForm {
    pub fn status(&self) -> Result<ReviewStatus, String> {
        self.status
            .parse::<ReviewStatus>()
            .map_err(|_| format!("Invalid status: {}", self.status))
    }
}

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct ReplyForm {
    #[serde(default)]
    #[validate(min_length = 1)]
    #[validate(max_length = 5000)]
    pub reply: String,
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates.
pub fn parse_query_date(raw: &str, end_of_day: bool) -> Result<DateTime<Utc>, String> {
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Ok(date.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| format!("Invalid date: {}", raw))?;
    let time = if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    time.map(|t| t.and_utc())
        .ok_or_else(|| format!("Invalid date: {}", raw))
}

fn parse_optional<T, F>(value: &Option<String>, parse: F) -> Result<Option<T>, String>
where
    F: Fn(&str) -> Result<T, String>,
{
    match value.as_deref().map(str::trim).filter(|v| !v.is_empty() && *v != "all") {
        Some(v) => parse(v).map(Some),
        None => Ok(None),
    }
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQuery {
    pub marketplace: Option<String>,
    pub status: Option<String>,
    pub sentiment: Option<String>,
    pub severity: Option<String>,
    pub product_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl ReviewQuery {
    pub fn to_filter(&self) -> Result<ReviewFilter, String> {
        Ok(ReviewFilter {
            marketplace: parse_optional(&self.marketplace, |v| {
                v.parse::<crate::models::Platform>()
                    .map(|p| p.as_str().to_string())
                    .map_err(|err| err.to_string())
            })?,
            status: parse_optional(&self.status, |v| {
                v.parse::<ReviewStatus>().map_err(|err| err.to_string())
            })?,
            sentiment: parse_optional(&self.sentiment, |v| {
                v.parse::<Sentiment>().map_err(|err| err.to_string())
            })?,
            severity: parse_optional(&self.severity, |v| {
                v.parse::<Severity>().map_err(|err| err.to_string())
            })?,
            product_id: parse_optional(&self.product_id, |v| Ok(v.to_string()))?,
            start_date: parse_optional(&self.start_date, |v| parse_query_date(v, false))?,
            end_date: parse_optional(&self.end_date, |v| parse_query_date(v, true))?,
            imported_only: false,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl DateRangeQuery {
    pub fn to_filter(&self) -> Result<ReviewFilter, String> {
        ReviewQuery {
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            ..Default::default()
        }
        .to_filter()
    }
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct DeleteProductQuery {
    #[serde(default)]
    pub cascade: bool,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct LimitQuery {
    pub limit: Option<u32>,
}
