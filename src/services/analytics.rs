use crate::models::{Review, ReviewStatus, Sentiment};
use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_reviews: usize,
    pub positive_rate: String,
    pub negative_rate: String,
    pub resolution_rate: String,
    pub avg_rating: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SentimentCounts {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

/// Dashboard aggregates over a set of reviews.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub stats: Stats,
    /// Keyed by the Monday starting each ISO week.
    pub weekly_trends: BTreeMap<String, SentimentCounts>,
    pub category_counts: BTreeMap<String, usize>,
    pub marketplace_counts: BTreeMap<String, usize>,
    pub rating_counts: BTreeMap<String, usize>,
    pub status_counts: BTreeMap<String, usize>,
}

fn percent(part: usize, total: usize) -> String {
    if total == 0 {
        return "0.0".to_string();
    }
    format!("{:.1}", part as f64 * 100.0 / total as f64)
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

impl AnalyticsReport {
    pub fn from_reviews(reviews: &[Review]) -> Self {
        let total = reviews.len();
        let mut report = AnalyticsReport {
            rating_counts: (1..=5).map(|r| (r.to_string(), 0)).collect(),
            status_counts: ReviewStatus::ALL
                .iter()
                .map(|s| (s.as_str().to_string(), 0))
                .collect(),
            ..Default::default()
        };

        let mut positive = 0;
        let mut negative = 0;
        let mut resolved = 0;
        let mut rating_sum = 0i64;
        let mut rated = 0usize;

        for review in reviews {
            let week = week_start(review.created_at.date_naive()).to_string();
            let trend = report.weekly_trends.entry(week).or_default();
            match review.sentiment {
                Sentiment::Positive => {
                    positive += 1;
                    trend.positive += 1;
                }
                Sentiment::Neutral => trend.neutral += 1,
                Sentiment::Negative => {
                    negative += 1;
                    trend.negative += 1;
                }
            }

            if review.status == ReviewStatus::Resolved {
                resolved += 1;
            }
            *report
                .status_counts
                .entry(review.status.as_str().to_string())
                .or_default() += 1;
            *report
                .category_counts
                .entry(review.category.clone())
                .or_default() += 1;
            *report
                .marketplace_counts
                .entry(review.marketplace.clone())
                .or_default() += 1;

            if let Some(rating @ 1..=5) = review.rating {
                rating_sum += rating as i64;
                rated += 1;
                *report.rating_counts.entry(rating.to_string()).or_default() += 1;
            }
        }

        report.stats = Stats {
            total_reviews: total,
            positive_rate: percent(positive, total),
            negative_rate: percent(negative, total),
            resolution_rate: percent(resolved, total),
            avg_rating: if rated == 0 {
                "0.0".to_string()
            } else {
                format!("{:.1}", rating_sum as f64 / rated as f64)
            },
        };
        report
    }
}
