use crate::models;
use crate::storage::ReviewFilter;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::Instrument;
use uuid::Uuid;

const COLUMNS: &str = "id, user_id, external_review_id, marketplace, product_id, title, content, \
     customer_name, customer_email, rating, sentiment, category, severity, status, \
     ai_suggested_reply, ai_analysis_details, verified, created_at, imported_at";

fn push_user(query: &mut QueryBuilder<'_, Postgres>, user_id: Option<&str>) {
    if let Some(user_id) = user_id {
        query.push(" AND user_id = ").push_bind(user_id.to_string());
    }
}

pub async fn fetch_all(
    pool: &PgPool,
    filter: &ReviewFilter,
    user_id: Option<&str>,
) -> Result<Vec<models::Review>, String> {
    let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM reviews WHERE 1=1", COLUMNS));
    push_user(&mut query, user_id);

    if let Some(marketplace) = &filter.marketplace {
        query.push(" AND marketplace = ").push_bind(marketplace.clone());
    }
    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(sentiment) = filter.sentiment {
        query.push(" AND sentiment = ").push_bind(sentiment.as_str());
    }
    if let Some(severity) = filter.severity {
        query.push(" AND severity = ").push_bind(severity.as_str());
    }
    if let Some(product_id) = &filter.product_id {
        query.push(" AND product_id = ").push_bind(product_id.clone());
    }
    if let Some(start) = filter.start_date {
        query.push(" AND created_at >= ").push_bind(start);
    }
    if let Some(end) = filter.end_date {
        query.push(" AND created_at <= ").push_bind(end);
    }
    if filter.imported_only {
        query.push(" AND external_review_id IS NOT NULL");
    }
    query.push(" ORDER BY imported_at DESC");

    let query_span = tracing::info_span!("Fetching reviews", user_id = ?user_id);
    query
        .build_query_as::<models::Review>()
        .fetch_all(pool)
        .instrument(query_span)
        .await
        .map_err(|err| {
            tracing::error!("Failed to fetch reviews: {:?}", err);
            "Internal Server Error".to_string()
        })
}

pub async fn fetch(
    pool: &PgPool,
    id: Uuid,
    user_id: Option<&str>,
) -> Result<Option<models::Review>, String> {
    let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM reviews WHERE id = ", COLUMNS));
    query.push_bind(id);
    push_user(&mut query, user_id);

    let query_span = tracing::info_span!("Fetching review by id", %id);
    query
        .build_query_as::<models::Review>()
        .fetch_optional(pool)
        .instrument(query_span)
        .await
        .map_err(|err| {
            tracing::error!("Failed to fetch review: {:?}", err);
            "Internal Server Error".to_string()
        })
}

pub async fn insert(pool: &PgPool, review: models::Review) -> Result<models::Review, String> {
    let query_span = tracing::info_span!(
        "Saving new review into the database",
        marketplace = %review.marketplace
    );
    sqlx::query_as::<_, models::Review>(&format!(
        r#"
        INSERT INTO reviews ({COLUMNS})
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, NOW() at time zone 'utc')
        RETURNING {COLUMNS}
        "#
    ))
    .bind(review.id)
    .bind(review.user_id)
    .bind(review.external_review_id)
    .bind(review.marketplace)
    .bind(review.product_id)
    .bind(review.title)
    .bind(review.content)
    .bind(review.customer_name)
    .bind(review.customer_email)
    .bind(review.rating)
    .bind(review.sentiment.as_str())
    .bind(review.category)
    .bind(review.severity.as_str())
    .bind(review.status.as_str())
    .bind(review.ai_suggested_reply)
    .bind(review.ai_analysis_details)
    .bind(review.verified)
    .bind(review.created_at)
    .fetch_one(pool)
    .instrument(query_span)
    .await
    .map_err(|err| {
        tracing::error!("Failed to insert review: {:?}", err);
        "Failed to insert".to_string()
    })
}

pub async fn update_status(
    pool: &PgPool,
    id: Uuid,
    status: models::ReviewStatus,
    user_id: Option<&str>,
) -> Result<bool, String> {
    let mut query = QueryBuilder::<Postgres>::new("UPDATE reviews SET status = ");
    query.push_bind(status.as_str());
    query.push(" WHERE id = ").push_bind(id);
    push_user(&mut query, user_id);

    let query_span = tracing::info_span!("Updating review status", %id, status = %status);
    query
        .build()
        .execute(pool)
        .instrument(query_span)
        .await
        .map(|result| result.rows_affected() > 0)
        .map_err(|err| {
            tracing::error!("Failed to update review status: {:?}", err);
            "Failed to update".to_string()
        })
}

pub async fn update_reply(
    pool: &PgPool,
    id: Uuid,
    reply: &str,
    user_id: Option<&str>,
) -> Result<bool, String> {
    let mut query = QueryBuilder::<Postgres>::new("UPDATE reviews SET ai_suggested_reply = ");
    query.push_bind(reply.to_string());
    query.push(" WHERE id = ").push_bind(id);
    push_user(&mut query, user_id);

    let query_span = tracing::info_span!("Updating review reply", %id);
    query
        .build()
        .execute(pool)
        .instrument(query_span)
        .await
        .map(|result| result.rows_affected() > 0)
        .map_err(|err| {
            tracing::error!("Failed to update review reply: {:?}", err);
            "Failed to update".to_string()
        })
}

/// Stores a fresh AI classification and reply on an existing row.
pub async fn update_classification(pool: &PgPool, review: &models::Review) -> Result<bool, String> {
    let mut query = QueryBuilder::<Postgres>::new("UPDATE reviews SET sentiment = ");
    query.push_bind(review.sentiment.as_str());
    query.push(", severity = ").push_bind(review.severity.as_str());
    query.push(", category = ").push_bind(review.category.clone());
    query.push(", ai_analysis_details = ").push_bind(review.ai_analysis_details.clone());
    query.push(", ai_suggested_reply = ").push_bind(review.ai_suggested_reply.clone());
    query.push(" WHERE id = ").push_bind(review.id);
    push_user(&mut query, review.user_id.as_deref());

    let query_span = tracing::info_span!("Updating review classification", id = %review.id);
    query
        .build()
        .execute(pool)
        .instrument(query_span)
        .await
        .map(|result| result.rows_affected() > 0)
        .map_err(|err| {
            tracing::error!("Failed to update review classification: {:?}", err);
            "Failed to update".to_string()
        })
}

pub async fn exists(
    pool: &PgPool,
    external_review_id: &str,
    marketplace: &str,
    user_id: Option<&str>,
) -> Result<bool, String> {
    let mut query = QueryBuilder::<Postgres>::new(
        "SELECT EXISTS (SELECT 1 FROM reviews WHERE external_review_id = ",
    );
    query.push_bind(external_review_id.to_string());
    query.push(" AND marketplace = ").push_bind(marketplace.to_string());
    push_user(&mut query, user_id);
    query.push(")");

    let query_span = tracing::info_span!("Checking for existing review", external_review_id);
    query
        .build_query_scalar::<bool>()
        .fetch_one(pool)
        .instrument(query_span)
        .await
        .map_err(|err| {
            tracing::error!("Failed to check review existence: {:?}", err);
            "Internal Server Error".to_string()
        })
}

pub async fn count_for_product(
    pool: &PgPool,
    marketplace: &str,
    product_id: &str,
    user_id: Option<&str>,
) -> Result<i64, String> {
    let mut query =
        QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM reviews WHERE marketplace = ");
    query.push_bind(marketplace.to_string());
    query.push(" AND product_id = ").push_bind(product_id.to_string());
    push_user(&mut query, user_id);

    let query_span = tracing::info_span!("Counting reviews for product", product_id);
    query
        .build_query_scalar::<i64>()
        .fetch_one(pool)
        .instrument(query_span)
        .await
        .map_err(|err| {
            tracing::error!("Failed to count reviews: {:?}", err);
            "Internal Server Error".to_string()
        })
}

pub async fn delete_for_product(
    pool: &PgPool,
    marketplace: &str,
    product_id: &str,
    user_id: Option<&str>,
) -> Result<u64, String> {
    let mut query = QueryBuilder::<Postgres>::new("DELETE FROM reviews WHERE marketplace = ");
    query.push_bind(marketplace.to_string());
    query.push(" AND product_id = ").push_bind(product_id.to_string());
    push_user(&mut query, user_id);

    let query_span = tracing::info_span!("Deleting reviews for product", product_id);
    query
        .build()
        .execute(pool)
        .instrument(query_span)
        .await
        .map(|result| result.rows_affected())
        .map_err(|err| {
            tracing::error!("Failed to delete reviews: {:?}", err);
            "Failed to delete".to_string()
        })
}
