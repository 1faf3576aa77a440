use crate::models;
use sqlx::PgPool;
use tracing::Instrument;

pub async fn upsert(pool: &PgPool, user: models::User) -> Result<models::User, String> {
    let query_span = tracing::info_span!("Upserting user", id = %user.id);
    sqlx::query_as::<_, models::User>(
        r#"
        INSERT INTO users (id, email, first_name, last_name, profile_image_url, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, NOW() at time zone 'utc', NOW() at time zone 'utc')
        ON CONFLICT (id) DO UPDATE SET
            email = COALESCE(EXCLUDED.email, users.email),
            first_name = COALESCE(EXCLUDED.first_name, users.first_name),
            last_name = COALESCE(EXCLUDED.last_name, users.last_name),
            profile_image_url = COALESCE(EXCLUDED.profile_image_url, users.profile_image_url),
            updated_at = NOW() at time zone 'utc'
        RETURNING id, email, first_name, last_name, profile_image_url, created_at, updated_at
        "#,
    )
    .bind(user.id)
    .bind(user.email)
    .bind(user.first_name)
    .bind(user.last_name)
    .bind(user.profile_image_url)
    .fetch_one(pool)
    .instrument(query_span)
    .await
    .map_err(|err| {
        tracing::error!("Failed to upsert user: {:?}", err);
        "Failed to save user".to_string()
    })
}

pub async fn fetch(pool: &PgPool, id: &str) -> Result<Option<models::User>, String> {
    let query_span = tracing::info_span!("Fetching user", id);
    sqlx::query_as::<_, models::User>(
        r#"
        SELECT id, email, first_name, last_name, profile_image_url, created_at, updated_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .instrument(query_span)
    .await
    .map_err(|err| {
        tracing::error!("Failed to fetch user: {:?}", err);
        "Internal Server Error".to_string()
    })
}
