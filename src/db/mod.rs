pub mod product;
pub mod review;
pub mod user;

use sqlx::PgPool;

pub async fn ping(pool: &PgPool) -> Result<(), String> {
    sqlx::query("SELECT 1 as health_check")
        .fetch_one(pool)
        .await
        .map(|_| ())
        .map_err(|err| {
            tracing::error!("Database health check failed: {:?}", err);
            "Database unavailable".to_string()
        })
}
