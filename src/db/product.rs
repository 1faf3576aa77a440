use crate::models;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::Instrument;
use uuid::Uuid;

const COLUMNS: &str = "id, user_id, platform, product_id, product_name, last_imported, created_at";

fn push_user(query: &mut QueryBuilder<'_, Postgres>, user_id: Option<&str>) {
    if let Some(user_id) = user_id {
        query.push(" AND user_id = ").push_bind(user_id.to_string());
    }
}

pub async fn fetch_all(pool: &PgPool, user_id: Option<&str>) -> Result<Vec<models::Product>, String> {
    let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM products WHERE 1=1", COLUMNS));
    push_user(&mut query, user_id);
    query.push(" ORDER BY last_imported DESC");

    let query_span = tracing::info_span!("Fetching tracked products", user_id = ?user_id);
    query
        .build_query_as::<models::Product>()
        .fetch_all(pool)
        .instrument(query_span)
        .await
        .map_err(|err| {
            tracing::error!("Failed to fetch products: {:?}", err);
            "Internal Server Error".to_string()
        })
}

pub async fn fetch(
    pool: &PgPool,
    id: Uuid,
    user_id: Option<&str>,
) -> Result<Option<models::Product>, String> {
    let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM products WHERE id = ", COLUMNS));
    query.push_bind(id);
    push_user(&mut query, user_id);

    let query_span = tracing::info_span!("Fetching product by id", %id);
    query
        .build_query_as::<models::Product>()
        .fetch_optional(pool)
        .instrument(query_span)
        .await
        .map_err(|err| {
            tracing::error!("Failed to fetch product: {:?}", err);
            "Internal Server Error".to_string()
        })
}

pub async fn fetch_by_identifier(
    pool: &PgPool,
    platform: &str,
    product_id: &str,
    user_id: Option<&str>,
) -> Result<Option<models::Product>, String> {
    let mut query =
        QueryBuilder::<Postgres>::new(format!("SELECT {} FROM products WHERE platform = ", COLUMNS));
    query.push_bind(platform.to_string());
    query.push(" AND product_id = ").push_bind(product_id.to_string());
    push_user(&mut query, user_id);
    query.push(" LIMIT 1");

    let query_span = tracing::info_span!("Fetching product by identifier", platform, product_id);
    query
        .build_query_as::<models::Product>()
        .fetch_optional(pool)
        .instrument(query_span)
        .await
        .map_err(|err| {
            tracing::error!("Failed to fetch product: {:?}", err);
            "Internal Server Error".to_string()
        })
}

pub async fn insert(pool: &PgPool, product: models::Product) -> Result<models::Product, String> {
    let query_span = tracing::info_span!("Saving new product into the database");
    sqlx::query_as::<_, models::Product>(&format!(
        r#"
        INSERT INTO products ({COLUMNS})
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(product.id)
    .bind(product.user_id)
    .bind(product.platform)
    .bind(product.product_id)
    .bind(product.product_name)
    .bind(product.last_imported)
    .bind(product.created_at)
    .fetch_one(pool)
    .instrument(query_span)
    .await
    .map_err(|err| {
        tracing::error!("Failed to insert product: {:?}", err);
        "Failed to insert".to_string()
    })
}

pub async fn touch(pool: &PgPool, id: Uuid) -> Result<(), String> {
    let query_span = tracing::info_span!("Bumping product last_imported", %id);
    sqlx::query("UPDATE products SET last_imported = NOW() at time zone 'utc' WHERE id = $1")
        .bind(id)
        .execute(pool)
        .instrument(query_span)
        .await
        .map(|_| ())
        .map_err(|err| {
            tracing::error!("Failed to update product: {:?}", err);
            "Failed to update".to_string()
        })
}

pub async fn delete(pool: &PgPool, id: Uuid, user_id: Option<&str>) -> Result<bool, String> {
    let mut query = QueryBuilder::<Postgres>::new("DELETE FROM products WHERE id = ");
    query.push_bind(id);
    push_user(&mut query, user_id);

    let query_span = tracing::info_span!("Deleting product", %id);
    query
        .build()
        .execute(pool)
        .instrument(query_span)
        .await
        .map(|result| result.rows_affected() > 0)
        .map_err(|err| {
            tracing::error!("Failed to delete product: {:?}", err);
            "Failed to delete".to_string()
        })
}
