#![allow(dead_code)]

use driftsignal::configuration::{DatabaseSettings, Settings};
use driftsignal::storage::{MemoryStore, PgStore, ReviewStore};
use serde_json::{json, Value};
use sqlx::{Connection, Executor, PgConnection, PgPool};
use std::net::TcpListener;
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct TestApp {
    pub address: String,
    pub store: Arc<dyn ReviewStore>,
    /// Stands in for every upstream: Outscraper, Axesso, Shopify, OpenRouter and Graph.
    pub upstream: MockServer,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn post_json(&self, path: &str, body: &Value, user: Option<&str>) -> reqwest::Response {
        let mut request = self.client.post(self.url(path)).json(body);
        if let Some(user) = user {
            request = request.header("X-User-Id", user);
        }
        request.send().await.expect("Failed to execute request.")
    }

    pub async fn get(&self, path: &str, user: Option<&str>) -> reqwest::Response {
        let mut request = self.client.get(self.url(path));
        if let Some(user) = user {
            request = request.header("X-User-Id", user);
        }
        request.send().await.expect("Failed to execute request.")
    }
}

/// Settings whose connectors all point at the mock upstream, with secrets set.
pub fn test_settings(upstream: &MockServer) -> Settings {
    let mut settings = Settings::default();
    let base = upstream.uri();
    let connectors = &mut settings.connectors;

    connectors.openrouter.base_url = base.clone();
    connectors.openrouter.api_key = Some("test-openrouter-key".to_string());
    connectors.outscraper.base_url = base.clone();
    connectors.outscraper.api_key = Some("test-outscraper-key".to_string());
    connectors.axesso.base_url = base.clone();
    connectors.axesso.api_key = Some("test-axesso-key".to_string());
    connectors.shopify.base_url = Some(base.clone());
    connectors.shopify.access_token = Some("test-shopify-token".to_string());
    connectors.outlook.graph_base_url = base.clone();
    connectors.outlook.connection_url = Some(format!("{}/connection", base));
    connectors.outlook.identity_token = Some("test-identity".to_string());

    settings
}

pub async fn spawn_app_with_store(store: Arc<dyn ReviewStore>) -> TestApp {
    let upstream = MockServer::start().await;
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let server = driftsignal::startup::run(listener, store.clone(), test_settings(&upstream))
        .await
        .expect("Failed to bind address.");
    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        store,
        upstream,
        client: reqwest::Client::new(),
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_store(Arc::new(MemoryStore::new())).await
}

/// Store on a throwaway migrated database, `None` when no server is reachable.
pub async fn postgres_store() -> Option<PgStore> {
    let mut database = DatabaseSettings::default();
    database.database_name = uuid::Uuid::new_v4().to_string();

    match configure_database(&database).await {
        Ok(pool) => Some(PgStore::new(pool)),
        Err(err) => {
            eprintln!("Skipping tests: failed to connect to postgres: {}", err);
            None
        }
    }
}

/// Postgres-backed app, `None` when no server is reachable.
pub async fn spawn_app_with_postgres() -> Option<TestApp> {
    let store = postgres_store().await?;
    Some(spawn_app_with_store(Arc::new(store)).await)
}

pub async fn configure_database(config: &DatabaseSettings) -> Result<PgPool, sqlx::Error> {
    let mut connection = PgConnection::connect(&config.connection_string_without_db()).await?;

    connection
        .execute(format!(r#"CREATE DATABASE "{}""#, config.database_name).as_str())
        .await?;

    let connection_pool = PgPool::connect(&config.connection_string()).await?;

    sqlx::migrate!("./migrations").run(&connection_pool).await?;

    Ok(connection_pool)
}

pub fn completion(content: &str) -> Value {
    json!({
        "id": "gen-test",
        "choices": [ { "message": { "role": "assistant", "content": content } } ]
    })
}

/// Analysis and reply completions, told apart by their prompts.
pub async fn mount_openrouter(upstream: &MockServer, analysis: &str, reply: &str) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("Analyze this review"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(analysis)))
        .mount(upstream)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("Write a professional response"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(reply)))
        .mount(upstream)
        .await;
}

pub fn outscraper_reviews(asin: &str, ids: &[&str]) -> Value {
    let reviews: Vec<Value> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| {
            json!({
                "id": id,
                "author_title": format!("Customer {}", i),
                "title": format!("Review {}", i),
                "body": format!("The package arrived late, attempt {}", i),
                "rating": 2,
                "date": "Reviewed in the United States on March 3, 2024",
                "product_name": format!("Widget {}", asin),
                "verified_purchase": true
            })
        })
        .collect();

    json!({ "id": "req-1", "status": "Success", "data": [reviews] })
}
