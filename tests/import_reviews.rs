mod common;

use chrono::Utc;
use driftsignal::models::{Review, Sentiment, Severity};
use driftsignal::storage::ReviewFilter;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

const ASIN: &str = "B0C1ZQRKQ2";
const ANALYSIS: &str = r#"Here you go: {"sentiment": "negative", "severity": "high", "category": "shipping", "reasoning": "late delivery"}"#;

async fn mount_outscraper(app: &common::TestApp, ids: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/amazon-reviews"))
        .and(query_param("query", ASIN))
        .and(header("X-API-KEY", "test-outscraper-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::outscraper_reviews(ASIN, ids)))
        .mount(&app.upstream)
        .await;
}

#[tokio::test]
async fn amazon_import_classifies_and_stores_reviews() {
    let app = common::spawn_app().await;
    mount_outscraper(&app, &["R1", "R2", "R3"]).await;
    common::mount_openrouter(&app.upstream, ANALYSIS, "  Sorry about the delay!  ").await;

    let response = app
        .post_json(
            "/api/amazon/import-reviews",
            &json!({ "productUrl": format!("https://www.amazon.com/Widget/dp/{}?th=1", ASIN) }),
            Some("user-1"),
        )
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let summary: Value = response.json().await.unwrap();
    assert_eq!(summary["fetched"], 3);
    assert_eq!(summary["imported"], 3);
    assert_eq!(summary["skipped"], 0);
    assert_eq!(summary["product"]["productId"], ASIN);
    assert_eq!(summary["product"]["platform"], "Amazon");

    let reviews = app
        .store
        .list_reviews(&ReviewFilter::default(), Some("user-1"))
        .await
        .unwrap();
    assert_eq!(reviews.len(), 3);
    for review in &reviews {
        assert_eq!(review.marketplace, "Amazon");
        assert_eq!(review.product_id.as_deref(), Some(ASIN));
        assert_eq!(review.sentiment, Sentiment::Negative);
        assert_eq!(review.severity, Severity::High);
        assert_eq!(review.category, "shipping");
        assert_eq!(review.rating, Some(2));
        assert_eq!(review.ai_suggested_reply.as_deref(), Some("Sorry about the delay!"));
        assert!(review.verified);
    }
}

#[tokio::test]
async fn reimport_skips_reviews_already_stored() {
    let app = common::spawn_app().await;
    mount_outscraper(&app, &["R1", "R2"]).await;
    common::mount_openrouter(&app.upstream, ANALYSIS, "Thanks").await;
    let body = json!({ "productUrl": ASIN });

    let first: Value = app
        .post_json("/api/amazon/import-reviews", &body, None)
        .await
        .json()
        .await
        .unwrap();
    let second: Value = app
        .post_json("/api/amazon/import-reviews", &body, None)
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(first["imported"], 2);
    assert_eq!(second["imported"], 0);
    assert_eq!(second["skipped"], 2);
    assert_eq!(first["product"]["id"], second["product"]["id"]);

    let reviews = app.store.list_reviews(&ReviewFilter::default(), None).await.unwrap();
    assert_eq!(reviews.len(), 2);
}

#[tokio::test]
async fn three_fetched_with_one_stored_creates_two() {
    let app = common::spawn_app().await;
    mount_outscraper(&app, &["R1", "R2", "R3"]).await;
    common::mount_openrouter(&app.upstream, ANALYSIS, "Thanks").await;

    app.store
        .insert_review(Review {
            external_review_id: Some("R2".into()),
            marketplace: "Amazon".into(),
            product_id: Some(ASIN.into()),
            content: "stored earlier".into(),
            created_at: Utc::now(),
            ..Default::default()
        })
        .await
        .unwrap();

    let summary: Value = app
        .post_json("/api/amazon/import-reviews", &json!({ "productUrl": ASIN }), None)
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(summary["imported"], 2);
    assert_eq!(summary["skipped"], 1);
    let reviews = app.store.list_reviews(&ReviewFilter::default(), None).await.unwrap();
    assert_eq!(reviews.len(), 3);
}

#[tokio::test]
async fn unreadable_model_output_falls_back_to_defaults() {
    let app = common::spawn_app().await;
    mount_outscraper(&app, &["R1"]).await;
    common::mount_openrouter(&app.upstream, "I cannot answer that.", "Thanks").await;

    let response = app
        .post_json("/api/amazon/import-reviews", &json!({ "productUrl": ASIN }), None)
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let reviews = app.store.list_reviews(&ReviewFilter::default(), None).await.unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].sentiment, Sentiment::Neutral);
    assert_eq!(reviews[0].severity, Severity::Medium);
    assert_eq!(reviews[0].category, "general");
}

#[tokio::test]
async fn failed_completion_still_stores_the_review() {
    let app = common::spawn_app().await;
    mount_outscraper(&app, &["R1"]).await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model overloaded"))
        .mount(&app.upstream)
        .await;

    let summary: Value = app
        .post_json("/api/amazon/import-reviews", &json!({ "productUrl": ASIN }), None)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(summary["imported"], 1);

    let reviews = app.store.list_reviews(&ReviewFilter::default(), None).await.unwrap();
    assert_eq!(reviews[0].sentiment, Sentiment::Neutral);
    assert_eq!(reviews[0].ai_suggested_reply, None);
}

#[tokio::test]
async fn upstream_failure_writes_nothing() {
    let app = common::spawn_app().await;
    Mock::given(method("GET"))
        .and(path("/amazon-reviews"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&app.upstream)
        .await;

    let response = app
        .post_json("/api/amazon/import-reviews", &json!({ "productUrl": ASIN }), None)
        .await;

    assert_eq!(response.status().as_u16(), 502);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("Outscraper API error (500)"));
    assert!(app.store.list_products(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_product_url_is_rejected() {
    let app = common::spawn_app().await;

    let response = app
        .post_json("/api/walmart/import-reviews", &json!({ "productUrl": "" }), None)
        .await;
    assert_eq!(response.status().as_u16(), 400);

    let response = app
        .post_json("/api/ebay/import-reviews", &json!({ "productUrl": "x" }), None)
        .await;
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn walmart_auth_failure_is_reported() {
    let app = common::spawn_app().await;
    Mock::given(method("GET"))
        .and(path("/wlm/walmart-lookup-product"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&app.upstream)
        .await;

    let response = app
        .post_json(
            "/api/walmart/import-reviews",
            &json!({ "productUrl": "https://www.walmart.com/ip/Some-Product/123456789" }),
            None,
        )
        .await;

    assert_eq!(response.status().as_u16(), 502);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("AXESSO_API_KEY"));
}

#[tokio::test]
async fn walmart_import_uses_item_id() {
    let app = common::spawn_app().await;
    Mock::given(method("GET"))
        .and(path("/wlm/walmart-lookup-product"))
        .and(header("x-rapidapi-key", "test-axesso-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "responseStatus": "PRODUCT_FOUND_RESPONSE",
            "productTitle": "Blender 3000",
            "reviews": [
                { "reviewId": "W1", "userNickname": "Sam", "rating": 5, "reviewText": "Great blender" },
                { "reviewText": "Broke after a week" }
            ]
        })))
        .mount(&app.upstream)
        .await;
    common::mount_openrouter(&app.upstream, ANALYSIS, "Thanks").await;

    let summary: Value = app
        .post_json(
            "/api/walmart/import-reviews",
            &json!({ "productUrl": "https://www.walmart.com/ip/Blender-3000/123456789" }),
            None,
        )
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(summary["imported"], 2);
    assert_eq!(summary["product"]["productId"], "123456789");
    assert_eq!(summary["product"]["productName"], "Blender 3000");

    let reviews = app.store.list_reviews(&ReviewFilter::default(), None).await.unwrap();
    assert!(reviews.iter().any(|r| r.customer_name == "Anonymous" && r.rating == Some(0)));
}

#[tokio::test]
async fn shopify_import_parses_metafield() {
    let app = common::spawn_app().await;
    let metafield = r#"<div class="spr-reviews"><div class="spr-review">
        <span class="spr-starrating spr-review-header-starratings" aria-label="4 out of 5 stars"></span>
        <h3 class="spr-review-header-title">Solid mug</h3>
        <span class="spr-review-header-byline"><strong class="spr-review-header-byline">Jo</strong> on <span class="spr-review-header-date">Mar 3, 2024</span></span>
        <div class="spr-review-content"><div class="spr-review-content-body">Keeps coffee <b>hot</b>.</div></div>
        </div><div class="spr-review"><h3 class="spr-review-header-title">Empty</h3>
        <div class="spr-review-content"><div class="spr-review-content-body"></div></div></div></div>"#;

    Mock::given(method("POST"))
        .and(path("/admin/api/2025-10/graphql.json"))
        .and(header("X-Shopify-Access-Token", "test-shopify-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "productByHandle": {
                "id": "gid://shopify/Product/42",
                "title": "Travel Mug",
                "handle": "travel-mug",
                "reviewsMetafield": { "value": metafield }
            } }
        })))
        .mount(&app.upstream)
        .await;
    common::mount_openrouter(&app.upstream, ANALYSIS, "Thanks").await;

    let summary: Value = app
        .post_json(
            "/api/shopify/import-reviews",
            &json!({ "productUrl": "https://demo.myshopify.com/products/travel-mug" }),
            None,
        )
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(summary["fetched"], 1);
    assert_eq!(summary["product"]["productId"], "gid://shopify/Product/42");

    let reviews = app.store.list_reviews(&ReviewFilter::default(), None).await.unwrap();
    assert_eq!(reviews[0].content, "Keeps coffee hot.");
    assert_eq!(reviews[0].customer_name, "Jo");
    assert_eq!(reviews[0].rating, Some(4));
}

#[tokio::test]
async fn shopify_products_count_whole_review_blocks() {
    let app = common::spawn_app().await;
    let metafield = r#"<div class="spr-reviews"><div class="spr-review">
        <div class="spr-review-header">
        <span class="spr-starrating spr-review-header-starratings" aria-label="5 out of 5 stars"></span>
        <h3 class="spr-review-header-title">Great mug</h3>
        <span class="spr-review-header-byline"><strong class="spr-review-header-byline">Ari</strong></span>
        </div>
        <div class="spr-review-content"><div class="spr-review-content-body">Love it.</div></div>
        </div></div>"#;

    Mock::given(method("POST"))
        .and(path("/admin/api/2025-10/graphql.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "products": { "edges": [
                { "node": {
                    "id": "gid://shopify/Product/7",
                    "title": "Mug",
                    "handle": "mug",
                    "reviewsMetafield": { "value": metafield }
                } },
                { "node": {
                    "id": "gid://shopify/Product/8",
                    "title": "Plate",
                    "handle": "plate",
                    "reviewsMetafield": null
                } }
            ] } }
        })))
        .mount(&app.upstream)
        .await;

    let response = app.get("/api/shopify/products?limit=2", None).await;
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    let list = body["list"].as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["handle"], "mug");
    assert_eq!(list[0]["totalReviews"], 1);
    assert_eq!(list[1]["totalReviews"], 0);
}

#[tokio::test]
async fn refresh_reimports_a_tracked_product() {
    let app = common::spawn_app().await;
    mount_outscraper(&app, &["R1", "R2"]).await;
    common::mount_openrouter(&app.upstream, ANALYSIS, "Thanks").await;

    let first: Value = app
        .post_json("/api/amazon/import-reviews", &json!({ "productUrl": ASIN }), Some("u1"))
        .await
        .json()
        .await
        .unwrap();
    let id = first["product"]["id"].as_str().unwrap().to_string();
    let first_imported: chrono::DateTime<Utc> =
        serde_json::from_value(first["product"]["lastImported"].clone()).unwrap();

    let response = app
        .post_json(&format!("/api/products/{}/refresh", id), &json!({}), Some("u1"))
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let summary: Value = response.json().await.unwrap();
    assert_eq!(summary["fetched"], 2);
    assert_eq!(summary["imported"], 0);
    assert_eq!(summary["skipped"], 2);
    assert_eq!(summary["product"]["id"], id.as_str());

    let product_id = uuid::Uuid::parse_str(&id).unwrap();
    let product = app.store.get_product(product_id, Some("u1")).await.unwrap().unwrap();
    assert!(product.last_imported > first_imported);

    let response = app
        .post_json(&format!("/api/products/{}/refresh", id), &json!({}), Some("u2"))
        .await;
    assert_eq!(response.status().as_u16(), 404);

    let response = app
        .post_json(
            &format!("/api/products/{}/refresh", uuid::Uuid::new_v4()),
            &json!({}),
            Some("u1"),
        )
        .await;
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn amazon_preview_does_not_store() {
    let app = common::spawn_app().await;
    mount_outscraper(&app, &["R1", "R2"]).await;

    let response = app
        .post_json("/api/amazon/reviews", &json!({ "asin": ASIN, "limit": 2 }), None)
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["asin"], ASIN);
    assert_eq!(body["total"], 2);
    assert!(app.store.list_reviews(&ReviewFilter::default(), None).await.unwrap().is_empty());
}

#[tokio::test]
async fn connector_status_reports_configuration() {
    let app = common::spawn_app().await;

    let body: Value = app.get("/api/amazon/status", None).await.json().await.unwrap();
    assert_eq!(body["configured"], true);

    let response = app.get("/api/ebay/status", None).await;
    assert_eq!(response.status().as_u16(), 400);
}
