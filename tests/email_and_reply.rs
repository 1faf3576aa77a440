mod common;

use driftsignal::storage::ReviewFilter;
use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

async fn mount_outlook_connection(app: &common::TestApp) {
    Mock::given(method("GET"))
        .and(path("/connection"))
        .and(header("X_REPLIT_TOKEN", "test-identity"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [ { "settings": {
                "access_token": "graph-token",
                "expires_at": "2099-01-01T00:00:00Z"
            } } ]
        })))
        .mount(&app.upstream)
        .await;
}

fn classification(is_review: bool) -> Value {
    common::completion(&format!(
        r#"{{"isReviewOrComplaint": {}, "confidence": 90, "reasoning": "test", "suggestedAction": "{}"}}"#,
        is_review,
        if is_review { "import" } else { "ignore" }
    ))
}

#[tokio::test]
async fn generate_reply_requires_content() {
    let app = common::spawn_app().await;

    let response = app
        .post_json("/api/generate-reply", &json!({ "reviewContent": "", "sentiment": "negative" }), None)
        .await;
    assert_eq!(response.status().as_u16(), 400);

    let response = app.post_json("/api/generate-reply", &json!({}), None).await;
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn generate_reply_returns_completion() {
    let app = common::spawn_app().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("Generate a professional, empathetic response"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::completion(
            "\nWe are sorry to hear that.\n",
        )))
        .mount(&app.upstream)
        .await;

    let response = app
        .post_json(
            "/api/generate-reply",
            &json!({ "reviewContent": "Broken on arrival", "sentiment": "negative", "category": "quality" }),
            None,
        )
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["reply"], "We are sorry to hear that.");
}

#[tokio::test]
async fn generate_reply_reports_upstream_failure() {
    let app = common::spawn_app().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.upstream)
        .await;

    let response = app
        .post_json("/api/generate-reply", &json!({ "reviewContent": "Broken" }), None)
        .await;
    assert_eq!(response.status().as_u16(), 502);
}

#[tokio::test]
async fn send_email_requires_every_field() {
    let app = common::spawn_app().await;

    let response = app
        .post_json("/api/send-email", &json!({ "to": "pat@example.com", "subject": "Hi" }), None)
        .await;

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Missing required fields: to, subject, body");
}

#[tokio::test]
async fn send_email_goes_through_graph() {
    let app = common::spawn_app().await;
    mount_outlook_connection(&app).await;
    Mock::given(method("POST"))
        .and(path("/me/sendMail"))
        .and(header("Authorization", "Bearer graph-token"))
        .and(body_string_contains("pat@example.com"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let response = app
        .post_json(
            "/api/send-email",
            &json!({ "to": "pat@example.com", "subject": "Your order", "body": "Refund issued." }),
            None,
        )
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn classify_email_returns_model_verdict() {
    let app = common::spawn_app().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(classification(true)))
        .mount(&app.upstream)
        .await;

    let response = app
        .post_json(
            "/api/emails/classify",
            &json!({ "subject": "Broken kettle", "body": "It leaks", "senderName": "Kim" }),
            None,
        )
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["isReviewOrComplaint"], true);
    assert_eq!(body["suggestedAction"], "import");
}

#[tokio::test]
async fn import_emails_from_mailbox() {
    let app = common::spawn_app().await;
    mount_outlook_connection(&app).await;
    Mock::given(method("GET"))
        .and(path("/me/messages"))
        .and(query_param("$top", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                {
                    "id": "msg-1",
                    "subject": "Kettle leaks",
                    "bodyPreview": "My kettle leaks from the base.",
                    "from": { "emailAddress": { "name": "Kim", "address": "kim@example.com" } },
                    "receivedDateTime": "2024-05-01T10:00:00Z"
                },
                {
                    "id": "msg-2",
                    "subject": "Weekly newsletter",
                    "bodyPreview": "Deals of the week",
                    "from": { "emailAddress": { "name": "Shop", "address": "news@example.com" } }
                }
            ]
        })))
        .mount(&app.upstream)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("Classify this email"))
        .and(body_string_contains("Kettle leaks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(classification(true)))
        .mount(&app.upstream)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("Classify this email"))
        .respond_with(ResponseTemplate::new(200).set_body_json(classification(false)))
        .mount(&app.upstream)
        .await;
    common::mount_openrouter(
        &app.upstream,
        r#"{"sentiment": "negative", "severity": "medium", "category": "quality"}"#,
        "Sorry about the kettle.",
    )
    .await;

    let body: Value = app
        .post_json("/api/emails/import", &json!({ "limit": 5 }), Some("u1"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["processed"], 2);
    assert_eq!(body["imported"], 1);
    assert_eq!(body["ignored"], 1);

    let again: Value = app
        .post_json("/api/emails/import", &json!({ "limit": 5 }), Some("u1"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(again["imported"], 0);
    assert_eq!(again["duplicates"], 1);

    let reviews = app
        .store
        .list_reviews(&ReviewFilter::default(), Some("u1"))
        .await
        .unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].marketplace, "Outlook");
    assert_eq!(reviews[0].external_review_id.as_deref(), Some("msg-1"));
    assert_eq!(reviews[0].customer_email.as_deref(), Some("kim@example.com"));
}
