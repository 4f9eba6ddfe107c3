mod common;

use axum::{Router, routing::post};
use axum_test::TestServer;
use serde_json::json;
use snaplink::api::handlers::shorten_handler;

fn make_server(ctx: &common::TestContext) -> TestServer {
    let app = Router::new()
        .route("/api/shorten", post(shorten_handler))
        .with_state(ctx.state());
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_shorten_generated_code() {
    let ctx = common::create_test_context();
    let server = make_server(&ctx);

    let response = server
        .post("/api/shorten")
        .json(&json!({ "url": "https://example.com/very/long/path" }))
        .await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    let code = json["short_code"].as_str().unwrap();

    assert_eq!(code.len(), 6);
    assert_eq!(json["short_url"], format!("{}/{}", common::BASE_URL, code));
    assert_eq!(json["original_url"], "https://example.com/very/long/path");
    assert_eq!(json["is_custom_alias"], false);
    assert_eq!(json["created_at"], "2025-01-01T12:00:00Z");
    assert_eq!(json["expires_at"], "2025-01-31T12:00:00Z");
}

#[tokio::test]
async fn test_shorten_custom_alias() {
    let ctx = common::create_test_context();
    let server = make_server(&ctx);

    let response = server
        .post("/api/shorten")
        .json(&json!({
            "url": "https://example.com",
            "custom_alias": "my-link",
            "expiry_days": 7
        }))
        .await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["short_code"], "my-link");
    assert_eq!(json["is_custom_alias"], true);
    assert_eq!(json["expires_at"], "2025-01-08T12:00:00Z");
}

#[tokio::test]
async fn test_shorten_null_expiry_never_expires() {
    let ctx = common::create_test_context();
    let server = make_server(&ctx);

    let response = server
        .post("/api/shorten")
        .json(&json!({ "url": "https://example.com", "expiry_days": null }))
        .await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert!(json["expires_at"].is_null());
}

#[tokio::test]
async fn test_shorten_alias_taken() {
    let ctx = common::create_test_context();
    let server = make_server(&ctx);

    server
        .post("/api/shorten")
        .json(&json!({ "url": "https://example.com", "custom_alias": "taken" }))
        .await
        .assert_status_ok();

    let response = server
        .post("/api/shorten")
        .json(&json!({ "url": "https://other.example.com", "custom_alias": "taken" }))
        .await;

    response.assert_status_bad_request();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "alias_taken");
}

#[tokio::test]
async fn test_shorten_invalid_url() {
    let ctx = common::create_test_context();
    let server = make_server(&ctx);

    let response = server
        .post("/api/shorten")
        .json(&json!({ "url": "not-a-valid-url" }))
        .await;

    response.assert_status_bad_request();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_shorten_rejects_zero_expiry_days() {
    let ctx = common::create_test_context();
    let server = make_server(&ctx);

    let response = server
        .post("/api/shorten")
        .json(&json!({ "url": "https://example.com", "expiry_days": 0 }))
        .await;

    response.assert_status_bad_request();
    assert!(ctx.store.is_empty());
}

#[tokio::test]
async fn test_shorten_rejects_reserved_alias() {
    let ctx = common::create_test_context();
    let server = make_server(&ctx);

    let response = server
        .post("/api/shorten")
        .json(&json!({ "url": "https://example.com", "custom_alias": "health" }))
        .await;

    response.assert_status_bad_request();
    assert!(ctx.store.is_empty());
}

#[tokio::test]
async fn test_unprefixed_shorten_accepts_original_url() {
    let ctx = common::create_test_context();
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server
        .post("/shorten")
        .json(&json!({
            "original_url": "https://example.com/legacy",
            "custom_alias": "legacy1"
        }))
        .await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["short_code"], "legacy1");
    assert_eq!(json["original_url"], "https://example.com/legacy");

    let redirect = server.get("/legacy1").await;
    assert_eq!(redirect.status_code(), 307);
}
