mod common;

use axum::{Router, routing::get};
use axum_test::TestServer;
use snaplink::api::handlers::health_handler;
use snaplink::state::AppState;

fn make_server(state: AppState) -> TestServer {
    let app = Router::new()
        .route("/health", get(health_handler))
        .with_state(state);
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_health_check_success() {
    let ctx = common::create_test_context();
    let server = make_server(ctx.state());

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
    assert!(json.get("version").is_some());
    assert_eq!(json["checks"]["store"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["message"], "memory connected");
}

#[tokio::test]
async fn test_health_check_degraded_cache_still_serves() {
    let (service, _store) = common::create_service_with_broken_cache();
    let server = make_server(AppState::new(service));

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["store"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["status"], "error");
}

#[tokio::test]
async fn test_health_check_store_down_is_unavailable() {
    let service = common::create_service_with_broken_store();
    let server = make_server(AppState::new(service));

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), 503);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "unhealthy");
    assert_eq!(json["checks"]["store"]["status"], "error");
    assert_eq!(json["checks"]["cache"]["status"], "ok");
}
