//! Integration tests for the health endpoint.

mod common;

use axum::http::StatusCode;

#[tokio::test]
async fn test_health_returns_200_with_status_ok() {
    let app = common::TestApp::new();

    let response = app.send_empty("GET", "/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json["status"], "ok");
    assert_eq!(response.json["service"], "storefront-api");
    assert!(response.json["version"].is_string());
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let app = common::TestApp::new();

    let response = app.send_empty("GET", "/api/v1/nonexistent", None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
