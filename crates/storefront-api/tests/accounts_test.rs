//! Integration tests for registration and email verification.

mod common;

use axum::http::StatusCode;
use serde_json::json;

fn registration(email: &str) -> serde_json::Value {
    json!({
        "email": email,
        "password": common::PASSWORD,
        "password_confirmation": common::PASSWORD,
    })
}

#[tokio::test]
async fn test_register_verify_and_view_cart() {
    let app = common::TestApp::new();

    // POST /api/v1/accounts: registers an inactive account and mails a link.
    let response = app
        .send_json("POST", "/api/v1/accounts", None, &registration("a@example.com"))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json, json!({ "code": 1, "messages": [] }));
    assert_eq!(app.mail.sent().len(), 1);
    assert!(!app.database.account_by_email("a@example.com").unwrap().is_active);

    // GET /api/v1/accounts/email/verify: activates and logs in.
    let token = app.last_token();
    let response = app
        .send_empty("GET", &format!("/api/v1/accounts/email/verify?token={token}"), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let cookie = response.set_cookie("AccountSessionID").unwrap();
    assert!(cookie.contains("Max-Age=1209600"));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert_eq!(app.payments.customers_created(), 1);
    assert_eq!(app.mail.sent().len(), 1);

    // GET /api/v1/private/cart: the activation created an empty cart.
    let session_id = response.cookie_value("AccountSessionID").unwrap();
    let response = app
        .send_empty(
            "GET",
            "/api/v1/private/cart",
            Some(&format!("AccountSessionID={session_id}")),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let account = app.database.account_by_email("a@example.com").unwrap();
    assert_eq!(response.json["account_id"], account.id.to_string());
    assert_eq!(response.json["version"], 1);
    assert_eq!(response.json["lines"], json!([]));
}

#[tokio::test]
async fn test_register_with_invalid_input_returns_validation_messages() {
    let app = common::TestApp::new();

    let response = app
        .send_json(
            "POST",
            "/api/v1/accounts",
            None,
            &json!({
                "email": "not-an-address",
                "password": "short",
                "password_confirmation": "other"
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json["code"], 2);
    assert_eq!(
        response.json["messages"],
        json!([
            "email address is not valid",
            "password must be at least 8 characters",
        ])
    );
    assert!(app.mail.sent().is_empty());
}

#[tokio::test]
async fn test_register_twice_is_rejected_with_hint() {
    let app = common::TestApp::new();
    app.send_json("POST", "/api/v1/accounts", None, &registration("a@example.com"))
        .await;

    let response = app
        .send_json("POST", "/api/v1/accounts", None, &registration("a@example.com"))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json["code"], 2);
    assert_eq!(
        response.json["messages"],
        json!(["email address is already in use; please check the verification email"])
    );
    assert_eq!(app.database.account_count(), 1);
}

#[tokio::test]
async fn test_verify_with_forged_token_sets_no_cookie() {
    let app = common::TestApp::new();

    let response = app
        .send_empty("GET", "/api/v1/accounts/email/verify?token=forged", None)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json["code"], 3);
    assert_eq!(
        response.json["messages"],
        json!(["the verification link is invalid"])
    );
    assert!(response.set_cookie("AccountSessionID").is_none());
}

#[tokio::test]
async fn test_verify_merges_guest_cart_and_drops_its_cookie() {
    // Arrange
    let app = common::TestApp::new();
    let product = app.seed_product(1, 10);
    app.seed_guest_cart("guest-1", &[(product, 2)]);
    app.send_json("POST", "/api/v1/accounts", None, &registration("a@example.com"))
        .await;
    let token = app.last_token();

    // Act
    let response = app
        .send_empty(
            "GET",
            &format!("/api/v1/accounts/email/verify?token={token}"),
            Some("SessionCartSessionID=guest-1"),
        )
        .await;

    // Assert
    assert_eq!(response.status, StatusCode::OK);
    assert!(
        response
            .set_cookie("SessionCartSessionID")
            .unwrap()
            .contains("Max-Age=0")
    );
    let account = app.database.account_by_email("a@example.com").unwrap();
    let carts = app.database.carts_of(account.id);
    assert_eq!(carts.len(), 1);
    assert_eq!(carts[0].quantity_of(product), 2);
    assert!(
        !app.sessions
            .has_session_cart(&storefront_enduser::domain::session::SessionId::new("guest-1"))
    );
}
