//! Integration tests for the Redis session store.
//!
//! These need a Redis server (`REDIS_URL`, default `redis://127.0.0.1:6379`)
//! and are ignored by default: `cargo test -p storefront-store -- --ignored`.

use std::sync::Arc;

use chrono::{Duration, Utc};
use storefront_core::clock::SystemClock;
use storefront_enduser::domain::repositories::{SessionAccountRepository, SessionCartRepository};
use storefront_enduser::domain::session::SessionId;
use storefront_enduser::domain::session_account::SessionAccount;
use storefront_enduser::domain::session_cart::SessionCartLine;
use storefront_store::redis_session_store::RedisSessionStore;
use uuid::Uuid;

async fn store() -> RedisSessionStore {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_owned());
    RedisSessionStore::connect(&url, Arc::new(SystemClock))
        .await
        .unwrap()
}

fn unique_session() -> SessionId {
    SessionId::new(Uuid::new_v4().to_string())
}

#[tokio::test]
#[ignore = "requires Redis"]
async fn test_session_account_round_trips_with_ttl() {
    // Arrange
    let store = store().await;
    let session_id = unique_session();
    let account_id = Uuid::new_v4();
    let session = SessionAccount::restored(session_id.clone(), account_id, Utc::now());

    // Act
    SessionAccountRepository::insert(&store, &session, Duration::days(14))
        .await
        .unwrap();
    let found = SessionAccountRepository::find_by_session_id(&store, &session_id)
        .await
        .unwrap()
        .unwrap();

    // Assert
    assert_eq!(found.account_id, account_id);
    let remaining = found.expires_at - Utc::now();
    assert!(remaining > Duration::days(13));
    assert!(remaining <= Duration::days(14));

    SessionAccountRepository::delete(&store, &session_id)
        .await
        .unwrap();
    assert!(
        SessionAccountRepository::find_by_session_id(&store, &session_id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
#[ignore = "requires Redis"]
async fn test_guest_cart_expiration_is_extended() {
    // Arrange
    let store = store().await;
    let session_id = unique_session();
    let lines = vec![SessionCartLine {
        product_id: Uuid::new_v4(),
        quantity: 3,
    }];
    store
        .put_session_cart(&session_id, lines.clone(), Duration::days(1))
        .await
        .unwrap();

    // Act
    SessionCartRepository::update_expiration(&store, &session_id, Duration::days(30))
        .await
        .unwrap();
    let found = SessionCartRepository::find_by_session_id(&store, &session_id)
        .await
        .unwrap()
        .unwrap();

    // Assert
    assert_eq!(found.lines, lines);
    assert!(found.expires_at - Utc::now() > Duration::days(29));

    SessionCartRepository::delete(&store, &session_id)
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires Redis"]
async fn test_unknown_session_is_absent() {
    let store = store().await;

    let found = SessionCartRepository::find_by_session_id(&store, &unique_session())
        .await
        .unwrap();

    assert!(found.is_none());
}
