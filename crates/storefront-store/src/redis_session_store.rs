//! Redis-backed login sessions and guest carts.
//!
//! Keys:
//! - `session_account:{session_id}` → account id
//! - `session_cart:{session_id}` → JSON `{"lines":[{"product_id":…,"quantity":…}]}`
//!
//! Expiry is Redis' own TTL; a record's `expires_at` is derived from the
//! remaining TTL at read time.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use serde::{Deserialize, Serialize};
use storefront_core::clock::Clock;
use storefront_core::error::DomainError;
use storefront_enduser::domain::repositories::{SessionAccountRepository, SessionCartRepository};
use storefront_enduser::domain::session::SessionId;
use storefront_enduser::domain::session_account::SessionAccount;
use storefront_enduser::domain::session_cart::{SessionCart, SessionCartLine};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
struct StoredSessionCart {
    lines: Vec<SessionCartLine>,
}

fn redis_error(context: &str, err: &redis::RedisError) -> DomainError {
    DomainError::Infrastructure(format!("{context}: {err}"))
}

fn ttl_seconds(ttl: Duration) -> u64 {
    u64::try_from(ttl.num_seconds()).unwrap_or(0).max(1)
}

/// Session store over a Redis connection manager.
#[derive(Clone)]
pub struct RedisSessionStore {
    conn_manager: ConnectionManager,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for RedisSessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisSessionStore").finish_non_exhaustive()
    }
}

impl RedisSessionStore {
    /// Connects to `redis_url`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the URL is invalid or the
    /// server cannot be reached.
    pub async fn connect(redis_url: &str, clock: Arc<dyn Clock>) -> Result<Self, DomainError> {
        let client =
            Client::open(redis_url).map_err(|e| redis_error("create redis client", &e))?;
        let conn_manager = ConnectionManager::new(client)
            .await
            .map_err(|e| redis_error("connect to redis", &e))?;
        Ok(Self {
            conn_manager,
            clock,
        })
    }

    fn account_key(session_id: &SessionId) -> String {
        format!("session_account:{session_id}")
    }

    fn cart_key(session_id: &SessionId) -> String {
        format!("session_cart:{session_id}")
    }

    /// Value and remaining TTL of `key`, `None` once it is gone.
    async fn get_with_ttl(&self, key: &str) -> Result<Option<(String, Duration)>, DomainError> {
        let mut conn = self.conn_manager.clone();
        let (value, ttl): (Option<String>, i64) = redis::pipe()
            .get(key)
            .ttl(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| redis_error("read session", &e))?;
        // TTL is -2 for a missing key and -1 for a key without expiry.
        Ok(match value {
            Some(value) if ttl != -2 => Some((value, Duration::seconds(ttl.max(0)))),
            _ => None,
        })
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), DomainError> {
        let mut conn = self.conn_manager.clone();
        let seconds = i64::try_from(ttl_seconds(ttl)).unwrap_or(i64::MAX);
        let _: bool = conn
            .expire(key, seconds)
            .await
            .map_err(|e| redis_error("extend session", &e))?;
        Ok(())
    }

    async fn delete_key(&self, key: &str) -> Result<(), DomainError> {
        let mut conn = self.conn_manager.clone();
        let _: i64 = conn
            .del(key)
            .await
            .map_err(|e| redis_error("delete session", &e))?;
        Ok(())
    }

    /// Stores a guest cart. Guest carts are filled by catalog browsing;
    /// this is its write path.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if Redis fails.
    pub async fn put_session_cart(
        &self,
        session_id: &SessionId,
        lines: Vec<SessionCartLine>,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        let payload = serde_json::to_string(&StoredSessionCart { lines })
            .map_err(|e| DomainError::Infrastructure(format!("encode guest cart: {e}")))?;
        let mut conn = self.conn_manager.clone();
        let (): () = conn
            .set_ex(Self::cart_key(session_id), payload, ttl_seconds(ttl))
            .await
            .map_err(|e| redis_error("store guest cart", &e))?;
        Ok(())
    }
}

#[async_trait]
impl SessionAccountRepository for RedisSessionStore {
    async fn insert(
        &self,
        session_account: &SessionAccount,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        let mut conn = self.conn_manager.clone();
        let (): () = conn
            .set_ex(
                Self::account_key(&session_account.session_id),
                session_account.account_id.to_string(),
                ttl_seconds(ttl),
            )
            .await
            .map_err(|e| redis_error("store session", &e))?;
        tracing::debug!(account_id = %session_account.account_id, "session stored");
        Ok(())
    }

    async fn find_by_session_id(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<SessionAccount>, DomainError> {
        let Some((value, remaining)) = self.get_with_ttl(&Self::account_key(session_id)).await?
        else {
            return Ok(None);
        };
        let account_id = Uuid::parse_str(&value)
            .map_err(|e| DomainError::Infrastructure(format!("decode session: {e}")))?;
        Ok(Some(SessionAccount::restored(
            session_id.clone(),
            account_id,
            self.clock.now() + remaining,
        )))
    }

    async fn update_expiration(
        &self,
        session_id: &SessionId,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        self.expire(&Self::account_key(session_id), ttl).await
    }

    async fn delete(&self, session_id: &SessionId) -> Result<(), DomainError> {
        self.delete_key(&Self::account_key(session_id)).await
    }
}

#[async_trait]
impl SessionCartRepository for RedisSessionStore {
    async fn find_by_session_id(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<SessionCart>, DomainError> {
        let Some((value, remaining)) = self.get_with_ttl(&Self::cart_key(session_id)).await?
        else {
            return Ok(None);
        };
        let stored: StoredSessionCart = serde_json::from_str(&value)
            .map_err(|e| DomainError::Infrastructure(format!("decode guest cart: {e}")))?;
        Ok(Some(SessionCart {
            session_id: session_id.clone(),
            lines: stored.lines,
            expires_at: self.clock.now() + remaining,
        }))
    }

    async fn update_expiration(
        &self,
        session_id: &SessionId,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        self.expire(&Self::cart_key(session_id), ttl).await
    }

    async fn delete(&self, session_id: &SessionId) -> Result<(), DomainError> {
        self.delete_key(&Self::cart_key(session_id)).await
    }
}
