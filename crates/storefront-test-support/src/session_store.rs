//! In-memory TTL store for login sessions and guest carts.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use storefront_core::clock::Clock;
use storefront_core::error::DomainError;
use storefront_enduser::domain::repositories::{SessionAccountRepository, SessionCartRepository};
use storefront_enduser::domain::session::SessionId;
use storefront_enduser::domain::session_account::SessionAccount;
use storefront_enduser::domain::session_cart::{SessionCart, SessionCartLine};
use uuid::Uuid;

const SESSION_ACCOUNT_PREFIX: &str = "session_account:";
const SESSION_CART_PREFIX: &str = "session_cart:";

#[derive(Debug, Clone)]
enum Value {
    Account(Uuid),
    Cart(Vec<SessionCartLine>),
}

/// Key-value store with per-key expiry, judged against an injected clock.
/// Implements both session repositories over one key space.
pub struct InMemorySessionStore {
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, (Value, DateTime<Utc>)>>,
    fail_expiration_updates: AtomicBool,
    expiration_updates: AtomicUsize,
}

impl std::fmt::Debug for InMemorySessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySessionStore")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

fn account_key(session_id: &SessionId) -> String {
    format!("{SESSION_ACCOUNT_PREFIX}{session_id}")
}

fn cart_key(session_id: &SessionId) -> String {
    format!("{SESSION_CART_PREFIX}{session_id}")
}

impl InMemorySessionStore {
    /// Creates an empty store whose expiry is judged by `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            entries: Mutex::new(HashMap::new()),
            fail_expiration_updates: AtomicBool::new(false),
            expiration_updates: AtomicUsize::new(0),
        }
    }

    /// Stores a login session expiring at `expires_at`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn seed_session_account(
        &self,
        session_id: &SessionId,
        account_id: Uuid,
        expires_at: DateTime<Utc>,
    ) {
        self.entries.lock().unwrap().insert(
            account_key(session_id),
            (Value::Account(account_id), expires_at),
        );
    }

    /// Stores a guest cart expiring at `expires_at`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn seed_session_cart(
        &self,
        session_id: &SessionId,
        lines: Vec<SessionCartLine>,
        expires_at: DateTime<Utc>,
    ) {
        self.entries
            .lock()
            .unwrap()
            .insert(cart_key(session_id), (Value::Cart(lines), expires_at));
    }

    /// Expiry of the raw key, live or not.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn expiry_of(&self, key: &str) -> Option<DateTime<Utc>> {
        self.entries.lock().unwrap().get(key).map(|(_, at)| *at)
    }

    /// Returns `true` if a live login session exists for `session_id`.
    #[must_use]
    pub fn has_session_account(&self, session_id: &SessionId) -> bool {
        self.live(&account_key(session_id)).is_some()
    }

    /// Returns `true` if a live guest cart exists for `session_id`.
    #[must_use]
    pub fn has_session_cart(&self, session_id: &SessionId) -> bool {
        self.live(&cart_key(session_id)).is_some()
    }

    /// Number of live login sessions.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn session_account_count(&self) -> usize {
        let now = self.clock.now();
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(key, (_, at))| key.starts_with(SESSION_ACCOUNT_PREFIX) && *at > now)
            .count()
    }

    /// Makes every following expiry extension fail.
    pub fn set_fail_expiration_updates(&self, fail: bool) {
        self.fail_expiration_updates.store(fail, Ordering::SeqCst);
    }

    /// Number of attempted expiry extensions.
    #[must_use]
    pub fn expiration_update_count(&self) -> usize {
        self.expiration_updates.load(Ordering::SeqCst)
    }

    fn live(&self, key: &str) -> Option<(Value, DateTime<Utc>)> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap();
        if entries.get(key).is_some_and(|(_, at)| *at <= now) {
            entries.remove(key);
            return None;
        }
        entries.get(key).cloned()
    }

    fn extend(&self, key: &str, ttl: Duration) -> Result<(), DomainError> {
        self.expiration_updates.fetch_add(1, Ordering::SeqCst);
        if self.fail_expiration_updates.load(Ordering::SeqCst) {
            return Err(DomainError::Infrastructure(
                "session store unavailable".to_owned(),
            ));
        }
        let expires_at = self.clock.now() + ttl;
        if let Some(entry) = self.entries.lock().unwrap().get_mut(key) {
            entry.1 = expires_at;
        }
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}

#[async_trait]
impl SessionAccountRepository for InMemorySessionStore {
    async fn insert(
        &self,
        session_account: &SessionAccount,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        let expires_at = self.clock.now() + ttl;
        self.seed_session_account(
            &session_account.session_id,
            session_account.account_id,
            expires_at,
        );
        Ok(())
    }

    async fn find_by_session_id(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<SessionAccount>, DomainError> {
        Ok(match self.live(&account_key(session_id)) {
            Some((Value::Account(account_id), expires_at)) => Some(SessionAccount::restored(
                session_id.clone(),
                account_id,
                expires_at,
            )),
            _ => None,
        })
    }

    async fn update_expiration(
        &self,
        session_id: &SessionId,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        self.extend(&account_key(session_id), ttl)
    }

    async fn delete(&self, session_id: &SessionId) -> Result<(), DomainError> {
        self.remove(&account_key(session_id));
        Ok(())
    }
}

#[async_trait]
impl SessionCartRepository for InMemorySessionStore {
    async fn find_by_session_id(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<SessionCart>, DomainError> {
        Ok(match self.live(&cart_key(session_id)) {
            Some((Value::Cart(lines), expires_at)) => Some(SessionCart {
                session_id: session_id.clone(),
                lines,
                expires_at,
            }),
            _ => None,
        })
    }

    async fn update_expiration(
        &self,
        session_id: &SessionId,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        self.extend(&cart_key(session_id), ttl)
    }

    async fn delete(&self, session_id: &SessionId) -> Result<(), DomainError> {
        self.remove(&cart_key(session_id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FixedClock;

    #[tokio::test]
    async fn test_expired_entries_are_not_found() {
        // Arrange
        let clock = FixedClock::default_instant();
        let store = InMemorySessionStore::new(Arc::new(clock));
        let live = SessionId::new("live");
        let dead = SessionId::new("dead");
        store.seed_session_account(&live, Uuid::from_u128(1), clock.0 + Duration::days(1));
        store.seed_session_account(&dead, Uuid::from_u128(2), clock.0 - Duration::seconds(1));

        // Act
        let found_live = SessionAccountRepository::find_by_session_id(&store, &live)
            .await
            .unwrap();
        let found_dead = SessionAccountRepository::find_by_session_id(&store, &dead)
            .await
            .unwrap();

        // Assert
        assert_eq!(found_live.unwrap().account_id, Uuid::from_u128(1));
        assert!(found_dead.is_none());
        assert_eq!(store.session_account_count(), 1);
    }

    #[tokio::test]
    async fn test_update_expiration_resets_ttl_from_now() {
        let clock = FixedClock::default_instant();
        let store = InMemorySessionStore::new(Arc::new(clock));
        let id = SessionId::new("cart");
        store.seed_session_cart(&id, Vec::new(), clock.0 + Duration::days(2));

        SessionCartRepository::update_expiration(&store, &id, Duration::days(30))
            .await
            .unwrap();

        assert_eq!(
            store.expiry_of("session_cart:cart"),
            Some(clock.0 + Duration::days(30))
        );
    }
}
