//! Session identifiers and lifetimes shared by the session-backed
//! aggregates.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identifier of a browser session, carried in a cookie.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wraps a raw session identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How long a kind of session record lives, and when it gets renewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLifetime {
    /// Name of the cookie carrying the session id.
    pub cookie_name: &'static str,
    ttl_days: i64,
    renew_below_days: i64,
}

impl SessionLifetime {
    /// Full lifetime of a freshly created or renewed record.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::days(self.ttl_days)
    }

    /// Low-water mark: a record with less remaining life is renewed.
    #[must_use]
    pub fn renew_below(&self) -> Duration {
        Duration::days(self.renew_below_days)
    }

    /// Returns `true` when a record expiring at `expires_at` should be
    /// extended at `now`.
    #[must_use]
    pub fn needs_renewal(&self, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        expires_at - now < self.renew_below()
    }
}

/// Login sessions live two weeks and are extended once under one week.
pub const SESSION_ACCOUNT_LIFETIME: SessionLifetime = SessionLifetime {
    cookie_name: "AccountSessionID",
    ttl_days: 14,
    renew_below_days: 7,
};

/// Guest carts live 30 days and are extended once under two weeks.
pub const SESSION_CART_LIFETIME: SessionLifetime = SessionLifetime {
    cookie_name: "SessionCartSessionID",
    ttl_days: 30,
    renew_below_days: 14,
};
