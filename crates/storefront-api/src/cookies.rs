//! Session cookie encoding and lookup.

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use chrono::Duration;
use storefront_core::error::DomainError;

/// Attributes shared by every session cookie.
#[derive(Debug, Clone, Default)]
pub struct CookieSettings {
    /// `Domain` attribute; host-only when absent.
    pub domain: Option<String>,
}

impl CookieSettings {
    /// Builds a `Set-Cookie` value for `name=value` living `max_age`.
    /// The cookie is HTTP-only and `SameSite=Lax`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the value contains bytes not
    /// allowed in a header.
    pub fn session_cookie(
        &self,
        name: &str,
        value: &str,
        max_age: Duration,
    ) -> Result<HeaderValue, DomainError> {
        self.encode(name, value, max_age.num_seconds().max(0))
    }

    /// Builds a `Set-Cookie` value that makes the browser drop `name`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the name is not a valid
    /// header value.
    pub fn removal_cookie(&self, name: &str) -> Result<HeaderValue, DomainError> {
        self.encode(name, "", 0)
    }

    fn encode(&self, name: &str, value: &str, max_age: i64) -> Result<HeaderValue, DomainError> {
        let mut cookie =
            format!("{name}={value}; Path=/; Max-Age={max_age}; HttpOnly; SameSite=Lax");
        if let Some(domain) = &self.domain {
            cookie.push_str("; Domain=");
            cookie.push_str(domain);
        }
        HeaderValue::from_str(&cookie)
            .map_err(|e| DomainError::Infrastructure(format!("invalid cookie {name}: {e}")))
    }
}

/// Returns the value of the first request cookie called `name`.
#[must_use]
pub fn read(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_owned())
        .filter(|value| !value.is_empty())
}

/// Returns `true` if the response already sets a cookie called `name`.
#[must_use]
pub fn is_set(headers: &HeaderMap, name: &str) -> bool {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|cookie| {
            cookie
                .split_once('=')
                .is_some_and(|(key, _)| key.trim() == name)
        })
}
