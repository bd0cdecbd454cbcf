//! Outbound collaborators the domain depends on.

use async_trait::async_trait;
use chrono::Duration;
use storefront_core::error::DomainError;
use thiserror::Error;

/// Sends HTML email.
#[async_trait]
pub trait MailSender: Send + Sync {
    /// Sends one message.
    async fn send(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        body_html: &str,
    ) -> Result<(), DomainError>;
}

/// Payment provider client.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a customer and returns its id at the provider.
    async fn create_customer(&self) -> Result<String, DomainError>;
}

/// Failure verifying a signed token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The token was well formed and signed, but is past its expiry.
    #[error("token expired")]
    Expired,
    /// The signature does not match.
    #[error("invalid token signature")]
    InvalidSignature,
    /// Any other failure (malformed token, signing failure).
    #[error("token error: {0}")]
    Other(String),
}

/// Signs and verifies time-boxed tokens binding a subject.
pub trait TokenSigner: Send + Sync {
    /// Signs `subject`, valid for `ttl`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Other` if signing fails.
    fn sign(&self, subject: &str, ttl: Duration) -> Result<String, TokenError>;

    /// Verifies `token` and returns its subject.
    ///
    /// # Errors
    ///
    /// Distinguishes an expired token from a bad signature from anything
    /// else.
    fn verify(&self, token: &str) -> Result<String, TokenError>;
}

/// One-way password hashing.
pub trait PasswordHasher: Send + Sync {
    /// Hashes `password` for storage.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if hashing fails.
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// Returns `true` if `password` matches `digest`.
    fn verify(&self, password: &str, digest: &str) -> bool;
}
