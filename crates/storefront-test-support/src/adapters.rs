//! Doubles for the outbound collaborators.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Duration;
use storefront_core::error::DomainError;
use storefront_enduser::domain::adapters::{
    MailSender, PasswordHasher, PaymentGateway, TokenError, TokenSigner,
};

/// A mail captured by [`RecordingMailSender`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    /// Sender.
    pub from: String,
    /// Recipient.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub body_html: String,
}

/// A mail sender that records every message instead of sending it.
#[derive(Debug, Default)]
pub struct RecordingMailSender {
    sent: Mutex<Vec<SentMail>>,
    fail: AtomicBool,
}

impl RecordingMailSender {
    /// Creates a sender with an empty outbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following send fail.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Returns a snapshot of all sent mails.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailSender for RecordingMailSender {
    async fn send(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        body_html: &str,
    ) -> Result<(), DomainError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::Infrastructure("smtp unavailable".into()));
        }
        self.sent.lock().unwrap().push(SentMail {
            from: from.to_owned(),
            to: to.to_owned(),
            subject: subject.to_owned(),
            body_html: body_html.to_owned(),
        });
        Ok(())
    }
}

/// A payment gateway handing out `cus_0001`, `cus_0002`, ...
#[derive(Debug, Default)]
pub struct FakePaymentGateway {
    created: AtomicUsize,
    fail: AtomicBool,
}

impl FakePaymentGateway {
    /// Creates a gateway with no customers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following call fail.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Number of customers created.
    #[must_use]
    pub fn customers_created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for FakePaymentGateway {
    async fn create_customer(&self) -> Result<String, DomainError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::Infrastructure(
                "payment provider unavailable".into(),
            ));
        }
        let n = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("cus_{n:04}"))
    }
}

/// A "hasher" that stores passwords with a visible prefix.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainPasswordHasher;

impl PasswordHasher for PlainPasswordHasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        Ok(format!("plain:{password}"))
    }

    fn verify(&self, password: &str, digest: &str) -> bool {
        digest.strip_prefix("plain:") == Some(password)
    }
}

const TOKEN_PREFIX: &str = "token-for:";

/// A token signer whose tokens are the subject with a prefix. Any other
/// string has an invalid signature.
#[derive(Debug, Default)]
pub struct FakeTokenSigner {
    expired: AtomicBool,
}

impl FakeTokenSigner {
    /// Creates a signer whose tokens are valid.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following verification report an expired token.
    pub fn set_expired(&self, expired: bool) {
        self.expired.store(expired, Ordering::SeqCst);
    }
}

impl TokenSigner for FakeTokenSigner {
    fn sign(&self, subject: &str, _ttl: Duration) -> Result<String, TokenError> {
        Ok(format!("{TOKEN_PREFIX}{subject}"))
    }

    fn verify(&self, token: &str) -> Result<String, TokenError> {
        let subject = token
            .strip_prefix(TOKEN_PREFIX)
            .ok_or(TokenError::InvalidSignature)?;
        if self.expired.load(Ordering::SeqCst) {
            return Err(TokenError::Expired);
        }
        Ok(subject.to_owned())
    }
}
