//! Sends the email-verification link of a newly registered account.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use storefront_core::error::DomainError;
use storefront_core::publisher::EventSubscriber;

use super::unexpected_event;
use crate::domain::adapters::{MailSender, TokenSigner};
use crate::domain::events::{ACCOUNT_CREATED_BY_EMAIL, EnduserEvent};

/// Lifetime of a verification token.
pub const VERIFICATION_TOKEN_TTL_HOURS: i64 = 24;

/// Path of the verification endpoint, relative to the backend URL.
pub const VERIFICATION_PATH: &str = "/api/v1/accounts/email/verify";

/// Where verification mails come from and where their links point.
#[derive(Debug, Clone)]
pub struct VerificationMailSettings {
    /// Sender address.
    pub from: String,
    /// Public base URL of the backend, without trailing slash.
    pub backend_url: String,
}

/// Reacts to `AccountCreatedByEmail` by mailing a signed, 24-hour
/// verification link.
pub struct SendVerificationEmailSubscriber {
    mail_sender: Arc<dyn MailSender>,
    token_signer: Arc<dyn TokenSigner>,
    settings: VerificationMailSettings,
}

impl SendVerificationEmailSubscriber {
    /// Creates the subscriber.
    #[must_use]
    pub fn new(
        mail_sender: Arc<dyn MailSender>,
        token_signer: Arc<dyn TokenSigner>,
        settings: VerificationMailSettings,
    ) -> Self {
        Self {
            mail_sender,
            token_signer,
            settings,
        }
    }

    fn body(&self, token: &str) -> String {
        format!(
            r#"<a href="{}{VERIFICATION_PATH}?token={token}">Verify your email address</a><br/>The link is valid for {VERIFICATION_TOKEN_TTL_HOURS} hours."#,
            self.settings.backend_url.trim_end_matches('/'),
        )
    }
}

#[async_trait]
impl EventSubscriber<EnduserEvent> for SendVerificationEmailSubscriber {
    fn name(&self) -> &'static str {
        "send_verification_email"
    }

    fn target_events(&self) -> &'static [&'static str] {
        &[ACCOUNT_CREATED_BY_EMAIL]
    }

    async fn handle(&self, event: &EnduserEvent) -> Result<(), DomainError> {
        let EnduserEvent::AccountCreatedByEmail(created) = event else {
            return Err(unexpected_event(self.name(), event));
        };

        let token = self
            .token_signer
            .sign(
                &created.email,
                Duration::hours(VERIFICATION_TOKEN_TTL_HOURS),
            )
            .map_err(|e| DomainError::Infrastructure(format!("signing verification token: {e}")))?;

        self.mail_sender
            .send(
                &self.settings.from,
                &created.email,
                "Verify your email address",
                &self.body(&token),
            )
            .await?;

        tracing::info!(account_id = %created.account_id, "verification email sent");
        Ok(())
    }
}
