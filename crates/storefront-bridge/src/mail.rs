//! Mail sender that writes messages to the log instead of delivering them.

use async_trait::async_trait;
use storefront_core::error::DomainError;
use storefront_enduser::domain::adapters::MailSender;

/// Logs every message at `info` level. Used for local development, where no
/// mail relay is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleMailSender;

impl ConsoleMailSender {
    /// Creates a sender.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MailSender for ConsoleMailSender {
    async fn send(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        body_html: &str,
    ) -> Result<(), DomainError> {
        tracing::info!(from, to, subject, body = body_html, "mail sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_always_succeeds() {
        let sender = ConsoleMailSender::new();

        let result = sender
            .send("from@example.com", "to@example.com", "Hello", "<p>hi</p>")
            .await;

        assert!(result.is_ok());
    }
}
