//! Creates the payment-provider customer of an activated account.

use std::sync::Arc;

use async_trait::async_trait;
use storefront_core::error::DomainError;
use storefront_core::publisher::EventSubscriber;

use super::unexpected_event;
use crate::domain::adapters::PaymentGateway;
use crate::domain::events::{ACCOUNT_ACTIVATED, EnduserEvent};

/// Reacts to `AccountActivated` by creating a customer at the payment
/// provider and storing its id on the account, in the activation's
/// transaction.
///
/// An account that already has a customer id is left alone.
pub struct CreatePaymentCustomerSubscriber {
    payment_gateway: Arc<dyn PaymentGateway>,
}

impl CreatePaymentCustomerSubscriber {
    /// Creates the subscriber.
    #[must_use]
    pub fn new(payment_gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { payment_gateway }
    }
}

#[async_trait]
impl EventSubscriber<EnduserEvent> for CreatePaymentCustomerSubscriber {
    fn name(&self) -> &'static str {
        "create_payment_customer"
    }

    fn target_events(&self) -> &'static [&'static str] {
        &[ACCOUNT_ACTIVATED]
    }

    async fn handle(&self, event: &EnduserEvent) -> Result<(), DomainError> {
        let EnduserEvent::AccountActivated(activated) = event else {
            return Err(unexpected_event(self.name(), event));
        };
        let accounts = activated.unit_of_work.accounts();

        // Re-read so that a customer linked earlier in this transaction is seen.
        let mut account = accounts
            .find_by_id(activated.account.id)
            .await?
            .ok_or_else(|| {
                DomainError::Inconsistency(format!(
                    "activated account {} not found",
                    activated.account.id
                ))
            })?;

        if let Some(existing) = &account.payment_customer_id {
            tracing::info!(
                account_id = %account.id,
                customer_id = %existing,
                "payment customer already linked, skipping"
            );
            return Ok(());
        }

        let customer_id = self.payment_gateway.create_customer().await?;
        account.set_payment_customer_id(customer_id);
        accounts.update(&account).await?;

        tracing::info!(account_id = %account.id, "payment customer created");
        Ok(())
    }
}
