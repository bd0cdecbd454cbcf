//! Cart side effects: the cart of an activated account, and folding a
//! guest cart into it at login.

use std::sync::Arc;

use async_trait::async_trait;
use storefront_core::error::DomainError;
use storefront_core::id::IdGenerator;
use storefront_core::publisher::EventSubscriber;

use super::unexpected_event;
use crate::domain::cart::Cart;
use crate::domain::events::{ACCOUNT_ACTIVATED, EnduserEvent, SESSION_ACCOUNT_CREATED};
use crate::domain::repositories::SessionCartRepository;

/// Reacts to `AccountActivated` by creating the account's empty cart in
/// the activation's transaction. Does nothing if the cart already exists.
pub struct CreateCartSubscriber {
    ids: Arc<dyn IdGenerator>,
}

impl CreateCartSubscriber {
    /// Creates the subscriber.
    #[must_use]
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }
}

#[async_trait]
impl EventSubscriber<EnduserEvent> for CreateCartSubscriber {
    fn name(&self) -> &'static str {
        "create_cart"
    }

    fn target_events(&self) -> &'static [&'static str] {
        &[ACCOUNT_ACTIVATED]
    }

    async fn handle(&self, event: &EnduserEvent) -> Result<(), DomainError> {
        let EnduserEvent::AccountActivated(activated) = event else {
            return Err(unexpected_event(self.name(), event));
        };
        let account_id = activated.account.id;
        let carts = activated.unit_of_work.carts();

        if let Some(existing) = carts.find_by_account_id(account_id).await? {
            tracing::info!(%account_id, cart_id = %existing.id, "cart already exists, skipping");
            return Ok(());
        }

        let cart = Cart::create(self.ids.next_id(), account_id);
        carts.insert(&cart).await?;

        tracing::info!(%account_id, cart_id = %cart.id, "cart created");
        Ok(())
    }
}

/// Reacts to `SessionAccountCreated` by merging the browser's guest cart
/// into the account cart and deleting the guest cart.
pub struct MergeGuestCartSubscriber {
    session_carts: Arc<dyn SessionCartRepository>,
}

impl MergeGuestCartSubscriber {
    /// Creates the subscriber.
    #[must_use]
    pub fn new(session_carts: Arc<dyn SessionCartRepository>) -> Self {
        Self { session_carts }
    }
}

#[async_trait]
impl EventSubscriber<EnduserEvent> for MergeGuestCartSubscriber {
    fn name(&self) -> &'static str {
        "merge_guest_cart"
    }

    fn target_events(&self) -> &'static [&'static str] {
        &[SESSION_ACCOUNT_CREATED]
    }

    async fn handle(&self, event: &EnduserEvent) -> Result<(), DomainError> {
        let EnduserEvent::SessionAccountCreated(created) = event else {
            return Err(unexpected_event(self.name(), event));
        };
        let account_id = created.account_id;

        let Some(guest_session_id) = &created.guest_cart_session_id else {
            return Ok(());
        };
        let Some(guest_cart) = self.session_carts.find_by_session_id(guest_session_id).await?
        else {
            tracing::debug!(%account_id, "guest cart expired or missing, nothing to merge");
            return Ok(());
        };
        if guest_cart.is_empty() {
            return Ok(());
        }

        let unit_of_work = &created.unit_of_work;
        let mut cart = unit_of_work
            .carts()
            .find_by_account_id(account_id)
            .await?
            .ok_or_else(|| {
                tracing::error!(%account_id, "active account has no cart");
                DomainError::Inconsistency(format!("no cart for account {account_id}"))
            })?;
        let products = unit_of_work
            .products()
            .find_by_ids(&guest_cart.product_ids())
            .await?;

        cart.merge_guest_cart(&guest_cart, &products);
        unit_of_work.carts().update(&cart).await?;
        self.session_carts.delete(guest_session_id).await?;

        tracing::info!(
            %account_id,
            cart_id = %cart.id,
            guest_lines = guest_cart.lines.len(),
            "guest cart merged"
        );
        Ok(())
    }
}
