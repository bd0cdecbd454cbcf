//! Builds the end-user publisher with its subscribers.

use std::sync::Arc;

use storefront_core::id::IdGenerator;

use crate::domain::adapters::{MailSender, PaymentGateway, TokenSigner};
use crate::domain::events::EnduserEventPublisher;
use crate::domain::repositories::SessionCartRepository;
use crate::domain::subscribers::{
    CreateCartSubscriber, CreatePaymentCustomerSubscriber, MergeGuestCartSubscriber,
    SendVerificationEmailSubscriber, VerificationMailSettings,
};

/// Collaborators the subscribers call out to.
pub struct SubscriberDependencies {
    /// Sends verification mails.
    pub mail_sender: Arc<dyn MailSender>,
    /// Creates payment-provider customers.
    pub payment_gateway: Arc<dyn PaymentGateway>,
    /// Signs verification tokens.
    pub token_signer: Arc<dyn TokenSigner>,
    /// Guest cart store.
    pub session_carts: Arc<dyn SessionCartRepository>,
    /// Identifiers for new carts.
    pub ids: Arc<dyn IdGenerator>,
    /// Verification mail sender and link base.
    pub verification: VerificationMailSettings,
}

/// Registers every end-user subscriber. On activation the cart is created
/// before the payment customer.
#[must_use]
pub fn build_publisher(deps: SubscriberDependencies) -> EnduserEventPublisher {
    let mut publisher = EnduserEventPublisher::new();
    publisher
        .register(Arc::new(SendVerificationEmailSubscriber::new(
            deps.mail_sender,
            deps.token_signer,
            deps.verification,
        )))
        .register(Arc::new(CreateCartSubscriber::new(deps.ids)))
        .register(Arc::new(CreatePaymentCustomerSubscriber::new(
            deps.payment_gateway,
        )))
        .register(Arc::new(MergeGuestCartSubscriber::new(deps.session_carts)));
    publisher
}
