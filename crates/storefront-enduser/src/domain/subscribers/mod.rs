//! Subscribers executing the side effects of end-user events.

mod cart;
mod payment_customer;
mod verification_email;

pub use cart::{CreateCartSubscriber, MergeGuestCartSubscriber};
pub use payment_customer::CreatePaymentCustomerSubscriber;
pub use verification_email::{SendVerificationEmailSubscriber, VerificationMailSettings};

use storefront_core::error::DomainError;
use storefront_core::event::DomainEvent;

use super::events::EnduserEvent;

/// Error for an event routed to a subscriber that does not handle it.
fn unexpected_event(subscriber: &str, event: &EnduserEvent) -> DomainError {
    DomainError::Inconsistency(format!(
        "subscriber {subscriber} received unexpected event {}",
        event.name()
    ))
}
