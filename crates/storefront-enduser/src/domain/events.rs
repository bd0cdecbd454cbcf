//! Domain events for the end-user context.
//!
//! One closed enum carries every fact the context raises; subscribers match
//! on the variant they registered for.

use storefront_core::event::DomainEvent;
use storefront_core::publisher::DomainEventPublisher;
use uuid::Uuid;

use super::account::Account;
use super::repositories::UnitOfWorkHandle;
use super::session::SessionId;

/// Routing name of [`EnduserEvent::AccountCreatedByEmail`].
pub const ACCOUNT_CREATED_BY_EMAIL: &str = "enduser.account_created_by_email";
/// Routing name of [`EnduserEvent::AccountActivated`].
pub const ACCOUNT_ACTIVATED: &str = "enduser.account_activated";
/// Routing name of [`EnduserEvent::SessionAccountCreated`].
pub const SESSION_ACCOUNT_CREATED: &str = "enduser.session_account_created";

/// An account was registered with an email address and awaits verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountCreatedByEmail {
    /// The new account.
    pub account_id: Uuid,
    /// Address the verification link is sent to.
    pub email: String,
}

/// An account passed email verification and is now active.
///
/// Carries the still-open unit of work of the activation so that follow-up
/// writes commit (or roll back) together with it.
#[derive(Debug, Clone)]
pub struct AccountActivated {
    /// Snapshot of the account right after activation.
    pub account: Account,
    /// The transaction the activation was written in.
    pub unit_of_work: UnitOfWorkHandle,
}

/// A login session was created for an account.
#[derive(Debug, Clone)]
pub struct SessionAccountCreated {
    /// The authenticated account.
    pub account_id: Uuid,
    /// The guest cart session of the browser, when one was resolved.
    pub guest_cart_session_id: Option<SessionId>,
    /// The transaction the login runs in.
    pub unit_of_work: UnitOfWorkHandle,
}

/// Every event raised in the end-user context.
#[derive(Debug, Clone)]
pub enum EnduserEvent {
    /// See [`AccountCreatedByEmail`].
    AccountCreatedByEmail(AccountCreatedByEmail),
    /// See [`AccountActivated`].
    AccountActivated(AccountActivated),
    /// See [`SessionAccountCreated`].
    SessionAccountCreated(SessionAccountCreated),
}

impl DomainEvent for EnduserEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::AccountCreatedByEmail(_) => ACCOUNT_CREATED_BY_EMAIL,
            Self::AccountActivated(_) => ACCOUNT_ACTIVATED,
            Self::SessionAccountCreated(_) => SESSION_ACCOUNT_CREATED,
        }
    }
}

/// Publisher specialised to the end-user events.
pub type EnduserEventPublisher = DomainEventPublisher<EnduserEvent>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_distinct() {
        let created = EnduserEvent::AccountCreatedByEmail(AccountCreatedByEmail {
            account_id: Uuid::nil(),
            email: "a@example.com".to_owned(),
        });
        assert_eq!(created.name(), ACCOUNT_CREATED_BY_EMAIL);
        assert_ne!(ACCOUNT_ACTIVATED, SESSION_ACCOUNT_CREATED);
        assert_ne!(ACCOUNT_CREATED_BY_EMAIL, ACCOUNT_ACTIVATED);
    }
}
