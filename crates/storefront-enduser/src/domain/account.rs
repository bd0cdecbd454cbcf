//! The account aggregate.

use serde::{Deserialize, Serialize};
use storefront_core::aggregate::AggregateRoot;
use storefront_core::error::DomainError;
use uuid::Uuid;

use super::events::{AccountActivated, AccountCreatedByEmail, EnduserEvent};
use super::repositories::UnitOfWorkHandle;

/// Nickname shown on reviews until the user picks one.
pub const INITIAL_REVIEW_NICKNAME: &str = "anonymous";

/// How an account authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthType {
    /// Email address and password.
    Email,
    /// Google sign-in.
    Google,
    /// Apple sign-in.
    Apple,
}

impl AuthType {
    /// Storage code of the auth type.
    #[must_use]
    pub fn code(self) -> i16 {
        match self {
            Self::Email => 1,
            Self::Google => 2,
            Self::Apple => 3,
        }
    }

    /// Parses a storage code.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` for an unknown code.
    pub fn from_code(code: i16) -> Result<Self, DomainError> {
        match code {
            1 => Ok(Self::Email),
            2 => Ok(Self::Google),
            3 => Ok(Self::Apple),
            other => Err(DomainError::Infrastructure(format!(
                "unknown auth type code {other}"
            ))),
        }
    }
}

/// The aggregate root for an end-user account.
#[derive(Debug, Clone)]
pub struct Account {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Unique email address.
    pub email: String,
    /// Password hash, present for email accounts.
    pub password_digest: Option<String>,
    /// Authentication method.
    pub auth_type: AuthType,
    /// Account id at the external identity provider.
    pub external_account_id: Option<String>,
    /// Whether the email address has been verified.
    pub is_active: bool,
    /// Customer reference at the payment provider.
    pub payment_customer_id: Option<String>,
    /// Name shown on reviews.
    pub review_nickname: String,
    /// Events raised since the last drain.
    pending_events: Vec<EnduserEvent>,
}

impl Account {
    /// Registers a new, inactive account for `email`, raising
    /// `AccountCreatedByEmail`.
    #[must_use]
    pub fn create_by_email(id: Uuid, email: String, password_digest: String) -> Self {
        let event = EnduserEvent::AccountCreatedByEmail(AccountCreatedByEmail {
            account_id: id,
            email: email.clone(),
        });
        Self {
            id,
            email,
            password_digest: Some(password_digest),
            auth_type: AuthType::Email,
            external_account_id: None,
            is_active: false,
            payment_customer_id: None,
            review_nickname: INITIAL_REVIEW_NICKNAME.to_owned(),
            pending_events: vec![event],
        }
    }

    /// Rebuilds an account loaded from storage. Optional fields start empty
    /// and are filled in by the caller; no events are pending.
    #[must_use]
    pub fn restored(id: Uuid, email: String, auth_type: AuthType) -> Self {
        Self {
            id,
            email,
            password_digest: None,
            auth_type,
            external_account_id: None,
            is_active: false,
            payment_customer_id: None,
            review_nickname: INITIAL_REVIEW_NICKNAME.to_owned(),
            pending_events: Vec::new(),
        }
    }

    /// Marks the email address as verified, raising `AccountActivated`
    /// with `unit_of_work` so that subscribers write in the same
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Rejected` if the account is already active.
    pub fn activate(&mut self, unit_of_work: UnitOfWorkHandle) -> Result<(), DomainError> {
        if self.is_active {
            return Err(DomainError::rejected("the account is already active"));
        }
        self.is_active = true;
        let event = EnduserEvent::AccountActivated(AccountActivated {
            account: self.snapshot(),
            unit_of_work,
        });
        self.pending_events.push(event);
        Ok(())
    }

    /// Links the account to its payment-provider customer.
    pub fn set_payment_customer_id(&mut self, customer_id: String) {
        self.payment_customer_id = Some(customer_id);
    }

    /// Returns `true` if the account logs in with email and password.
    #[must_use]
    pub fn uses_email_login(&self) -> bool {
        self.auth_type == AuthType::Email && self.password_digest.is_some()
    }

    /// A copy of the account state without pending events.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        let mut copy = self.clone();
        copy.pending_events.clear();
        copy
    }
}

impl AggregateRoot for Account {
    type Event = EnduserEvent;

    fn pending_events(&self) -> &[EnduserEvent] {
        &self.pending_events
    }

    fn clear_events(&mut self) -> Vec<EnduserEvent> {
        std::mem::take(&mut self.pending_events)
    }
}
