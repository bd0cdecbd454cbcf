//! The login session aggregate.

use chrono::{DateTime, Utc};
use storefront_core::aggregate::AggregateRoot;
use uuid::Uuid;

use super::events::{EnduserEvent, SessionAccountCreated};
use super::repositories::UnitOfWorkHandle;
use super::session::{SESSION_ACCOUNT_LIFETIME, SessionId};

/// A logged-in browser session, kept in the session store with a TTL.
#[derive(Debug, Clone)]
pub struct SessionAccount {
    /// Session identifier carried in the `AccountSessionID` cookie.
    pub session_id: SessionId,
    /// The account the session is logged in as.
    pub account_id: Uuid,
    /// When the store will drop the record.
    pub expires_at: DateTime<Utc>,
    /// Events raised since the last drain.
    pending_events: Vec<EnduserEvent>,
}

impl SessionAccount {
    /// Logs `account_id` in, raising `SessionAccountCreated`.
    ///
    /// `guest_cart_session_id` is the browser's guest cart, if one was
    /// resolved for the request; the merge subscriber folds it into the
    /// account cart.
    #[must_use]
    pub fn create(
        session_id: SessionId,
        account_id: Uuid,
        guest_cart_session_id: Option<SessionId>,
        unit_of_work: UnitOfWorkHandle,
        now: DateTime<Utc>,
    ) -> Self {
        let event = EnduserEvent::SessionAccountCreated(SessionAccountCreated {
            account_id,
            guest_cart_session_id,
            unit_of_work,
        });
        Self {
            session_id,
            account_id,
            expires_at: now + SESSION_ACCOUNT_LIFETIME.ttl(),
            pending_events: vec![event],
        }
    }

    /// Rebuilds a session loaded from the store.
    #[must_use]
    pub fn restored(session_id: SessionId, account_id: Uuid, expires_at: DateTime<Utc>) -> Self {
        Self {
            session_id,
            account_id,
            expires_at,
            pending_events: Vec::new(),
        }
    }
}

impl AggregateRoot for SessionAccount {
    type Event = EnduserEvent;

    fn pending_events(&self) -> &[EnduserEvent] {
        &self.pending_events
    }

    fn clear_events(&mut self) -> Vec<EnduserEvent> {
        std::mem::take(&mut self.pending_events)
    }
}
