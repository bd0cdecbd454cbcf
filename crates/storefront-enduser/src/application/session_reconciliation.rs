//! Per-request resolution and renewal of session records.
//!
//! A request may carry a login session cookie and a guest cart cookie.
//! Each one is looked up in the session store; a record close to expiry is
//! extended to its full lifetime. Renewal is best effort: a failed
//! extension is logged and the request goes on with the record as found.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use storefront_core::clock::Clock;
use storefront_core::error::DomainError;

use crate::domain::repositories::{SessionAccountRepository, SessionCartRepository};
use crate::domain::session::{SESSION_ACCOUNT_LIFETIME, SESSION_CART_LIFETIME, SessionId};
use crate::domain::session_account::SessionAccount;
use crate::domain::session_cart::SessionCart;

/// The session records resolved for one request. Either may be absent.
#[derive(Debug, Clone, Default)]
pub struct ReconciledSessions {
    /// The login session, if the request is logged in.
    pub session_account: Option<SessionAccount>,
    /// The guest cart, if the browser has one.
    pub session_cart: Option<SessionCart>,
    /// New expiry of the login session, set when it was extended.
    pub session_account_renewed_until: Option<DateTime<Utc>>,
    /// New expiry of the guest cart, set when it was extended.
    pub session_cart_renewed_until: Option<DateTime<Utc>>,
}

impl ReconciledSessions {
    /// The guest cart session id, when the browser has a live guest cart.
    #[must_use]
    pub fn guest_cart_session_id(&self) -> Option<SessionId> {
        self.session_cart.as_ref().map(|cart| cart.session_id.clone())
    }
}

/// Looks up and renews the session records of a request.
#[derive(Clone)]
pub struct SessionReconciler {
    session_accounts: Arc<dyn SessionAccountRepository>,
    session_carts: Arc<dyn SessionCartRepository>,
    clock: Arc<dyn Clock>,
}

impl SessionReconciler {
    /// Creates a reconciler over the two session stores.
    #[must_use]
    pub fn new(
        session_accounts: Arc<dyn SessionAccountRepository>,
        session_carts: Arc<dyn SessionCartRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            session_accounts,
            session_carts,
            clock,
        }
    }

    /// Resolves the records named by the request's cookies.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if a lookup fails. Failed
    /// renewals are not errors.
    pub async fn reconcile(
        &self,
        account_session_id: Option<&SessionId>,
        cart_session_id: Option<&SessionId>,
    ) -> Result<ReconciledSessions, DomainError> {
        let now = self.clock.now();
        let mut reconciled = ReconciledSessions::default();

        if let Some(session_id) = account_session_id {
            if let Some(mut session) = self.session_accounts.find_by_session_id(session_id).await? {
                if SESSION_ACCOUNT_LIFETIME.needs_renewal(session.expires_at, now) {
                    let lifetime = SESSION_ACCOUNT_LIFETIME.ttl();
                    match self.session_accounts.update_expiration(session_id, lifetime).await {
                        Ok(()) => {
                            session.expires_at = now + lifetime;
                            reconciled.session_account_renewed_until = Some(session.expires_at);
                        }
                        Err(err) => {
                            tracing::error!(error = %err, "failed to extend login session");
                        }
                    }
                }
                reconciled.session_account = Some(session);
            }
        }

        if let Some(session_id) = cart_session_id {
            if let Some(mut cart) = self.session_carts.find_by_session_id(session_id).await? {
                if SESSION_CART_LIFETIME.needs_renewal(cart.expires_at, now) {
                    let lifetime = SESSION_CART_LIFETIME.ttl();
                    match self.session_carts.update_expiration(session_id, lifetime).await {
                        Ok(()) => {
                            cart.expires_at = now + lifetime;
                            reconciled.session_cart_renewed_until = Some(cart.expires_at);
                        }
                        Err(err) => {
                            tracing::error!(error = %err, "failed to extend guest cart session");
                        }
                    }
                }
                reconciled.session_cart = Some(cart);
            }
        }

        Ok(reconciled)
    }
}
