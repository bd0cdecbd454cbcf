//! Dependencies shared by the end-user use cases.

use std::sync::Arc;

use storefront_core::clock::Clock;
use storefront_core::id::IdGenerator;

use crate::domain::adapters::{PasswordHasher, TokenSigner};
use crate::domain::events::EnduserEventPublisher;
use crate::domain::repositories::{
    SessionAccountRepository, SessionCartRepository, TransactionManager,
};

/// Everything the command and query handlers need, cloned cheaply into
/// each request.
#[derive(Clone)]
pub struct EnduserServices {
    /// Opens storage transactions.
    pub transactions: Arc<dyn TransactionManager>,
    /// Login session store.
    pub session_accounts: Arc<dyn SessionAccountRepository>,
    /// Guest cart store.
    pub session_carts: Arc<dyn SessionCartRepository>,
    /// Routes raised events to subscribers.
    pub publisher: Arc<EnduserEventPublisher>,
    /// Verifies email-verification tokens.
    pub token_signer: Arc<dyn TokenSigner>,
    /// Hashes and checks passwords.
    pub password_hasher: Arc<dyn PasswordHasher>,
    /// Current time.
    pub clock: Arc<dyn Clock>,
    /// Identifiers for accounts and sessions.
    pub ids: Arc<dyn IdGenerator>,
}

impl std::fmt::Debug for EnduserServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnduserServices")
            .field("publisher", &self.publisher)
            .finish_non_exhaustive()
    }
}
