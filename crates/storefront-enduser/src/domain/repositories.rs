//! Repository contracts and the transactional unit of work.
//!
//! Account, cart and product repositories are reached only through a
//! [`UnitOfWork`], so every write they make belongs to one transaction.
//! Session records live in a TTL store outside that transaction.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use storefront_core::error::DomainError;
use uuid::Uuid;

use super::account::Account;
use super::cart::Cart;
use super::product::Product;
use super::session::SessionId;
use super::session_account::SessionAccount;
use super::session_cart::SessionCart;

/// Accounts, inside a transaction.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Finds an account by its (unique) email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError>;

    /// Finds an account by id.
    async fn find_by_id(&self, account_id: Uuid) -> Result<Option<Account>, DomainError>;

    /// Inserts a new account. Does not touch pending events.
    async fn insert(&self, account: &Account) -> Result<(), DomainError>;

    /// Overwrites an existing account. Does not touch pending events.
    async fn update(&self, account: &Account) -> Result<(), DomainError>;
}

/// Account carts, inside a transaction.
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Finds the cart owned by `account_id`.
    async fn find_by_account_id(&self, account_id: Uuid) -> Result<Option<Cart>, DomainError>;

    /// Inserts a new cart at its current version.
    async fn insert(&self, cart: &Cart) -> Result<(), DomainError>;

    /// Replaces the cart's lines and bumps its stored version to
    /// `cart.version + 1`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ConcurrencyConflict` if the stored version is
    /// not `cart.version`; the stored cart is left unchanged.
    async fn update(&self, cart: &Cart) -> Result<(), DomainError>;
}

/// Product projections, inside a transaction.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Loads the products among `product_ids` that exist.
    async fn find_by_ids(&self, product_ids: &[Uuid]) -> Result<Vec<Product>, DomainError>;
}

/// An open storage transaction.
///
/// Shared as a [`UnitOfWorkHandle`] so that events can carry it to
/// subscribers. After `commit` or `rollback` every further call fails.
#[async_trait]
pub trait UnitOfWork: Send + Sync + fmt::Debug {
    /// Accounts in this transaction.
    fn accounts(&self) -> &dyn AccountRepository;

    /// Carts in this transaction.
    fn carts(&self) -> &dyn CartRepository;

    /// Products in this transaction.
    fn products(&self) -> &dyn ProductRepository;

    /// Commits every write made through this unit of work.
    async fn commit(&self) -> Result<(), DomainError>;

    /// Discards every write made through this unit of work.
    async fn rollback(&self) -> Result<(), DomainError>;
}

/// Shared handle to an open unit of work.
pub type UnitOfWorkHandle = Arc<dyn UnitOfWork>;

/// Opens units of work.
#[async_trait]
pub trait TransactionManager: Send + Sync {
    /// Begins a new transaction.
    async fn begin(&self) -> Result<UnitOfWorkHandle, DomainError>;
}

/// Login sessions in the TTL store.
#[async_trait]
pub trait SessionAccountRepository: Send + Sync {
    /// Stores `session_account`, expiring after `ttl`. Does not touch
    /// pending events.
    async fn insert(
        &self,
        session_account: &SessionAccount,
        ttl: Duration,
    ) -> Result<(), DomainError>;

    /// Finds a live session.
    async fn find_by_session_id(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<SessionAccount>, DomainError>;

    /// Resets the remaining lifetime of a session to `ttl`.
    async fn update_expiration(&self, session_id: &SessionId, ttl: Duration)
    -> Result<(), DomainError>;

    /// Deletes a session. Deleting a missing session is not an error.
    async fn delete(&self, session_id: &SessionId) -> Result<(), DomainError>;
}

/// Guest carts in the TTL store.
#[async_trait]
pub trait SessionCartRepository: Send + Sync {
    /// Finds a live guest cart.
    async fn find_by_session_id(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<SessionCart>, DomainError>;

    /// Resets the remaining lifetime of a guest cart to `ttl`.
    async fn update_expiration(&self, session_id: &SessionId, ttl: Duration)
    -> Result<(), DomainError>;

    /// Deletes a guest cart. Deleting a missing cart is not an error.
    async fn delete(&self, session_id: &SessionId) -> Result<(), DomainError>;
}
