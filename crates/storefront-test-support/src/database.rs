//! In-memory transactional store for accounts, carts and products.
//!
//! Each unit of work stages its writes on a private copy of the committed
//! tables. A cart update fails once another unit of work has committed a
//! newer version of that cart. `commit` re-checks cart versions against what
//! was committed in the meantime and publishes the staged rows; `rollback`
//! drops them.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use storefront_core::error::DomainError;
use storefront_enduser::domain::account::Account;
use storefront_enduser::domain::cart::Cart;
use storefront_enduser::domain::product::Product;
use storefront_enduser::domain::repositories::{
    AccountRepository, CartRepository, ProductRepository, TransactionManager, UnitOfWork,
    UnitOfWorkHandle,
};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
struct Tables {
    accounts: HashMap<Uuid, Account>,
    carts: HashMap<Uuid, Cart>,
    products: HashMap<Uuid, Product>,
}

#[derive(Debug, Default)]
struct Shared {
    committed: Mutex<Tables>,
    fail_on_commit: AtomicBool,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
}

/// An in-memory database. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDatabase {
    shared: Arc<Shared>,
}

impl InMemoryDatabase {
    /// Creates an empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn committed(&self) -> MutexGuard<'_, Tables> {
        self.shared.committed.lock().unwrap()
    }

    /// Stores `account` as committed, outside any transaction.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn seed_account(&self, account: &Account) {
        self.committed()
            .accounts
            .insert(account.id, account.snapshot());
    }

    /// Stores `cart` as committed, outside any transaction.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn seed_cart(&self, cart: &Cart) {
        self.committed().carts.insert(cart.id, cart.clone());
    }

    /// Stores `product` as committed, outside any transaction.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn seed_product(&self, product: Product) {
        self.committed().products.insert(product.id, product);
    }

    /// Returns the committed account with `email`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn account_by_email(&self, email: &str) -> Option<Account> {
        self.committed()
            .accounts
            .values()
            .find(|account| account.email == email)
            .cloned()
    }

    /// Returns every committed cart owned by `account_id`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn carts_of(&self, account_id: Uuid) -> Vec<Cart> {
        self.committed()
            .carts
            .values()
            .filter(|cart| cart.account_id == account_id)
            .cloned()
            .collect()
    }

    /// Number of committed accounts.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn account_count(&self) -> usize {
        self.committed().accounts.len()
    }

    /// Makes every following `commit` fail.
    pub fn set_fail_on_commit(&self, fail: bool) {
        self.shared.fail_on_commit.store(fail, Ordering::SeqCst);
    }

    /// Number of successful commits.
    #[must_use]
    pub fn commit_count(&self) -> usize {
        self.shared.commits.load(Ordering::SeqCst)
    }

    /// Number of rollbacks.
    #[must_use]
    pub fn rollback_count(&self) -> usize {
        self.shared.rollbacks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransactionManager for InMemoryDatabase {
    async fn begin(&self) -> Result<UnitOfWorkHandle, DomainError> {
        let snapshot = self.committed().clone();
        let base_cart_versions = snapshot
            .carts
            .iter()
            .map(|(id, cart)| (*id, cart.version))
            .collect();
        Ok(Arc::new(InMemoryUnitOfWork {
            shared: Arc::clone(&self.shared),
            staged: Mutex::new(Some(Staged {
                tables: snapshot,
                touched_accounts: HashSet::new(),
                touched_carts: HashSet::new(),
                base_cart_versions,
            })),
        }))
    }
}

struct Staged {
    tables: Tables,
    touched_accounts: HashSet<Uuid>,
    touched_carts: HashSet<Uuid>,
    base_cart_versions: HashMap<Uuid, i64>,
}

/// A transaction over an [`InMemoryDatabase`].
pub struct InMemoryUnitOfWork {
    shared: Arc<Shared>,
    staged: Mutex<Option<Staged>>,
}

impl fmt::Debug for InMemoryUnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = self.staged.lock().map(|s| s.is_some()).unwrap_or(false);
        f.debug_struct("InMemoryUnitOfWork")
            .field("open", &open)
            .finish_non_exhaustive()
    }
}

fn finished() -> DomainError {
    DomainError::Infrastructure("transaction already finished".to_owned())
}

impl InMemoryUnitOfWork {
    fn with_staged<T>(
        &self,
        f: impl FnOnce(&mut Staged) -> Result<T, DomainError>,
    ) -> Result<T, DomainError> {
        let mut guard = self.staged.lock().unwrap();
        let staged = guard.as_mut().ok_or_else(finished)?;
        f(staged)
    }

    fn take_staged(&self) -> Result<Staged, DomainError> {
        self.staged.lock().unwrap().take().ok_or_else(finished)
    }
}

#[async_trait]
impl AccountRepository for InMemoryUnitOfWork {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        self.with_staged(|staged| {
            Ok(staged
                .tables
                .accounts
                .values()
                .find(|account| account.email == email)
                .cloned())
        })
    }

    async fn find_by_id(&self, account_id: Uuid) -> Result<Option<Account>, DomainError> {
        self.with_staged(|staged| Ok(staged.tables.accounts.get(&account_id).cloned()))
    }

    async fn insert(&self, account: &Account) -> Result<(), DomainError> {
        self.with_staged(|staged| {
            let accounts = &mut staged.tables.accounts;
            if accounts.contains_key(&account.id)
                || accounts.values().any(|a| a.email == account.email)
            {
                return Err(DomainError::Infrastructure(format!(
                    "duplicate account {}",
                    account.id
                )));
            }
            accounts.insert(account.id, account.snapshot());
            staged.touched_accounts.insert(account.id);
            Ok(())
        })
    }

    async fn update(&self, account: &Account) -> Result<(), DomainError> {
        self.with_staged(|staged| {
            if !staged.tables.accounts.contains_key(&account.id) {
                return Err(DomainError::AggregateNotFound(account.id));
            }
            staged
                .tables
                .accounts
                .insert(account.id, account.snapshot());
            staged.touched_accounts.insert(account.id);
            Ok(())
        })
    }
}

#[async_trait]
impl CartRepository for InMemoryUnitOfWork {
    async fn find_by_account_id(&self, account_id: Uuid) -> Result<Option<Cart>, DomainError> {
        self.with_staged(|staged| {
            Ok(staged
                .tables
                .carts
                .values()
                .find(|cart| cart.account_id == account_id)
                .cloned())
        })
    }

    async fn insert(&self, cart: &Cart) -> Result<(), DomainError> {
        self.with_staged(|staged| {
            let carts = &mut staged.tables.carts;
            if carts.contains_key(&cart.id)
                || carts.values().any(|c| c.account_id == cart.account_id)
            {
                return Err(DomainError::Infrastructure(format!(
                    "duplicate cart for account {}",
                    cart.account_id
                )));
            }
            carts.insert(cart.id, cart.clone());
            staged.touched_carts.insert(cart.id);
            Ok(())
        })
    }

    async fn update(&self, cart: &Cart) -> Result<(), DomainError> {
        self.with_staged(|staged| {
            let base = staged.base_cart_versions.get(&cart.id).copied();
            let current = self
                .shared
                .committed
                .lock()
                .unwrap()
                .carts
                .get(&cart.id)
                .map(|committed| committed.version);
            if let (Some(expected), Some(actual)) = (base, current) {
                if expected != actual {
                    return Err(DomainError::ConcurrencyConflict {
                        aggregate_id: cart.id,
                        expected,
                        actual,
                    });
                }
            }
            let stored = staged
                .tables
                .carts
                .get_mut(&cart.id)
                .ok_or(DomainError::AggregateNotFound(cart.id))?;
            if stored.version != cart.version {
                return Err(DomainError::ConcurrencyConflict {
                    aggregate_id: cart.id,
                    expected: cart.version,
                    actual: stored.version,
                });
            }
            stored.lines.clone_from(&cart.lines);
            stored.version = cart.version + 1;
            staged.touched_carts.insert(cart.id);
            Ok(())
        })
    }
}

#[async_trait]
impl ProductRepository for InMemoryUnitOfWork {
    async fn find_by_ids(&self, product_ids: &[Uuid]) -> Result<Vec<Product>, DomainError> {
        self.with_staged(|staged| {
            Ok(product_ids
                .iter()
                .filter_map(|id| staged.tables.products.get(id).copied())
                .collect())
        })
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    fn accounts(&self) -> &dyn AccountRepository {
        self
    }

    fn carts(&self) -> &dyn CartRepository {
        self
    }

    fn products(&self) -> &dyn ProductRepository {
        self
    }

    async fn commit(&self) -> Result<(), DomainError> {
        let staged = self.take_staged()?;
        if self.shared.fail_on_commit.load(Ordering::SeqCst) {
            self.shared.rollbacks.fetch_add(1, Ordering::SeqCst);
            return Err(DomainError::Infrastructure("commit failed".to_owned()));
        }

        let mut committed = self.shared.committed.lock().unwrap();
        for cart_id in &staged.touched_carts {
            let base = staged.base_cart_versions.get(cart_id);
            let current = committed.carts.get(cart_id).map(|cart| cart.version);
            if let (Some(&expected), Some(actual)) = (base, current) {
                if expected != actual {
                    drop(committed);
                    self.shared.rollbacks.fetch_add(1, Ordering::SeqCst);
                    return Err(DomainError::ConcurrencyConflict {
                        aggregate_id: *cart_id,
                        expected,
                        actual,
                    });
                }
            }
        }
        for account_id in &staged.touched_accounts {
            if let Some(account) = staged.tables.accounts.get(account_id) {
                committed.accounts.insert(*account_id, account.clone());
            }
        }
        for cart_id in &staged.touched_carts {
            if let Some(cart) = staged.tables.carts.get(cart_id) {
                committed.carts.insert(*cart_id, cart.clone());
            }
        }
        drop(committed);

        self.shared.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(&self) -> Result<(), DomainError> {
        self.take_staged()?;
        self.shared.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
