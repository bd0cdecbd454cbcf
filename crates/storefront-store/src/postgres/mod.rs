//! `PostgreSQL` implementation of the end-user unit of work.
//!
//! A [`PgUnitOfWork`] owns one open transaction. Every repository it hands
//! out runs its statements on that transaction, so the activation write and
//! the subscriber writes it triggers commit together.

mod accounts;
mod carts;
mod products;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use storefront_core::error::DomainError;
use storefront_enduser::domain::repositories::{
    AccountRepository, CartRepository, ProductRepository, TransactionManager, UnitOfWork,
    UnitOfWorkHandle,
};
use tokio::sync::{Mutex, MutexGuard};

/// Opens `PostgreSQL` transactions.
#[derive(Debug, Clone)]
pub struct PgTransactionManager {
    pool: PgPool,
}

impl PgTransactionManager {
    /// Creates a new `PgTransactionManager`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionManager for PgTransactionManager {
    async fn begin(&self) -> Result<UnitOfWorkHandle, DomainError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin transaction", &e))?;
        Ok(Arc::new(PgUnitOfWork {
            tx: Mutex::new(Some(tx)),
        }))
    }
}

/// One open `PostgreSQL` transaction. Dropping it unfinished rolls back.
pub struct PgUnitOfWork {
    tx: Mutex<Option<Transaction<'static, Postgres>>>,
}

impl fmt::Debug for PgUnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgUnitOfWork").finish_non_exhaustive()
    }
}

type TxGuard<'a> = MutexGuard<'a, Option<Transaction<'static, Postgres>>>;

impl PgUnitOfWork {
    /// Locks the transaction for one statement.
    async fn open(&self) -> Result<TxGuard<'_>, DomainError> {
        let guard = self.tx.lock().await;
        if guard.is_none() {
            return Err(finished());
        }
        Ok(guard)
    }

    async fn take(&self) -> Result<Transaction<'static, Postgres>, DomainError> {
        self.tx.lock().await.take().ok_or_else(finished)
    }
}

/// Borrows the connection of a guard returned by [`PgUnitOfWork::open`].
fn conn<'a>(guard: &'a mut TxGuard<'_>) -> Result<&'a mut sqlx::PgConnection, DomainError> {
    guard.as_deref_mut().ok_or_else(finished)
}

fn finished() -> DomainError {
    DomainError::Infrastructure("transaction already finished".to_owned())
}

fn db_error(context: &str, err: &sqlx::Error) -> DomainError {
    DomainError::Infrastructure(format!("{context}: {err}"))
}

/// Counts are stored as `INTEGER`; a negative one is a corrupt row.
fn decode_count(value: i32) -> Result<u32, sqlx::Error> {
    u32::try_from(value).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
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
        self.take()
            .await?
            .commit()
            .await
            .map_err(|e| db_error("commit", &e))
    }

    async fn rollback(&self) -> Result<(), DomainError> {
        self.take()
            .await?
            .rollback()
            .await
            .map_err(|e| db_error("rollback", &e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_count_accepts_non_negative_values() {
        assert_eq!(decode_count(0).unwrap(), 0);
        assert_eq!(decode_count(42).unwrap(), 42);
    }

    #[test]
    fn test_negative_count_is_a_decode_error() {
        // Act
        let err = db_error("decode cart line", &decode_count(-1).unwrap_err());

        // Assert
        match err {
            DomainError::Infrastructure(msg) => assert!(msg.starts_with("decode cart line: ")),
            other => panic!("expected Infrastructure, got {other:?}"),
        }
    }
}
