//! Query handlers for the end-user context.

use serde::Serialize;
use storefront_core::error::DomainError;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::cart::CartLine;
use crate::domain::repositories::TransactionManager;

/// Read model of an account cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    /// Cart identifier.
    pub cart_id: Uuid,
    /// Owning account.
    pub account_id: Uuid,
    /// Optimistic concurrency version.
    pub version: i64,
    /// Lines, sorted by product id.
    pub lines: Vec<CartLine>,
}

/// Returns the cart of `account_id`.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if the account has no cart.
#[instrument(skip(transactions))]
pub async fn get_cart_for_account(
    account_id: Uuid,
    transactions: &dyn TransactionManager,
) -> Result<CartView, DomainError> {
    let unit_of_work = transactions.begin().await?;
    let found = unit_of_work.carts().find_by_account_id(account_id).await;
    // Read-only: nothing to commit.
    if let Err(err) = unit_of_work.rollback().await {
        tracing::warn!(error = %err, "closing read transaction failed");
    }

    let cart = found?.ok_or(DomainError::AggregateNotFound(account_id))?;
    let mut lines = cart.lines;
    lines.sort_by_key(|line| line.product_id);

    Ok(CartView {
        cart_id: cart.id,
        account_id: cart.account_id,
        version: cart.version,
        lines,
    })
}
