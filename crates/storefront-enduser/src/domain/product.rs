//! Read projection of a catalog product.

use storefront_core::error::DomainError;
use uuid::Uuid;

/// Sales status of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductStatus {
    /// Can be added to carts and bought.
    OnSale,
    /// Temporarily withdrawn.
    SalesSuspended,
    /// Discontinued.
    SalesEnded,
}

impl ProductStatus {
    /// Storage code of the status.
    #[must_use]
    pub fn code(self) -> i16 {
        match self {
            Self::OnSale => 1,
            Self::SalesSuspended => 2,
            Self::SalesEnded => 3,
        }
    }

    /// Parses a storage code.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` for an unknown code.
    pub fn from_code(code: i16) -> Result<Self, DomainError> {
        match code {
            1 => Ok(Self::OnSale),
            2 => Ok(Self::SalesSuspended),
            3 => Ok(Self::SalesEnded),
            other => Err(DomainError::Infrastructure(format!(
                "unknown product status code {other}"
            ))),
        }
    }
}

/// The parts of a product the end-user context reads. Never mutated here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
    /// Product identifier.
    pub id: Uuid,
    /// Current sales status.
    pub status: ProductStatus,
    /// Units currently in stock.
    pub stock_count: u32,
}

impl Product {
    /// Returns `true` if the product can be put in a cart.
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        self.status == ProductStatus::OnSale
    }
}
