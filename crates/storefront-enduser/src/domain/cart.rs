//! The account cart aggregate and the guest cart merge.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::product::Product;
use super::session_cart::SessionCart;

/// Version of a freshly created cart.
pub const INITIAL_CART_VERSION: i64 = 1;

/// One product in an account cart. A cart holds at most one line per
/// product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// The product.
    pub product_id: Uuid,
    /// Quantity in the cart.
    pub quantity: u32,
}

/// The cart owned by an active account.
///
/// `version` is the optimistic concurrency token: it is the version the cart
/// was loaded at, and a successful update stores `version + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Owning account.
    pub account_id: Uuid,
    /// Version the cart was loaded at.
    pub version: i64,
    /// Cart contents.
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Creates the empty cart of a newly activated account.
    #[must_use]
    pub fn create(id: Uuid, account_id: Uuid) -> Self {
        Self {
            id,
            account_id,
            version: INITIAL_CART_VERSION,
            lines: Vec::new(),
        }
    }

    /// Folds `guest` into this cart using [`merge_guest_cart`].
    pub fn merge_guest_cart(&mut self, guest: &SessionCart, products: &[Product]) {
        self.lines = merge_guest_cart(&self.lines, guest, products);
    }

    /// Quantity of `product_id` in the cart, zero when absent.
    #[must_use]
    pub fn quantity_of(&self, product_id: Uuid) -> u32 {
        self.lines
            .iter()
            .find(|line| line.product_id == product_id)
            .map_or(0, |line| line.quantity)
    }
}

/// Merges the lines of a guest cart into an account cart's lines.
///
/// For each guest line: a product missing from `products` or not on sale is
/// skipped; otherwise `min(requested, stock)` units are transferred, adding
/// to an existing line for the product or appending a new one. Nothing is
/// transferred when stock is zero. Stock is only read, never reserved.
#[must_use]
pub fn merge_guest_cart(
    account_lines: &[CartLine],
    guest: &SessionCart,
    products: &[Product],
) -> Vec<CartLine> {
    let catalog: HashMap<Uuid, &Product> = products.iter().map(|p| (p.id, p)).collect();
    let mut merged = account_lines.to_vec();

    for guest_line in &guest.lines {
        let Some(product) = catalog.get(&guest_line.product_id) else {
            tracing::warn!(
                product_id = %guest_line.product_id,
                "skipping unknown product in guest cart"
            );
            continue;
        };
        if !product.is_on_sale() {
            tracing::warn!(
                product_id = %product.id,
                status = ?product.status,
                "skipping product not on sale"
            );
            continue;
        }
        let take = guest_line.quantity.min(product.stock_count);
        if take == 0 {
            continue;
        }
        match merged
            .iter_mut()
            .find(|line| line.product_id == guest_line.product_id)
        {
            Some(line) => line.quantity = line.quantity.saturating_add(take),
            None => merged.push(CartLine {
                product_id: guest_line.product_id,
                quantity: take,
            }),
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::product::ProductStatus;
    use crate::domain::session::SessionId;
    use crate::domain::session_cart::SessionCartLine;

    const P1: Uuid = Uuid::from_u128(1);
    const P2: Uuid = Uuid::from_u128(2);
    const P3: Uuid = Uuid::from_u128(3);

    fn line(product_id: Uuid, quantity: u32) -> CartLine {
        CartLine {
            product_id,
            quantity,
        }
    }

    fn guest(lines: &[(Uuid, u32)]) -> SessionCart {
        SessionCart {
            session_id: SessionId::new("guest"),
            lines: lines
                .iter()
                .map(|&(product_id, quantity)| SessionCartLine {
                    product_id,
                    quantity,
                })
                .collect(),
            expires_at: Utc::now(),
        }
    }

    fn product(id: Uuid, status: ProductStatus, stock_count: u32) -> Product {
        Product {
            id,
            status,
            stock_count,
        }
    }

    #[test]
    fn test_merge_adds_full_quantity_when_stock_suffices() {
        // Arrange
        let products = [product(P1, ProductStatus::OnSale, 10)];

        // Act
        let merged = merge_guest_cart(&[], &guest(&[(P1, 5)]), &products);

        // Assert
        assert_eq!(merged, vec![line(P1, 5)]);
    }

    #[test]
    fn test_merge_caps_quantity_at_stock() {
        let products = [product(P1, ProductStatus::OnSale, 3)];

        let merged = merge_guest_cart(&[], &guest(&[(P1, 5)]), &products);

        assert_eq!(merged, vec![line(P1, 3)]);
    }

    #[test]
    fn test_merge_increments_existing_line_by_capped_quantity() {
        let products = [product(P1, ProductStatus::OnSale, 3)];

        let merged = merge_guest_cart(&[line(P1, 2)], &guest(&[(P1, 5)]), &products);

        assert_eq!(merged, vec![line(P1, 5)]);
    }

    #[test]
    fn test_merge_skips_products_not_on_sale() {
        let products = [
            product(P1, ProductStatus::SalesSuspended, 100),
            product(P2, ProductStatus::SalesEnded, 100),
        ];

        let merged = merge_guest_cart(
            &[line(P2, 1)],
            &guest(&[(P1, 5), (P2, 5)]),
            &products,
        );

        assert_eq!(merged, vec![line(P2, 1)]);
    }

    #[test]
    fn test_merge_skips_out_of_stock_products() {
        let products = [product(P1, ProductStatus::OnSale, 0)];

        let merged = merge_guest_cart(&[], &guest(&[(P1, 5)]), &products);

        assert!(merged.is_empty());
    }

    #[test]
    fn test_merge_skips_unknown_products() {
        let products = [product(P1, ProductStatus::OnSale, 10)];

        let merged = merge_guest_cart(&[line(P1, 1)], &guest(&[(P3, 2)]), &products);

        assert_eq!(merged, vec![line(P1, 1)]);
    }

    #[test]
    fn test_merge_keeps_unrelated_account_lines() {
        // Arrange
        let products = [
            product(P1, ProductStatus::OnSale, 10),
            product(P2, ProductStatus::OnSale, 10),
        ];
        let account_lines = [line(P3, 7), line(P1, 1)];

        // Act
        let merged = merge_guest_cart(&account_lines, &guest(&[(P1, 2), (P2, 4)]), &products);

        // Assert
        assert_eq!(merged, vec![line(P3, 7), line(P1, 3), line(P2, 4)]);
    }

    #[test]
    fn test_merge_result_does_not_depend_on_guest_line_order() {
        // Arrange
        let products = [
            product(P1, ProductStatus::OnSale, 2),
            product(P2, ProductStatus::OnSale, 10),
            product(P3, ProductStatus::SalesSuspended, 10),
        ];
        let account_lines = [line(P2, 1)];

        // Act
        let mut forward = merge_guest_cart(
            &account_lines,
            &guest(&[(P1, 5), (P2, 3), (P3, 1)]),
            &products,
        );
        let mut backward = merge_guest_cart(
            &account_lines,
            &guest(&[(P3, 1), (P2, 3), (P1, 5)]),
            &products,
        );

        // Assert
        forward.sort_by_key(|l| l.product_id);
        backward.sort_by_key(|l| l.product_id);
        assert_eq!(forward, backward);
        assert_eq!(forward, vec![line(P1, 2), line(P2, 4)]);
    }

    #[test]
    fn test_merge_never_duplicates_a_product_line() {
        let products = [product(P1, ProductStatus::OnSale, 10)];

        let merged = merge_guest_cart(&[], &guest(&[(P1, 2), (P1, 3)]), &products);

        assert_eq!(merged, vec![line(P1, 5)]);
    }

    #[test]
    fn test_cart_merge_guest_cart_updates_lines_in_place() {
        // Arrange
        let mut cart = Cart::create(Uuid::from_u128(10), Uuid::from_u128(20));
        let products = [product(P1, ProductStatus::OnSale, 10)];

        // Act
        cart.merge_guest_cart(&guest(&[(P1, 4)]), &products);

        // Assert
        assert_eq!(cart.quantity_of(P1), 4);
        assert_eq!(cart.quantity_of(P2), 0);
        assert_eq!(cart.version, INITIAL_CART_VERSION);
    }
}
