//! Product projection rows.

use async_trait::async_trait;
use sqlx::Row;
use storefront_core::error::DomainError;
use storefront_enduser::domain::product::{Product, ProductStatus};
use storefront_enduser::domain::repositories::ProductRepository;
use uuid::Uuid;

use super::{PgUnitOfWork, conn, db_error, decode_count};

#[async_trait]
impl ProductRepository for PgUnitOfWork {
    async fn find_by_ids(&self, product_ids: &[Uuid]) -> Result<Vec<Product>, DomainError> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut guard = self.open().await?;
        let rows = sqlx::query("SELECT id, status, stock_count FROM products WHERE id = ANY($1)")
            .bind(product_ids)
            .fetch_all(conn(&mut guard)?)
            .await
            .map_err(|e| db_error("find products", &e))?;

        rows.iter()
            .map(|row| {
                let status: i16 = row
                    .try_get("status")
                    .map_err(|e| db_error("decode product", &e))?;
                let stock: i32 = row
                    .try_get("stock_count")
                    .map_err(|e| db_error("decode product", &e))?;
                Ok(Product {
                    id: row.try_get("id").map_err(|e| db_error("decode product", &e))?,
                    status: ProductStatus::from_code(status)?,
                    stock_count: decode_count(stock)
                        .map_err(|e| db_error("decode product", &e))?,
                })
            })
            .collect()
    }
}
