//! Cart rows, guarded by an optimistic version check.

use async_trait::async_trait;
use sqlx::{PgConnection, Row};
use storefront_core::error::DomainError;
use storefront_enduser::domain::cart::{Cart, CartLine};
use storefront_enduser::domain::repositories::CartRepository;
use uuid::Uuid;

use super::{PgUnitOfWork, conn, db_error, decode_count};

async fn replace_lines(
    connection: &mut PgConnection,
    cart_id: Uuid,
    lines: &[CartLine],
) -> Result<(), DomainError> {
    sqlx::query("DELETE FROM cart_lines WHERE cart_id = $1")
        .bind(cart_id)
        .execute(&mut *connection)
        .await
        .map_err(|e| db_error("clear cart lines", &e))?;

    if lines.is_empty() {
        return Ok(());
    }
    let product_ids: Vec<Uuid> = lines.iter().map(|line| line.product_id).collect();
    let quantities = lines
        .iter()
        .map(|line| {
            i32::try_from(line.quantity).map_err(|_| {
                DomainError::validation(format!("quantity {} is too large", line.quantity))
            })
        })
        .collect::<Result<Vec<i32>, DomainError>>()?;

    sqlx::query(
        r"
        INSERT INTO cart_lines (cart_id, product_id, quantity)
        SELECT $1, product_id, quantity
        FROM UNNEST($2::uuid[], $3::int4[]) AS line (product_id, quantity)
        ",
    )
    .bind(cart_id)
    .bind(product_ids)
    .bind(quantities)
    .execute(&mut *connection)
    .await
    .map_err(|e| db_error("insert cart lines", &e))?;
    Ok(())
}

#[async_trait]
impl CartRepository for PgUnitOfWork {
    async fn find_by_account_id(&self, account_id: Uuid) -> Result<Option<Cart>, DomainError> {
        let mut guard = self.open().await?;
        let connection = conn(&mut guard)?;

        let Some(row) = sqlx::query("SELECT id, version FROM carts WHERE account_id = $1")
            .bind(account_id)
            .fetch_optional(&mut *connection)
            .await
            .map_err(|e| db_error("find cart", &e))?
        else {
            return Ok(None);
        };
        let cart_id: Uuid = row.try_get("id").map_err(|e| db_error("decode cart", &e))?;
        let version: i64 = row
            .try_get("version")
            .map_err(|e| db_error("decode cart", &e))?;

        let lines = sqlx::query(
            "SELECT product_id, quantity FROM cart_lines WHERE cart_id = $1 ORDER BY product_id",
        )
        .bind(cart_id)
        .fetch_all(&mut *connection)
        .await
        .map_err(|e| db_error("load cart lines", &e))?
        .iter()
        .map(|line| {
            let quantity: i32 = line.try_get("quantity")?;
            Ok(CartLine {
                product_id: line.try_get("product_id")?,
                quantity: decode_count(quantity)?,
            })
        })
        .collect::<Result<Vec<CartLine>, sqlx::Error>>()
        .map_err(|e| db_error("decode cart line", &e))?;

        Ok(Some(Cart {
            id: cart_id,
            account_id,
            version,
            lines,
        }))
    }

    async fn insert(&self, cart: &Cart) -> Result<(), DomainError> {
        let mut guard = self.open().await?;
        let connection = conn(&mut guard)?;
        sqlx::query("INSERT INTO carts (id, account_id, version) VALUES ($1, $2, $3)")
            .bind(cart.id)
            .bind(cart.account_id)
            .bind(cart.version)
            .execute(&mut *connection)
            .await
            .map_err(|e| db_error("insert cart", &e))?;
        replace_lines(connection, cart.id, &cart.lines).await
    }

    async fn update(&self, cart: &Cart) -> Result<(), DomainError> {
        let mut guard = self.open().await?;
        let connection = conn(&mut guard)?;

        let bumped = sqlx::query(
            "UPDATE carts SET version = version + 1 WHERE id = $1 AND version = $2",
        )
        .bind(cart.id)
        .bind(cart.version)
        .execute(&mut *connection)
        .await
        .map_err(|e| db_error("update cart", &e))?;

        if bumped.rows_affected() == 0 {
            let actual: Option<i64> = sqlx::query_scalar("SELECT version FROM carts WHERE id = $1")
                .bind(cart.id)
                .fetch_optional(&mut *connection)
                .await
                .map_err(|e| db_error("read cart version", &e))?;
            return Err(match actual {
                Some(actual) => DomainError::ConcurrencyConflict {
                    aggregate_id: cart.id,
                    expected: cart.version,
                    actual,
                },
                None => DomainError::AggregateNotFound(cart.id),
            });
        }

        replace_lines(connection, cart.id, &cart.lines).await
    }
}
