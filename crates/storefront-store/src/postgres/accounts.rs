//! Account rows.

use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use storefront_core::error::DomainError;
use storefront_enduser::domain::account::{Account, AuthType};
use storefront_enduser::domain::repositories::AccountRepository;
use uuid::Uuid;

use super::{PgUnitOfWork, conn, db_error};

const SELECT_ACCOUNT: &str = r"
SELECT id, email, password_digest, auth_type, external_account_id,
       is_active, payment_customer_id, review_nickname
FROM accounts
";

fn account_from_row(row: &PgRow) -> Result<Account, sqlx::Error> {
    let auth_code: i16 = row.try_get("auth_type")?;
    let auth_type =
        AuthType::from_code(auth_code).map_err(|e| sqlx::Error::Decode(e.to_string().into()))?;
    let mut account = Account::restored(row.try_get("id")?, row.try_get("email")?, auth_type);
    account.password_digest = row.try_get("password_digest")?;
    account.external_account_id = row.try_get("external_account_id")?;
    account.is_active = row.try_get("is_active")?;
    account.payment_customer_id = row.try_get("payment_customer_id")?;
    account.review_nickname = row.try_get("review_nickname")?;
    Ok(account)
}

#[async_trait]
impl AccountRepository for PgUnitOfWork {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        let mut guard = self.open().await?;
        let row = sqlx::query(&format!("{SELECT_ACCOUNT} WHERE email = $1"))
            .bind(email)
            .fetch_optional(conn(&mut guard)?)
            .await
            .map_err(|e| db_error("find account by email", &e))?;
        row.as_ref()
            .map(account_from_row)
            .transpose()
            .map_err(|e| db_error("decode account", &e))
    }

    async fn find_by_id(&self, account_id: Uuid) -> Result<Option<Account>, DomainError> {
        let mut guard = self.open().await?;
        let row = sqlx::query(&format!("{SELECT_ACCOUNT} WHERE id = $1"))
            .bind(account_id)
            .fetch_optional(conn(&mut guard)?)
            .await
            .map_err(|e| db_error("find account by id", &e))?;
        row.as_ref()
            .map(account_from_row)
            .transpose()
            .map_err(|e| db_error("decode account", &e))
    }

    async fn insert(&self, account: &Account) -> Result<(), DomainError> {
        let mut guard = self.open().await?;
        sqlx::query(
            r"
            INSERT INTO accounts
                (id, email, password_digest, auth_type, external_account_id,
                 is_active, payment_customer_id, review_nickname)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(account.id)
        .bind(&account.email)
        .bind(&account.password_digest)
        .bind(account.auth_type.code())
        .bind(&account.external_account_id)
        .bind(account.is_active)
        .bind(&account.payment_customer_id)
        .bind(&account.review_nickname)
        .execute(conn(&mut guard)?)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return DomainError::validation("email address is already in use");
                }
            }
            db_error("insert account", &e)
        })?;
        Ok(())
    }

    async fn update(&self, account: &Account) -> Result<(), DomainError> {
        let mut guard = self.open().await?;
        let result = sqlx::query(
            r"
            UPDATE accounts
            SET email = $2, password_digest = $3, auth_type = $4,
                external_account_id = $5, is_active = $6,
                payment_customer_id = $7, review_nickname = $8,
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(account.id)
        .bind(&account.email)
        .bind(&account.password_digest)
        .bind(account.auth_type.code())
        .bind(&account.external_account_id)
        .bind(account.is_active)
        .bind(&account.payment_customer_id)
        .bind(&account.review_nickname)
        .execute(conn(&mut guard)?)
        .await
        .map_err(|e| db_error("update account", &e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::AggregateNotFound(account.id));
        }
        Ok(())
    }
}
