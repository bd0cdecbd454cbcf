//! Storefront persistence.
//!
//! Accounts, carts and products live in `PostgreSQL` and are written through
//! a transactional unit of work. Login sessions and guest carts live in
//! Redis with store-managed expiry.

pub mod postgres;
pub mod redis_session_store;

/// Migrations for the `PostgreSQL` schema.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");
