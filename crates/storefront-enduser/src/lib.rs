//! Storefront: End-user bounded context.
//!
//! Responsible for account registration and activation, login sessions,
//! guest (session) carts and the account cart they are reconciled into.
//! Side effects of account and session state changes are declared as
//! domain events and executed by subscribers.

pub mod application;
pub mod domain;
