//! Application layer for the end-user context.

pub mod command_handlers;
pub mod query_handlers;
pub mod services;
pub mod session_reconciliation;
pub mod wiring;
