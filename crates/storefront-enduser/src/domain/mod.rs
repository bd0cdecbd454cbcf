//! Domain layer for the end-user context.

pub mod account;
pub mod adapters;
pub mod cart;
pub mod commands;
pub mod events;
pub mod product;
pub mod repositories;
pub mod session;
pub mod session_account;
pub mod session_cart;
pub mod subscribers;
pub mod validation;
