//! Storefront Core: shared domain abstractions.
//!
//! This crate defines the fundamental traits and types that the bounded
//! contexts depend on: domain events and their in-process publisher,
//! aggregates with pending events, commands, clocks and identifier
//! generation. It contains no infrastructure code.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod id;
pub mod publisher;
