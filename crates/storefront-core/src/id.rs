//! Identifier generation abstraction for determinism.
//!
//! In production, this produces random UUIDs. In tests, a sequential
//! implementation is injected so that identifiers are predictable.

use uuid::Uuid;

/// Abstraction over unique identifier generation.
pub trait IdGenerator: Send + Sync {
    /// Returns a new, unique identifier.
    fn next_id(&self) -> Uuid;
}

/// Production generator backed by random (v4) UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}
