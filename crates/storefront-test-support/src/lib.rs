//! Shared test doubles and utilities for the storefront backend.

mod adapters;
mod clock;
mod database;
mod ids;
mod session_store;

pub use adapters::{
    FakePaymentGateway, FakeTokenSigner, PlainPasswordHasher, RecordingMailSender, SentMail,
};
pub use clock::FixedClock;
pub use database::InMemoryDatabase;
pub use ids::SequentialIds;
pub use session_store::InMemorySessionStore;
