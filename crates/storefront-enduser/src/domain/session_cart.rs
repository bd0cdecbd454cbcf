//! The guest cart kept against an anonymous browser session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::session::SessionId;

/// One product in a guest cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCartLine {
    /// The product.
    pub product_id: Uuid,
    /// Requested quantity.
    pub quantity: u32,
}

/// A guest cart. It has no version; it is superseded, never edited
/// concurrently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCart {
    /// Session identifier carried in the `SessionCartSessionID` cookie.
    pub session_id: SessionId,
    /// Requested products.
    pub lines: Vec<SessionCartLine>,
    /// When the store will drop the record.
    pub expires_at: DateTime<Utc>,
}

impl SessionCart {
    /// Returns `true` if the guest cart holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Distinct product ids referenced by the lines, in first-seen order.
    #[must_use]
    pub fn product_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            if !ids.contains(&line.product_id) {
                ids.push(line.product_id);
            }
        }
        ids
    }
}
