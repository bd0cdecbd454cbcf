//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An event was published with no subscriber registered for its name.
    /// This is a wiring defect and must never be swallowed.
    #[error("no subscriber registered for event {event_name}")]
    NoSubscriber {
        /// The routing name of the unhandled event.
        event_name: &'static str,
    },

    /// Input failed validation. Carries user-facing messages.
    #[error("validation error: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// A business rule rejected the request (expired token, credential
    /// mismatch, already-active account). Carries user-facing messages.
    #[error("rejected: {}", .0.join(", "))]
    Rejected(Vec<String>),

    /// The caller is not logged in.
    #[error("login required")]
    LoginRequired,

    /// An aggregate was not found.
    #[error("aggregate not found: {0}")]
    AggregateNotFound(Uuid),

    /// Optimistic concurrency conflict.
    #[error(
        "concurrency conflict on aggregate {aggregate_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        /// The aggregate that had the conflict.
        aggregate_id: Uuid,
        /// The expected version.
        expected: i64,
        /// The actual version found.
        actual: i64,
    },

    /// A related aggregate that must exist is missing.
    #[error("inconsistency: {0}")]
    Inconsistency(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Builds a validation error from a single message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(vec![message.into()])
    }

    /// Builds a rejection from a single message.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(vec![message.into()])
    }

    /// Returns the messages that may be shown to the end user. Defects and
    /// infrastructure failures have none.
    #[must_use]
    pub fn user_messages(&self) -> Vec<String> {
        match self {
            Self::Validation(messages) | Self::Rejected(messages) => messages.clone(),
            Self::LoginRequired => vec!["please log in".to_owned()],
            Self::ConcurrencyConflict { .. } => {
                vec!["the data was updated by another request; please try again".to_owned()]
            }
            Self::NoSubscriber { .. }
            | Self::AggregateNotFound(_)
            | Self::Inconsistency(_)
            | Self::Infrastructure(_) => Vec::new(),
        }
    }

    /// Returns `true` for optimistic-lock conflicts.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ConcurrencyConflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_exposes_validation_messages() {
        let err = DomainError::Validation(vec!["a".into(), "b".into()]);
        assert_eq!(err.user_messages(), vec!["a".to_owned(), "b".to_owned()]);
        assert_eq!(err.to_string(), "validation error: a, b");
    }

    #[test]
    fn test_user_messages_hides_defect_details() {
        let err = DomainError::Inconsistency("cart missing for account".into());
        assert!(err.user_messages().is_empty());
    }

    #[test]
    fn test_is_conflict() {
        let err = DomainError::ConcurrencyConflict {
            aggregate_id: Uuid::new_v4(),
            expected: 1,
            actual: 2,
        };
        assert!(err.is_conflict());
        assert!(!DomainError::LoginRequired.is_conflict());
    }
}
