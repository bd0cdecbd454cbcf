//! Commands: requests to change state, handled by one use case each.

use uuid::Uuid;

/// A request handed to a use case. Handlers record both values on their
/// tracing span.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Dotted `context.action` name, e.g. `enduser.verify_email`.
    fn command_type(&self) -> &'static str;

    /// Correlation id shared by every log line of one request.
    fn correlation_id(&self) -> Uuid;
}
