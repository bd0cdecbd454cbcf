//! Domain event abstractions.

/// Trait that all domain events implement.
///
/// Events are immutable facts. A bounded context models its events as one
/// closed enum whose variants carry their own payloads; the name returned
/// here is the routing key used by the publisher.
pub trait DomainEvent: Send + Sync + std::fmt::Debug {
    /// Returns the event name used for subscriber routing.
    fn name(&self) -> &'static str;
}
