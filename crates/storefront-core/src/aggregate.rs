//! Aggregate root abstraction.

use crate::event::DomainEvent;

/// Trait for aggregate roots that raise domain events as a byproduct of
/// their state transitions.
///
/// Events are appended to an owned pending list by the aggregate's own
/// methods and are never published by the aggregate itself. The code that
/// persists the aggregate drains the list with [`AggregateRoot::clear_events`]
/// and hands the batch to a publisher.
pub trait AggregateRoot: Send + Sync {
    /// The event type this aggregate raises.
    type Event: DomainEvent;

    /// Returns the events raised since the last drain, in the order raised.
    fn pending_events(&self) -> &[Self::Event];

    /// Drains the pending events, leaving the aggregate with an empty list.
    ///
    /// A second call in a row returns an empty list, so the same event can
    /// never be handed to a publisher twice.
    fn clear_events(&mut self) -> Vec<Self::Event>;
}
