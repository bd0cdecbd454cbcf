//! In-process, synchronous domain event publisher.
//!
//! The publisher is a registry mapping an event name to the ordered list of
//! subscribers registered for it. `publish` walks a batch of events in the
//! order they were raised and awaits each subscriber inline, so every side
//! effect has completed (or failed) before the caller continues. There is no
//! queue, no retry and no cross-process delivery.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::DomainError;
use crate::event::DomainEvent;

/// A handler bound to one or more event names.
#[async_trait]
pub trait EventSubscriber<E: DomainEvent>: Send + Sync {
    /// Name of the subscriber, used in logs.
    fn name(&self) -> &'static str;

    /// The event names this subscriber wants to receive.
    fn target_events(&self) -> &'static [&'static str];

    /// Handles a single event.
    ///
    /// # Errors
    ///
    /// Any error aborts the surrounding `publish` call and is returned to
    /// its caller unchanged.
    async fn handle(&self, event: &E) -> Result<(), DomainError>;
}

/// Routes events to the subscribers registered for their names.
///
/// Build it once at startup with [`DomainEventPublisher::register`], then
/// share it behind an `Arc`; publishing only needs `&self`.
pub struct DomainEventPublisher<E: DomainEvent> {
    subscribers: HashMap<&'static str, Vec<Arc<dyn EventSubscriber<E>>>>,
}

impl<E: DomainEvent> DomainEventPublisher<E> {
    /// Creates a publisher with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: HashMap::new(),
        }
    }

    /// Registers `subscriber` against each of `event_names`. Subscribers for
    /// the same name are invoked in registration order.
    pub fn subscribe(
        &mut self,
        event_names: &[&'static str],
        subscriber: &Arc<dyn EventSubscriber<E>>,
    ) {
        for &name in event_names {
            tracing::debug!(
                event = name,
                subscriber = subscriber.name(),
                "registering subscriber"
            );
            self.subscribers
                .entry(name)
                .or_default()
                .push(Arc::clone(subscriber));
        }
    }

    /// Registers `subscriber` against the events it declares in
    /// [`EventSubscriber::target_events`].
    pub fn register(&mut self, subscriber: Arc<dyn EventSubscriber<E>>) -> &mut Self {
        self.subscribe(subscriber.target_events(), &subscriber);
        self
    }

    /// Returns the number of subscribers registered for `event_name`.
    #[must_use]
    pub fn subscriber_count(&self, event_name: &str) -> usize {
        self.subscribers.get(event_name).map_or(0, Vec::len)
    }

    /// Delivers `events`, in order, to every subscriber registered for each
    /// event's name. Ownership of the events ends with this call.
    ///
    /// The whole batch is routed before anything is delivered, so a batch
    /// containing an unrouted event invokes no subscriber at all.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NoSubscriber` if any event has no subscriber.
    /// Returns the first subscriber error; later subscribers and later events
    /// are not invoked.
    pub async fn publish(&self, events: Vec<E>) -> Result<(), DomainError> {
        let mut routed = Vec::with_capacity(events.len());
        for event in events {
            let Some(subscribers) = self.subscribers.get(event.name()) else {
                tracing::error!(event = event.name(), "no subscriber registered for event");
                return Err(DomainError::NoSubscriber {
                    event_name: event.name(),
                });
            };
            routed.push((event, subscribers));
        }

        for (event, subscribers) in routed {
            for subscriber in subscribers {
                tracing::debug!(
                    event = event.name(),
                    subscriber = subscriber.name(),
                    "dispatching event"
                );
                if let Err(err) = subscriber.handle(&event).await {
                    tracing::error!(
                        event = event.name(),
                        subscriber = subscriber.name(),
                        error = %err,
                        "subscriber failed"
                    );
                    return Err(err);
                }
            }
        }

        Ok(())
    }
}

impl<E: DomainEvent> Default for DomainEventPublisher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: DomainEvent> fmt::Debug for DomainEventPublisher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, subscribers) in &self.subscribers {
            let names: Vec<&'static str> = subscribers.iter().map(|s| s.name()).collect();
            map.entry(name, &names);
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug)]
    enum TestEvent {
        Created(u32),
        Activated(u32),
        Orphan,
    }

    impl DomainEvent for TestEvent {
        fn name(&self) -> &'static str {
            match self {
                Self::Created(_) => "test.created",
                Self::Activated(_) => "test.activated",
                Self::Orphan => "test.orphan",
            }
        }
    }

    type Log = Arc<Mutex<Vec<String>>>;

    struct RecordingSubscriber {
        name: &'static str,
        targets: &'static [&'static str],
        log: Log,
        fail: bool,
    }

    #[async_trait]
    impl EventSubscriber<TestEvent> for RecordingSubscriber {
        fn name(&self) -> &'static str {
            self.name
        }

        fn target_events(&self) -> &'static [&'static str] {
            self.targets
        }

        async fn handle(&self, event: &TestEvent) -> Result<(), DomainError> {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:{event:?}", self.name));
            if self.fail {
                return Err(DomainError::Infrastructure(format!("{} failed", self.name)));
            }
            Ok(())
        }
    }

    fn subscriber(
        name: &'static str,
        targets: &'static [&'static str],
        log: &Log,
        fail: bool,
    ) -> Arc<dyn EventSubscriber<TestEvent>> {
        Arc::new(RecordingSubscriber {
            name,
            targets,
            log: Arc::clone(log),
            fail,
        })
    }

    #[tokio::test]
    async fn test_publish_invokes_each_registered_subscriber_exactly_once() {
        // Arrange
        let log: Log = Arc::default();
        let mut publisher = DomainEventPublisher::new();
        publisher.register(subscriber("a", &["test.created"], &log, false));
        publisher.register(subscriber("b", &["test.activated"], &log, false));

        // Act
        publisher
            .publish(vec![TestEvent::Created(1)])
            .await
            .unwrap();

        // Assert
        assert_eq!(*log.lock().unwrap(), vec!["a:Created(1)".to_owned()]);
    }

    #[tokio::test]
    async fn test_publish_delivers_in_registration_and_event_order() {
        // Arrange
        let log: Log = Arc::default();
        let mut publisher = DomainEventPublisher::new();
        publisher
            .register(subscriber("first", &["test.created", "test.activated"], &log, false))
            .register(subscriber("second", &["test.created"], &log, false));

        // Act
        publisher
            .publish(vec![TestEvent::Created(1), TestEvent::Activated(2)])
            .await
            .unwrap();

        // Assert
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "first:Created(1)".to_owned(),
                "second:Created(1)".to_owned(),
                "first:Activated(2)".to_owned(),
            ]
        );
    }

    #[tokio::test]
    async fn test_publish_without_subscriber_fails_and_invokes_nothing() {
        // Arrange
        let log: Log = Arc::default();
        let mut publisher = DomainEventPublisher::new();
        publisher.register(subscriber("a", &["test.created"], &log, false));

        // Act
        let result = publisher
            .publish(vec![TestEvent::Created(1), TestEvent::Orphan])
            .await;

        // Assert
        match result.unwrap_err() {
            DomainError::NoSubscriber { event_name } => assert_eq!(event_name, "test.orphan"),
            other => panic!("expected NoSubscriber, got {other:?}"),
        }
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_publish_stops_at_first_failing_subscriber() {
        // Arrange
        let log: Log = Arc::default();
        let mut publisher = DomainEventPublisher::new();
        publisher
            .register(subscriber("ok", &["test.created"], &log, false))
            .register(subscriber("broken", &["test.created"], &log, true))
            .register(subscriber("never", &["test.created", "test.activated"], &log, false));

        // Act
        let result = publisher
            .publish(vec![TestEvent::Created(1), TestEvent::Activated(2)])
            .await;

        // Assert
        match result.unwrap_err() {
            DomainError::Infrastructure(msg) => assert_eq!(msg, "broken failed"),
            other => panic!("expected Infrastructure, got {other:?}"),
        }
        assert_eq!(
            *log.lock().unwrap(),
            vec!["ok:Created(1)".to_owned(), "broken:Created(1)".to_owned()]
        );
    }

    #[tokio::test]
    async fn test_publish_empty_batch_is_a_no_op() {
        let publisher: DomainEventPublisher<TestEvent> = DomainEventPublisher::new();
        publisher.publish(Vec::new()).await.unwrap();
    }

    #[test]
    fn test_subscriber_count_tracks_registrations() {
        let log: Log = Arc::default();
        let mut publisher = DomainEventPublisher::new();
        publisher
            .register(subscriber("a", &["test.created"], &log, false))
            .register(subscriber("b", &["test.created", "test.activated"], &log, false));

        assert_eq!(publisher.subscriber_count("test.created"), 2);
        assert_eq!(publisher.subscriber_count("test.activated"), 1);
        assert_eq!(publisher.subscriber_count("test.orphan"), 0);
    }
}
