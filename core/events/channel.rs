use super::event::Event;
use super::EventConsumer;
use crate::sync::Arc;
use crossbeam::deque::{Injector, Worker};

/// A multi-producer event bus. Cloning it is cheap and every clone publishes to the same bus.
///
#[derive(Clone, Debug, Default)]
pub struct EventChannel {
    bus: Arc<Injector<Event>>,
}

impl EventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.bus.is_empty()
    }

    pub fn send<E>(&self, event: E)
    where
        E: Into<Event>,
    {
        let event = event.into();
        tracing::trace!("event: {:?}", event);
        self.bus.push(event)
    }

    pub fn consumer(&self) -> EventConsumer {
        EventConsumer::new(self.bus.clone(), Worker::new_fifo())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::event::GraphEvent;
    use crate::model::{ItemKind, Label};

    #[test]
    fn new_event_channel_is_empty() {
        let ec = EventChannel::new();
        assert!(ec.is_empty());
        assert!(ec.consumer().is_empty());
    }

    #[quickcheck]
    fn event_consumer_needs_to_fetch_to_get_messages(event: Event) {
        let ec = EventChannel::new();
        let c = ec.consumer();
        ec.send(event);
        assert!(c.pop().is_none());
        c.fetch();
        assert!(c.pop().is_some());
    }

    #[quickcheck]
    fn events_are_drained_in_the_order_they_are_sent(events: Vec<Event>) {
        let ec = EventChannel::new();
        let c = ec.consumer();

        for event in &events {
            ec.send(event.clone());
        }

        assert_eq!(c.drain(), events);
        assert!(ec.is_empty());
        assert!(c.pop().is_none());
    }

    #[test]
    fn clones_publish_to_the_same_bus() {
        let ec = EventChannel::new();
        let c = ec.consumer();
        let label: Label = "//a:a".parse().unwrap();

        ec.clone().send(GraphEvent::ItemResolved {
            label: label.clone(),
            kind: ItemKind::Target,
        });

        assert_matches!(
            c.drain().as_slice(),
            [Event::GraphEvent(GraphEvent::ItemResolved { label: l, .. })] if *l == label
        );
    }
}
