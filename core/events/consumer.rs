use super::event::Event;
use crate::sync::Arc;
use crossbeam::deque::{Injector, Steal, Worker};

pub struct EventConsumer {
    channel: Arc<Injector<Event>>,
    queue: Worker<Event>,
}

impl EventConsumer {
    pub fn new(channel: Arc<Injector<Event>>, queue: Worker<Event>) -> Self {
        Self { channel, queue }
    }

    pub fn fetch(&self) {
        let _steal = self.channel.steal_batch(&self.queue);
    }

    pub fn pop(&self) -> Option<Event> {
        self.queue.pop()
    }

    /// Takes every event currently on the bus, in the order they were sent.
    pub fn drain(&self) -> Vec<Event> {
        let mut events = vec![];
        loop {
            while let Some(event) = self.queue.pop() {
                events.push(event);
            }
            match self.channel.steal_batch(&self.queue) {
                Steal::Empty => return events,
                Steal::Success(_) | Steal::Retry => continue,
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        let _steal = self.channel.steal_batch(&self.queue);
        self.queue.is_empty()
    }
}

impl Iterator for &EventConsumer {
    type Item = Event;

    fn next(&mut self) -> Option<Self::Item> {
        self.pop()
    }
}
