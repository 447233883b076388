//! Typed fan-out of domain events to external collaborators.
//!
//! Collaborators subscribe when they are constructed and either call
//! [`EventBus::unsubscribe`] on teardown or simply drop their
//! [`Subscription`]; dead receivers are pruned on the next publish.

use std::sync::mpsc::{channel, Receiver, Sender};

use crate::EventEnvelope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<(SubscriberId, Sender<EventEnvelope>)>,
    next_subscriber_id: u64,
}

/// Receiving end held by a collaborator.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    rx: Receiver<EventEnvelope>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Take everything published since the last drain, in publish order.
    pub fn drain(&self) -> Vec<EventEnvelope> {
        self.rx.try_iter().collect()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Subscription {
        let id = SubscriberId(self.next_subscriber_id);
        self.next_subscriber_id += 1;
        let (tx, rx) = channel();
        self.subscribers.push((id, tx));
        Subscription { id, rx }
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn publish(&mut self, events: &[EventEnvelope]) {
        if events.is_empty() {
            return;
        }
        self.subscribers
            .retain(|(_, tx)| events.iter().all(|event| tx.send(event.clone()).is_ok()));
    }
}
