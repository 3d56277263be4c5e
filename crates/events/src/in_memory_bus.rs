//! In-memory event sink for tests, benches and the replay CLI.

use std::sync::{Mutex, mpsc};

use crate::bus::{EventBus, PublishedEvent, Subscription};

#[derive(Debug)]
pub enum InMemoryBusError {
    Poisoned,
}

#[derive(Debug)]
struct Subscriber {
    /// `None` receives everything; `Some(id)` only events addressed to `id`.
    participant_id: Option<String>,
    sender: mpsc::Sender<PublishedEvent>,
}

impl Subscriber {
    fn wants(&self, event: &PublishedEvent) -> bool {
        match &self.participant_id {
            None => true,
            Some(id) => event.payload().is_addressed_to(id),
        }
    }
}

/// In-process fan-out of committed ledger events.
///
/// Subscribers whose receiving end was dropped are pruned on the next event
/// they would have received.
#[derive(Debug, Default)]
pub struct InMemoryEventBus {
    subscribers: Mutex<Vec<Subscriber>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive only the events whose target audience names `participant_id`,
    /// the way a participant's notification channel would.
    pub fn subscribe_as(&self, participant_id: impl Into<String>) -> Subscription {
        self.register(Some(participant_id.into()))
    }

    fn register(&self, participant_id: Option<String>) -> Subscription {
        let (sender, receiver) = mpsc::channel();
        // A poisoned lock still yields a subscription; it just never receives.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(Subscriber {
                participant_id,
                sender,
            });
        }
        Subscription::new(receiver)
    }
}

impl EventBus for InMemoryEventBus {
    type Error = InMemoryBusError;

    fn publish(&self, event: PublishedEvent) -> Result<(), Self::Error> {
        let mut subs = self
            .subscribers
            .lock()
            .map_err(|_| InMemoryBusError::Poisoned)?;
        subs.retain(|s| !s.wants(&event) || s.sender.send(event.clone()).is_ok());
        Ok(())
    }

    fn subscribe(&self) -> Subscription {
        self.register(None)
    }
}
