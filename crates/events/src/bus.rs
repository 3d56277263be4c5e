//! Event sink abstraction.
//!
//! The ledger core only *constructs* notifications. Delivering them to
//! interested parties (web sockets, message brokers, test harnesses) is the job
//! of an external sink. The contract publishes to the sink strictly after a
//! unit of work commits, so a rolled-back invocation never produces a
//! notification.
//!
//! Delivery is at-least-once from the consumer's point of view: a publish that
//! fails after commit is reported to the caller, who may retry it.

use std::sync::Arc;
use std::sync::mpsc::Receiver;

use crate::envelope::EventEnvelope;
use crate::event::LedgerEvent;

/// What the sink carries: a ledger event stamped with its commit metadata.
pub type PublishedEvent = EventEnvelope<LedgerEvent>;

/// Queue of published events for one subscriber, in publication order.
#[derive(Debug)]
pub struct Subscription {
    receiver: Receiver<PublishedEvent>,
}

impl Subscription {
    pub(crate) fn new(receiver: Receiver<PublishedEvent>) -> Self {
        Self { receiver }
    }

    /// Take every event queued so far without blocking.
    pub fn drain(&self) -> Vec<PublishedEvent> {
        self.receiver.try_iter().collect()
    }
}

/// Transport-agnostic event sink.
pub trait EventBus: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, event: PublishedEvent) -> Result<(), Self::Error>;

    /// Receive every event published from now on.
    fn subscribe(&self) -> Subscription;
}

impl<B> EventBus for Arc<B>
where
    B: EventBus + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, event: PublishedEvent) -> Result<(), Self::Error> {
        (**self).publish(event)
    }

    fn subscribe(&self) -> Subscription {
        (**self).subscribe()
    }
}
