//! Ledger notifications: the pure event builder and the sink they are
//! published to once a unit of work has committed.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, PublishedEvent, Subscription};
pub use envelope::EventEnvelope;
pub use event::{EventName, EventSubject, LedgerEvent, build_event};
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
