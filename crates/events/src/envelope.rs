use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope for an event, carrying the metadata of the commit that produced it.
///
/// This is the unit handed to the event sink after a unit of work commits.
///
/// Notes:
/// - `sequence_number` orders the events of one transaction, starting at 1.
/// - `committed_at` is the host's commit time, not a business timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    tx_id: Uuid,
    sequence_number: u64,
    committed_at: DateTime<Utc>,
    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(tx_id: Uuid, sequence_number: u64, committed_at: DateTime<Utc>, payload: E) -> Self {
        Self {
            tx_id,
            sequence_number,
            committed_at,
            payload,
        }
    }

    pub fn tx_id(&self) -> Uuid {
        self.tx_id
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn committed_at(&self) -> DateTime<Utc> {
        self.committed_at
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }
}
