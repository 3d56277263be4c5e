use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use eggtrack_core::{CompositeKey, ExpectedVersion, KeyVersion};

/// Encoded record bytes together with the version they were written at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedValue {
    pub value: Vec<u8>,
    pub version: KeyVersion,
}

impl VersionedValue {
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

/// Everything a unit of work hands to the world state at commit time.
///
/// `reads` carries the version observed for every key the unit of work read
/// (including existence checks on absent keys, observed as version `0`).
/// `writes` is applied in order; a later write to the same key wins.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    pub tx_id: Uuid,
    pub reads: Vec<(CompositeKey, ExpectedVersion)>,
    pub writes: Vec<(CompositeKey, Vec<u8>)>,
}

impl WriteBatch {
    pub fn new(tx_id: Uuid) -> Self {
        Self {
            tx_id,
            reads: Vec::new(),
            writes: Vec::new(),
        }
    }
}

/// Outcome of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    pub tx_id: Uuid,
    pub committed_at: DateTime<Utc>,
    pub written: usize,
}

/// World state operation error.
///
/// These are infrastructure errors (concurrency, locking), as opposed to the
/// domain errors raised by lifecycle rules.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("write conflict on key {key}: expected {expected:?}, found version {found}")]
    Conflict {
        key: CompositeKey,
        expected: ExpectedVersion,
        found: KeyVersion,
    },

    #[error("world state lock poisoned")]
    Poisoned,
}

/// Versioned key-value ledger state.
///
/// Implementations must:
/// - keep one version per key, starting at `1` on first write
/// - return scans in key order (stable, total)
/// - check every read expectation of a batch and apply all of its writes
///   atomically, or apply none of them
pub trait WorldState: Send + Sync {
    fn get_state(&self, key: &CompositeKey) -> Result<Option<VersionedValue>, StoreError>;

    /// Every stored entry, in key order.
    fn scan(&self) -> Result<Vec<(CompositeKey, VersionedValue)>, StoreError>;

    fn commit(&self, batch: WriteBatch) -> Result<CommitReceipt, StoreError>;
}

impl<S> WorldState for Arc<S>
where
    S: WorldState + ?Sized,
{
    fn get_state(&self, key: &CompositeKey) -> Result<Option<VersionedValue>, StoreError> {
        (**self).get_state(key)
    }

    fn scan(&self) -> Result<Vec<(CompositeKey, VersionedValue)>, StoreError> {
        (**self).scan()
    }

    fn commit(&self, batch: WriteBatch) -> Result<CommitReceipt, StoreError> {
        (**self).commit(batch)
    }
}
