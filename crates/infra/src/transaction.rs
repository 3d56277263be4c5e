//! Unit of work over the world state.
//!
//! Reads go to the world state (or to this unit of work's own staged writes),
//! writes and events are staged, and nothing becomes visible to anyone else
//! until [`Transaction::commit`]. Dropping a transaction discards it.

use std::collections::BTreeMap;

use uuid::Uuid;

use eggtrack_core::{CompositeKey, DomainError, ExpectedVersion, KeyVersion, Record};
use eggtrack_events::LedgerEvent;

use crate::codec::{self, CodecError};
use crate::error::{ContractError, ContractResult};
use crate::query::{self, CapMode, QueryCap, QueryResult, Selector};
use crate::world_state::{CommitReceipt, WorldState, WriteBatch};

pub struct Transaction<'a, S: WorldState + ?Sized> {
    state: &'a S,
    tx_id: Uuid,
    cap_mode: CapMode,
    /// Version observed on first read of each key (0 when absent).
    reads: BTreeMap<CompositeKey, KeyVersion>,
    writes: BTreeMap<CompositeKey, Vec<u8>>,
    events: Vec<LedgerEvent>,
}

impl<'a, S: WorldState + ?Sized> Transaction<'a, S> {
    pub fn begin(state: &'a S, cap_mode: CapMode) -> Self {
        Self {
            state,
            tx_id: Uuid::now_v7(),
            cap_mode,
            reads: BTreeMap::new(),
            writes: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    pub fn tx_id(&self) -> Uuid {
        self.tx_id
    }

    fn observe(&mut self, key: &CompositeKey, version: KeyVersion) {
        self.reads.entry(key.clone()).or_insert(version);
    }

    fn read_raw(&mut self, key: &CompositeKey) -> ContractResult<Option<Vec<u8>>> {
        if let Some(staged) = self.writes.get(key) {
            return Ok(Some(staged.clone()));
        }
        let stored = self.state.get_state(key)?;
        self.observe(key, stored.as_ref().map(|v| v.version).unwrap_or(0));
        Ok(stored.filter(|v| !v.is_empty()).map(|v| v.value))
    }

    /// Whether a non-empty value is currently stored at `key`.
    pub fn exists(&mut self, key: &CompositeKey) -> ContractResult<bool> {
        Ok(self.read_raw(key)?.is_some())
    }

    /// Fail with `AlreadyExists` if `key` is taken.
    pub fn ensure_absent(&mut self, key: &CompositeKey, what: &str) -> ContractResult<()> {
        if self.exists(key)? {
            return Err(DomainError::already_exists(format!("{what} with key {key}")).into());
        }
        Ok(())
    }

    /// Load the record at `key`, or fail with `NotFound`. A key holding a
    /// record of another type counts as missing.
    pub fn require<R: Record>(&mut self, key: &CompositeKey, what: &str) -> ContractResult<R> {
        let missing = || ContractError::from(DomainError::not_found(format!("{what} ID {key}")));
        let Some(bytes) = self.read_raw(key)? else {
            return Err(missing());
        };
        match codec::decode(key, &bytes) {
            Ok(record) => Ok(record),
            Err(CodecError::TypeMismatch { .. }) => Err(missing()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn put_record<R: Record>(&mut self, record: &R) -> ContractResult<()> {
        let bytes = codec::encode(record)?;
        self.writes.insert(record.key().clone(), bytes);
        Ok(())
    }

    /// Run `selector` over the world state overlaid with the staged writes,
    /// capped at `max` (`0` = uncapped). Returned keys join the read set.
    pub fn query(&mut self, selector: &Selector, max: usize) -> ContractResult<Vec<QueryResult>> {
        let mut versions = BTreeMap::new();
        let mut merged: BTreeMap<CompositeKey, Vec<u8>> = BTreeMap::new();
        for (key, stored) in self.state.scan()? {
            versions.insert(key.clone(), stored.version);
            merged.insert(key, stored.value);
        }
        for (key, bytes) in &self.writes {
            merged.insert(key.clone(), bytes.clone());
        }

        let results = query::execute(merged, selector, QueryCap::new(max, self.cap_mode))?;
        for hit in &results {
            if !self.writes.contains_key(&hit.key) {
                let version = versions.get(&hit.key).copied().unwrap_or(0);
                self.observe(&hit.key, version);
            }
        }
        Ok(results)
    }

    /// Stage an event for publication once the writes are committed.
    pub fn set_event(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    pub fn staged_events(&self) -> &[LedgerEvent] {
        &self.events
    }

    pub fn staged_writes(&self) -> usize {
        self.writes.len()
    }

    /// Hand the staged writes to the world state. The staged events are
    /// returned only when the commit succeeded.
    pub fn commit(self) -> ContractResult<(CommitReceipt, Vec<LedgerEvent>)> {
        let batch = WriteBatch {
            tx_id: self.tx_id,
            reads: self
                .reads
                .into_iter()
                .map(|(k, v)| (k, ExpectedVersion::Exact(v)))
                .collect(),
            writes: self.writes.into_iter().collect(),
        };
        let receipt = self.state.commit(batch)?;
        Ok((receipt, self.events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world_state::InMemoryWorldState;
    use eggtrack_boxes::EggBox;
    use eggtrack_participants::Participant;

    #[test]
    fn staged_writes_are_visible_inside_only() {
        let state = InMemoryWorldState::new();
        let b = EggBox::pack("farmer1", "t1", 6).unwrap();

        let mut tx = Transaction::begin(&state, CapMode::Scanned);
        assert!(!tx.exists(b.box_id()).unwrap());
        tx.put_record(&b).unwrap();
        assert!(tx.exists(b.box_id()).unwrap());
        assert_eq!(tx.query(&Selector::boxes_of("farmer1"), 0).unwrap().len(), 1);
        assert!(state.get_state(b.box_id()).unwrap().is_none());

        tx.commit().unwrap();
        assert!(state.get_state(b.box_id()).unwrap().is_some());
    }

    #[test]
    fn dropped_transaction_writes_nothing() {
        let state = InMemoryWorldState::new();
        {
            let mut tx = Transaction::begin(&state, CapMode::Scanned);
            tx.put_record(&EggBox::pack("farmer1", "t1", 6).unwrap()).unwrap();
        }
        assert!(state.is_empty().unwrap());
    }

    #[test]
    fn racing_creations_conflict() {
        let state = InMemoryWorldState::new();
        let b = EggBox::pack("farmer1", "t1", 6).unwrap();

        let mut first = Transaction::begin(&state, CapMode::Scanned);
        let mut second = Transaction::begin(&state, CapMode::Scanned);
        first.ensure_absent(b.box_id(), "egg box").unwrap();
        second.ensure_absent(b.box_id(), "egg box").unwrap();
        first.put_record(&b).unwrap();
        second.put_record(&b).unwrap();

        first.commit().unwrap();
        let err = second.commit().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Conflict);
    }

    #[test]
    fn require_reports_missing_key() {
        let state = InMemoryWorldState::new();
        let mut tx = Transaction::begin(&state, CapMode::Scanned);
        let err = tx
            .require::<EggBox>(&CompositeKey::from_raw("Box:none:1"), "egg box")
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::NotFound);
    }

    #[test]
    fn require_treats_other_record_types_as_missing() {
        let state = InMemoryWorldState::new();
        let b = EggBox::pack("farmer1", "t1", 6).unwrap();
        let mut tx = Transaction::begin(&state, CapMode::Scanned);
        tx.put_record(&b).unwrap();

        let err = tx.require::<Participant>(b.box_id(), "participant").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::NotFound);
        assert_eq!(err.to_string(), "participant ID Box:farmer1:t1 not found");

        let corrupt = CompositeKey::from_raw("Box:farmer1:t2");
        tx.writes.insert(corrupt.clone(), b"not json".to_vec());
        let err = tx.require::<EggBox>(&corrupt, "egg box").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Codec);
    }
}
