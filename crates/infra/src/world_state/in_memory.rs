use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::Utc;

use eggtrack_core::{CompositeKey, KeyVersion};

use super::r#trait::{CommitReceipt, StoreError, VersionedValue, WorldState, WriteBatch};

/// In-memory versioned world state.
///
/// Intended for tests, benches and the replay CLI.
#[derive(Debug, Default)]
pub struct InMemoryWorldState {
    entries: RwLock<BTreeMap<CompositeKey, VersionedValue>>,
}

impl InMemoryWorldState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.entries.read().map_err(|_| StoreError::Poisoned)?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    fn version_of(
        entries: &BTreeMap<CompositeKey, VersionedValue>,
        key: &CompositeKey,
    ) -> KeyVersion {
        entries.get(key).map(|v| v.version).unwrap_or(0)
    }
}

impl WorldState for InMemoryWorldState {
    fn get_state(&self, key: &CompositeKey) -> Result<Option<VersionedValue>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn scan(&self) -> Result<Vec<(CompositeKey, VersionedValue)>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    fn commit(&self, batch: WriteBatch) -> Result<CommitReceipt, StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;

        // Validate the whole read set before touching anything.
        for (key, expected) in &batch.reads {
            let found = Self::version_of(&entries, key);
            if !expected.matches(found) {
                return Err(StoreError::Conflict {
                    key: key.clone(),
                    expected: *expected,
                    found,
                });
            }
        }

        let written = batch.writes.len();
        for (key, value) in batch.writes {
            let version = Self::version_of(&entries, &key) + 1;
            entries.insert(key, VersionedValue { value, version });
        }

        Ok(CommitReceipt {
            tx_id: batch.tx_id,
            committed_at: Utc::now(),
            written,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eggtrack_core::ExpectedVersion;
    use uuid::Uuid;

    fn key(raw: &str) -> CompositeKey {
        CompositeKey::from_raw(raw)
    }

    fn write(k: &str, v: &str) -> WriteBatch {
        let mut batch = WriteBatch::new(Uuid::now_v7());
        batch.writes.push((key(k), v.as_bytes().to_vec()));
        batch
    }

    #[test]
    fn versions_start_at_one_and_increase() {
        let state = InMemoryWorldState::new();
        state.commit(write("Box:a:1", "x")).unwrap();
        state.commit(write("Box:a:1", "y")).unwrap();

        let stored = state.get_state(&key("Box:a:1")).unwrap().unwrap();
        assert_eq!(stored.version, 2);
        assert_eq!(stored.value, b"y".to_vec());
    }

    #[test]
    fn scan_is_in_key_order() {
        let state = InMemoryWorldState::new();
        state.commit(write("Shipment:f:d:1", "s")).unwrap();
        state.commit(write("Box:b:1", "b")).unwrap();
        state.commit(write("Box:a:1", "a")).unwrap();

        let keys: Vec<_> = state
            .scan()
            .unwrap()
            .into_iter()
            .map(|(k, _)| k.into_string())
            .collect();
        assert_eq!(keys, vec!["Box:a:1", "Box:b:1", "Shipment:f:d:1"]);
    }

    #[test]
    fn stale_read_rejects_whole_batch() {
        let state = InMemoryWorldState::new();
        state.commit(write("Box:a:1", "first")).unwrap();

        let mut batch = write("Box:b:1", "other");
        batch.reads.push((key("Box:a:1"), ExpectedVersion::Exact(0)));
        let err = state.commit(batch).unwrap_err();

        assert!(matches!(err, StoreError::Conflict { found: 1, .. }));
        assert!(state.get_state(&key("Box:b:1")).unwrap().is_none());
        assert_eq!(state.len().unwrap(), 1);
    }
}
