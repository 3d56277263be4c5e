//! Versioned key-value world state boundary.
//!
//! The ledger's records live here as `compositeKey -> encoded record bytes`.
//! Commits are all-or-nothing and guarded by the read set of the unit of work.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryWorldState;
pub use r#trait::{CommitReceipt, StoreError, VersionedValue, WorldState, WriteBatch};
