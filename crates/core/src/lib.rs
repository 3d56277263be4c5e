//! `eggtrack-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the ledger
//! modules: the error taxonomy, the composite key scheme and record typing.

pub mod error;
pub mod key;
pub mod record;
pub mod version;

pub use error::{DomainError, DomainResult};
pub use key::{CompositeKey, KEY_DELIMITER, build_key};
pub use record::{Record, RecordType};
pub use version::{ExpectedVersion, KeyVersion};
