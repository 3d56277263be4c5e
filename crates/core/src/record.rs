//! Ledger records: typed values stored under a composite key.

use core::str::FromStr;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::key::CompositeKey;

/// Value of the `type` field carried by every stored record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    Box,
    Shipment,
    Participant,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Box => "Box",
            RecordType::Shipment => "Shipment",
            RecordType::Participant => "Participant",
        }
    }
}

impl core::fmt::Display for RecordType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Box" => Ok(RecordType::Box),
            "Shipment" => Ok(RecordType::Shipment),
            "Participant" => Ok(RecordType::Participant),
            other => Err(DomainError::validation(format!("unknown record type '{other}'"))),
        }
    }
}

/// A record owned by the ledger.
///
/// Records are plain data: the core reads them from the world state at the
/// start of an invocation, transitions them, and writes them back. They are
/// never cached across invocations.
pub trait Record: Serialize + DeserializeOwned + Clone + core::fmt::Debug {
    const RECORD_TYPE: RecordType;

    /// The `type` tag actually carried by this value (checked on decode).
    fn record_type(&self) -> RecordType;

    /// Composite key the record is stored under.
    fn key(&self) -> &CompositeKey;
}
