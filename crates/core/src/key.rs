//! Composite keys derived from natural keys.
//!
//! A key is the record type followed by the natural key parts, joined with
//! [`KEY_DELIMITER`]. Parts are not escaped, so a part containing the
//! delimiter would let two different natural keys collide; such parts are
//! rejected when the key is built.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::record::RecordType;

pub const KEY_DELIMITER: char = ':';

/// Deterministic world-state key of a ledger record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompositeKey(String);

impl CompositeKey {
    /// Wrap a raw key as received from a caller (e.g. a shipment id argument).
    ///
    /// No structure is checked; unknown keys simply resolve to nothing.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Record type prefix, if the key was produced by [`build_key`].
    pub fn record_type(&self) -> Option<RecordType> {
        self.0
            .split(KEY_DELIMITER)
            .next()
            .and_then(|prefix| RecordType::from_str(prefix).ok())
    }
}

impl core::fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CompositeKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Build the composite key for `record_type` from its natural key parts.
pub fn build_key(record_type: RecordType, parts: &[&str]) -> DomainResult<CompositeKey> {
    let mut key = String::from(record_type.as_str());
    for (idx, part) in parts.iter().enumerate() {
        validate_part(record_type, idx, part)?;
        key.push(KEY_DELIMITER);
        key.push_str(part);
    }
    Ok(CompositeKey(key))
}

fn validate_part(record_type: RecordType, idx: usize, part: &str) -> DomainResult<()> {
    if part.trim().is_empty() {
        return Err(DomainError::validation(format!(
            "{record_type} key part {idx} cannot be empty"
        )));
    }
    if part.contains(KEY_DELIMITER) {
        return Err(DomainError::validation(format!(
            "{record_type} key part '{part}' must not contain '{KEY_DELIMITER}'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn joins_type_and_parts() {
        let key = build_key(RecordType::Box, &["farmer1", "202106031608"]).unwrap();
        assert_eq!(key.as_str(), "Box:farmer1:202106031608");
        assert_eq!(key.record_type(), Some(RecordType::Box));
    }

    #[test]
    fn shipment_key_has_three_parts() {
        let key = build_key(RecordType::Shipment, &["farmer2", "dist2", "202106031700"]).unwrap();
        assert_eq!(key.as_str(), "Shipment:farmer2:dist2:202106031700");
    }

    #[test]
    fn rejects_delimiter_inside_part() {
        let err = build_key(RecordType::Box, &["farmer:1", "t"]).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn rejects_empty_part() {
        let err = build_key(RecordType::Participant, &["  "]).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn raw_keys_without_known_prefix_have_no_type() {
        assert_eq!(CompositeKey::from_raw("UNKNOWN").record_type(), None);
    }

    proptest! {
        /// Distinct valid natural keys never map to the same composite key.
        #[test]
        fn distinct_parts_give_distinct_keys(
            a in "[a-z0-9]{1,8}", b in "[a-z0-9]{1,8}",
            c in "[a-z0-9]{1,8}", d in "[a-z0-9]{1,8}",
        ) {
            let left = build_key(RecordType::Box, &[&a, &b]).unwrap();
            let right = build_key(RecordType::Box, &[&c, &d]).unwrap();
            prop_assert_eq!(left == right, a == c && b == d);
        }
    }
}
