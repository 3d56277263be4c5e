//! Selector queries over the world state.
//!
//! A [`Selector`] is a set of required equality constraints plus at most one
//! `$or` group of equality constraints, in the `{"selector": {...}}` form used
//! by document-store ledgers. Queries walk the records in key order.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use eggtrack_boxes::BoxState;
use eggtrack_core::{CompositeKey, RecordType};

use crate::codec::{self, CodecError};

const SELECTOR_FIELD: &str = "selector";
const OR_FIELD: &str = "$or";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("malformed selector: {0}")]
    Malformed(String),

    #[error("unsupported selector construct: {0}")]
    Unsupported(String),
}

/// Equality filter evaluated against decoded records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selector {
    equals: BTreeMap<String, JsonValue>,
    any_of: Vec<(String, JsonValue)>,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selector restricted to one record type.
    pub fn of_type(record_type: RecordType) -> Self {
        Self::new().eq("type", record_type.as_str())
    }

    /// Require `field == value`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.equals.insert(field.into(), value.into());
        self
    }

    /// Add `field == value` to the `$or` group.
    pub fn or_eq(mut self, field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.any_of.push((field.into(), value.into()));
        self
    }

    /// Boxes packed by or currently held by `participant_id`.
    pub fn boxes_of(participant_id: &str) -> Self {
        Self::of_type(RecordType::Box)
            .or_eq("originId", participant_id)
            .or_eq("holderId", participant_id)
    }

    /// `PACKED` boxes held by `farmer_id`, i.e. candidates for a new shipment.
    pub fn packed_boxes_held_by(farmer_id: &str) -> Self {
        Self::of_type(RecordType::Box)
            .eq("holderId", farmer_id)
            .eq("state", BoxState::Packed.as_str())
    }

    /// Shipments where `participant_id` is the farmer, shipper or distributor.
    pub fn shipments_of(participant_id: &str) -> Self {
        Self::of_type(RecordType::Shipment)
            .or_eq("farmerId", participant_id)
            .or_eq("shipperId", participant_id)
            .or_eq("distributorId", participant_id)
    }

    pub fn matches(&self, record: &JsonValue) -> bool {
        let field_is = |field: &str, value: &JsonValue| record.get(field) == Some(value);

        self.equals.iter().all(|(f, v)| field_is(f, v))
            && (self.any_of.is_empty() || self.any_of.iter().any(|(f, v)| field_is(f, v)))
    }

    /// `{"selector": {...}}` form.
    pub fn to_json(&self) -> JsonValue {
        let mut inner: Map<String, JsonValue> = self
            .equals
            .iter()
            .map(|(f, v)| (f.clone(), v.clone()))
            .collect();
        if !self.any_of.is_empty() {
            let group = self
                .any_of
                .iter()
                .map(|(f, v)| {
                    let mut m = Map::new();
                    m.insert(f.clone(), v.clone());
                    JsonValue::Object(m)
                })
                .collect();
            inner.insert(OR_FIELD.to_string(), JsonValue::Array(group));
        }
        let mut outer = Map::new();
        outer.insert(SELECTOR_FIELD.to_string(), JsonValue::Object(inner));
        JsonValue::Object(outer)
    }

    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        let value: JsonValue =
            serde_json::from_str(raw).map_err(|e| QueryError::Malformed(e.to_string()))?;
        Self::from_json(&value)
    }

    pub fn from_json(value: &JsonValue) -> Result<Self, QueryError> {
        let inner = value
            .get(SELECTOR_FIELD)
            .and_then(JsonValue::as_object)
            .ok_or_else(|| QueryError::Malformed("missing \"selector\" object".to_string()))?;

        let mut selector = Selector::new();
        for (field, v) in inner {
            if field == OR_FIELD {
                let group = v
                    .as_array()
                    .ok_or_else(|| QueryError::Malformed("\"$or\" must be an array".to_string()))?;
                for clause in group {
                    let clause = clause.as_object().ok_or_else(|| {
                        QueryError::Malformed("\"$or\" entries must be objects".to_string())
                    })?;
                    for (f, cv) in clause {
                        selector = selector.or_eq(f.clone(), scalar(f, cv)?);
                    }
                }
            } else if field.starts_with('$') {
                return Err(QueryError::Unsupported(field.clone()));
            } else {
                selector = selector.eq(field.clone(), scalar(field, v)?);
            }
        }
        Ok(selector)
    }
}

fn scalar(field: &str, value: &JsonValue) -> Result<JsonValue, QueryError> {
    match value {
        JsonValue::Object(_) | JsonValue::Array(_) => Err(QueryError::Unsupported(format!(
            "non-equality constraint on {field}"
        ))),
        other => Ok(other.clone()),
    }
}

/// What the `max` cap of a query counts.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapMode {
    /// Every record examined counts, matching or not.
    #[default]
    Scanned,
    /// Only matching records count.
    Matched,
}

impl CapMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CapMode::Scanned => "scanned",
            CapMode::Matched => "matched",
        }
    }
}

impl FromStr for CapMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scanned" => Ok(CapMode::Scanned),
            "matched" => Ok(CapMode::Matched),
            other => Err(format!("unknown query cap mode '{other}'")),
        }
    }
}

/// Result cap for a query. `max == 0` means uncapped.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct QueryCap {
    pub max: usize,
    pub mode: CapMode,
}

impl QueryCap {
    pub fn uncapped() -> Self {
        Self::default()
    }

    pub fn new(max: usize, mode: CapMode) -> Self {
        Self { max, mode }
    }

    fn reached(&self, scanned: usize, matched: usize) -> bool {
        if self.max == 0 {
            return false;
        }
        match self.mode {
            CapMode::Scanned => scanned >= self.max,
            CapMode::Matched => matched >= self.max,
        }
    }
}

/// One query hit, encoded as `{"key": .., "record": {..}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub key: CompositeKey,
    pub record: JsonValue,
}

/// Evaluate `selector` over `entries` (which must already be in key order).
///
/// Empty values count as examined but never match.
pub fn execute<I>(
    entries: I,
    selector: &Selector,
    cap: QueryCap,
) -> Result<Vec<QueryResult>, CodecError>
where
    I: IntoIterator<Item = (CompositeKey, Vec<u8>)>,
{
    let mut results = Vec::new();
    let mut scanned = 0usize;

    for (key, bytes) in entries {
        if !bytes.is_empty() {
            let record = codec::decode_value(&key, &bytes)?;
            if selector.matches(&record) {
                results.push(QueryResult { key, record });
            }
        }
        scanned += 1;
        if cap.reached(scanned, results.len()) {
            break;
        }
    }

    tracing::debug!(scanned, matched = results.len(), max = cap.max, "selector scan finished");
    Ok(results)
}
