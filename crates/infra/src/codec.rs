//! Record encoding for the world state (`serde_json` bytes).

use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

use eggtrack_core::{CompositeKey, Record, RecordType};

const TYPE_FIELD: &str = "type";

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode record {key}: {message}")]
    Encode { key: CompositeKey, message: String },

    #[error("failed to decode record {key}: {message}")]
    Decode { key: CompositeKey, message: String },

    #[error("record {key} has type {found}, expected {expected}")]
    TypeMismatch {
        key: CompositeKey,
        expected: RecordType,
        found: String,
    },

    #[error("failed to encode payload: {0}")]
    Payload(String),
}

pub fn encode<R: Record>(record: &R) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(record).map_err(|e| CodecError::Encode {
        key: record.key().clone(),
        message: e.to_string(),
    })
}

/// Encode an operation result for the caller.
pub fn encode_payload<T: Serialize + ?Sized>(value: &T) -> Result<String, CodecError> {
    serde_json::to_string(value).map_err(|e| CodecError::Payload(e.to_string()))
}

/// Decode raw bytes into an untyped JSON record (used by selector queries).
pub fn decode_value(key: &CompositeKey, bytes: &[u8]) -> Result<JsonValue, CodecError> {
    serde_json::from_slice(bytes).map_err(|e| CodecError::Decode {
        key: key.clone(),
        message: e.to_string(),
    })
}

/// Decode bytes stored at `key` into `R`.
pub fn decode<R: Record>(key: &CompositeKey, bytes: &[u8]) -> Result<R, CodecError> {
    from_value(key, decode_value(key, bytes)?)
}

/// Convert an untyped record into `R`, checking the `type` discriminator
/// first so that a key of another record type is reported as such.
pub fn from_value<R: Record>(key: &CompositeKey, value: JsonValue) -> Result<R, CodecError> {
    let found = value.get(TYPE_FIELD).and_then(JsonValue::as_str).unwrap_or("");
    if found != R::RECORD_TYPE.as_str() {
        return Err(CodecError::TypeMismatch {
            key: key.clone(),
            expected: R::RECORD_TYPE,
            found: found.to_string(),
        });
    }
    serde_json::from_value(value).map_err(|e| CodecError::Decode {
        key: key.clone(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use eggtrack_boxes::EggBox;
    use eggtrack_shipments::Shipment;

    #[test]
    fn decodes_what_it_encodes() {
        let b = EggBox::pack("farmer1", "t1", 12).unwrap();
        let bytes = encode(&b).unwrap();
        let decoded: EggBox = decode(b.box_id(), &bytes).unwrap();
        assert_eq!(decoded, b);
    }

    #[test]
    fn wrong_record_type_is_reported() {
        let b = EggBox::pack("farmer1", "t1", 12).unwrap();
        let bytes = encode(&b).unwrap();
        let err = decode::<Shipment>(b.box_id(), &bytes).unwrap_err();
        assert!(matches!(err, CodecError::TypeMismatch { ref found, .. } if found == "Box"));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let key = CompositeKey::from_raw("Box:x:1");
        let err = decode::<EggBox>(&key, b"not json").unwrap_err();
        assert!(matches!(err, CodecError::Decode { .. }));
    }
}
