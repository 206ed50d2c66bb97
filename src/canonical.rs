//! The canonical serialization of UCAN headers and payloads.
//!
//! Both are rendered as compact JSON with object keys sorted bytewise at every level, so the output
//! only depends on the logical contents and never on the order fields were set in.

use crate::{
    codec::to_base64,
    token::{UcanHeader, UcanPayload},
};
use serde::Serialize;
use serde_json::{Map, Value};

/// Serialize a value as canonical JSON.
pub fn canonical_json<T: Serialize>(input: &T) -> Result<Vec<u8>, serde_json::Error> {
    let value = sort_keys(serde_json::to_value(input)?);
    serde_json::to_vec(&value)
}

/// The bytes that get signed for the given header and payload.
///
/// This is the base64url encoding of each of their canonical JSON forms, joined by a `.`.
pub fn canonical_bytes(header: &UcanHeader, payload: &UcanPayload) -> Result<Vec<u8>, serde_json::Error> {
    let header = to_base64(canonical_json(header)?);
    let payload = to_base64(canonical_json(payload)?);
    Ok(format!("{header}.{payload}").into_bytes())
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(object) => {
            let mut entries: Vec<_> = object.into_iter().collect();
            entries.sort_by(|(left, _), (right, _)| left.as_bytes().cmp(right.as_bytes()));
            Value::Object(entries.into_iter().map(|(key, value)| (key, sort_keys(value))).collect::<Map<_, _>>())
        }
        Value::Array(values) => Value::Array(values.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
