//! Canonical JSON serialization for deterministic hashing
//!
//! Object keys are sorted recursively and no whitespace is emitted, so the
//! same value always hashes to the same Blake3 digest.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::errors::Result;

/// Serialize a value to canonical JSON (sorted keys, no whitespace)
pub fn to_canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let json_value = serde_json::to_value(value)?;
    let canonical = canonicalize_value(json_value);
    Ok(serde_json::to_string(&canonical)?)
}

fn canonicalize_value(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let sorted: BTreeMap<String, serde_json::Value> = map
                .into_iter()
                .map(|(k, v)| (k, canonicalize_value(v)))
                .collect();
            serde_json::Value::Object(sorted.into_iter().collect())
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(canonicalize_value).collect())
        }
        other => other,
    }
}

/// Compute the Blake3 hash of the canonical JSON form as a hex string
pub fn hash_canonical_hex<T: Serialize>(value: &T) -> Result<String> {
    let json = to_canonical_json(value)?;
    Ok(hex::encode(blake3::hash(json.as_bytes()).as_bytes()))
}
