use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::domain::RawInitiativeMap;

/// SHA-256 hex digest of a raw initiative map.
///
/// Initiative order is part of the digest since table order, top-performer ties
/// and compact-key collisions all depend on it. Keys inside each record are
/// sorted. Intended as a cache key for callers that memoize pipeline outputs.
pub fn input_fingerprint(raw: &RawInitiativeMap) -> String {
    let mut ordered = Map::new();
    for (name, record) in raw {
        ordered.insert(name.clone(), canonicalize(record));
    }
    let canonical = Value::Object(ordered);
    let mut hasher = Sha256::new();
    hasher.update(canonical.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(obj) => {
            let mut entries: Vec<(&String, &Value)> = obj.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut sorted = Map::new();
            for (key, v) in entries {
                sorted.insert(key.clone(), canonicalize(v));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
