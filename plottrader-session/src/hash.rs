//! Stable credential hashing for sibling-session discovery.
//!
//! A JSON object's keys are sorted explicitly before hashing (recursively,
//! so nested objects are canonicalized too) so that logically-identical
//! credentials supplied with differently-ordered keys always hash
//! identically, rather than relying on whatever iteration order the JSON
//! map happens to produce.

use serde_json::Value;
use sha2::{Digest, Sha256};

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted: Vec<(String, Value)> =
                map.iter().map(|(k, v)| (k.clone(), canonicalize(v))).collect();
            sorted.sort_by(|a, b| a.0.cmp(&b.0));
            let mut canonical = serde_json::Map::new();
            for (k, v) in sorted {
                canonical.insert(k, v);
            }
            Value::Object(canonical)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Hashes a credentials payload into a hex-encoded SHA-256 digest, stable
/// under any reordering of object keys.
pub fn hash_credentials(value: &Value) -> String {
    let canonical = canonicalize(value);
    let bytes = serde_json::to_vec(&canonical).unwrap_or_default();
    let digest = Sha256::digest(&bytes);
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_order_does_not_affect_the_hash() {
        let a = json!({ "api_key": "x", "api_secret": "y" });
        let b = json!({ "api_secret": "y", "api_key": "x" });
        assert_eq!(hash_credentials(&a), hash_credentials(&b));
    }

    #[test]
    fn different_credentials_hash_differently() {
        let a = json!({ "api_key": "x" });
        let b = json!({ "api_key": "y" });
        assert_ne!(hash_credentials(&a), hash_credentials(&b));
    }

    #[test]
    fn nested_objects_are_canonicalized_too() {
        let a = json!({ "outer": { "a": 1, "b": 2 } });
        let b = json!({ "outer": { "b": 2, "a": 1 } });
        assert_eq!(hash_credentials(&a), hash_credentials(&b));
    }
}
