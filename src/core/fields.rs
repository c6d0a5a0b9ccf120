//! Structured fields attached to records
//!
//! Fields are an insertion-ordered JSON object. Every node owns one store per
//! scope (severity-agnostic plus one per severity); at emit time the stores
//! along the path are merged into a single mapping.

use serde_json::{Map, Value};

/// Ordered key/value mapping carried by records.
pub type Fields = Map<String, Value>;

/// Accumulate `src` into `dst`, overwriting existing keys.
///
/// Shallow: nested objects in `src` replace their counterpart wholesale.
pub fn extend(dst: &mut Fields, src: Fields) {
    for (key, value) in src {
        dst.insert(key, value);
    }
}

/// Deep overlay: `src` wins on collision, nested objects are merged.
pub fn overlay(dst: &mut Fields, src: &Fields) {
    for (key, value) in src {
        match (dst.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                overlay(existing, incoming);
            }
            _ => {
                dst.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Deep fill: keys of `src` are only added where `dst` lacks them.
///
/// Used when walking towards the root, where the already-merged mapping is
/// more specific than anything an ancestor supplies.
pub fn fill(dst: &mut Fields, src: &Fields) {
    for (key, value) in src {
        match (dst.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                fill(existing, incoming);
            }
            (Some(_), _) => {}
            (None, _) => {
                dst.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Format fields as key=value pairs
pub fn format_fields(fields: &Fields) -> String {
    fields
        .iter()
        .map(|(k, v)| match v {
            Value::String(s) => format!("{}={}", k, s),
            other => format!("{}={}", k, other),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
