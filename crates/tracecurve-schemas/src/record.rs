//! Path addressing over semi-structured records.
//!
//! A record is any [`serde_json::Value`]. Paths are JSON pointers: the empty
//! string addresses the whole record, and every other path is a sequence of
//! `/`-prefixed reference tokens (`/args/detail`, `/traceEvents/0/dur`).
//!
//! Resolution is total. A missing field, an out-of-range index, or a
//! malformed pointer all resolve to `None`; callers decide whether absence
//! matters once they ask for a typed value.

use serde_json::Value;

/// Resolves `pointer` within `record`.
pub fn lookup<'a>(record: &'a Value, pointer: &str) -> Option<&'a Value> {
    record.pointer(pointer)
}

/// Resolves `pointer` and returns the string stored there, if any.
pub fn lookup_str<'a>(record: &'a Value, pointer: &str) -> Option<&'a str> {
    lookup(record, pointer).and_then(Value::as_str)
}

/// Resolves `pointer` and returns the number stored there as `f64`.
///
/// Integers are widened; non-numeric values resolve to `None`.
pub fn lookup_number(record: &Value, pointer: &str) -> Option<f64> {
    lookup(record, pointer).and_then(Value::as_f64)
}

/// Returns true if `pointer` is syntactically a JSON pointer.
///
/// This only checks the leading slash. Token contents are validated lazily
/// by resolution, which treats a bad token as an absent path.
pub fn is_pointer(pointer: &str) -> bool {
    pointer.is_empty() || pointer.starts_with('/')
}

/// Escapes an object key for use as a JSON pointer reference token.
///
/// `~` becomes `~0` and `/` becomes `~1`, in that order.
pub fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Flattens a record into `(pointer, leaf)` pairs.
///
/// Objects and arrays are walked recursively; every scalar becomes a leaf
/// addressed by its full pointer. Empty objects and empty arrays have no
/// children and are kept as leaves themselves, so `lookup(record, pointer)`
/// returns exactly `leaf` for every pair. A scalar root flattens to a
/// single pair with the empty pointer.
pub fn flatten(record: &Value) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    flatten_into(record, String::new(), &mut out);
    out
}

fn flatten_into(value: &Value, prefix: String, out: &mut Vec<(String, Value)>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                let pointer = format!("{prefix}/{}", escape_token(key));
                flatten_into(child, pointer, out);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(child, format!("{prefix}/{index}"), out);
            }
        }
        leaf => out.push((prefix, leaf.clone())),
    }
}
