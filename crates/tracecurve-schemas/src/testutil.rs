//! Shared proptest strategies for schema tests.

use proptest::prelude::*;
use serde_json::{Map, Value};

/// Strategy for generating object keys, including characters that need
/// escaping in JSON pointers.
pub fn arb_key() -> impl Strategy<Value = String> {
    "[a-z_/~][a-z0-9_/~]{0,7}"
}

/// Strategy for generating arbitrary scalar leaves.
pub fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::from),
        "[a-z]{0,6}".prop_map(Value::String),
    ]
}

/// Strategy for generating nested records up to a few levels deep.
pub fn arb_record() -> impl Strategy<Value = Value> {
    arb_leaf().prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec((arb_key(), inner), 0..4).prop_map(
                |entries| Value::Object(entries.into_iter().collect::<Map<_, _>>())
            ),
        ]
    })
}
