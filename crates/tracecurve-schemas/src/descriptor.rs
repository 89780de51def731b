//! Group descriptor schema.
//!
//! A group descriptor names a subset of trace events. Its constraints are
//! kept as raw records here; `tracecurve-predicates` compiles them.
//!
//! ```json
//! {
//!   "name": "Total Frontend",
//!   "predicates": [
//!     { "type": "streq", "pointer": "/name", "string": "Total Frontend" }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Name of the catch-all descriptor returned by
/// [`GroupDescriptor::catch_all`].
pub const DEFAULT_DESCRIPTOR_NAME: &str = "All";

/// Named, ordered list of constraints selecting a group of events.
///
/// An event belongs to the group iff it satisfies every constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDescriptor {
    pub name: String,
    /// Constraint records, in configuration order.
    pub predicates: Vec<Value>,
}

impl GroupDescriptor {
    pub fn new(name: impl Into<String>, predicates: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            predicates,
        }
    }

    /// The default descriptor: every event with a string `name`.
    pub fn catch_all() -> Self {
        Self::new(
            DEFAULT_DESCRIPTOR_NAME,
            vec![json!({
                "type": "regex",
                "pointer": "/name",
                "regex": ".*",
            })],
        )
    }

    /// Serializes the descriptor back into its record form.
    pub fn to_record(&self) -> Value {
        json!({
            "name": self.name,
            "predicates": self.predicates,
        })
    }
}
