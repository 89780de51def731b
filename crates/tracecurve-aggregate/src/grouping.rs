//! How events are assigned to groups.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracecurve_predicates::{CompiledDescriptor, Predicate, all_match};
use tracecurve_schemas::record::lookup_str;

use crate::map::GroupKey;

/// What to do with an event that lacks a string at one of the key paths.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MissingKeyPolicy {
    /// Omit the slot, producing a shorter key.
    ///
    /// Slots are not tagged with their path, so values from different
    /// slots can produce the same key: with key paths `/name` and
    /// `/args/detail`, `{"name": "A"}` and `{"args": {"detail": "A"}}` both
    /// key as `["A"]`. Use [`MissingKeyPolicy::Drop`] to keep them apart.
    #[default]
    Truncate,
    /// Skip the event.
    Drop,
}

impl MissingKeyPolicy {
    pub const ALL: [MissingKeyPolicy; 2] =
        [MissingKeyPolicy::Truncate, MissingKeyPolicy::Drop];

    pub fn name(self) -> &'static str {
        match self {
            MissingKeyPolicy::Truncate => "truncate",
            MissingKeyPolicy::Drop => "drop",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

impl fmt::Display for MissingKeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Grouping mode for an aggregation run.
#[derive(Debug, Clone)]
pub enum GroupingSpec {
    /// Each descriptor is both a filter and a key. An event matching several
    /// descriptors lands in each of their groups.
    Static(Vec<CompiledDescriptor>),
    /// The key is the tuple of strings found at `key_paths` in the event.
    Dynamic {
        key_paths: Vec<String>,
        missing_keys: MissingKeyPolicy,
    },
}

impl GroupingSpec {
    /// Dynamic grouping with the default missing-key policy.
    pub fn dynamic(key_paths: Vec<String>) -> Self {
        GroupingSpec::Dynamic {
            key_paths,
            missing_keys: MissingKeyPolicy::default(),
        }
    }

    /// Group keys `event` belongs to. Empty if the event is not selected.
    ///
    /// Filters only apply to dynamic grouping.
    pub fn keys_for(&self, event: &Value, filters: &[Predicate]) -> Vec<GroupKey> {
        match self {
            GroupingSpec::Static(descriptors) => descriptors
                .iter()
                .filter(|d| d.matches(event))
                .map(|d| GroupKey::named(d.name()))
                .collect(),
            GroupingSpec::Dynamic {
                key_paths,
                missing_keys,
            } => {
                if !all_match(filters, event) {
                    return Vec::new();
                }
                let mut fields = Vec::with_capacity(key_paths.len());
                for path in key_paths {
                    match (lookup_str(event, path), missing_keys) {
                        (Some(value), _) => fields.push(value.to_string()),
                        (None, MissingKeyPolicy::Truncate) => {}
                        (None, MissingKeyPolicy::Drop) => return Vec::new(),
                    }
                }
                vec![GroupKey::Fields(fields)]
            }
        }
    }
}
