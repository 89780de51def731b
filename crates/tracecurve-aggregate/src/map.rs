//! The aggregate map: sample buckets keyed by group, case and size.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one group of events.
///
/// Static grouping keys buckets by descriptor name; dynamic grouping keys
/// them by the tuple of string values read from each event.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(untagged)]
pub enum GroupKey {
    Named(String),
    Fields(Vec<String>),
}

impl GroupKey {
    pub fn named(name: impl Into<String>) -> Self {
        GroupKey::Named(name.into())
    }

    /// Key components. A named key has exactly one.
    pub fn components(&self) -> &[String] {
        match self {
            GroupKey::Named(name) => std::slice::from_ref(name),
            GroupKey::Fields(fields) => fields,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Named(name) => f.write_str(name),
            GroupKey::Fields(fields) => write!(f, "[{}]", fields.join(", ")),
        }
    }
}

/// Address of one sample bucket.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct BucketKey {
    pub group: GroupKey,
    pub case: String,
    pub size: u64,
}

impl BucketKey {
    pub fn new(group: GroupKey, case: impl Into<String>, size: u64) -> Self {
        Self {
            group,
            case: case.into(),
            size,
        }
    }
}

/// Raw samples for every (group, case, size) that was observed.
///
/// Buckets are multisets: the order of samples inside a bucket carries no
/// meaning and may differ between runs. Views iterate in key order (group,
/// then case name, then ascending size).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurveAggregateMap {
    buckets: BTreeMap<BucketKey, Vec<f64>>,
}

impl CurveAggregateMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of buckets, empty ones included.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of samples across all buckets.
    pub fn sample_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Makes sure a bucket exists, creating it empty if needed.
    pub fn touch(&mut self, key: BucketKey) -> &mut Vec<f64> {
        self.buckets.entry(key).or_default()
    }

    /// Appends one sample.
    pub fn push(&mut self, key: BucketKey, value: f64) {
        self.touch(key).push(value);
    }

    pub fn get(&self, key: &BucketKey) -> Option<&[f64]> {
        self.buckets.get(key).map(Vec::as_slice)
    }

    /// Samples for one (group, case, size), if that bucket exists.
    pub fn samples(
        &self,
        group: &GroupKey,
        case: &str,
        size: u64,
    ) -> Option<&[f64]> {
        self.get(&BucketKey::new(group.clone(), case, size))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BucketKey, &[f64])> {
        self.buckets.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Distinct group keys, in key order.
    pub fn groups(&self) -> Vec<&GroupKey> {
        let mut groups: Vec<&GroupKey> = Vec::new();
        for key in self.buckets.keys() {
            if groups.last() != Some(&&key.group) {
                groups.push(&key.group);
            }
        }
        groups
    }

    /// Distinct case names observed for `group`, in name order.
    pub fn cases(&self, group: &GroupKey) -> Vec<&str> {
        let mut cases: Vec<&str> = Vec::new();
        for key in self.buckets.keys().filter(|k| &k.group == group) {
            if cases.last() != Some(&key.case.as_str()) {
                cases.push(&key.case);
            }
        }
        cases
    }

    /// The buckets of one (group, case), ascending by size.
    pub fn curve(&self, group: &GroupKey, case: &str) -> Vec<(u64, &[f64])> {
        let lo = BucketKey::new(group.clone(), case, 0);
        let hi = BucketKey::new(group.clone(), case, u64::MAX);
        self.buckets
            .range(lo..=hi)
            .map(|(k, v)| (k.size, v.as_slice()))
            .collect()
    }

    /// Moves every sample of `other` into `self`.
    pub fn merge(&mut self, other: CurveAggregateMap) {
        for (key, mut samples) in other.buckets {
            self.touch(key).append(&mut samples);
        }
    }

    /// Returns the map with every bucket sorted, for order-insensitive
    /// comparison.
    #[must_use]
    pub fn canonical(mut self) -> Self {
        for samples in self.buckets.values_mut() {
            samples.sort_by(f64::total_cmp);
        }
        self
    }
}

impl<'a> IntoIterator for &'a CurveAggregateMap {
    type Item = (&'a BucketKey, &'a Vec<f64>);
    type IntoIter = std::collections::btree_map::Iter<'a, BucketKey, Vec<f64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.iter()
    }
}
