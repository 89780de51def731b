//! Counters describing what an aggregation run did.

use std::fmt;

use serde::Serialize;

/// Summary of one aggregation run.
///
/// Every data problem the engine tolerates is counted here, so callers can
/// decide after the fact whether the result is trustworthy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregateReport {
    /// Repetitions whose events were scanned.
    pub repetitions_loaded: usize,
    /// Repetitions that could not be read, parsed, or had no `traceEvents`.
    pub repetitions_skipped: usize,
    /// Instances that had no repetitions at all.
    pub empty_instances: usize,
    pub events_seen: usize,
    /// Events selected by at least one group.
    pub events_matched: usize,
    /// Selected events without a number at the value path.
    pub values_missing: usize,
    /// Samples appended to buckets. An event in several groups counts once
    /// per group.
    pub samples_stored: usize,
    /// Static buckets that ended up with no samples.
    pub empty_buckets: usize,
}

impl AggregateReport {
    /// Adds the counters of `other` into `self`.
    pub fn merge(&mut self, other: &AggregateReport) {
        self.repetitions_loaded += other.repetitions_loaded;
        self.repetitions_skipped += other.repetitions_skipped;
        self.empty_instances += other.empty_instances;
        self.events_seen += other.events_seen;
        self.events_matched += other.events_matched;
        self.values_missing += other.values_missing;
        self.samples_stored += other.samples_stored;
        self.empty_buckets += other.empty_buckets;
    }

    /// Returns true if no data problem was tolerated.
    pub fn is_clean(&self) -> bool {
        self.repetitions_skipped == 0
            && self.empty_instances == 0
            && self.values_missing == 0
            && self.empty_buckets == 0
    }
}

impl fmt::Display for AggregateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} repetitions loaded ({} skipped), {} of {} events matched, \
             {} samples stored, {} values missing, {} empty buckets",
            self.repetitions_loaded,
            self.repetitions_skipped,
            self.events_matched,
            self.events_seen,
            self.samples_stored,
            self.values_missing,
            self.empty_buckets,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_sums_counters() {
        let mut a = AggregateReport {
            repetitions_loaded: 2,
            events_seen: 10,
            ..AggregateReport::default()
        };
        let b = AggregateReport {
            repetitions_loaded: 1,
            repetitions_skipped: 1,
            events_seen: 5,
            ..AggregateReport::default()
        };
        assert!(a.is_clean());
        a.merge(&b);
        assert_eq!(a.repetitions_loaded, 3);
        assert_eq!(a.events_seen, 15);
        assert!(!a.is_clean());
        assert!(a.to_string().contains("1 skipped"));
    }
}
