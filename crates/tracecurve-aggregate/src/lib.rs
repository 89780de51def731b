//! Aggregation engine: from a benchmark set to sample buckets.
//!
//! [`aggregate`] walks every repetition of every instance of every case,
//! selects events by a [`GroupingSpec`], reads one number per selected event
//! and appends it to the bucket for `(group, case, size)`.
//!
//! Repetitions are independent, so they are processed in parallel: each
//! rayon worker folds its share into a private [`CurveAggregateMap`], and the
//! partial maps are merged at the end. Appending is commutative, so bucket
//! contents do not depend on scheduling (up to the order of samples inside a
//! bucket).
//!
//! Data problems never fail the run. A repetition that cannot be loaded is
//! skipped, an event without a value is dropped, and every such case is
//! logged and counted in the [`AggregateReport`].

mod grouping;
mod map;
mod report;

use rayon::prelude::*;
use serde_json::Value;
use tracecurve_predicates::Predicate;
use tracecurve_schemas::record::lookup_number;
use tracecurve_schemas::{BenchmarkSet, Repetition};
use tracing::{debug, debug_span, info, instrument, warn};

pub use grouping::{GroupingSpec, MissingKeyPolicy};
pub use map::{BucketKey, CurveAggregateMap, GroupKey};
pub use report::AggregateReport;

/// Default value path: trace event duration.
pub const DEFAULT_VALUE_PATH: &str = "/dur";

/// One repetition to scan, with the bucket coordinates it feeds.
struct WorkUnit<'a> {
    case: &'a str,
    size: u64,
    repetition: &'a Repetition,
}

/// Aggregates `bset` into sample buckets.
///
/// See [`aggregate_with_report`] for the counters of what was skipped.
pub fn aggregate(
    bset: &BenchmarkSet,
    grouping: &GroupingSpec,
    value_path: &str,
    filters: &[Predicate],
) -> CurveAggregateMap {
    aggregate_with_report(bset, grouping, value_path, filters).0
}

/// Aggregates `bset` and reports what happened along the way.
///
/// `filters` must all hold for an event to be considered under dynamic
/// grouping; static grouping ignores them. In static mode every
/// (descriptor, case, size) bucket exists in the result, empty ones
/// included, and each empty one is warned about once.
#[instrument(
    skip_all,
    fields(
        cases = bset.len(),
        repetitions = bset.repetition_count(),
        value_path = value_path,
    )
)]
pub fn aggregate_with_report(
    bset: &BenchmarkSet,
    grouping: &GroupingSpec,
    value_path: &str,
    filters: &[Predicate],
) -> (CurveAggregateMap, AggregateReport) {
    let mut map = CurveAggregateMap::new();
    let mut report = AggregateReport::default();

    let mut units = Vec::with_capacity(bset.repetition_count());
    for case in bset {
        for instance in &case.instances {
            if instance.repetitions.is_empty() {
                warn!(
                    case = %case.name,
                    size = instance.size,
                    "instance has no repetitions"
                );
                report.empty_instances += 1;
            }
            // Static buckets exist even when nothing lands in them, so the
            // plotters see every size of every case.
            if let GroupingSpec::Static(descriptors) = grouping {
                for descriptor in descriptors {
                    map.touch(BucketKey::new(
                        GroupKey::named(descriptor.name()),
                        &case.name,
                        instance.size,
                    ));
                }
            }
            units.extend(instance.repetitions.iter().map(|repetition| WorkUnit {
                case: &case.name,
                size: instance.size,
                repetition,
            }));
        }
    }

    let (partial_map, partial_report) = units
        // Each repetition is an independent unit of work...
        .par_iter()
        // ...folded into a worker-private map and report...
        .fold_with(
            (CurveAggregateMap::new(), AggregateReport::default()),
            |(mut map, mut report), unit| {
                scan_repetition(
                    unit,
                    grouping,
                    value_path,
                    filters,
                    &mut map,
                    &mut report,
                );
                (map, report)
            },
        )
        // ...which are merged once every worker is done.
        .reduce(
            || (CurveAggregateMap::new(), AggregateReport::default()),
            |(mut map, mut report), (more_map, more_report)| {
                map.merge(more_map);
                report.merge(&more_report);
                (map, report)
            },
        );
    map.merge(partial_map);
    report.merge(&partial_report);

    if matches!(grouping, GroupingSpec::Static(_)) {
        for (key, samples) in map.iter() {
            if samples.is_empty() {
                warn!(
                    descriptor = %key.group,
                    case = %key.case,
                    size = key.size,
                    "no samples for group"
                );
                report.empty_buckets += 1;
            }
        }
    }

    info!(
        buckets = map.len(),
        repetitions_loaded = report.repetitions_loaded,
        repetitions_skipped = report.repetitions_skipped,
        events_seen = report.events_seen,
        events_matched = report.events_matched,
        samples_stored = report.samples_stored,
        values_missing = report.values_missing,
        empty_buckets = report.empty_buckets,
        "aggregation complete"
    );

    (map, report)
}

/// Scans one repetition into `map`, counting into `report`.
fn scan_repetition(
    unit: &WorkUnit<'_>,
    grouping: &GroupingSpec,
    value_path: &str,
    filters: &[Predicate],
    map: &mut CurveAggregateMap,
    report: &mut AggregateReport,
) {
    let _span = debug_span!(
        "scan_repetition",
        case = unit.case,
        size = unit.size,
        repetition = %unit.repetition
    )
    .entered();

    let scanned = unit.repetition.with_trace_events(|events| {
        let mut scan = AggregateReport::default();
        for event in events {
            scan.events_seen += 1;
            let keys = grouping.keys_for(event, filters);
            if keys.is_empty() {
                continue;
            }
            scan.events_matched += 1;

            let Some(value) = lookup_number(event, value_path) else {
                debug!(
                    event = %event_name(event),
                    value_path,
                    "event has no numeric value, skipping"
                );
                scan.values_missing += 1;
                continue;
            };
            for group in keys {
                map.push(BucketKey::new(group, unit.case, unit.size), value);
                scan.samples_stored += 1;
            }
        }
        scan
    });

    match scanned {
        Ok(scan) => {
            if scan.values_missing > 0 {
                warn!(
                    repetition = %unit.repetition,
                    missing = scan.values_missing,
                    value_path,
                    "selected events without a numeric value were dropped"
                );
            }
            report.merge(&scan);
            report.repetitions_loaded += 1;
        }
        Err(e) => {
            warn!(
                repetition = %unit.repetition,
                error = %e,
                "skipping repetition"
            );
            report.repetitions_skipped += 1;
        }
    }
}

/// Short description of an event for log lines.
fn event_name(event: &Value) -> &str {
    event.get("name").and_then(Value::as_str).unwrap_or("<unnamed>")
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tracecurve_predicates::resolve;
    use tracecurve_schemas::{BenchmarkCase, BenchmarkInstance, GroupDescriptor};

    use super::*;

    fn trace(events: Value) -> Repetition {
        Repetition::Loaded(json!({ "traceEvents": events }))
    }

    fn catch_all() -> GroupingSpec {
        GroupingSpec::Static(vec![resolve(&GroupDescriptor::catch_all()).unwrap()])
    }

    #[test]
    fn empty_set_gives_empty_map() {
        let (map, report) = aggregate_with_report(
            &BenchmarkSet::default(),
            &catch_all(),
            DEFAULT_VALUE_PATH,
            &[],
        );
        assert!(map.is_empty());
        assert_eq!(report, AggregateReport::default());
    }

    #[test]
    fn empty_instance_warns_and_keeps_bucket() {
        let bset = BenchmarkSet::new(vec![BenchmarkCase::new(
            "foo",
            vec![BenchmarkInstance::new(10, vec![])],
        )]);
        let (map, report) =
            aggregate_with_report(&bset, &catch_all(), DEFAULT_VALUE_PATH, &[]);
        assert_eq!(report.empty_instances, 1);
        assert_eq!(report.empty_buckets, 1);
        assert_eq!(map.samples(&GroupKey::named("All"), "foo", 10), Some(&[][..]));
    }

    #[test]
    fn missing_trace_events_is_skipped() {
        let bset = BenchmarkSet::new(vec![BenchmarkCase::new(
            "foo",
            vec![BenchmarkInstance::new(
                10,
                vec![
                    Repetition::Loaded(json!({"events": []})),
                    trace(json!([{"name": "Source", "dur": 3}])),
                ],
            )],
        )]);
        let (map, report) =
            aggregate_with_report(&bset, &catch_all(), DEFAULT_VALUE_PATH, &[]);
        assert_eq!(report.repetitions_skipped, 1);
        assert_eq!(report.repetitions_loaded, 1);
        assert_eq!(map.samples(&GroupKey::named("All"), "foo", 10), Some(&[3.0][..]));
    }

    #[test]
    fn custom_value_path_and_wrong_types() {
        let bset = BenchmarkSet::new(vec![BenchmarkCase::new(
            "foo",
            vec![BenchmarkInstance::new(
                1,
                vec![trace(json!([
                    {"name": "a", "args": {"count": 4}},
                    {"name": "b", "args": {"count": "four"}},
                    {"name": "c"},
                ]))],
            )],
        )]);
        let (map, report) =
            aggregate_with_report(&bset, &catch_all(), "/args/count", &[]);
        assert_eq!(report.events_matched, 3);
        assert_eq!(report.values_missing, 2);
        assert_eq!(map.samples(&GroupKey::named("All"), "foo", 1), Some(&[4.0][..]));
    }

    #[test]
    fn dynamic_grouping_has_no_empty_buckets() {
        let bset = BenchmarkSet::new(vec![BenchmarkCase::new(
            "foo",
            vec![
                BenchmarkInstance::new(1, vec![trace(json!([{"name": "x", "dur": 1}]))]),
                BenchmarkInstance::new(2, vec![trace(json!([{"name": "y", "dur": 2}]))]),
            ],
        )]);
        let grouping = GroupingSpec::dynamic(vec!["/name".into()]);
        let (map, report) =
            aggregate_with_report(&bset, &grouping, DEFAULT_VALUE_PATH, &[]);
        assert_eq!(map.len(), 2);
        assert_eq!(report.empty_buckets, 0);
        let x = GroupKey::Fields(vec!["x".into()]);
        assert_eq!(map.curve(&x, "foo"), [(1, &[1.0][..])]);
    }
}
