//! Comparison keyed by event contents.
//!
//! Events passing the configured filters are grouped by the strings found at
//! `key_ptrs` (by default the event name and its detail). Each distinct key
//! gets a chart overlaying every benchmark case, so a template instantiation
//! or a header can be tracked across implementations.

use std::fmt::Write as _;

use cpp_demangle::Symbol;
use itertools::Itertools;
use rayon::prelude::*;
use serde_json::{Value, json};
use tracecurve_aggregate::{GroupKey, GroupingSpec, aggregate_with_report};
use tracecurve_predicates::{ConfigError, ConstraintRegistry};
use tracecurve_schemas::{BenchmarkSet, PlotArtifact};
use tracing::{info, instrument};

use crate::config::{
    Presentation, extend_base, filters, missing_key_policy, read_bool,
    read_pointer_array, value_path,
};
use crate::series::{SeriesOptions, case_series, stem_component};

pub(crate) const HELP: &str = "Groups events by the strings found at \
key_ptrs and draws one chart per distinct key, comparing every benchmark \
case. Optional filters narrow the events first; demangle makes mangled C++ \
symbols readable in output names.";

/// Output stem for an empty key.
const EMPTY_KEY_STEM: &str = "empty";

pub(crate) fn default_config() -> Value {
    extend_base(json!({
        "plotter": "compare_by",
        "key_ptrs": ["/name", "/args/detail"],
        "value_json_pointer": "/dur",
        "draw_average": true,
        "draw_median": true,
        "draw_points": true,
        "draw_stddev": false,
        "demangle": true,
        "missing_key_policy": "truncate",
        "filters": [
            {"type": "regex", "pointer": "/name", "regex": ".*"},
        ],
    }))
}

/// Demangles an Itanium C++ symbol, returning other strings unchanged.
pub fn demangle(symbol: &str) -> String {
    if !symbol.starts_with("_Z") {
        return symbol.to_string();
    }
    let mut out = String::new();
    match Symbol::new(symbol.as_bytes()) {
        Ok(parsed) if write!(out, "{parsed}").is_ok() => out,
        _ => symbol.to_string(),
    }
}

/// Turns a key into an output stem: components joined with `/`, slashes
/// inside a component replaced by `_`.
pub fn key_stem(key: &GroupKey, demangle_symbols: bool) -> String {
    let components = key.components();
    if components.is_empty() {
        return EMPTY_KEY_STEM.to_string();
    }
    components
        .iter()
        .map(|component| {
            if demangle_symbols {
                stem_component(&demangle(component))
            } else {
                stem_component(component)
            }
        })
        .join("/")
}

#[instrument(skip_all, fields(cases = bset.len()))]
pub(crate) fn run(
    bset: &BenchmarkSet,
    config: &Value,
    registry: &ConstraintRegistry,
) -> Result<Vec<PlotArtifact>, ConfigError> {
    let key_paths = read_pointer_array(config, "key_ptrs")?;
    let grouping = GroupingSpec::Dynamic {
        key_paths,
        missing_keys: missing_key_policy(config)?,
    };
    let filters = filters(config, registry)?;
    let value_path = value_path(config)?;
    let options = SeriesOptions::from_config(config)?;
    let demangle_symbols = read_bool(config, "demangle", true)?;
    let presentation = Presentation::from_config(config)?;

    let (map, _) = aggregate_with_report(bset, &grouping, &value_path, &filters);

    // Groups come out of the map already sorted; each chart only reads its
    // own slice of the map.
    let artifacts: Vec<PlotArtifact> = map
        .groups()
        .into_par_iter()
        .map(|group| {
            let mut artifact = PlotArtifact::new(key_stem(group, demangle_symbols));
            presentation.apply(&mut artifact);
            for case in bset {
                let series =
                    case_series(&case.name, &map.curve(group, &case.name), options);
                artifact.curves.extend(series.curves);
                artifact.points.extend(series.points);
            }
            artifact
        })
        .collect();

    info!(artifacts = artifacts.len(), "compare-by plots built");
    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use tracecurve_schemas::{BenchmarkCase, BenchmarkInstance, Repetition};

    use super::*;
    use crate::config::merge_config;

    fn fields(items: &[&str]) -> GroupKey {
        GroupKey::Fields(items.iter().map(|s| (*s).to_string()).collect())
    }

    #[test]
    fn stems() {
        assert_eq!(key_stem(&fields(&[]), false), "empty");
        assert_eq!(
            key_stem(&fields(&["Source", "/usr/include/vector"]), false),
            "Source/_usr_include_vector"
        );
        assert_eq!(
            key_stem(&fields(&["InstantiateFunction", "_Z3foov"]), true),
            "InstantiateFunction/foo()"
        );
        assert_eq!(
            key_stem(&fields(&["InstantiateFunction", "_Z3foov"]), false),
            "InstantiateFunction/_Z3foov"
        );
    }

    #[test]
    fn demangle_leaves_plain_names() {
        assert_eq!(demangle("std::vector<int>"), "std::vector<int>");
        assert_eq!(demangle("_Z!!"), "_Z!!");
        assert_eq!(demangle("_Z3foov"), "foo()");
    }

    #[test]
    fn one_chart_per_key_sorted() {
        let events = json!([
            {"name": "InstantiateClass", "args": {"detail": "B"}, "dur": 4},
            {"name": "InstantiateClass", "args": {"detail": "A"}, "dur": 2},
            {"name": "InstantiateClass", "args": {"detail": "A"}, "dur": 6},
            {"name": "Source", "args": {"detail": "x.hpp"}, "dur": 100},
            {"name": "Total Frontend", "dur": 1000},
        ]);
        let bset = BenchmarkSet::new(vec![BenchmarkCase::new(
            "case",
            vec![BenchmarkInstance::new(
                3,
                vec![Repetition::Loaded(json!({"traceEvents": events}))],
            )],
        )]);
        let config = merge_config(
            &default_config(),
            &json!({
                "filters": [
                    {"type": "regex", "pointer": "/name", "regex": "Instantiate.*|Total.*"},
                ],
                "draw_points": false,
                "draw_median": false,
            }),
        );

        let artifacts = run(&bset, &config, &ConstraintRegistry::default()).unwrap();
        let stems: Vec<_> = artifacts.iter().map(|a| a.path_stem.as_str()).collect();
        // "Total Frontend" has no detail and is truncated to a one-part key.
        assert_eq!(
            stems,
            ["InstantiateClass/A", "InstantiateClass/B", "Total Frontend"]
        );
        assert_eq!(artifacts[0].curves[0].label, "case average");
        assert_eq!(artifacts[0].curves[0].y, [4.0]);
        assert!(artifacts[0].points.is_empty());
    }

    #[test]
    fn drop_policy_skips_incomplete_keys() {
        let bset = BenchmarkSet::new(vec![BenchmarkCase::new(
            "case",
            vec![BenchmarkInstance::new(
                1,
                vec![Repetition::Loaded(json!({"traceEvents": [
                    {"name": "Total Frontend", "dur": 1},
                    {"name": "Source", "args": {"detail": "a.hpp"}, "dur": 2},
                ]}))],
            )],
        )]);
        let config = merge_config(
            &default_config(),
            &json!({"missing_key_policy": "drop"}),
        );
        let artifacts = run(&bset, &config, &ConstraintRegistry::default()).unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].path_stem, "Source/a.hpp");
    }

    #[test]
    fn key_ptrs_required() {
        let err = run(
            &BenchmarkSet::default(),
            &json!({}),
            &ConstraintRegistry::default(),
        )
        .unwrap_err();
        assert!(err.is_config_key());
    }
}
