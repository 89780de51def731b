//! Cross-case comparison, one chart per group descriptor.

use serde_json::{Value, json};
use tracecurve_aggregate::{GroupKey, GroupingSpec, aggregate_with_report};
use tracecurve_predicates::{ConfigError, ConstraintRegistry, resolve_all};
use tracecurve_schemas::{BenchmarkSet, GroupDescriptor, PlotArtifact};
use tracing::{info, instrument};

use crate::config::{Presentation, extend_base, group_descriptors, value_path};
use crate::series::{SeriesOptions, case_series, stem_component};

pub(crate) const HELP: &str = "Compares benchmark cases for each group \
descriptor. Every descriptor gets its own chart, where each case is drawn as \
average and median curves plus its raw samples.";

pub(crate) fn default_config() -> Value {
    let catch_all = GroupDescriptor::catch_all().to_record();
    extend_base(json!({
        "plotter": "compare",
        "value_json_pointer": "/dur",
        "draw_average": true,
        "draw_median": true,
        "draw_points": true,
        "draw_stddev": false,
        "group_descriptors": [catch_all],
    }))
}

#[instrument(skip_all, fields(cases = bset.len()))]
pub(crate) fn run(
    bset: &BenchmarkSet,
    config: &Value,
    registry: &ConstraintRegistry,
) -> Result<Vec<PlotArtifact>, ConfigError> {
    let descriptors = resolve_all(registry, &group_descriptors(config)?)?;
    let value_path = value_path(config)?;
    let options = SeriesOptions::from_config(config)?;
    let presentation = Presentation::from_config(config)?;

    let names: Vec<String> =
        descriptors.iter().map(|d| d.name().to_string()).collect();
    let (map, _) = aggregate_with_report(
        bset,
        &GroupingSpec::Static(descriptors),
        &value_path,
        &[],
    );

    let artifacts: Vec<PlotArtifact> = names
        .iter()
        .map(|name| {
            let group = GroupKey::named(name.as_str());
            let mut artifact = PlotArtifact::new(stem_component(name));
            artifact.title.clone_from(name);
            presentation.apply(&mut artifact);

            // Cases overlay in benchmark set order.
            for case in bset {
                let series =
                    case_series(&case.name, &map.curve(&group, &case.name), options);
                artifact.curves.extend(series.curves);
                artifact.points.extend(series.points);
            }
            artifact
        })
        .collect();

    info!(artifacts = artifacts.len(), "compare plots built");
    Ok(artifacts)
}
