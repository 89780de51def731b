//! Stacked-area plotter.
//!
//! One artifact per benchmark case. Each group descriptor contributes a band
//! whose height at a given size is the mean of that descriptor's samples
//! (or its mean at the previous size when there are none), and
//! bands are stacked in configuration order: the low edge of descriptor
//! `i + 1` is the high edge of descriptor `i`. All artifacts share the same
//! y range, from zero to the tallest stack of any case, so they can be
//! compared side by side.

use serde_json::{Value, json};
use tracecurve_aggregate::{
    CurveAggregateMap, GroupKey, GroupingSpec, aggregate_with_report,
};
use tracecurve_predicates::{ConfigError, ConstraintRegistry, resolve_all};
use tracecurve_schemas::{Band, BenchmarkSet, Curve, GroupDescriptor, PlotArtifact};
use tracecurve_stats::average;
use tracing::{info, instrument, warn};

use crate::config::{Presentation, extend_base, group_descriptors, value_path};
use crate::series::{size_to_x, stem_component};

pub(crate) const HELP: &str = "Stacked area chart per benchmark case. Each \
group descriptor is a layer whose height is the mean of its samples; every \
chart shares the y range of the tallest stack.";

pub(crate) fn default_config() -> Value {
    let descriptors = ["Total Frontend", "Total Backend"].map(|name| {
        GroupDescriptor::new(
            name,
            vec![json!({"type": "streq", "pointer": "/name", "string": name})],
        )
        .to_record()
    });
    extend_base(json!({
        "plotter": "stack",
        "value_json_pointer": "/dur",
        "group_descriptors": descriptors,
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
    let presentation = Presentation::from_config(config)?;

    let names: Vec<String> =
        descriptors.iter().map(|d| d.name().to_string()).collect();
    let (map, _) = aggregate_with_report(
        bset,
        &GroupingSpec::Static(descriptors),
        &value_path,
        &[],
    );

    let mut artifacts: Vec<PlotArtifact> = bset
        .iter()
        .map(|case| {
            let sizes: Vec<u64> = case.instances.iter().map(|i| i.size).collect();
            let mut artifact = stack_case(&map, &names, &case.name, &sizes);
            presentation.apply(&mut artifact);
            artifact
        })
        .collect();

    // Normalize every chart to the tallest stack.
    let y_max = artifacts
        .iter()
        .flat_map(|a| a.bands.last())
        .flat_map(|band| band.y_high.iter().copied())
        .fold(0.0, f64::max);
    for artifact in &mut artifacts {
        artifact.y_range = Some((0.0, y_max));
    }

    info!(artifacts = artifacts.len(), y_max, "stack plots built");
    Ok(artifacts)
}

/// Builds the stacked artifact of one case.
fn stack_case(
    map: &CurveAggregateMap,
    descriptors: &[String],
    case: &str,
    sizes: &[u64],
) -> PlotArtifact {
    let mut artifact = PlotArtifact::new(stem_component(case));
    artifact.title = case.to_string();

    let x: Vec<f64> = sizes.iter().copied().map(size_to_x).collect();
    let mut y_low = vec![0.0; sizes.len()];

    for name in descriptors {
        let group = GroupKey::named(name.as_str());
        // A size without samples repeats the previous size's mean (0 at
        // the first size), so a gap does not dent the stack.
        let mut last = 0.0;
        let means: Vec<f64> = sizes
            .iter()
            .map(|&size| {
                let samples = map.samples(&group, case, size).unwrap_or_default();
                match average(samples) {
                    Some(mean) => last = mean,
                    None => {
                        warn!(
                            descriptor = %name,
                            case,
                            size,
                            previous = last,
                            "no samples to stack, repeating previous value"
                        );
                    }
                }
                last
            })
            .collect();

        let y_high: Vec<f64> =
            y_low.iter().zip(&means).map(|(low, mean)| low + mean).collect();

        artifact.curves.push(Curve::new(name.as_str(), x.clone(), means));
        artifact.bands.push(Band {
            label: name.clone(),
            x: x.clone(),
            y_low,
            y_high: y_high.clone(),
        });
        y_low = y_high;
    }

    artifact
}
