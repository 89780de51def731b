//! Curves and point clouds for one case, shared by compare and compare-by.

use serde_json::Value;
use tracecurve_predicates::ConfigError;
use tracecurve_schemas::{Curve, PointSet};
use tracecurve_stats::{average, median, stddev};

use crate::config::read_bool;

/// Which series to draw per case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesOptions {
    pub draw_average: bool,
    pub draw_median: bool,
    pub draw_points: bool,
    /// Attach the population standard deviation to the average curve.
    pub draw_stddev: bool,
}

impl Default for SeriesOptions {
    fn default() -> Self {
        Self {
            draw_average: true,
            draw_median: true,
            draw_points: true,
            draw_stddev: false,
        }
    }
}

impl SeriesOptions {
    pub fn from_config(config: &Value) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            draw_average: read_bool(config, "draw_average", defaults.draw_average)?,
            draw_median: read_bool(config, "draw_median", defaults.draw_median)?,
            draw_points: read_bool(config, "draw_points", defaults.draw_points)?,
            draw_stddev: read_bool(config, "draw_stddev", defaults.draw_stddev)?,
        })
    }
}

/// Series of one case, ready to append to an artifact.
#[derive(Debug, Default)]
pub(crate) struct CaseSeries {
    pub curves: Vec<Curve>,
    pub points: Vec<PointSet>,
}

#[expect(
    clippy::cast_precision_loss,
    reason = "benchmark sizes are small integers"
)]
pub(crate) fn size_to_x(size: u64) -> f64 {
    size as f64
}

/// Builds the series of `case` from its buckets, given ascending by size.
///
/// Empty buckets contribute no point to any series, and a series with no
/// points at all is left out.
pub(crate) fn case_series(
    case: &str,
    buckets: &[(u64, &[f64])],
    options: SeriesOptions,
) -> CaseSeries {
    let mut out = CaseSeries::default();

    if options.draw_average {
        let mut curve = Curve::new(format!("{case} average"), Vec::new(), Vec::new());
        let mut y_err = Vec::new();
        for &(size, samples) in buckets {
            if let (Some(mean), Some(sd)) = (average(samples), stddev(samples)) {
                curve.x.push(size_to_x(size));
                curve.y.push(mean);
                y_err.push(sd);
            }
        }
        if options.draw_stddev {
            curve.y_err = Some(y_err);
        }
        if !curve.is_empty() {
            out.curves.push(curve);
        }
    }

    if options.draw_median {
        let mut curve = Curve::new(format!("{case} median"), Vec::new(), Vec::new());
        for &(size, samples) in buckets {
            if let Some(m) = median(samples) {
                curve.x.push(size_to_x(size));
                curve.y.push(m);
            }
        }
        if !curve.is_empty() {
            out.curves.push(curve);
        }
    }

    if options.draw_points {
        let mut points = PointSet {
            label: format!("{case} points"),
            x: Vec::new(),
            y: Vec::new(),
        };
        for &(size, samples) in buckets {
            points.x.extend(std::iter::repeat_n(size_to_x(size), samples.len()));
            points.y.extend_from_slice(samples);
        }
        if !points.x.is_empty() {
            out.points.push(points);
        }
    }

    out
}

/// Makes one path component safe to use in an output stem.
pub(crate) fn stem_component(component: &str) -> String {
    component.replace('/', "_")
}
