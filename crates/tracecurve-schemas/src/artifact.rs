//! Plot artifact schema.
//!
//! A [`PlotArtifact`] describes one chart: its output stem, axis labels and
//! the series to draw. It carries coordinates only; turning it into SVG, PNG
//! or anything else is the job of an external sink.

use serde::{Deserialize, Serialize};

/// A labelled polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Optional symmetric error per point (same length as `y`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_err: Option<Vec<f64>>,
}

impl Curve {
    pub fn new(label: impl Into<String>, x: Vec<f64>, y: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            x,
            y,
            y_err: None,
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// A labelled point cloud (raw samples).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSet {
    pub label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// A filled area between two curves sharing the same x coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub label: String,
    pub x: Vec<f64>,
    pub y_low: Vec<f64>,
    pub y_high: Vec<f64>,
}

/// One chart produced by a plotting strategy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlotArtifact {
    /// Output location relative to the sink's destination, without
    /// extension. May contain `/` to nest outputs.
    pub path_stem: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend_title: Option<String>,
    /// Fixed y axis range, when the strategy normalizes across artifacts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_range: Option<(f64, f64)>,
    #[serde(default)]
    pub curves: Vec<Curve>,
    #[serde(default)]
    pub points: Vec<PointSet>,
    #[serde(default)]
    pub bands: Vec<Band>,
}

impl PlotArtifact {
    /// Creates an empty artifact titled after its stem.
    pub fn new(path_stem: impl Into<String>) -> Self {
        let path_stem = path_stem.into();
        Self {
            title: path_stem.clone(),
            path_stem,
            ..Self::default()
        }
    }

    /// Returns true if the artifact has nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty() && self.points.is_empty() && self.bands.is_empty()
    }
}
