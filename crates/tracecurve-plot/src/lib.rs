//! Plotting strategies.
//!
//! A plotter turns a [`BenchmarkSet`] and a JSON configuration into
//! rendering-agnostic [`PlotArtifact`]s (or, for `debug`, a text report).
//! Plotters are selected by name through [`PlotterKind::from_name`]:
//!
//! | name         | output                                              |
//! |--------------|-----------------------------------------------------|
//! | `stack`      | one stacked-area chart per case                     |
//! | `compare`    | one chart per group descriptor, cases overlaid      |
//! | `compare_by` | one chart per distinct event key, cases overlaid    |
//! | `debug`      | a [`DebugReport`] of the benchmark set's shape      |
//!
//! Configuration is validated before any trace file is read, so a bad
//! configuration fails fast with a [`ConfigError`].

mod compare;
mod compare_by;
pub mod config;
mod debug;
mod series;
mod stack;

use std::fmt;

use serde_json::Value;
use tracecurve_predicates::{ConfigError, ConstraintRegistry};
use tracecurve_schemas::{BenchmarkSet, PlotArtifact};
use tracing::info_span;

pub use compare_by::{demangle, key_stem};
pub use config::merge_config;
pub use debug::{CaseSummary, DebugReport, InstanceSummary};
pub use series::SeriesOptions;

/// Available plotters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlotterKind {
    Stack,
    Compare,
    CompareBy,
    Debug,
}

/// Name table used to resolve plotters.
const PLOTTERS: [(&str, PlotterKind); 4] = [
    ("stack", PlotterKind::Stack),
    ("compare", PlotterKind::Compare),
    ("compare_by", PlotterKind::CompareBy),
    ("debug", PlotterKind::Debug),
];

/// What a plotter produced.
#[derive(Debug, Clone, PartialEq)]
pub enum PlotOutput {
    /// Charts for the rendering sink, with the file formats it should emit.
    Artifacts {
        artifacts: Vec<PlotArtifact>,
        file_extensions: Vec<String>,
    },
    /// A text report for the logging sink.
    Report(DebugReport),
}

impl PlotterKind {
    /// Every plotter, in name table order.
    pub fn all() -> impl Iterator<Item = PlotterKind> {
        PLOTTERS.into_iter().map(|(_, kind)| kind)
    }

    /// Names accepted by [`PlotterKind::from_name`].
    pub fn names() -> impl Iterator<Item = &'static str> {
        PLOTTERS.into_iter().map(|(name, _)| name)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        PLOTTERS
            .into_iter()
            .find_map(|(n, kind)| (n == name).then_some(kind))
    }

    /// Resolves a name, or fails with the list of known plotters.
    pub fn resolve(name: &str) -> Result<Self, ConfigError> {
        Self::from_name(name)
            .ok_or_else(|| ConfigError::unknown_plotter(name, Self::names()))
    }

    pub fn name(self) -> &'static str {
        match self {
            PlotterKind::Stack => "stack",
            PlotterKind::Compare => "compare",
            PlotterKind::CompareBy => "compare_by",
            PlotterKind::Debug => "debug",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            PlotterKind::Stack => stack::HELP,
            PlotterKind::Compare => compare::HELP,
            PlotterKind::CompareBy => compare_by::HELP,
            PlotterKind::Debug => debug::HELP,
        }
    }

    /// The plotter's default configuration. Pure: every call returns the
    /// same value.
    pub fn default_config(self) -> Value {
        match self {
            PlotterKind::Stack => stack::default_config(),
            PlotterKind::Compare => compare::default_config(),
            PlotterKind::CompareBy => compare_by::default_config(),
            PlotterKind::Debug => debug::default_config(),
        }
    }

    /// Runs the plotter with the built-in constraint kinds.
    ///
    /// `config` is used as given; merge it over [`default_config`] first to
    /// get the documented defaults.
    ///
    /// [`default_config`]: PlotterKind::default_config
    pub fn run(
        self,
        bset: &BenchmarkSet,
        config: &Value,
    ) -> Result<PlotOutput, ConfigError> {
        self.run_with(&ConstraintRegistry::default(), bset, config)
    }

    /// Runs the plotter, compiling constraints through `registry`.
    pub fn run_with(
        self,
        registry: &ConstraintRegistry,
        bset: &BenchmarkSet,
        config: &Value,
    ) -> Result<PlotOutput, ConfigError> {
        let _span = info_span!("plot", plotter = self.name()).entered();

        let artifacts = match self {
            PlotterKind::Debug => {
                return Ok(PlotOutput::Report(DebugReport::new(bset)));
            }
            PlotterKind::Stack => stack::run(bset, config, registry)?,
            PlotterKind::Compare => compare::run(bset, config, registry)?,
            PlotterKind::CompareBy => compare_by::run(bset, config, registry)?,
        };
        Ok(PlotOutput::Artifacts {
            artifacts,
            file_extensions: config::plot_file_extensions(config)?,
        })
    }
}

impl fmt::Display for PlotterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Default configuration of the named plotter.
pub fn default_config(name: &str) -> Result<Value, ConfigError> {
    PlotterKind::resolve(name).map(PlotterKind::default_config)
}
