//! Structural report of a benchmark set. No aggregation, no charts.

use std::io::Write;

use serde::Serialize;
use serde_json::{Value, json};
use tracecurve_schemas::BenchmarkSet;

pub(crate) const HELP: &str = "Debug plotter. Reports the cases, sizes and \
repetition counts of the benchmark set, to check how it was built.";

pub(crate) fn default_config() -> Value {
    json!({"plotter": "debug"})
}

/// Shape of one instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceSummary {
    pub size: u64,
    pub repetitions: usize,
}

/// Shape of one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseSummary {
    pub name: String,
    pub instances: Vec<InstanceSummary>,
}

/// Case, instance and repetition counts of a benchmark set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DebugReport {
    pub cases: Vec<CaseSummary>,
}

impl DebugReport {
    pub fn new(bset: &BenchmarkSet) -> Self {
        let cases = bset
            .iter()
            .map(|case| CaseSummary {
                name: case.name.clone(),
                instances: case
                    .instances
                    .iter()
                    .map(|instance| InstanceSummary {
                        size: instance.size,
                        repetitions: instance.repetitions.len(),
                    })
                    .collect(),
            })
            .collect();
        Self { cases }
    }

    pub fn repetition_count(&self) -> usize {
        self.cases
            .iter()
            .flat_map(|c| &c.instances)
            .map(|i| i.repetitions)
            .sum()
    }

    /// Writes the report as indented text.
    pub fn write_report(&self, mut w: impl Write) -> std::io::Result<()> {
        writeln!(w, "Cases:       {}", self.cases.len())?;
        writeln!(w, "Repetitions: {}", self.repetition_count())?;

        for case in &self.cases {
            writeln!(w)?;
            writeln!(w, "Case: {}", case.name)?;
            writeln!(w, "  Instances: {}", case.instances.len())?;
            for instance in &case.instances {
                writeln!(
                    w,
                    "    size {:>8}  repetitions {:>4}",
                    instance.size, instance.repetitions
                )?;
            }
        }
        Ok(())
    }
}
