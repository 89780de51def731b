//! Benchmark set discovery on disk.
//!
//! Each input directory is one case, named after the directory. Its child
//! directories are named after the input size they were measured at, and
//! every regular file below a size directory is one repetition:
//!
//! ```text
//! variadic_sum.recursive/
//!   10/rep0.json
//!   10/rep1.json
//!   20/rep0.json
//! ```
//!
//! Anything that does not fit the layout is reported and skipped.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracecurve_schemas::{
    BenchmarkCase, BenchmarkInstance, BenchmarkSet, Repetition,
};
use tracing::{info, instrument, warn};

/// Builds a benchmark set from case directories, in input order.
#[instrument(skip_all, fields(inputs = inputs.len()))]
pub fn build_benchmark_set(inputs: &[PathBuf]) -> Result<BenchmarkSet> {
    let mut cases = Vec::with_capacity(inputs.len());
    for input in inputs {
        if !input.is_dir() {
            warn!(path = %input.display(), "not a directory, skipping");
            continue;
        }
        cases.push(read_case(input)?);
    }

    let bset = BenchmarkSet::new(cases);
    info!(
        cases = bset.len(),
        repetitions = bset.repetition_count(),
        "benchmark set built"
    );
    Ok(bset)
}

fn read_case(dir: &Path) -> Result<BenchmarkCase> {
    let name = case_name(dir)?;
    let mut instances = Vec::new();

    for entry in sorted_entries(dir)? {
        let Some(size) = instance_size(&entry) else {
            warn!(
                path = %entry.display(),
                "entry is not a size directory, skipping"
            );
            continue;
        };
        let mut repetitions = Vec::new();
        collect_files(&entry, &mut repetitions)?;
        repetitions.sort();
        instances.push(BenchmarkInstance::new(
            size,
            repetitions.into_iter().map(Repetition::Path).collect(),
        ));
    }

    Ok(BenchmarkCase::new(name, instances))
}

/// Case name: the directory's own name, resolving `.` and `..` first.
fn case_name(dir: &Path) -> Result<String> {
    if let Some(name) = dir.file_name() {
        return Ok(name.to_string_lossy().into_owned());
    }
    let canonical = fs::canonicalize(dir)
        .with_context(|| format!("failed to resolve {}", dir.display()))?;
    Ok(canonical.file_name().map_or_else(
        || canonical.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    ))
}

fn instance_size(path: &Path) -> Option<u64> {
    if !path.is_dir() {
        return None;
    }
    path.file_name()?.to_str()?.parse().ok()
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("failed to list {}", dir.display()))?;
    entries.sort();
    Ok(entries)
}

/// Pushes every regular file below `dir`, recursively.
fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for path in sorted_entries(dir)? {
        if path.is_dir() {
            collect_files(&path, out)?;
        } else if path.is_file() {
            out.push(path);
        } else {
            warn!(
                path = %path.display(),
                "repetition is not a regular file, skipping"
            );
        }
    }
    Ok(())
}
