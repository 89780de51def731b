//! On-disk output for plot artifacts.
//!
//! Every artifact is written as pretty-printed JSON to
//! `<dest>/<path_stem>.json`. An `index.json` manifest next to them lists
//! the written files along with [`RenderHints`] for whatever turns them into
//! images.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use tracecurve_schemas::PlotArtifact;
use tracing::{debug, info, instrument, warn};

/// Name of the manifest written next to the artifacts.
pub const INDEX_FILE: &str = "index.json";

const ARTIFACT_EXTENSION: &str = ".json";

/// Longest file name most filesystems accept, in bytes.
const MAX_FILE_NAME: usize = 255;

/// Image settings forwarded from the plotter configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderHints {
    pub plot_file_extensions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,
}

impl RenderHints {
    pub fn new(config: &Value, plot_file_extensions: Vec<String>) -> Self {
        Self {
            plot_file_extensions,
            width: config.get("width").and_then(Value::as_u64),
            height: config.get("height").and_then(Value::as_u64),
        }
    }
}

#[derive(Serialize)]
struct Index<'a> {
    #[serde(flatten)]
    hints: &'a RenderHints,
    artifacts: Vec<IndexEntry<'a>>,
}

#[derive(Serialize)]
struct IndexEntry<'a> {
    path_stem: &'a str,
    title: &'a str,
    /// Written file, relative to the destination directory.
    file: String,
}

/// Writes `artifacts` and the manifest under `dest`, creating directories
/// as needed. Returns the manifest path.
#[instrument(skip_all, fields(dest = %dest.display(), artifacts = artifacts.len()))]
pub fn write_artifacts(
    dest: &Path,
    artifacts: &[PlotArtifact],
    hints: &RenderHints,
) -> Result<PathBuf> {
    // The manifest name is taken up front so a clashing stem is reported.
    let mut written = HashSet::from([PathBuf::from(INDEX_FILE)]);
    let mut entries = Vec::with_capacity(artifacts.len());

    for artifact in artifacts {
        let relative = artifact_path(&artifact.path_stem);
        if !written.insert(relative.clone()) {
            warn!(
                path_stem = %artifact.path_stem,
                file = %relative.display(),
                "output file already written, overwriting"
            );
        }
        write_json(&dest.join(&relative), artifact)?;
        debug!(file = %relative.display(), "artifact written");

        entries.push(IndexEntry {
            path_stem: &artifact.path_stem,
            title: &artifact.title,
            file: relative.to_string_lossy().into_owned(),
        });
    }

    let entries_len = entries.len();
    let index_path = dest.join(INDEX_FILE);
    write_json(
        &index_path,
        &Index {
            hints,
            artifacts: entries,
        },
    )?;
    info!(files = entries_len, "plot artifacts written");
    Ok(index_path)
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| {
            format!("failed to create directory {}", parent.display())
        })?;
    }
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("failed to write {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Relative output path of a stem.
///
/// Components that would leave the destination (`..`, `.`, empty) become
/// `_`, and every component is cut to the file name limit.
fn artifact_path(stem: &str) -> PathBuf {
    let components: Vec<&str> = stem.split('/').collect();
    let last = components.len() - 1;

    let mut path = PathBuf::new();
    for (i, component) in components.into_iter().enumerate() {
        let component = match component {
            "" | "." | ".." => "_",
            other => other,
        };
        if i == last {
            let name = truncate(component, MAX_FILE_NAME - ARTIFACT_EXTENSION.len());
            path.push(format!("{name}{ARTIFACT_EXTENSION}"));
        } else {
            path.push(truncate(component, MAX_FILE_NAME));
        }
    }
    path
}

/// Cuts `s` to at most `max` bytes on a char boundary.
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
