//! Benchmark set schema: cases, size instances, and repetitions.
//!
//! ## Terminology
//!
//! - **Case**: a named benchmark (e.g. `variadic_sum.recursive`).
//! - **Instance**: one input size of a case. Holds every repetition that was
//!   measured at that size.
//! - **Repetition**: a single trace-event log, either on disk or already
//!   loaded into memory.
//!
//! A [`BenchmarkSet`] is an ordered list of cases and is the only input the
//! aggregation engine needs.

use std::borrow::Cow;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use serde_json::Value;

use crate::error::{LoadError, LoadErrorKind};

/// Top-level field holding the event array in a trace-event log.
pub const TRACE_EVENTS_FIELD: &str = "traceEvents";

/// One trace-event log.
#[derive(Debug, Clone, PartialEq)]
pub enum Repetition {
    /// A JSON file that is read on demand.
    Path(PathBuf),
    /// A record that is already in memory.
    Loaded(Value),
}

impl Repetition {
    /// Loads the repetition's record.
    ///
    /// In-memory records are borrowed; files are read and parsed each call.
    pub fn load(&self) -> Result<Cow<'_, Value>, LoadError> {
        match self {
            Repetition::Loaded(record) => Ok(Cow::Borrowed(record)),
            Repetition::Path(path) => {
                let file = File::open(path).map_err(|source| {
                    LoadError::new(LoadErrorKind::Io {
                        path: path.clone(),
                        source,
                    })
                })?;
                let record = serde_json::from_reader(BufReader::new(file))
                    .map_err(|source| {
                        LoadError::new(LoadErrorKind::Parse {
                            path: path.clone(),
                            source,
                        })
                    })?;
                Ok(Cow::Owned(record))
            }
        }
    }

    /// Loads the repetition and hands its `traceEvents` array to `f`.
    ///
    /// Fails if the record cannot be loaded or has no `traceEvents` array.
    pub fn with_trace_events<R>(
        &self,
        f: impl FnOnce(&[Value]) -> R,
    ) -> Result<R, LoadError> {
        let record = self.load()?;
        let events = trace_events(&record).ok_or_else(|| {
            LoadError::new(LoadErrorKind::MissingTraceEvents {
                origin: self.to_string(),
            })
        })?;
        Ok(f(events))
    }
}

impl fmt::Display for Repetition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Repetition::Path(path) => write!(f, "{}", path.display()),
            Repetition::Loaded(_) => f.write_str("<in-memory record>"),
        }
    }
}

impl From<PathBuf> for Repetition {
    fn from(path: PathBuf) -> Self {
        Repetition::Path(path)
    }
}

impl From<Value> for Repetition {
    fn from(record: Value) -> Self {
        Repetition::Loaded(record)
    }
}

/// Returns the `traceEvents` array of a record, if it has one.
pub fn trace_events(record: &Value) -> Option<&[Value]> {
    record
        .get(TRACE_EVENTS_FIELD)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
}

/// All repetitions of one case at one input size.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkInstance {
    /// Input size (the x coordinate of every curve).
    pub size: u64,
    /// Trace logs measured at this size. May be empty.
    pub repetitions: Vec<Repetition>,
}

impl BenchmarkInstance {
    pub fn new(size: u64, repetitions: Vec<Repetition>) -> Self {
        Self { size, repetitions }
    }
}

/// A named benchmark and its size instances.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkCase {
    pub name: String,
    /// Instances, ascending by size when built through [`BenchmarkCase::new`].
    pub instances: Vec<BenchmarkInstance>,
}

impl BenchmarkCase {
    /// Creates a case, sorting its instances by ascending size.
    pub fn new(
        name: impl Into<String>,
        mut instances: Vec<BenchmarkInstance>,
    ) -> Self {
        instances.sort_by_key(|instance| instance.size);
        Self {
            name: name.into(),
            instances,
        }
    }

    /// Total number of repetitions across all instances.
    pub fn repetition_count(&self) -> usize {
        self.instances.iter().map(|i| i.repetitions.len()).sum()
    }
}

/// Ordered collection of benchmark cases under comparison.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BenchmarkSet {
    pub cases: Vec<BenchmarkCase>,
}

impl BenchmarkSet {
    pub fn new(cases: Vec<BenchmarkCase>) -> Self {
        Self { cases }
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BenchmarkCase> {
        self.cases.iter()
    }

    /// Total number of repetitions across all cases.
    pub fn repetition_count(&self) -> usize {
        self.cases.iter().map(BenchmarkCase::repetition_count).sum()
    }
}

impl FromIterator<BenchmarkCase> for BenchmarkSet {
    fn from_iter<I: IntoIterator<Item = BenchmarkCase>>(iter: I) -> Self {
        Self {
            cases: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a BenchmarkSet {
    type Item = &'a BenchmarkCase;
    type IntoIter = std::slice::Iter<'a, BenchmarkCase>;

    fn into_iter(self) -> Self::IntoIter {
        self.cases.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;

    use super::*;

    #[test]
    fn case_new_sorts_instances() {
        let case = BenchmarkCase::new(
            "foo",
            vec![
                BenchmarkInstance::new(20, vec![]),
                BenchmarkInstance::new(5, vec![]),
                BenchmarkInstance::new(10, vec![]),
            ],
        );
        let sizes: Vec<u64> = case.instances.iter().map(|i| i.size).collect();
        assert_eq!(sizes, vec![5, 10, 20]);
    }

    #[test]
    fn repetition_counts() {
        let rep = || Repetition::Loaded(json!({"traceEvents": []}));
        let set = BenchmarkSet::new(vec![
            BenchmarkCase::new(
                "a",
                vec![
                    BenchmarkInstance::new(1, vec![rep(), rep()]),
                    BenchmarkInstance::new(2, vec![rep()]),
                ],
            ),
            BenchmarkCase::new("b", vec![BenchmarkInstance::new(1, vec![])]),
        ]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.cases[0].repetition_count(), 3);
        assert_eq!(set.repetition_count(), 3);
    }

    #[test]
    fn loaded_repetition_yields_events() {
        let rep = Repetition::Loaded(json!({
            "traceEvents": [{"name": "Total Frontend", "dur": 100}]
        }));
        let count = rep.with_trace_events(<[Value]>::len).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn missing_trace_events_is_error() {
        let rep = Repetition::Loaded(json!({"events": []}));
        let err = rep.with_trace_events(<[Value]>::len).unwrap_err();
        assert!(err.is_missing_trace_events());

        // Present but not an array.
        let rep = Repetition::Loaded(json!({"traceEvents": {}}));
        let err = rep.with_trace_events(<[Value]>::len).unwrap_err();
        assert!(err.is_missing_trace_events());
    }

    #[test]
    fn path_repetition_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"traceEvents": [{{"name": "Source", "dur": 3}}, {{"name": "X"}}]}}"#
        )
        .unwrap();

        let rep = Repetition::from(file.path().to_path_buf());
        let names: Vec<String> = rep
            .with_trace_events(|events| {
                events
                    .iter()
                    .filter_map(|e| e["name"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap();
        assert_eq!(names, vec!["Source", "X"]);
    }

    #[test]
    fn path_repetition_errors() {
        let missing = Repetition::Path(PathBuf::from("/nonexistent/rep.json"));
        assert!(missing.load().unwrap_err().is_io());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ truncated").unwrap();
        let corrupt = Repetition::from(file.path().to_path_buf());
        assert!(corrupt.load().unwrap_err().is_parse());
    }

    #[test]
    fn repetition_display() {
        let rep = Repetition::Path(PathBuf::from("foo/10/0.json"));
        assert_eq!(rep.to_string(), "foo/10/0.json");
        let rep = Repetition::Loaded(Value::Null);
        assert_eq!(rep.to_string(), "<in-memory record>");
    }
}
