//! Error type for loading repetition records.
//!
//! Load failures are data errors: the aggregation engine logs them and skips
//! the repetition, so this type never aborts a run on its own.

use std::backtrace::Backtrace;
use std::fmt;
use std::path::PathBuf;

/// Error returned when a repetition cannot be turned into trace events.
#[derive(Debug)]
pub struct LoadError {
    kind: LoadErrorKind,
    backtrace: Backtrace,
}

/// Internal error variants. Not exposed publicly; use `is_xxx()` methods.
#[derive(Debug)]
pub(crate) enum LoadErrorKind {
    /// The repetition file could not be read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The repetition file is not valid JSON.
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// The record has no top-level `traceEvents` array.
    MissingTraceEvents { origin: String },
}

impl LoadError {
    /// Creates an error from an error kind, capturing a backtrace.
    pub(crate) fn new(kind: LoadErrorKind) -> Self {
        Self {
            kind,
            backtrace: Backtrace::capture(),
        }
    }

    /// Returns true if the repetition file could not be read.
    pub fn is_io(&self) -> bool {
        matches!(self.kind, LoadErrorKind::Io { .. })
    }

    /// Returns true if the repetition file is not valid JSON.
    pub fn is_parse(&self) -> bool {
        matches!(self.kind, LoadErrorKind::Parse { .. })
    }

    /// Returns true if the record lacks a `traceEvents` array.
    pub fn is_missing_trace_events(&self) -> bool {
        matches!(self.kind, LoadErrorKind::MissingTraceEvents { .. })
    }

    /// Returns the backtrace captured when this error was created.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

impl fmt::Display for LoadErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadErrorKind::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            LoadErrorKind::Parse { path, source } => {
                write!(f, "failed to parse {}: {source}", path.display())
            }
            LoadErrorKind::MissingTraceEvents { origin } => {
                write!(f, "no traceEvents array in {origin}")
            }
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Data errors are logged inline, so keep the message on one line.
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            LoadErrorKind::Io { source, .. } => Some(source),
            LoadErrorKind::Parse { source, .. } => Some(source),
            LoadErrorKind::MissingTraceEvents { .. } => None,
        }
    }
}
