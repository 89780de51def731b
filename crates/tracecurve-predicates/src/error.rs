//! Error type for configuration problems.
//!
//! A configuration error changes the meaning of everything aggregated after
//! it, so every variant is fatal: the host reports it once and stops before
//! producing any output. Each variant keeps the offending record so the
//! report can show exactly what was wrong.

use std::backtrace::Backtrace;
use std::fmt;

use serde_json::Value;

/// Error returned when a constraint, descriptor, or plotter configuration
/// is invalid.
#[derive(Debug)]
pub struct ConfigError {
    kind: ConfigErrorKind,
    backtrace: Backtrace,
}

/// Internal error variants. Not exposed publicly; use `is_xxx()` methods.
#[derive(Debug)]
pub(crate) enum ConfigErrorKind {
    /// Constraint has no string `type` field.
    MissingType { constraint: Value },
    /// Constraint `type` is not registered.
    UnknownType {
        kind: String,
        known: Vec<String>,
        constraint: Value,
    },
    /// A required field is absent or has the wrong JSON type.
    MissingField {
        context: String,
        field: String,
        expected: &'static str,
        record: Value,
    },
    /// A pointer field does not start with `/`.
    InvalidPointer {
        context: String,
        pointer: String,
        record: Value,
    },
    /// A regex field does not compile.
    InvalidRegex {
        pattern: String,
        source: regex::Error,
        constraint: Value,
    },
    /// A top-level configuration key has the wrong JSON type.
    InvalidKey {
        key: String,
        expected: &'static str,
        value: Value,
    },
    /// A top-level configuration key is absent.
    MissingKey { key: String, expected: &'static str },
    /// No plotter is registered under this name.
    UnknownPlotter { name: String, known: Vec<String> },
}

impl ConfigError {
    /// Creates an error from an error kind, capturing a backtrace.
    pub(crate) fn new(kind: ConfigErrorKind) -> Self {
        Self {
            kind,
            backtrace: Backtrace::capture(),
        }
    }

    /// A required top-level configuration key is absent.
    pub fn missing_key(key: impl Into<String>, expected: &'static str) -> Self {
        Self::new(ConfigErrorKind::MissingKey {
            key: key.into(),
            expected,
        })
    }

    /// A top-level configuration key holds a value of the wrong type.
    pub fn invalid_key(
        key: impl Into<String>,
        expected: &'static str,
        value: Value,
    ) -> Self {
        Self::new(ConfigErrorKind::InvalidKey {
            key: key.into(),
            expected,
            value,
        })
    }

    /// No plotter is registered under `name`.
    pub fn unknown_plotter(
        name: impl Into<String>,
        known: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self::new(ConfigErrorKind::UnknownPlotter {
            name: name.into(),
            known: known.into_iter().map(Into::into).collect(),
        })
    }

    /// Returns true if a constraint has no `type` field.
    pub fn is_missing_type(&self) -> bool {
        matches!(self.kind, ConfigErrorKind::MissingType { .. })
    }

    /// Returns true if a constraint `type` is not registered.
    pub fn is_unknown_type(&self) -> bool {
        matches!(self.kind, ConfigErrorKind::UnknownType { .. })
    }

    /// Returns true if a constraint or descriptor field is missing or
    /// ill-typed.
    pub fn is_missing_field(&self) -> bool {
        matches!(self.kind, ConfigErrorKind::MissingField { .. })
    }

    /// Returns true if a pointer field is not a JSON pointer.
    pub fn is_invalid_pointer(&self) -> bool {
        matches!(self.kind, ConfigErrorKind::InvalidPointer { .. })
    }

    /// Returns true if a regex field failed to compile.
    pub fn is_invalid_regex(&self) -> bool {
        matches!(self.kind, ConfigErrorKind::InvalidRegex { .. })
    }

    /// Returns true if a top-level configuration key is missing or
    /// ill-typed.
    pub fn is_config_key(&self) -> bool {
        matches!(
            self.kind,
            ConfigErrorKind::MissingKey { .. }
                | ConfigErrorKind::InvalidKey { .. }
        )
    }

    /// Returns true if the requested plotter does not exist.
    pub fn is_unknown_plotter(&self) -> bool {
        matches!(self.kind, ConfigErrorKind::UnknownPlotter { .. })
    }

    /// Returns the backtrace captured when this error was created.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

/// Pretty-prints a record for inclusion in an error message.
fn dump(record: &Value) -> String {
    serde_json::to_string_pretty(record).unwrap_or_else(|_| record.to_string())
}

impl fmt::Display for ConfigErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigErrorKind::MissingType { constraint } => write!(
                f,
                "constraint has no string \"type\" field:\n{}",
                dump(constraint)
            ),
            ConfigErrorKind::UnknownType {
                kind,
                known,
                constraint,
            } => write!(
                f,
                "unknown constraint type \"{kind}\" (known: {}):\n{}",
                known.join(", "),
                dump(constraint)
            ),
            ConfigErrorKind::MissingField {
                context,
                field,
                expected,
                record,
            } => write!(
                f,
                "{context} has no valid \"{field}\" field (expected {expected}):\n{}",
                dump(record)
            ),
            ConfigErrorKind::InvalidPointer {
                context,
                pointer,
                record,
            } => write!(
                f,
                "{context} has an invalid JSON pointer \"{pointer}\" \
                 (must be empty or start with '/'):\n{}",
                dump(record)
            ),
            ConfigErrorKind::InvalidRegex {
                pattern,
                source,
                constraint,
            } => write!(
                f,
                "invalid regex \"{pattern}\": {source}\n{}",
                dump(constraint)
            ),
            ConfigErrorKind::InvalidKey {
                key,
                expected,
                value,
            } => write!(
                f,
                "configuration key \"{key}\" must be {expected}, got:\n{}",
                dump(value)
            ),
            ConfigErrorKind::MissingKey { key, expected } => {
                write!(f, "missing configuration key \"{key}\" ({expected})")
            }
            ConfigErrorKind::UnknownPlotter { name, known } => write!(
                f,
                "unknown plotter \"{name}\" (known: {})",
                known.join(", ")
            ),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Summary of what happened.
        writeln!(f, "{}", self.kind)?;

        // Backtrace (will be empty unless RUST_BACKTRACE is set).
        write!(f, "{}", self.backtrace)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ConfigErrorKind::InvalidRegex { source, .. } => Some(source),
            _ => None,
        }
    }
}
