//! Constraint kinds and their compilers.
//!
//! Dispatch goes through a [`ConstraintRegistry`]: a table from the
//! constraint's `type` string to a compiler function. The built-in kinds are
//!
//! | type        | fields                                   |
//! |-------------|------------------------------------------|
//! | `regex`     | `pointer`, `regex`                       |
//! | `streq`     | `pointer`, `string`                      |
//! | `match`     | `matcher`, optional `regex_match`        |
//! | `op_and`    | `first`, `second`                        |
//! | `op_or`     | `first`, `second`                        |
//! | `val_true`  |                                          |
//! | `val_false` |                                          |
//!
//! Combinators compile their operands through the same registry, so a kind
//! registered later is usable inside `op_and`/`op_or` as well.

use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;
use tracecurve_schemas::record::{flatten, is_pointer};

use crate::error::{ConfigError, ConfigErrorKind};
use crate::predicate::{Expected, Predicate, full_match_regex};

/// Compiles one constraint record of a given kind.
pub type ConstraintCompiler =
    fn(&Value, &ConstraintRegistry) -> Result<Predicate, ConfigError>;

/// Table of constraint kinds.
#[derive(Clone)]
pub struct ConstraintRegistry {
    compilers: IndexMap<String, ConstraintCompiler>,
}

impl fmt::Debug for ConstraintRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.kinds()).finish()
    }
}

impl Default for ConstraintRegistry {
    /// Returns a registry holding the built-in constraint kinds.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("regex", compile_regex);
        registry.register("match", compile_match);
        registry.register("streq", compile_streq);
        registry.register("op_and", compile_and);
        registry.register("op_or", compile_or);
        registry.register("val_true", |_, _| Ok(Predicate::Const(true)));
        registry.register("val_false", |_, _| Ok(Predicate::Const(false)));
        registry
    }
}

impl ConstraintRegistry {
    /// Returns a registry with no constraint kinds.
    pub fn empty() -> Self {
        Self {
            compilers: IndexMap::new(),
        }
    }

    /// Registers a compiler for `kind`, returning the one it replaces.
    pub fn register(
        &mut self,
        kind: impl Into<String>,
        compiler: ConstraintCompiler,
    ) -> Option<ConstraintCompiler> {
        self.compilers.insert(kind.into(), compiler)
    }

    /// Registered kind names, in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.compilers.keys().map(String::as_str)
    }

    /// Compiles a constraint record into a predicate.
    pub fn compile(&self, constraint: &Value) -> Result<Predicate, ConfigError> {
        let Some(kind) = constraint.get("type").and_then(Value::as_str) else {
            return Err(ConfigError::new(ConfigErrorKind::MissingType {
                constraint: constraint.clone(),
            }));
        };
        let Some(compiler) = self.compilers.get(kind) else {
            return Err(ConfigError::new(ConfigErrorKind::UnknownType {
                kind: kind.to_string(),
                known: self.kinds().map(str::to_string).collect(),
                constraint: constraint.clone(),
            }));
        };
        compiler(constraint, self)
    }

    /// Compiles every constraint in order, stopping at the first error.
    pub fn compile_all(
        &self,
        constraints: &[Value],
    ) -> Result<Vec<Predicate>, ConfigError> {
        constraints.iter().map(|c| self.compile(c)).collect()
    }
}

/// Compiles a constraint with the built-in registry.
pub fn compile(constraint: &Value) -> Result<Predicate, ConfigError> {
    ConstraintRegistry::default().compile(constraint)
}

// -----------------------------------------------------------------------
// Field access helpers
// -----------------------------------------------------------------------

fn context(constraint: &Value) -> String {
    match constraint.get("type").and_then(Value::as_str) {
        Some(kind) => format!("{kind} constraint"),
        None => "constraint".to_string(),
    }
}

fn missing_field(
    constraint: &Value,
    field: &str,
    expected: &'static str,
) -> ConfigError {
    ConfigError::new(ConfigErrorKind::MissingField {
        context: context(constraint),
        field: field.to_string(),
        expected,
        record: constraint.clone(),
    })
}

/// Reads a required field of any JSON type.
pub fn required_field<'a>(
    constraint: &'a Value,
    field: &str,
) -> Result<&'a Value, ConfigError> {
    constraint
        .get(field)
        .ok_or_else(|| missing_field(constraint, field, "a value"))
}

/// Reads a required string field.
pub fn required_str<'a>(
    constraint: &'a Value,
    field: &str,
) -> Result<&'a str, ConfigError> {
    constraint
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| missing_field(constraint, field, "a string"))
}

/// Reads a required JSON pointer field.
pub fn required_pointer(
    constraint: &Value,
    field: &str,
) -> Result<String, ConfigError> {
    let pointer = required_str(constraint, field)?;
    if !is_pointer(pointer) {
        return Err(ConfigError::new(ConfigErrorKind::InvalidPointer {
            context: context(constraint),
            pointer: pointer.to_string(),
            record: constraint.clone(),
        }));
    }
    Ok(pointer.to_string())
}

/// Reads an optional bool field; present but not a bool is an error.
pub fn optional_bool(
    constraint: &Value,
    field: &str,
) -> Result<Option<bool>, ConfigError> {
    match constraint.get(field) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(missing_field(constraint, field, "a bool")),
    }
}

fn regex_field(
    constraint: &Value,
    pattern: &str,
) -> Result<regex::Regex, ConfigError> {
    full_match_regex(pattern).map_err(|source| {
        ConfigError::new(ConfigErrorKind::InvalidRegex {
            pattern: pattern.to_string(),
            source,
            constraint: constraint.clone(),
        })
    })
}

// -----------------------------------------------------------------------
// Built-in compilers
// -----------------------------------------------------------------------

fn compile_regex(
    constraint: &Value,
    _: &ConstraintRegistry,
) -> Result<Predicate, ConfigError> {
    let pointer = required_pointer(constraint, "pointer")?;
    let pattern = required_str(constraint, "regex")?;
    let regex = regex_field(constraint, pattern)?;
    Ok(Predicate::Regex { pointer, regex })
}

fn compile_streq(
    constraint: &Value,
    _: &ConstraintRegistry,
) -> Result<Predicate, ConfigError> {
    let pointer = required_pointer(constraint, "pointer")?;
    let string = required_str(constraint, "string")?.to_string();
    Ok(Predicate::Streq { pointer, string })
}

fn compile_match(
    constraint: &Value,
    _: &ConstraintRegistry,
) -> Result<Predicate, ConfigError> {
    let matcher = required_field(constraint, "matcher")?;

    // `regex` is the older spelling of the flag. It only counts when it is
    // a bool, so a stray pattern string under that key is not misread.
    let regex_match = match optional_bool(constraint, "regex_match")? {
        Some(flag) => flag,
        None => constraint
            .get("regex")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    };

    let expected = flatten(matcher)
        .into_iter()
        .map(|(pointer, leaf)| -> Result<_, ConfigError> {
            let expected = match leaf {
                Value::String(pattern) if regex_match => {
                    Expected::Pattern(regex_field(constraint, &pattern)?)
                }
                leaf => Expected::Exact(leaf),
            };
            Ok((pointer, expected))
        })
        .collect::<Result<Vec<(String, Expected)>, _>>()?;

    Ok(Predicate::Match { expected })
}

fn compile_operands(
    constraint: &Value,
    registry: &ConstraintRegistry,
) -> Result<(Box<Predicate>, Box<Predicate>), ConfigError> {
    let first = registry.compile(required_field(constraint, "first")?)?;
    let second = registry.compile(required_field(constraint, "second")?)?;
    Ok((Box::new(first), Box::new(second)))
}

fn compile_and(
    constraint: &Value,
    registry: &ConstraintRegistry,
) -> Result<Predicate, ConfigError> {
    let (first, second) = compile_operands(constraint, registry)?;
    Ok(Predicate::And(first, second))
}

fn compile_or(
    constraint: &Value,
    registry: &ConstraintRegistry,
) -> Result<Predicate, ConfigError> {
    let (first, second) = compile_operands(constraint, registry)?;
    Ok(Predicate::Or(first, second))
}
