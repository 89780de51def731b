//! Group descriptor compilation and (de)serialization.

use serde_json::Value;
use tracecurve_schemas::GroupDescriptor;
use tracing::debug;

use crate::error::{ConfigError, ConfigErrorKind};
use crate::predicate::{Predicate, all_match};
use crate::registry::ConstraintRegistry;

/// A group descriptor whose constraints have been compiled.
#[derive(Debug, Clone)]
pub struct CompiledDescriptor {
    name: String,
    predicates: Vec<Predicate>,
}

impl CompiledDescriptor {
    /// Builds a descriptor from already compiled predicates.
    pub fn new(name: impl Into<String>, predicates: Vec<Predicate>) -> Self {
        Self {
            name: name.into(),
            predicates,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Returns true if every predicate holds for `record`.
    pub fn matches(&self, record: &Value) -> bool {
        all_match(&self.predicates, record)
    }
}

/// Compiles a descriptor with the built-in constraint kinds.
pub fn resolve(
    descriptor: &GroupDescriptor,
) -> Result<CompiledDescriptor, ConfigError> {
    resolve_with(&ConstraintRegistry::default(), descriptor)
}

/// Compiles a descriptor's constraints in order through `registry`.
pub fn resolve_with(
    registry: &ConstraintRegistry,
    descriptor: &GroupDescriptor,
) -> Result<CompiledDescriptor, ConfigError> {
    let predicates = registry.compile_all(&descriptor.predicates)?;
    debug!(
        descriptor = %descriptor.name,
        predicates = predicates.len(),
        "compiled group descriptor"
    );
    Ok(CompiledDescriptor::new(descriptor.name.clone(), predicates))
}

/// Compiles a list of descriptors, keeping their order.
pub fn resolve_all(
    registry: &ConstraintRegistry,
    descriptors: &[GroupDescriptor],
) -> Result<Vec<CompiledDescriptor>, ConfigError> {
    descriptors
        .iter()
        .map(|d| resolve_with(registry, d))
        .collect()
}

fn bad_descriptor(
    record: &Value,
    field: &str,
    expected: &'static str,
) -> ConfigError {
    ConfigError::new(ConfigErrorKind::MissingField {
        context: "group descriptor".to_string(),
        field: field.to_string(),
        expected,
        record: record.clone(),
    })
}

/// Reads one descriptor from its record form `{name, predicates}`.
pub fn read_descriptor(record: &Value) -> Result<GroupDescriptor, ConfigError> {
    let name = record
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| bad_descriptor(record, "name", "a string"))?;
    let predicates = record
        .get("predicates")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            bad_descriptor(record, "predicates", "an array of constraints")
        })?;
    Ok(GroupDescriptor::new(name, predicates.clone()))
}

/// Reads an array of descriptor records, keeping their order.
pub fn read_descriptors(
    records: &Value,
) -> Result<Vec<GroupDescriptor>, ConfigError> {
    let Some(items) = records.as_array() else {
        return Err(ConfigError::invalid_key(
            "group_descriptors",
            "an array of group descriptors",
            records.clone(),
        ));
    };
    items.iter().map(read_descriptor).collect()
}

/// Writes descriptors back into an array of records.
pub fn write_descriptors(descriptors: &[GroupDescriptor]) -> Value {
    Value::Array(descriptors.iter().map(GroupDescriptor::to_record).collect())
}

/// Compiles a bare list of constraint records (used for filters).
pub fn compile_all(
    registry: &ConstraintRegistry,
    constraints: &[Value],
) -> Result<Vec<Predicate>, ConfigError> {
    registry.compile_all(constraints)
}
