//! Plotter configuration: defaults, merging and typed access.
//!
//! A configuration is a JSON object. Every plotter starts from a default
//! produced by a pure function, and the user's file is merged on top with
//! [`merge_config`]. Readers below turn keys into typed values; a key with
//! the wrong JSON type is a [`ConfigError`], never a silent default.

use serde_json::{Map, Value, json};
use tracecurve_aggregate::{DEFAULT_VALUE_PATH, MissingKeyPolicy};
use tracecurve_predicates::{
    ConfigError, ConstraintRegistry, Predicate, compile_all, read_descriptors,
};
use tracecurve_schemas::record::is_pointer;
use tracecurve_schemas::{GroupDescriptor, PlotArtifact};

/// Preferred key for the value path.
pub const VALUE_PTR_KEY: &str = "value_ptr";
/// Older spelling of [`VALUE_PTR_KEY`], used when the preferred key is absent.
pub const VALUE_JSON_POINTER_KEY: &str = "value_json_pointer";

/// Merges `overrides` into `defaults`.
///
/// Objects merge key by key, recursively. Any other override value,
/// arrays included, replaces the default wholesale.
pub fn merge_config(defaults: &Value, overrides: &Value) -> Value {
    match (defaults, overrides) {
        (Value::Object(defaults), Value::Object(overrides)) => {
            let mut merged = defaults.clone();
            for (key, value) in overrides {
                let entry = match defaults.get(key) {
                    Some(default) => merge_config(default, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), entry);
            }
            Value::Object(merged)
        }
        (_, overrides) => overrides.clone(),
    }
}

/// Presentation defaults shared by every chart-producing plotter.
pub fn base_default_config() -> Value {
    json!({
        "width": 1500,
        "height": 500,
        "legend_title": "Timings",
        "x_label": "Benchmark size factor",
        "y_label": "Time (µs)",
        "plot_file_extensions": [".svg", ".png"],
    })
}

/// Adds `entries` to the base configuration.
pub(crate) fn extend_base(entries: Value) -> Value {
    merge_config(&base_default_config(), &entries)
}

// -----------------------------------------------------------------------
// Typed readers
// -----------------------------------------------------------------------

fn object(config: &Value) -> Option<&Map<String, Value>> {
    config.as_object()
}

/// Reads an optional bool, falling back to `default` when absent.
pub fn read_bool(
    config: &Value,
    key: &str,
    default: bool,
) -> Result<bool, ConfigError> {
    match object(config).and_then(|c| c.get(key)) {
        None => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(ConfigError::invalid_key(key, "a bool", other.clone())),
    }
}

/// Reads an optional string.
pub fn read_str<'a>(
    config: &'a Value,
    key: &str,
) -> Result<Option<&'a str>, ConfigError> {
    match object(config).and_then(|c| c.get(key)) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => {
            Err(ConfigError::invalid_key(key, "a string", other.clone()))
        }
    }
}

/// Reads a required array of strings.
pub fn read_string_array(
    config: &Value,
    key: &str,
) -> Result<Vec<String>, ConfigError> {
    const EXPECTED: &str = "an array of strings";
    let value = object(config)
        .and_then(|c| c.get(key))
        .ok_or_else(|| ConfigError::missing_key(key, EXPECTED))?;
    let items = value
        .as_array()
        .ok_or_else(|| ConfigError::invalid_key(key, EXPECTED, value.clone()))?;
    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                ConfigError::invalid_key(key, EXPECTED, value.clone())
            })
        })
        .collect()
}

/// Reads a required array of JSON pointers.
pub fn read_pointer_array(
    config: &Value,
    key: &str,
) -> Result<Vec<String>, ConfigError> {
    let pointers = read_string_array(config, key)?;
    if let Some(bad) = pointers.iter().find(|p| !is_pointer(p)) {
        return Err(ConfigError::invalid_key(
            key,
            "an array of JSON pointers",
            Value::String(bad.clone()),
        ));
    }
    Ok(pointers)
}

/// Path of the measured value: `value_ptr`, else `value_json_pointer`,
/// else `/dur`.
pub fn value_path(config: &Value) -> Result<String, ConfigError> {
    let (key, path) = match read_str(config, VALUE_PTR_KEY)? {
        Some(path) => (VALUE_PTR_KEY, path),
        None => match read_str(config, VALUE_JSON_POINTER_KEY)? {
            Some(path) => (VALUE_JSON_POINTER_KEY, path),
            None => return Ok(DEFAULT_VALUE_PATH.to_string()),
        },
    };
    if !is_pointer(path) {
        return Err(ConfigError::invalid_key(
            key,
            "a JSON pointer",
            Value::String(path.to_string()),
        ));
    }
    Ok(path.to_string())
}

/// Reads the required `group_descriptors` array.
pub fn group_descriptors(
    config: &Value,
) -> Result<Vec<GroupDescriptor>, ConfigError> {
    let value = object(config)
        .and_then(|c| c.get("group_descriptors"))
        .ok_or_else(|| {
            ConfigError::missing_key(
                "group_descriptors",
                "an array of group descriptors",
            )
        })?;
    read_descriptors(value)
}

/// Compiles the optional `filters` array. Absent means no filtering.
pub fn filters(
    config: &Value,
    registry: &ConstraintRegistry,
) -> Result<Vec<Predicate>, ConfigError> {
    match object(config).and_then(|c| c.get("filters")) {
        None => Ok(Vec::new()),
        Some(Value::Array(constraints)) => compile_all(registry, constraints),
        Some(other) => Err(ConfigError::invalid_key(
            "filters",
            "an array of constraints",
            other.clone(),
        )),
    }
}

/// Reads the optional `missing_key_policy` (`"truncate"` or `"drop"`).
pub fn missing_key_policy(
    config: &Value,
) -> Result<MissingKeyPolicy, ConfigError> {
    const KEY: &str = "missing_key_policy";
    match read_str(config, KEY)? {
        None => Ok(MissingKeyPolicy::default()),
        Some(name) => MissingKeyPolicy::from_name(name).ok_or_else(|| {
            ConfigError::invalid_key(
                KEY,
                "\"truncate\" or \"drop\"",
                Value::String(name.to_string()),
            )
        }),
    }
}

/// File extensions the sink should render, in configured order.
pub fn plot_file_extensions(config: &Value) -> Result<Vec<String>, ConfigError> {
    const KEY: &str = "plot_file_extensions";
    if object(config).is_some_and(|c| c.contains_key(KEY)) {
        read_string_array(config, KEY)
    } else {
        Ok(Vec::new())
    }
}

/// Axis and legend labels copied into every artifact.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Presentation {
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub legend_title: Option<String>,
}

impl Presentation {
    pub fn from_config(config: &Value) -> Result<Self, ConfigError> {
        let owned = |s: Option<&str>| s.map(str::to_string);
        Ok(Self {
            x_label: owned(read_str(config, "x_label")?),
            y_label: owned(read_str(config, "y_label")?),
            legend_title: owned(read_str(config, "legend_title")?),
        })
    }

    pub fn apply(&self, artifact: &mut PlotArtifact) {
        artifact.x_label.clone_from(&self.x_label);
        artifact.y_label.clone_from(&self.y_label);
        artifact.legend_title.clone_from(&self.legend_title);
    }
}
