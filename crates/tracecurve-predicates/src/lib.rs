//! Predicate engine for trace event selection.
//!
//! Constraint records (`{"type": "regex", "pointer": "/name", ...}`) are
//! compiled once into [`Predicate`]s, which are then evaluated against every
//! trace event. Compilation is where all validation happens: unknown kinds,
//! missing fields and bad regexes are reported as a [`ConfigError`] carrying
//! the offending record. Evaluation is infallible.
//!
//! ```
//! use serde_json::json;
//!
//! let pred = tracecurve_predicates::compile(&json!({
//!     "type": "regex",
//!     "pointer": "/name",
//!     "regex": "Instantiate.*",
//! }))
//! .unwrap();
//!
//! assert!(pred.eval(&json!({"name": "InstantiateClass"})));
//! assert!(!pred.eval(&json!({"name": "Source"})));
//! ```
//!
//! Group descriptors bundle constraints under a name; see [`resolve`].

mod descriptor;
mod error;
mod predicate;
mod registry;

pub use descriptor::{
    CompiledDescriptor, compile_all, read_descriptor, read_descriptors,
    resolve, resolve_all, resolve_with, write_descriptors,
};
pub use error::ConfigError;
pub use predicate::{CustomPredicate, Expected, Predicate, all_match};
pub use registry::{
    ConstraintCompiler, ConstraintRegistry, compile, optional_bool,
    required_field, required_pointer, required_str,
};
