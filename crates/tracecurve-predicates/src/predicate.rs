//! Compiled predicates.
//!
//! A [`Predicate`] is the compiled form of a constraint record. Compilation
//! parses every pointer, regex, and matcher up front, so evaluation never
//! fails: anything that does not line up with the record (absent path,
//! wrong JSON type) is simply a non-match.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde_json::{Number, Value};
use tracecurve_schemas::record::{lookup, lookup_str};

/// Compiled boolean test over a record.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Always true or always false.
    Const(bool),
    /// The string at `pointer` fully matches `regex`.
    Regex { pointer: String, regex: Regex },
    /// The string at `pointer` equals `string`.
    Streq { pointer: String, string: String },
    /// Every `(pointer, expected)` pair holds.
    Match { expected: Vec<(String, Expected)> },
    /// Both sides hold.
    And(Box<Predicate>, Box<Predicate>),
    /// Either side holds.
    Or(Box<Predicate>, Box<Predicate>),
    /// Test supplied by a registered extension.
    Custom(CustomPredicate),
}

/// Expected value for one flattened matcher leaf.
#[derive(Debug, Clone)]
pub enum Expected {
    /// Observed value must equal this value exactly.
    Exact(Value),
    /// Observed value must be a string fully matching this regex.
    Pattern(Regex),
}

impl Expected {
    fn holds(&self, observed: &Value) -> bool {
        match self {
            Expected::Exact(Value::Number(expected)) => match observed {
                Value::Number(observed) => numbers_equal(observed, expected),
                _ => false,
            },
            Expected::Exact(value) => observed == value,
            Expected::Pattern(regex) => {
                observed.as_str().is_some_and(|s| regex.is_match(s))
            }
        }
    }
}

/// Compares two JSON numbers by value, so `100` equals `100.0`.
fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return a == b;
    }
    a.as_f64() == b.as_f64()
}

/// Opaque closure predicate for constraint kinds added at runtime.
#[derive(Clone)]
pub struct CustomPredicate(Arc<dyn Fn(&Value) -> bool + Send + Sync>);

impl fmt::Debug for CustomPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomPredicate(..)")
    }
}

impl Predicate {
    /// Wraps a closure as a predicate.
    pub fn custom(f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Predicate::Custom(CustomPredicate(Arc::new(f)))
    }

    /// Evaluates the predicate against `record`.
    pub fn eval(&self, record: &Value) -> bool {
        match self {
            Predicate::Const(value) => *value,
            Predicate::Regex { pointer, regex } => {
                lookup_str(record, pointer).is_some_and(|s| regex.is_match(s))
            }
            Predicate::Streq { pointer, string } => {
                lookup_str(record, pointer) == Some(string.as_str())
            }
            Predicate::Match { expected } => {
                expected.iter().all(|(pointer, expected)| {
                    lookup(record, pointer)
                        .is_some_and(|observed| expected.holds(observed))
                })
            }
            Predicate::And(first, second) => {
                first.eval(record) && second.eval(record)
            }
            Predicate::Or(first, second) => {
                first.eval(record) || second.eval(record)
            }
            Predicate::Custom(CustomPredicate(f)) => f(record),
        }
    }
}

/// Returns true if every predicate holds for `record`.
///
/// An empty slice holds for every record.
pub fn all_match(predicates: &[Predicate], record: &Value) -> bool {
    predicates.iter().all(|p| p.eval(record))
}

/// Compiles `pattern` so that it only matches whole strings.
pub(crate) fn full_match_regex(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{pattern})$"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn full_match_is_anchored() {
        let regex = full_match_regex("bar.*").unwrap();
        assert!(regex.is_match("bar"));
        assert!(regex.is_match("barbar"));
        assert!(!regex.is_match("foobar"));

        // Alternation binds inside the group.
        let regex = full_match_regex("a|b").unwrap();
        assert!(regex.is_match("a"));
        assert!(!regex.is_match("ab"));
    }

    #[test]
    fn streq_requires_string() {
        let p = Predicate::Streq {
            pointer: "/name".to_string(),
            string: "1".to_string(),
        };
        assert!(p.eval(&json!({"name": "1"})));
        assert!(!p.eval(&json!({"name": 1})));
        assert!(!p.eval(&json!({})));
    }

    #[test]
    fn match_pattern_requires_string() {
        let p = Predicate::Match {
            expected: vec![(
                "/dur".to_string(),
                Expected::Pattern(full_match_regex("1.*").unwrap()),
            )],
        };
        assert!(p.eval(&json!({"dur": "100"})));
        assert!(!p.eval(&json!({"dur": 100})));
    }

    #[test]
    fn exact_numbers_compare_by_value() {
        let p = Predicate::Match {
            expected: vec![("/dur".to_string(), Expected::Exact(json!(100)))],
        };
        assert!(p.eval(&json!({"dur": 100})));
        assert!(p.eval(&json!({"dur": 100.0})));
        assert!(!p.eval(&json!({"dur": 100.5})));
        assert!(!p.eval(&json!({"dur": "100"})));

        let p = Predicate::Match {
            expected: vec![("/dur".to_string(), Expected::Exact(json!(2.0)))],
        };
        assert!(p.eval(&json!({"dur": 2})));
        assert!(!p.eval(&json!({"dur": -2})));

        // Large integers are not rounded through f64.
        let p = Predicate::Match {
            expected: vec![("/id".to_string(), Expected::Exact(json!(u64::MAX)))],
        };
        assert!(p.eval(&json!({"id": u64::MAX})));
        assert!(!p.eval(&json!({"id": u64::MAX - 1})));
    }

    #[test]
    fn empty_match_is_true() {
        let p = Predicate::Match { expected: vec![] };
        assert!(p.eval(&json!({})));
    }

    #[test]
    fn custom_predicate_runs_closure() {
        let p = Predicate::custom(|r| r.get("dur").is_some());
        assert!(p.eval(&json!({"dur": 1})));
        assert!(!p.eval(&json!({"name": "x"})));
        assert_eq!(format!("{p:?}"), "Custom(CustomPredicate(..))");
    }

    #[test]
    fn all_match_empty_is_true() {
        assert!(all_match(&[], &json!(null)));
        let preds = [Predicate::Const(true), Predicate::Const(false)];
        assert!(!all_match(&preds, &json!({})));
    }
}
