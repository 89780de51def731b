//! Algebraic properties of the `op_and` / `op_or` combinators.
//!
//! For any two constraints A and B and any record r,
//! `op_and(A, B)(r) == A(r) && B(r)` and `op_or(A, B)(r) == A(r) || B(r)`.
//! Constraints and records are drawn from a small vocabulary so that
//! matches and non-matches both occur often.

use proptest::prelude::*;
use serde_json::{Value, json};
use tracecurve_predicates::compile;

const NAMES: &[&str] = &["Source", "InstantiateClass", "ParseClass", "Frontend"];
const PATTERNS: &[&str] = &["Instantiate.*", "Parse.*", ".*Class", "S.*"];
const COMBINATORS: &[&str] = &["op_and", "op_or"];

fn arb_name() -> impl Strategy<Value = String> {
    prop::sample::select(NAMES).prop_map(str::to_string)
}

/// Leaf constraints that only look at `/name` and `/args/detail`.
fn arb_leaf_constraint() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(json!({"type": "val_true"})),
        Just(json!({"type": "val_false"})),
        arb_name().prop_map(|s| json!({"type": "streq", "pointer": "/name", "string": s})),
        prop::sample::select(PATTERNS)
            .prop_map(|r| json!({"type": "regex", "pointer": "/name", "regex": r})),
        (arb_name(), any::<bool>()).prop_map(|(s, regex_match)| json!({
            "type": "match",
            "regex_match": regex_match,
            "matcher": {"args": {"detail": s}},
        })),
    ]
}

fn arb_constraint() -> impl Strategy<Value = Value> {
    arb_leaf_constraint().prop_recursive(3, 16, 2, |inner| {
        (
            prop::sample::select(COMBINATORS),
            inner.clone(),
            inner,
        )
            .prop_map(|(kind, first, second)| {
                json!({"type": kind, "first": first, "second": second})
            })
    })
}

fn arb_event() -> impl Strategy<Value = Value> {
    (
        prop::option::of(arb_name()),
        prop::option::of(arb_name()),
        0u64..1000,
    )
        .prop_map(|(name, detail, dur)| {
            let mut event = json!({"dur": dur});
            if let Some(name) = name {
                event["name"] = json!(name);
            }
            if let Some(detail) = detail {
                event["args"] = json!({"detail": detail});
            }
            event
        })
}

proptest! {
    #[test]
    fn op_and_is_conjunction(
        a in arb_constraint(),
        b in arb_constraint(),
        events in prop::collection::vec(arb_event(), 1..16),
    ) {
        let pa = compile(&a).unwrap();
        let pb = compile(&b).unwrap();
        let both = compile(&json!({"type": "op_and", "first": a, "second": b})).unwrap();
        for event in &events {
            prop_assert_eq!(both.eval(event), pa.eval(event) && pb.eval(event));
        }
    }

    #[test]
    fn op_or_is_disjunction(
        a in arb_constraint(),
        b in arb_constraint(),
        events in prop::collection::vec(arb_event(), 1..16),
    ) {
        let pa = compile(&a).unwrap();
        let pb = compile(&b).unwrap();
        let either = compile(&json!({"type": "op_or", "first": a, "second": b})).unwrap();
        for event in &events {
            prop_assert_eq!(either.eval(event), pa.eval(event) || pb.eval(event));
        }
    }

    #[test]
    fn constants_ignore_record(event in arb_event()) {
        let val_true = json!({"type": "val_true"});
        let val_false = json!({"type": "val_false"});
        prop_assert!(compile(&val_true).unwrap().eval(&event));
        prop_assert!(!compile(&val_false).unwrap().eval(&event));
    }

    #[test]
    fn match_without_regex_agrees_with_streq(
        name in arb_name(),
        event in arb_event(),
    ) {
        let matcher = compile(&json!({
            "type": "match",
            "matcher": {"name": name},
        })).unwrap();
        let streq = compile(&json!({
            "type": "streq",
            "pointer": "/name",
            "string": name,
        })).unwrap();
        prop_assert_eq!(matcher.eval(&event), streq.eval(&event));
    }
}
