// crates/company-contract/src/expectation_tests.rs
// ============================================================================
// Module: Expectation Unit Tests
// Description: Coverage for status sets and subset JSON matching.
// Purpose: Pin down how filtered listings and echoed records are judged.
// Dependencies: serde_json
// ============================================================================

#![allow(clippy::unwrap_used, reason = "Test-only assertions favor direct unwrap for clarity.")]

use serde_json::json;

use super::Expectation;
use super::StatusExpectation;
use super::body_excerpt;
use super::json_matches;

#[test]
fn status_set_accepts_only_listed_codes() {
    let expectation = StatusExpectation::any_of(&[200, 201]);
    assert!(expectation.matches(200));
    assert!(expectation.matches(201));
    assert!(!expectation.matches(204));
    assert_eq!(expectation.to_string(), "200|201");
}

#[test]
fn status_mismatch_names_both_codes() {
    let expectation = Expectation::Status(StatusExpectation::exactly(201));
    let message = expectation.check(409, &json!({ "error": "duplicate" })).unwrap_err();
    assert!(message.contains("409"), "{message}");
    assert!(message.contains("201"), "{message}");
    assert!(message.contains("duplicate"), "{message}");
}

#[test]
fn object_fragment_matches_superset() {
    let actual = json!({ "id": 1, "name": "Empresa Teste", "city": "São Paulo" });
    assert!(json_matches(&json!({ "name": "Empresa Teste" }), &actual));
    assert!(!json_matches(&json!({ "name": "Outra" }), &actual));
    assert!(!json_matches(&json!({ "sector": "Facção" }), &actual));
}

#[test]
fn object_fragment_against_array_requires_every_element() {
    let fragment = json!({ "name": "Empresa Teste" });
    let all_match = json!([
        { "id": 1, "name": "Empresa Teste" },
        { "id": 2, "name": "Empresa Teste" }
    ]);
    let one_differs = json!([
        { "id": 1, "name": "Empresa Teste" },
        { "id": 2, "name": "Empresa 3" }
    ]);
    assert!(json_matches(&fragment, &all_match));
    assert!(!json_matches(&fragment, &one_differs));
    assert!(!json_matches(&fragment, &json!([])));
}

#[test]
fn arrays_match_element_wise() {
    assert!(json_matches(&json!([{ "a": 1 }]), &json!([{ "a": 1, "b": 2 }])));
    assert!(!json_matches(&json!([{ "a": 1 }]), &json!([{ "a": 1 }, { "a": 1 }])));
}

#[test]
fn numbers_compare_by_value() {
    assert!(json_matches(&json!({ "id": 1 }), &json!({ "id": 1.0 })));
    assert!(!json_matches(&json!({ "id": 1 }), &json!({ "id": "1" })));
}

#[test]
fn large_integers_compare_exactly() {
    let expected = json!({ "id": 9_007_199_254_740_993_u64 });
    assert!(!json_matches(&expected, &json!({ "id": 9_007_199_254_740_992_u64 })));
    assert!(json_matches(&expected, &json!({ "id": 9_007_199_254_740_993_u64 })));
    assert!(!json_matches(&json!({ "n": u64::MAX }), &json!({ "n": -1 })));
    assert!(json_matches(&json!({ "n": -5 }), &json!({ "n": -5 })));
}

#[test]
fn null_body_never_matches_object() {
    let expectation = Expectation::JsonMatch(json!({ "name": "Empresa Teste" }));
    assert!(expectation.check(200, &serde_json::Value::Null).is_err());
}

#[test]
fn long_bodies_are_truncated() {
    let body = json!({ "blob": "x".repeat(1_000) });
    let excerpt = body_excerpt(&body);
    assert!(excerpt.ends_with("..."));
    assert!(excerpt.chars().count() < 300);
}
