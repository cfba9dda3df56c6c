// crates/company-contract/src/expectation.rs
// ============================================================================
// Module: Response Expectations
// Description: Status and JSON-fragment assertions for contract requests.
// Purpose: Decide pass/fail for a single response without side effects.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Expectations are declared on a request before it is sent and checked in
//! declaration order against the response. The first mismatch is reported.
//!
//! JSON matching is a subset match: an expected object passes when each of
//! its keys is present in the actual object and matches recursively. An
//! expected object matched against an actual array requires a non-empty array
//! whose every element matches, which is how filtered listings are checked.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde_json::Number;
use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum characters of a response body quoted in a mismatch message.
const BODY_EXCERPT_CHARS: usize = 256;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Set of acceptable HTTP status codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusExpectation {
    /// Accepted codes, in declaration order.
    accepted: Vec<u16>,
}

impl StatusExpectation {
    /// Accepts exactly one code.
    #[must_use]
    pub fn exactly(code: u16) -> Self {
        Self {
            accepted: vec![code],
        }
    }

    /// Accepts any of the listed codes.
    #[must_use]
    pub fn any_of(codes: &[u16]) -> Self {
        Self {
            accepted: codes.to_vec(),
        }
    }

    /// Returns true when `status` is accepted.
    #[must_use]
    pub fn matches(&self, status: u16) -> bool {
        self.accepted.contains(&status)
    }
}

impl fmt::Display for StatusExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<String> = self.accepted.iter().map(u16::to_string).collect();
        f.write_str(&labels.join("|"))
    }
}

/// A single response assertion.
#[derive(Debug, Clone, PartialEq)]
pub enum Expectation {
    /// Response status must be in the accepted set.
    Status(StatusExpectation),
    /// Response body must contain the JSON fragment.
    JsonMatch(Value),
}

impl Expectation {
    /// Checks the expectation against a response.
    ///
    /// # Errors
    ///
    /// Returns a human-readable mismatch description.
    pub fn check(&self, status: u16, body: &Value) -> Result<(), String> {
        match self {
            Self::Status(expected) => {
                if expected.matches(status) {
                    Ok(())
                } else {
                    Err(format!(
                        "HTTP status {status} !== {expected}; body: {}",
                        body_excerpt(body)
                    ))
                }
            }
            Self::JsonMatch(fragment) => {
                if json_matches(fragment, body) {
                    Ok(())
                } else {
                    Err(format!(
                        "json body does not match {fragment}; body: {}",
                        body_excerpt(body)
                    ))
                }
            }
        }
    }
}

// ============================================================================
// SECTION: Matching
// ============================================================================

/// Returns true when `actual` contains `expected` under subset semantics.
#[must_use]
pub fn json_matches(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Object(expected_fields), Value::Object(actual_fields)) => {
            expected_fields.iter().all(|(key, expected_value)| {
                actual_fields
                    .get(key)
                    .is_some_and(|actual_value| json_matches(expected_value, actual_value))
            })
        }
        (Value::Object(_), Value::Array(items)) => {
            !items.is_empty() && items.iter().all(|item| json_matches(expected, item))
        }
        (Value::Array(expected_items), Value::Array(actual_items)) => {
            expected_items.len() == actual_items.len()
                && expected_items
                    .iter()
                    .zip(actual_items)
                    .all(|(expected_item, actual_item)| json_matches(expected_item, actual_item))
        }
        (Value::Number(left), Value::Number(right)) => numbers_match(left, right),
        _ => expected == actual,
    }
}

/// Compares integers exactly; a float on either side compares within epsilon.
fn numbers_match(left: &Number, right: &Number) -> bool {
    if !left.is_f64() && !right.is_f64() {
        return left == right;
    }
    match (left.as_f64(), right.as_f64()) {
        (Some(left), Some(right)) => (left - right).abs() < f64::EPSILON,
        _ => false,
    }
}

/// Renders a bounded single-line excerpt of a response body.
#[must_use]
pub fn body_excerpt(body: &Value) -> String {
    let rendered = body.to_string();
    if rendered.chars().count() <= BODY_EXCERPT_CHARS {
        return rendered;
    }
    let mut excerpt: String = rendered.chars().take(BODY_EXCERPT_CHARS).collect();
    excerpt.push_str("...");
    excerpt
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[path = "expectation_tests.rs"]
mod tests;
