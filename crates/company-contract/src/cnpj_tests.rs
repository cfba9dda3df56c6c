// crates/company-contract/src/cnpj_tests.rs
// ============================================================================
// Module: CNPJ Unit Tests
// Description: Coverage for CNPJ formatting, parsing, and allocation.
// Purpose: Ensure fixtures only ever carry well-formed, distinct values.
// Dependencies: proptest
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use std::collections::BTreeSet;

use proptest::prelude::*;

use super::Cnpj;
use super::CnpjAllocator;
use super::CnpjError;
use super::MAX_BRANCH;
use super::check_digits;
use super::is_well_formed;

#[test]
fn seed_cnpj_is_valid() {
    let cnpj = Cnpj::parse("12.345.678/0001-95").expect("seed cnpj");
    assert_eq!(cnpj.root(), 12_345_678);
    assert_eq!(cnpj.branch(), 1);
    assert_eq!(cnpj.formatted(), "12.345.678/0001-95");
}

#[test]
fn bare_digits_parse_to_the_same_value() {
    let formatted = Cnpj::parse("12.345.678/0001-95").unwrap();
    let bare = Cnpj::parse("12345678000195").unwrap();
    assert_eq!(formatted, bare);
}

#[test]
fn check_digits_match_known_value() {
    assert_eq!(check_digits(&[1, 2, 3, 4, 5, 6, 7, 8, 0, 0, 0, 1]), [9, 5]);
    assert_eq!(check_digits(&[1, 1, 2, 2, 2, 3, 3, 3, 0, 0, 0, 1]), [8, 1]);
}

#[test]
fn parse_rejects_wrong_check_digits() {
    let err = Cnpj::parse("12.345.678/0001-96").unwrap_err();
    assert!(matches!(err, CnpjError::CheckDigits(_)));
}

#[test]
fn invalid_literal_is_malformed() {
    assert!(!is_well_formed("CNPJ-Inválido"));
    assert!(matches!(Cnpj::parse("CNPJ-Inválido"), Err(CnpjError::Malformed(_))));
}

#[test]
fn five_digit_branch_is_malformed() {
    assert!(!is_well_formed("12.345.678/00010-95"));
}

#[test]
fn well_formed_ignores_check_digits() {
    assert!(is_well_formed("12.345.678/0001-00"));
}

#[test]
fn from_parts_rejects_out_of_range_values() {
    assert_eq!(Cnpj::from_parts(100_000_000, 1), Err(CnpjError::RootOutOfRange(100_000_000)));
    assert_eq!(Cnpj::from_parts(1, 0), Err(CnpjError::BranchOutOfRange(0)));
    assert_eq!(Cnpj::from_parts(1, 10_000), Err(CnpjError::BranchOutOfRange(10_000)));
}

#[test]
fn small_roots_are_zero_padded() {
    let cnpj = Cnpj::from_parts(42, 7).unwrap();
    assert!(cnpj.formatted().starts_with("00.000.042/0007-"));
}

#[test]
fn allocator_yields_distinct_values() {
    let mut allocator = CnpjAllocator::new(12_345_678).unwrap();
    let values: BTreeSet<String> =
        (0 .. 100).map(|_| allocator.allocate().unwrap().formatted()).collect();
    assert_eq!(values.len(), 100);
    assert!(values.contains("12.345.678/0001-95"));
}

#[test]
fn allocator_reports_exhaustion() {
    let mut allocator = CnpjAllocator::new(1).unwrap();
    for _ in 0 .. MAX_BRANCH {
        allocator.allocate().unwrap();
    }
    assert_eq!(allocator.allocate(), Err(CnpjError::Exhausted(1)));
}

#[test]
fn run_allocator_root_is_eight_digits() {
    for stamp in [0u128, 1, 89_999_999, 1_760_000_000_000] {
        let root = CnpjAllocator::for_run(stamp).root();
        assert!((10_000_000 ..= 99_999_999).contains(&root), "root {root}");
    }
}

proptest! {
    #[test]
    fn constructed_values_round_trip_through_parse(root in 0u32..=99_999_999, branch in 1u16..=9_999) {
        let cnpj = Cnpj::from_parts(root, branch).unwrap();
        let text = cnpj.formatted();
        prop_assert!(is_well_formed(&text));
        prop_assert_eq!(Cnpj::parse(&text).unwrap(), cnpj);
        prop_assert_eq!(cnpj.root(), root);
        prop_assert_eq!(cnpj.branch(), branch);
    }
}
