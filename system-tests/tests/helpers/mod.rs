// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for company contract system-tests.
// Purpose: Provide runner harnesses and artifact roots.
// Dependencies: system-tests, company-contract
// ============================================================================

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod artifacts;
pub mod harness;
