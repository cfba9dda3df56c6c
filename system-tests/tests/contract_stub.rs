// system-tests/tests/contract_stub.rs
// ============================================================================
// Module: Contract Stub Suite
// Description: Aggregates stub-backed contract system tests into one binary.
// Purpose: Run the full catalog offline against the in-process company stub.
// Dependencies: suites/*, helpers
// ============================================================================

//! ## Overview
//! Every test here binds its own loopback stub, so suites run in parallel
//! without shared state. No network access beyond 127.0.0.1 is needed.

mod helpers;

#[path = "suites/catalog_stub.rs"]
mod catalog_stub;
#[path = "suites/run_artifacts.rs"]
mod run_artifacts;
#[path = "suites/stub_api.rs"]
mod stub_api;
