// system-tests/src/lib.rs
// ============================================================================
// Module: Company Contract System Tests Library
// Description: Shared configuration and the company API stub for system tests.
// Purpose: Provide common utilities for the system-test binaries.
// Dependencies: axum, company-contract, tokio
// ============================================================================

//! ## Overview
//! This crate hosts the environment configuration and the in-process company
//! API stub used by the binaries in `system-tests/tests`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod stub;
