// crates/company-contract/src/lib.rs
// ============================================================================
// Module: Company Contract Library
// Description: Contract suite for the remote company CRUD API.
// Purpose: Compose payloads, issue requests, and report expected outcomes.
// Dependencies: reqwest, serde, serde_json, thiserror, tokio, toml, tracing
// ============================================================================

//! ## Overview
//! `company-contract` hosts a black-box contract suite for a remote company
//! CRUD API. A fluent client issues one request per call and checks the
//! response against declared expectations; a fixed catalog of scenarios is
//! executed sequentially and reported through pluggable reporters.
//!
//! The system under test is external. Nothing in this crate models server
//! behavior beyond the status codes and JSON fragments the scenarios assert.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod catalog;
pub mod client;
pub mod cnpj;
pub mod company;
pub mod config;
pub mod expectation;
pub mod logging;
pub mod report;
pub mod runner;
pub mod scenario;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use client::ApiClient;
pub use client::ClientError;
pub use client::RequestSpec;
pub use client::SpecError;
pub use client::SpecResponse;
pub use client::TranscriptEntry;
pub use cnpj::Cnpj;
pub use cnpj::CnpjAllocator;
pub use cnpj::CnpjError;
pub use company::Company;
pub use company::CompanyId;
pub use company::CompanyPayload;
pub use config::ConfigError;
pub use config::ContractConfig;
pub use report::ArtifactReporter;
pub use report::CompositeReporter;
pub use report::ConsoleReporter;
pub use report::ReportError;
pub use report::SuiteReporter;
pub use runner::CaseOutcome;
pub use runner::CaseStatus;
pub use runner::CleanupSummary;
pub use runner::RunOptions;
pub use runner::RunnerError;
pub use runner::SuiteRunner;
pub use runner::SuiteStart;
pub use runner::SuiteSummary;
pub use runner::select_scenarios;
pub use scenario::ScenarioContext;
pub use scenario::ScenarioError;
pub use scenario::ScenarioId;
pub use scenario::ScenarioOptions;
