// crates/company-contract/src/config/mod.rs
// ============================================================================
// Module: Contract Suite Configuration
// Description: TOML-backed configuration with environment overrides.
// Purpose: Provide typed, validated settings for the client, suite, and reports.
// Dependencies: serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is read from `company-contract.toml` (or an explicit path),
//! then environment overrides are applied, then the result is validated.
//! A missing default file is not an error; a missing explicit file is.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;
mod model;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::ContractEnv;
pub use env::EnvOverrides;
pub use env::read_env_strict;
pub use model::ConfigError;
pub use model::ContractConfig;
pub use model::DEFAULT_BASE_URL;
pub use model::DEFAULT_CONFIG_NAME;
pub use model::ReportConfig;
pub use model::SuiteConfig;
pub use model::TargetConfig;
