// crates/company-contract/src/config/env.rs
// ============================================================================
// Module: Contract Suite Environment
// Description: Environment-variable overrides for the contract configuration.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 or empty values fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use super::model::ConfigError;
use super::model::ContractConfig;
use super::model::MAX_BULK_COUNT;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys recognized by the contract suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractEnv {
    /// Config file path.
    ConfigPath,
    /// Base URL override.
    BaseUrl,
    /// Per-request timeout override in seconds (positive integer).
    TimeoutSeconds,
    /// Artifact directory override.
    RunRoot,
    /// Allow reusing a non-empty run root (`true`/`false` or `1`/`0`).
    AllowOverwrite,
    /// Bulk creation count override.
    BulkCount,
}

impl ContractEnv {
    /// Every key, in documentation order.
    pub const ALL: [Self; 6] = [
        Self::ConfigPath,
        Self::BaseUrl,
        Self::TimeoutSeconds,
        Self::RunRoot,
        Self::AllowOverwrite,
        Self::BulkCount,
    ];

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigPath => "COMPANY_CONTRACT_CONFIG",
            Self::BaseUrl => "COMPANY_CONTRACT_BASE_URL",
            Self::TimeoutSeconds => "COMPANY_CONTRACT_TIMEOUT_SEC",
            Self::RunRoot => "COMPANY_CONTRACT_RUN_ROOT",
            Self::AllowOverwrite => "COMPANY_CONTRACT_ALLOW_OVERWRITE",
            Self::BulkCount => "COMPANY_CONTRACT_BULK_COUNT",
        }
    }
}

// ============================================================================
// SECTION: Overrides
// ============================================================================

/// Values read from the environment; `None` leaves the file value in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnvOverrides {
    /// Base URL override.
    pub base_url: Option<String>,
    /// Per-request timeout override.
    pub timeout: Option<Duration>,
    /// Artifact directory override.
    pub run_root: Option<PathBuf>,
    /// Overwrite permission override.
    pub allow_overwrite: Option<bool>,
    /// Bulk creation count override.
    pub bulk_count: Option<usize>,
}

impl EnvOverrides {
    /// Reads overrides from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a value is not valid UTF-8, is
    /// empty, or fails validation (for example, an invalid timeout or boolean).
    pub fn load() -> Result<Self, ConfigError> {
        let base_url = read_env_nonempty(ContractEnv::BaseUrl.as_str())?;
        let timeout = read_env_nonempty(ContractEnv::TimeoutSeconds.as_str())?
            .map(|value| parse_timeout_seconds(ContractEnv::TimeoutSeconds.as_str(), &value))
            .transpose()?;
        let run_root = read_env_nonempty(ContractEnv::RunRoot.as_str())?.map(PathBuf::from);
        let allow_overwrite = read_env_nonempty(ContractEnv::AllowOverwrite.as_str())?
            .map(|value| parse_bool(ContractEnv::AllowOverwrite.as_str(), &value))
            .transpose()?;
        let bulk_count = read_env_nonempty(ContractEnv::BulkCount.as_str())?
            .map(|value| parse_bulk_count(ContractEnv::BulkCount.as_str(), &value))
            .transpose()?;
        Ok(Self {
            base_url,
            timeout,
            run_root,
            allow_overwrite,
            bulk_count,
        })
    }

    /// Applies the overrides onto a configuration.
    pub fn apply(self, config: &mut ContractConfig) {
        if let Some(base_url) = self.base_url {
            config.target.base_url = base_url;
        }
        if let Some(timeout) = self.timeout {
            config.target.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        }
        if let Some(run_root) = self.run_root {
            config.report.run_root = Some(run_root);
        }
        if let Some(allow_overwrite) = self.allow_overwrite {
            config.report.allow_overwrite = allow_overwrite;
        }
        if let Some(bulk_count) = self.bulk_count {
            config.suite.bulk_count = bulk_count;
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Reads an environment variable and rejects empty values.
fn read_env_nonempty(name: &str) -> Result<Option<String>, ConfigError> {
    match read_env_strict(name).map_err(ConfigError::Invalid)? {
        Some(value) if value.trim().is_empty() => {
            Err(ConfigError::Invalid(format!("{name} must not be empty")))
        }
        Some(value) => Ok(Some(value.trim().to_string())),
        None => Ok(None),
    }
}

/// Parses a positive number of seconds.
fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, ConfigError> {
    let secs: u64 = raw.trim().parse().map_err(|_| {
        ConfigError::Invalid(format!("{name} must be a positive integer number of seconds"))
    })?;
    if secs == 0 {
        return Err(ConfigError::Invalid(format!("{name} must be greater than zero")));
    }
    Ok(Duration::from_secs(secs))
}

/// Parses a boolean literal.
fn parse_bool(name: &str, raw: &str) -> Result<bool, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(ConfigError::Invalid(format!("{name} must be 1, 0, true, or false")))
}

/// Parses a bulk creation count.
fn parse_bulk_count(name: &str, raw: &str) -> Result<usize, ConfigError> {
    let count: usize = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{name} must be a positive integer")))?;
    if count == 0 || count > MAX_BULK_COUNT {
        return Err(ConfigError::Invalid(format!("{name} must be between 1 and {MAX_BULK_COUNT}")));
    }
    Ok(count)
}
