// crates/company-contract/src/config/model.rs
// ============================================================================
// Module: Contract Configuration Model
// Description: Configuration sections, file loading, and validation.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, thiserror, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with size and path limits.
//! Unknown keys are rejected so typos fail loudly instead of silently
//! running the suite against defaults.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use super::env::ContractEnv;
use super::env::EnvOverrides;
use super::env::read_env_strict;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "company-contract.toml";
/// Base URL of the hosted company API.
pub const DEFAULT_BASE_URL: &str = "https://api-desafio-qa.onrender.com/docs";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 64 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default per-request timeout in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Minimum per-request timeout in milliseconds.
const MIN_TIMEOUT_MS: u64 = 100;
/// Maximum per-request timeout in milliseconds.
const MAX_TIMEOUT_MS: u64 = 300_000;
/// Maximum readiness wait in milliseconds.
const MAX_READY_TIMEOUT_MS: u64 = 600_000;
/// Default number of bulk creations.
const DEFAULT_BULK_COUNT: usize = 100;
/// Maximum number of bulk creations.
pub(crate) const MAX_BULK_COUNT: usize = 1_000;
/// Id assumed not to exist on the server.
const DEFAULT_MISSING_COMPANY_ID: &str = "999999";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Company contract suite configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ContractConfig {
    /// Remote API settings.
    #[serde(default)]
    pub target: TargetConfig,
    /// Scenario settings.
    #[serde(default)]
    pub suite: SuiteConfig,
    /// Report artifact settings.
    #[serde(default)]
    pub report: ReportConfig,
    /// File the configuration was read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Remote API settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetConfig {
    /// Base URL that `/company` paths are joined onto.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Readiness wait before the first case in milliseconds (`0` disables).
    pub ready_timeout_ms: u64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            ready_timeout_ms: 0,
        }
    }
}

impl TargetConfig {
    /// Returns the per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Returns the readiness wait, when enabled.
    #[must_use]
    pub const fn ready_timeout(&self) -> Option<Duration> {
        if self.ready_timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.ready_timeout_ms))
        }
    }

    /// Validates target settings.
    fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(self.base_url.trim())
            .map_err(|err| ConfigError::Invalid(format!("target.base_url is invalid: {err}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(
                "target.base_url must use http:// or https://".to_string(),
            ));
        }
        if !(MIN_TIMEOUT_MS ..= MAX_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "target.timeout_ms must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}"
            )));
        }
        if self.ready_timeout_ms > MAX_READY_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "target.ready_timeout_ms must be at most {MAX_READY_TIMEOUT_MS}"
            )));
        }
        Ok(())
    }
}

/// Scenario settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SuiteConfig {
    /// Number of sequential creations in the bulk scenario.
    pub bulk_count: usize,
    /// Id used by the delete-missing scenario.
    pub missing_company_id: String,
    /// Delete companies created during the run once all cases finish.
    pub cleanup: bool,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            bulk_count: DEFAULT_BULK_COUNT,
            missing_company_id: DEFAULT_MISSING_COMPANY_ID.to_string(),
            cleanup: false,
        }
    }
}

impl SuiteConfig {
    /// Validates scenario settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.bulk_count == 0 || self.bulk_count > MAX_BULK_COUNT {
            return Err(ConfigError::Invalid(format!(
                "suite.bulk_count must be between 1 and {MAX_BULK_COUNT}"
            )));
        }
        let missing = self.missing_company_id.trim();
        if missing.is_empty() {
            return Err(ConfigError::Invalid("suite.missing_company_id must be set".to_string()));
        }
        if missing.contains(['/', '?', '#']) {
            return Err(ConfigError::Invalid(
                "suite.missing_company_id must be a single path segment".to_string(),
            ));
        }
        Ok(())
    }
}

/// Report artifact settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Write run artifacts (summary and transcript files).
    pub artifacts: bool,
    /// Artifact directory override.
    pub run_root: Option<PathBuf>,
    /// Allow writing into a non-empty run root.
    pub allow_overwrite: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            artifacts: true,
            run_root: None,
            allow_overwrite: false,
        }
    }
}

impl ReportConfig {
    /// Validates report settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(run_root) = &self.run_root {
            validate_path(run_root, "report.run_root")?;
        }
        Ok(())
    }
}

impl ContractConfig {
    /// Loads configuration from disk, applies environment overrides, and validates.
    ///
    /// Resolution order: explicit `path`, then `COMPANY_CONTRACT_CONFIG`, then
    /// `company-contract.toml` in the working directory. Only the last may be
    /// absent, in which case defaults are used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading, overriding, or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match resolve_path(path)? {
            ResolvedPath::Required(path) => Self::read_file(&path)?,
            ResolvedPath::Optional(path) => {
                if path.exists() {
                    Self::read_file(&path)?
                } else {
                    Self::default()
                }
            }
        };
        EnvOverrides::load()?.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from TOML text and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.target.validate()?;
        self.suite.validate()?;
        self.report.validate()?;
        Ok(())
    }

    /// Reads and parses one config file without validating it.
    pub(super) fn read_file(path: &Path) -> Result<Self, ConfigError> {
        validate_path(path, "config path")?;
        let bytes = fs::read(path)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Config path after resolution.
enum ResolvedPath {
    /// Named explicitly; must exist.
    Required(PathBuf),
    /// Default location; may be absent.
    Optional(PathBuf),
}

/// Resolves the config path from the caller or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<ResolvedPath, ConfigError> {
    if let Some(path) = path {
        return Ok(ResolvedPath::Required(path.to_path_buf()));
    }
    let name = ContractEnv::ConfigPath.as_str();
    match read_env_strict(name).map_err(ConfigError::Invalid)? {
        Some(value) if value.trim().is_empty() => {
            Err(ConfigError::Invalid(format!("{name} must not be empty")))
        }
        Some(value) => Ok(ResolvedPath::Required(PathBuf::from(value))),
        None => Ok(ResolvedPath::Optional(PathBuf::from(DEFAULT_CONFIG_NAME))),
    }
}

/// Validates a path against length limits.
fn validate_path(path: &Path, field: &str) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} component too long")));
        }
    }
    Ok(())
}
