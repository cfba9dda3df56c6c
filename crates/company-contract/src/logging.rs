// crates/company-contract/src/logging.rs
// ============================================================================
// Module: Logging Bootstrap
// Description: tracing-subscriber setup for the contract suite binaries.
// Purpose: Route library diagnostics to stderr with an env-driven filter.
// Dependencies: thiserror, tracing-subscriber
// ============================================================================

//! ## Overview
//! The library emits `tracing` events; binaries call [`init_logging`] once to
//! install a formatting subscriber on stderr. The filter is read from
//! `COMPANY_CONTRACT_LOG` using `EnvFilter` directive syntax and defaults to
//! `info`. Stdout stays reserved for user-facing report output.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::read_env_strict;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable holding the log filter directives.
pub const LOG_FILTER_ENV: &str = "COMPANY_CONTRACT_LOG";

/// Filter used when [`LOG_FILTER_ENV`] is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Logging bootstrap errors.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The filter directives could not be parsed.
    #[error("invalid COMPANY_CONTRACT_LOG filter: {0}")]
    Filter(String),
    /// A global subscriber is already installed.
    #[error("failed to install log subscriber: {0}")]
    Install(String),
}

// ============================================================================
// SECTION: Bootstrap
// ============================================================================

/// Builds the filter from [`LOG_FILTER_ENV`], falling back to [`DEFAULT_LOG_FILTER`].
///
/// # Errors
///
/// Returns [`LoggingError::Filter`] when the variable is not UTF-8 or holds
/// invalid directives.
pub fn log_filter() -> Result<EnvFilter, LoggingError> {
    let directives = read_env_strict(LOG_FILTER_ENV).map_err(LoggingError::Filter)?;
    match directives {
        Some(value) if !value.trim().is_empty() => {
            EnvFilter::try_new(value.trim()).map_err(|err| LoggingError::Filter(err.to_string()))
        }
        _ => Ok(EnvFilter::new(DEFAULT_LOG_FILTER)),
    }
}

/// Installs the global stderr subscriber.
///
/// # Errors
///
/// Returns [`LoggingError`] when the filter is invalid or a subscriber is
/// already installed.
pub fn init_logging() -> Result<(), LoggingError> {
    let filter = log_filter()?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| LoggingError::Install(err.to_string()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
