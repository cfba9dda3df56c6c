// crates/company-contract/src/logging_tests.rs
// ============================================================================
// Module: Logging Bootstrap Unit Tests
// Description: Coverage for log filter resolution.
// Purpose: Ensure bad filter directives fail instead of silencing output.
// Dependencies: std
// ============================================================================

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use super::DEFAULT_LOG_FILTER;
use super::LOG_FILTER_ENV;
use super::LoggingError;
use super::log_filter;

mod env_mut {
    #![allow(unsafe_code, reason = "Tests mutate process env vars in a controlled scope.")]

    /// Sets an environment variable for the current process.
    pub fn set_var(key: &str, value: &str) {
        // SAFETY: Only this module touches the log filter variable.
        unsafe {
            std::env::set_var(key, value);
        }
    }

    /// Removes an environment variable from the current process.
    pub fn remove_var(key: &str) {
        // SAFETY: Only this module touches the log filter variable.
        unsafe {
            std::env::remove_var(key);
        }
    }
}

#[test]
fn filter_resolution_follows_env() {
    env_mut::remove_var(LOG_FILTER_ENV);
    assert_eq!(log_filter().unwrap().to_string(), DEFAULT_LOG_FILTER);

    env_mut::set_var(LOG_FILTER_ENV, "company_contract=debug");
    assert_eq!(log_filter().unwrap().to_string(), "company_contract=debug");

    env_mut::set_var(LOG_FILTER_ENV, "company_contract=loudest");
    assert!(matches!(log_filter(), Err(LoggingError::Filter(_))));

    env_mut::remove_var(LOG_FILTER_ENV);
}
