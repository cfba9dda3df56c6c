// crates/company-contract/src/runner.rs
// ============================================================================
// Module: Suite Runner
// Description: Sequential execution of catalog scenarios with reporting.
// Purpose: Run each case to completion, record outcomes, and clean up.
// Dependencies: serde, thiserror, tokio, tracing
// ============================================================================

//! ## Overview
//! [`SuiteRunner::run`] executes the selected scenarios one at a time, in
//! catalog order. A failing case is recorded and the suite moves on; only
//! reporter failures abort a run.
//!
//! ## Invariants
//! - No two requests are ever in flight at once.
//! - The reporter's start hook fires once before the first case and its
//!   finish hook once after the last case (and after cleanup).
//! - Cleanup failures are logged, never turned into case failures.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;
use std::time::Instant;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use thiserror::Error;
use tokio::time::sleep;
use tracing::info;
use tracing::warn;

use crate::catalog::run_scenario;
use crate::client::ApiClient;
use crate::client::ClientError;
use crate::cnpj::CnpjAllocator;
use crate::company::CompanyId;
use crate::config::ContractConfig;
use crate::report::ReportError;
use crate::report::SuiteReporter;
use crate::scenario::COMPANY_PATH;
use crate::scenario::ScenarioContext;
use crate::scenario::ScenarioId;
use crate::scenario::ScenarioOptions;
use crate::scenario::company_path;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Delay between readiness probes.
const READY_POLL_INTERVAL: Duration = Duration::from_millis(500);

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors that abort a suite run.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The HTTP client could not be built.
    #[error(transparent)]
    Client(#[from] ClientError),
    /// A reporter hook failed.
    #[error(transparent)]
    Report(#[from] ReportError),
    /// Selection left nothing to run.
    #[error("no scenarios selected")]
    NoScenarios,
    /// The API never answered within the readiness window.
    #[error("{base_url} not ready after {attempts} attempts: {reason}")]
    NotReady {
        /// Base URL that was probed.
        base_url: String,
        /// Probes issued.
        attempts: u32,
        /// Last transport failure.
        reason: String,
    },
}

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Result of a single case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    /// Every request met its expectations.
    Passed,
    /// A request failed or missed an expectation.
    Failed,
}

impl CaseStatus {
    /// Returns the status label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
        }
    }
}

/// Outcome of one executed scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseOutcome {
    /// Scenario that ran.
    pub id: ScenarioId,
    /// Report group of the scenario.
    pub group: &'static str,
    /// Human-readable title.
    pub title: &'static str,
    /// Pass or fail.
    pub status: CaseStatus,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
    /// Notes recorded by a passing case.
    pub notes: Vec<String>,
    /// Failure message of a failing case.
    pub failure: Option<String>,
}

impl CaseOutcome {
    /// Returns true when the case passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == CaseStatus::Passed
    }
}

/// Information handed to reporters before the first case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteStart {
    /// Base URL under test.
    pub base_url: String,
    /// Run start, in milliseconds since the Unix epoch.
    pub started_at_ms: u64,
    /// Scenarios about to run, in order.
    pub scenarios: Vec<ScenarioId>,
}

/// Result of the post-run cleanup pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupSummary {
    /// Ids deleted (or already gone).
    pub deleted: usize,
    /// Ids the server refused to delete.
    pub failed: Vec<CompanyId>,
}

/// Result of a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteSummary {
    /// Base URL under test.
    pub base_url: String,
    /// Run start, in milliseconds since the Unix epoch.
    pub started_at_ms: u64,
    /// Run end, in milliseconds since the Unix epoch.
    pub finished_at_ms: u64,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
    /// Count of passed cases.
    pub passed: usize,
    /// Count of failed cases.
    pub failed: usize,
    /// Per-case outcomes in execution order.
    pub cases: Vec<CaseOutcome>,
    /// Cleanup result, when cleanup ran.
    pub cleanup: Option<CleanupSummary>,
}

impl SuiteSummary {
    /// Returns true when every case passed.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

// ============================================================================
// SECTION: Options
// ============================================================================

/// Runner settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Scenarios to run, in order.
    pub scenarios: Vec<ScenarioId>,
    /// Per-scenario tunables.
    pub scenario: ScenarioOptions,
    /// Delete created records after the last case.
    pub cleanup: bool,
    /// Readiness window before the first case.
    pub ready_timeout: Option<Duration>,
}

impl RunOptions {
    /// Derives options from a validated configuration, selecting every scenario.
    #[must_use]
    pub fn from_config(config: &ContractConfig) -> Self {
        Self {
            scenarios: ScenarioId::ALL.to_vec(),
            scenario: ScenarioOptions {
                bulk_count: config.suite.bulk_count,
                missing_company_id: CompanyId::new(config.suite.missing_company_id.trim()),
            },
            cleanup: config.suite.cleanup,
            ready_timeout: config.target.ready_timeout(),
        }
    }
}

/// Filters the catalog down to `only` (all when empty) minus `skip`, in catalog order.
#[must_use]
pub fn select_scenarios(only: &[ScenarioId], skip: &[ScenarioId]) -> Vec<ScenarioId> {
    ScenarioId::ALL
        .into_iter()
        .filter(|id| only.is_empty() || only.contains(id))
        .filter(|id| !skip.contains(id))
        .collect()
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Sequential executor for catalog scenarios.
pub struct SuiteRunner {
    /// Client shared by every case.
    client: ApiClient,
    /// Runner settings.
    options: RunOptions,
}

impl SuiteRunner {
    /// Creates a runner around an existing client.
    #[must_use]
    pub const fn new(client: ApiClient, options: RunOptions) -> Self {
        Self {
            client,
            options,
        }
    }

    /// Creates a runner from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Client`] when the HTTP client cannot be built.
    pub fn from_config(config: &ContractConfig) -> Result<Self, RunnerError> {
        let client = ApiClient::from_target(&config.target)?;
        Ok(Self::new(client, RunOptions::from_config(config)))
    }

    /// Replaces the scenario selection.
    #[must_use]
    pub fn with_scenarios(mut self, scenarios: Vec<ScenarioId>) -> Self {
        self.options.scenarios = scenarios;
        self
    }

    /// Returns the client.
    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Returns the runner settings.
    #[must_use]
    pub const fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Runs the selected scenarios and reports each outcome.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] when nothing is selected, the API never
    /// becomes ready, or a reporter hook fails. Case failures are not errors.
    pub async fn run(&self, reporter: &mut dyn SuiteReporter) -> Result<SuiteSummary, RunnerError> {
        if self.options.scenarios.is_empty() {
            return Err(RunnerError::NoScenarios);
        }
        if let Some(timeout) = self.options.ready_timeout {
            self.wait_until_ready(timeout).await?;
        }

        let started = Instant::now();
        let started_at_ms = now_millis();
        let base_url = self.client.base_url().to_string();
        reporter.suite_started(&SuiteStart {
            base_url: base_url.clone(),
            started_at_ms,
            scenarios: self.options.scenarios.clone(),
        })?;
        info!(base_url = %base_url, cases = self.options.scenarios.len(), "suite started");

        let mut ctx = ScenarioContext::new(
            self.client.clone(),
            CnpjAllocator::for_run(u128::from(started_at_ms)),
            self.options.scenario.clone(),
        );
        let mut cases = Vec::with_capacity(self.options.scenarios.len());
        for id in &self.options.scenarios {
            let outcome = run_case(*id, &mut ctx).await;
            reporter.case_finished(&outcome)?;
            cases.push(outcome);
        }

        let cleanup = if self.options.cleanup {
            Some(self.cleanup(ctx.take_created()).await)
        } else {
            None
        };

        let passed = cases.iter().filter(|case| case.passed()).count();
        let summary = SuiteSummary {
            base_url,
            started_at_ms,
            finished_at_ms: now_millis(),
            duration_ms: elapsed_millis(started),
            passed,
            failed: cases.len() - passed,
            cases,
            cleanup,
        };
        info!(passed = summary.passed, failed = summary.failed, "suite finished");
        reporter.suite_finished(&summary, &self.client.transcript())?;
        Ok(summary)
    }

    /// Polls `GET /company` until any HTTP response arrives.
    async fn wait_until_ready(&self, timeout: Duration) -> Result<(), RunnerError> {
        let start = Instant::now();
        let mut attempts = 0u32;
        loop {
            attempts = attempts.saturating_add(1);
            match self.client.spec().get(COMPANY_PATH).send().await {
                Ok(_) => return Ok(()),
                Err(err) => {
                    if start.elapsed() > timeout {
                        return Err(RunnerError::NotReady {
                            base_url: self.client.base_url().to_string(),
                            attempts,
                            reason: err.to_string(),
                        });
                    }
                    sleep(READY_POLL_INTERVAL).await;
                }
            }
        }
    }

    /// Deletes every id created during the run; 404 counts as already gone.
    async fn cleanup(&self, ids: Vec<CompanyId>) -> CleanupSummary {
        let mut summary = CleanupSummary::default();
        for id in ids {
            let result = self
                .client
                .spec()
                .delete(company_path(&id))
                .expect_status_in(&[200, 202, 204, 404])
                .send()
                .await;
            match result {
                Ok(_) => summary.deleted += 1,
                Err(err) => {
                    warn!(id = %id, error = %err, "cleanup delete failed");
                    summary.failed.push(id);
                }
            }
        }
        summary
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Runs one scenario and folds its result into an outcome.
async fn run_case(id: ScenarioId, ctx: &mut ScenarioContext) -> CaseOutcome {
    let started = Instant::now();
    let result = run_scenario(id, ctx).await;
    let duration_ms = elapsed_millis(started);
    let (status, notes, failure) = match result {
        Ok(notes) => {
            info!(scenario = id.as_str(), duration_ms, "case passed");
            (CaseStatus::Passed, notes, None)
        }
        Err(err) => {
            warn!(scenario = id.as_str(), duration_ms, error = %err, "case failed");
            (CaseStatus::Failed, Vec::new(), Some(err.to_string()))
        }
    };
    CaseOutcome {
        id,
        group: id.group(),
        title: id.title(),
        status,
        duration_ms,
        notes,
        failure,
    }
}

/// Milliseconds since the Unix epoch.
pub(crate) fn now_millis() -> u64 {
    let millis = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
    u64::try_from(millis).unwrap_or(u64::MAX)
}

/// Milliseconds elapsed since `started`.
fn elapsed_millis(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
