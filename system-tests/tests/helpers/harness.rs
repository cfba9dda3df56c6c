// system-tests/tests/helpers/harness.rs
// ============================================================================
// Module: Runner Harness
// Description: Builds suite runners pointed at a stub or live base URL.
// Purpose: Keep suites focused on outcomes rather than wiring.
// Dependencies: company-contract
// ============================================================================

use std::time::Duration;

use company_contract::ApiClient;
use company_contract::CaseOutcome;
use company_contract::CaseStatus;
use company_contract::CompanyId;
use company_contract::ReportError;
use company_contract::RunOptions;
use company_contract::ScenarioId;
use company_contract::ScenarioOptions;
use company_contract::SuiteReporter;
use company_contract::SuiteRunner;
use company_contract::SuiteStart;
use company_contract::SuiteSummary;
use company_contract::TranscriptEntry;

/// Request timeout for stub runs.
pub const STUB_TIMEOUT: Duration = Duration::from_secs(10);

/// Readiness budget for stub runs.
pub const STUB_READY_TIMEOUT: Duration = Duration::from_secs(10);

/// Bulk size used against the stub.
pub const STUB_BULK_COUNT: usize = 5;

/// Builds run options for the given scenarios.
pub fn run_options(scenarios: Vec<ScenarioId>, cleanup: bool) -> RunOptions {
    RunOptions {
        scenarios,
        scenario: ScenarioOptions {
            bulk_count: STUB_BULK_COUNT,
            missing_company_id: CompanyId::new("999999"),
        },
        cleanup,
        ready_timeout: Some(STUB_READY_TIMEOUT),
    }
}

/// Builds a runner against `base_url`.
pub fn runner(
    base_url: &str,
    scenarios: Vec<ScenarioId>,
    cleanup: bool,
) -> Result<SuiteRunner, Box<dyn std::error::Error>> {
    let client = ApiClient::new(base_url, STUB_TIMEOUT)?;
    Ok(SuiteRunner::new(client, run_options(scenarios, cleanup)))
}

/// Reporter that keeps every outcome and the final transcript in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    pub started: Option<SuiteStart>,
    pub cases: Vec<CaseOutcome>,
    pub transcript: Vec<TranscriptEntry>,
}

impl MemoryReporter {
    /// Returns the failure text of a case, if it failed.
    pub fn failure(&self, id: ScenarioId) -> Option<&str> {
        self.cases.iter().find(|case| case.id == id).and_then(|case| case.failure.as_deref())
    }
}

impl SuiteReporter for MemoryReporter {
    fn suite_started(&mut self, start: &SuiteStart) -> Result<(), ReportError> {
        self.started = Some(start.clone());
        Ok(())
    }

    fn case_finished(&mut self, outcome: &CaseOutcome) -> Result<(), ReportError> {
        self.cases.push(outcome.clone());
        Ok(())
    }

    fn suite_finished(
        &mut self,
        _summary: &SuiteSummary,
        transcript: &[TranscriptEntry],
    ) -> Result<(), ReportError> {
        self.transcript = transcript.to_vec();
        Ok(())
    }
}

/// Runs the scenarios against `base_url`, collecting everything in memory.
pub async fn run_collecting(
    base_url: &str,
    scenarios: Vec<ScenarioId>,
    cleanup: bool,
) -> Result<(SuiteSummary, MemoryReporter), Box<dyn std::error::Error>> {
    let runner = runner(base_url, scenarios, cleanup)?;
    let mut reporter = MemoryReporter::default();
    let summary = runner.run(&mut reporter).await?;
    Ok((summary, reporter))
}

/// Lists failed case labels with their failure text.
pub fn failed_cases(summary: &SuiteSummary) -> Vec<String> {
    summary
        .cases
        .iter()
        .filter(|case| case.status == CaseStatus::Failed)
        .map(|case| format!("{}: {}", case.id, case.failure.as_deref().unwrap_or_default()))
        .collect()
}
