// system-tests/tests/suites/live_api.rs
// ============================================================================
// Module: Live API Tests
// Description: Full catalog run against a deployed company API.
// Purpose: Record pass/fail per scenario with artifacts for triage.
// Dependencies: company-contract, system-tests helpers
// ============================================================================

use company_contract::ApiClient;
use company_contract::ArtifactReporter;
use company_contract::CompositeReporter;
use company_contract::RunOptions;
use company_contract::ScenarioId;
use company_contract::SuiteRunner;
use company_contract::config::ContractConfig;
use helpers::artifacts::TestArtifacts;
use helpers::harness::MemoryReporter;
use helpers::harness::failed_cases;
use system_tests::config::SystemTestConfig;

use crate::helpers;

#[tokio::test(flavor = "multi_thread")]
async fn live_api_honors_contract() -> Result<(), Box<dyn std::error::Error>> {
    let env = SystemTestConfig::load()?;
    let artifacts = TestArtifacts::new("live_api_honors_contract")?;

    let mut config = ContractConfig::default();
    config.target.base_url.clone_from(&env.live_base_url);
    config.suite.cleanup = true;
    config.validate()?;
    let timeout = env.timeout.unwrap_or_else(|| config.target.timeout());
    let client = ApiClient::new(&config.target.base_url, timeout)?;
    let runner = SuiteRunner::new(client, RunOptions::from_config(&config));

    let mut reporter = CompositeReporter::new()
        .with(Box::new(MemoryReporter::default()))
        .with(Box::new(ArtifactReporter::create(
            artifacts.root(),
            artifacts.allow_overwrite(),
        )?));
    let summary = runner.run(&mut reporter).await?;
    drop(reporter);

    if summary.cases.len() != ScenarioId::ALL.len() {
        return Err("every catalog scenario must run".into());
    }
    if !summary.all_passed() {
        return Err(format!(
            "{} of {} scenarios failed (artifacts in {}): {}",
            summary.failed,
            summary.cases.len(),
            artifacts.root().display(),
            failed_cases(&summary).join("; ")
        )
        .into());
    }
    Ok(())
}
