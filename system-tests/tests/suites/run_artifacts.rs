// system-tests/tests/suites/run_artifacts.rs
// ============================================================================
// Module: Run Artifact Tests
// Description: End-to-end artifact output for a stub-backed run.
// Purpose: Ensure summaries and transcripts land on disk for CI upload.
// Dependencies: company-contract, serde_json, system-tests helpers
// ============================================================================

use company_contract::ArtifactReporter;
use company_contract::CompositeReporter;
use company_contract::ScenarioId;
use company_contract::report::SUMMARY_JSON;
use company_contract::report::SUMMARY_MARKDOWN;
use company_contract::report::TRANSCRIPT_JSON;
use helpers::artifacts::TestArtifacts;
use helpers::harness::MemoryReporter;
use helpers::harness::runner;
use serde_json::Value;
use system_tests::stub::spawn_company_stub;

use crate::helpers;

#[tokio::test(flavor = "multi_thread")]
async fn run_writes_summary_and_transcript() -> Result<(), Box<dyn std::error::Error>> {
    let artifacts = TestArtifacts::new("run_writes_summary_and_transcript")?;
    let stub = spawn_company_stub()?;
    let selected = vec![ScenarioId::CreateValid, ScenarioId::DeleteMissing];
    let runner = runner(stub.base_url(), selected, false)?;

    let mut reporter = CompositeReporter::new()
        .with(Box::new(MemoryReporter::default()))
        .with(Box::new(ArtifactReporter::create(
            artifacts.root(),
            artifacts.allow_overwrite(),
        )?));
    let summary = runner.run(&mut reporter).await?;
    drop(reporter);
    if !summary.all_passed() {
        return Err("stub run should pass".into());
    }

    let summary_json: Value = serde_json::from_str(&artifacts.read_text(SUMMARY_JSON)?)?;
    if summary_json["status"] != "passed" || summary_json["passed"] != 2 {
        return Err(format!("unexpected summary: {summary_json}").into());
    }
    if summary_json["base_url"] != summary.base_url.as_str() {
        return Err("summary must record the base url".into());
    }

    let transcript: Value = serde_json::from_str(&artifacts.read_text(TRANSCRIPT_JSON)?)?;
    let entries = transcript.as_array().ok_or("transcript must be an array")?;
    let methods: Vec<&str> = entries.iter().filter_map(|entry| entry["method"].as_str()).collect();
    // Readiness probe, create, read back, delete of the missing id.
    if methods != ["GET", "POST", "GET", "DELETE"] {
        return Err(format!("unexpected transcript methods: {}", methods.join(",")).into());
    }
    if entries.last().and_then(|entry| entry["status"].as_u64()) != Some(404) {
        return Err("last exchange should be the 404 delete".into());
    }

    let markdown = artifacts.read_text(SUMMARY_MARKDOWN)?;
    if !markdown.contains("| create_valid | create | passed |") {
        return Err(format!("markdown missing create_valid row:\n{markdown}").into());
    }
    Ok(())
}
