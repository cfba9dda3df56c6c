// system-tests/tests/suites/catalog_stub.rs
// ============================================================================
// Module: Catalog Against Stub Tests
// Description: Runs the scenario catalog against the in-process company stub.
// Purpose: Prove a conforming API passes and each broken rule is reported.
// Dependencies: company-contract, system-tests helpers
// ============================================================================

use company_contract::CaseStatus;
use company_contract::ScenarioId;
use helpers::harness::STUB_BULK_COUNT;
use helpers::harness::failed_cases;
use helpers::harness::run_collecting;
use system_tests::stub::StubDefects;
use system_tests::stub::spawn_company_stub;
use system_tests::stub::spawn_company_stub_with_defects;

use crate::helpers;

#[tokio::test(flavor = "multi_thread")]
async fn conforming_api_passes_full_catalog() -> Result<(), Box<dyn std::error::Error>> {
    let stub = spawn_company_stub()?;
    let (summary, reporter) =
        run_collecting(stub.base_url(), ScenarioId::ALL.to_vec(), false).await?;

    let failures = failed_cases(&summary);
    if !failures.is_empty() {
        return Err(format!("expected every case to pass: {}", failures.join("; ")).into());
    }
    if summary.passed != ScenarioId::ALL.len() {
        let expected = ScenarioId::ALL.len();
        return Err(format!("expected {expected} passes, got {}", summary.passed).into());
    }
    let order: Vec<ScenarioId> = reporter.cases.iter().map(|case| case.id).collect();
    if order != ScenarioId::ALL.to_vec() {
        return Err("cases must be reported in catalog order".into());
    }
    if reporter.started.as_ref().map(|start| start.scenarios.len()) != Some(ScenarioId::ALL.len())
    {
        return Err("suite start must list every scenario".into());
    }
    // Survivors: create_valid, the duplicate original, fetch_by_id, both update setups, bulk.
    let expected_remaining = 5 + STUB_BULK_COUNT;
    if stub.company_count() != expected_remaining {
        return Err(format!(
            "expected {expected_remaining} stored companies, found {}",
            stub.company_count()
        )
        .into());
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn filter_query_is_percent_encoded() -> Result<(), Box<dyn std::error::Error>> {
    let stub = spawn_company_stub()?;
    let (summary, _) = run_collecting(
        stub.base_url(),
        vec![ScenarioId::CreateValid, ScenarioId::FilterByName],
        false,
    )
    .await?;
    if !summary.all_passed() {
        return Err(failed_cases(&summary).join("; ").into());
    }
    let filtered = stub
        .requests()
        .into_iter()
        .find(|request| request.method == "GET" && request.query.is_some())
        .ok_or("filter request not observed")?;
    if filtered.path != "/docs/company" || filtered.query.as_deref() != Some("name=Empresa%20Teste")
    {
        return Err(format!(
            "unexpected filter request: {}?{}",
            filtered.path,
            filtered.query.unwrap_or_default()
        )
        .into());
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn filter_without_matches_fails() -> Result<(), Box<dyn std::error::Error>> {
    let stub = spawn_company_stub()?;
    let (summary, reporter) =
        run_collecting(stub.base_url(), vec![ScenarioId::FilterByName], false).await?;
    if summary.failed != 1 {
        return Err("an empty filter result must not satisfy the name match".into());
    }
    if reporter.failure(ScenarioId::FilterByName).is_none() {
        return Err("failure text missing".into());
    }
    Ok(())
}

/// Runs the catalog against a defective stub and checks exactly `expected` fail.
async fn assert_defect_detected(
    defects: StubDefects,
    expected: &[ScenarioId],
) -> Result<(), Box<dyn std::error::Error>> {
    let stub = spawn_company_stub_with_defects(defects)?;
    let (summary, _) = run_collecting(stub.base_url(), ScenarioId::ALL.to_vec(), false).await?;
    let mut failed: Vec<ScenarioId> = summary
        .cases
        .iter()
        .filter(|case| case.status == CaseStatus::Failed)
        .map(|case| case.id)
        .collect();
    failed.sort();
    let mut expected = expected.to_vec();
    expected.sort();
    if failed != expected {
        let failed: Vec<&str> = failed.iter().map(|id| id.as_str()).collect();
        let expected: Vec<&str> = expected.iter().map(|id| id.as_str()).collect();
        return Err(format!(
            "expected failures [{}], got [{}]",
            expected.join(", "),
            failed.join(", ")
        )
        .into());
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn duplicate_acceptance_is_detected() -> Result<(), Box<dyn std::error::Error>> {
    assert_defect_detected(
        StubDefects {
            allow_duplicate_cnpj: true,
            ..StubDefects::default()
        },
        &[ScenarioId::CreateDuplicateCnpj],
    )
    .await
}

#[tokio::test(flavor = "multi_thread")]
async fn extra_field_acceptance_is_detected() -> Result<(), Box<dyn std::error::Error>> {
    assert_defect_detected(
        StubDefects {
            accept_extra_fields: true,
            ..StubDefects::default()
        },
        &[ScenarioId::CreateExtraField],
    )
    .await
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_cnpj_validation_is_detected() -> Result<(), Box<dyn std::error::Error>> {
    assert_defect_detected(
        StubDefects {
            skip_cnpj_validation: true,
            ..StubDefects::default()
        },
        &[ScenarioId::CreateInvalidCnpj, ScenarioId::UpdateInvalidCnpj],
    )
    .await
}

#[tokio::test(flavor = "multi_thread")]
async fn ignored_name_filter_is_detected() -> Result<(), Box<dyn std::error::Error>> {
    assert_defect_detected(
        StubDefects {
            ignore_name_filter: true,
            ..StubDefects::default()
        },
        &[ScenarioId::FilterByName],
    )
    .await
}

#[tokio::test(flavor = "multi_thread")]
async fn lenient_delete_is_detected() -> Result<(), Box<dyn std::error::Error>> {
    assert_defect_detected(
        StubDefects {
            delete_missing_ok: true,
            ..StubDefects::default()
        },
        &[ScenarioId::DeleteMissing],
    )
    .await
}

#[tokio::test(flavor = "multi_thread")]
async fn nameless_creation_is_detected() -> Result<(), Box<dyn std::error::Error>> {
    assert_defect_detected(
        StubDefects {
            accept_missing_name: true,
            ..StubDefects::default()
        },
        &[ScenarioId::CreateMissingName],
    )
    .await
}

#[tokio::test(flavor = "multi_thread")]
async fn cnpjless_creation_is_detected() -> Result<(), Box<dyn std::error::Error>> {
    assert_defect_detected(
        StubDefects {
            accept_missing_cnpj: true,
            ..StubDefects::default()
        },
        &[ScenarioId::CreateMissingCnpj],
    )
    .await
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_payload_creation_is_detected() -> Result<(), Box<dyn std::error::Error>> {
    assert_defect_detected(
        StubDefects {
            accept_empty_payload: true,
            ..StubDefects::default()
        },
        &[ScenarioId::CreateEmptyPayload],
    )
    .await
}

#[tokio::test(flavor = "multi_thread")]
async fn unpersisted_update_is_detected() -> Result<(), Box<dyn std::error::Error>> {
    assert_defect_detected(
        StubDefects {
            ignore_updates: true,
            ..StubDefects::default()
        },
        &[ScenarioId::UpdateExisting],
    )
    .await
}

#[tokio::test(flavor = "multi_thread")]
async fn altered_read_back_is_detected() -> Result<(), Box<dyn std::error::Error>> {
    assert_defect_detected(
        StubDefects {
            mangle_fetch: true,
            ..StubDefects::default()
        },
        &[ScenarioId::FetchById, ScenarioId::UpdateExisting],
    )
    .await
}

#[tokio::test(flavor = "multi_thread")]
async fn wrong_creation_status_fails_and_is_still_cleaned_up()
-> Result<(), Box<dyn std::error::Error>> {
    let stub = spawn_company_stub_with_defects(StubDefects {
        create_returns_ok: true,
        ..StubDefects::default()
    })?;
    let (summary, reporter) =
        run_collecting(stub.base_url(), vec![ScenarioId::CreateValid], true).await?;
    if summary.failed != 1 {
        return Err("200 on creation must fail create_valid".into());
    }
    let failure = reporter.failure(ScenarioId::CreateValid).unwrap_or_default();
    if !failure.contains("200") || !failure.contains("201") {
        return Err(format!("failure should name both statuses: {failure}").into());
    }
    let cleanup = summary.cleanup.ok_or("cleanup summary missing")?;
    if cleanup.deleted != 1 || stub.company_count() != 0 {
        return Err(format!(
            "stray creation should be deleted, deleted={} remaining={}",
            cleanup.deleted,
            stub.company_count()
        )
        .into());
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn cleanup_deletes_every_created_company() -> Result<(), Box<dyn std::error::Error>> {
    let stub = spawn_company_stub()?;
    let (summary, _) = run_collecting(stub.base_url(), ScenarioId::ALL.to_vec(), true).await?;
    if !summary.all_passed() {
        return Err(failed_cases(&summary).join("; ").into());
    }
    let cleanup = summary.cleanup.ok_or("cleanup summary missing")?;
    if !cleanup.failed.is_empty() {
        return Err("cleanup reported failures".into());
    }
    if stub.company_count() != 0 {
        return Err(format!("{} companies left after cleanup", stub.company_count()).into());
    }
    Ok(())
}
