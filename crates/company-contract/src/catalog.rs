// crates/company-contract/src/catalog.rs
// ============================================================================
// Module: Scenario Catalog
// Description: Request sequences for every catalog scenario.
// Purpose: Map each ScenarioId to the calls it issues and the outcome it asserts.
// Dependencies: serde_json, tracing
// ============================================================================

//! ## Overview
//! Every scenario is an async function over a [`ScenarioContext`]. Setup
//! creations draw a fresh CNPJ from the per-run allocator, so a record left
//! over from an earlier run cannot turn a setup call into a 409.
//!
//! Scenarios return short notes on success (ids created, counts observed)
//! and a [`ScenarioError`] on the first failed request.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use serde_json::json;
use tracing::debug;

use crate::company::CompanyId;
use crate::company::CompanyPayload;
use crate::company::EXTRA_FIELD_NAME;
use crate::company::EXTRA_FIELD_VALUE;
use crate::company::INVALID_CNPJ;
use crate::company::SEED_NAME;
use crate::scenario::COMPANY_PATH;
use crate::scenario::ScenarioContext;
use crate::scenario::ScenarioError;
use crate::scenario::ScenarioId;
use crate::scenario::company_path;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Notes collected by a passing scenario.
pub type ScenarioNotes = Vec<String>;

/// Result of one scenario.
pub type ScenarioResult = Result<ScenarioNotes, ScenarioError>;

// ============================================================================
// SECTION: Dispatch
// ============================================================================

/// Runs one scenario to completion.
///
/// # Errors
///
/// Returns [`ScenarioError`] when any request of the scenario fails.
pub async fn run_scenario(id: ScenarioId, ctx: &mut ScenarioContext) -> ScenarioResult {
    debug!(scenario = id.as_str(), "scenario started");
    match id {
        ScenarioId::CreateValid => create_valid(ctx).await,
        ScenarioId::CreateMissingName => create_missing_name(ctx).await,
        ScenarioId::CreateInvalidCnpj => create_invalid_cnpj(ctx).await,
        ScenarioId::CreateDuplicateCnpj => create_duplicate_cnpj(ctx).await,
        ScenarioId::CreateMissingCnpj => create_missing_cnpj(ctx).await,
        ScenarioId::CreateExtraField => create_extra_field(ctx).await,
        ScenarioId::ListCompanies => list_companies(ctx).await,
        ScenarioId::FetchById => fetch_by_id(ctx).await,
        ScenarioId::DeleteExisting => delete_existing(ctx).await,
        ScenarioId::DeleteMissing => delete_missing(ctx).await,
        ScenarioId::UpdateExisting => update_existing(ctx).await,
        ScenarioId::UpdateInvalidCnpj => update_invalid_cnpj(ctx).await,
        ScenarioId::CreateEmptyPayload => create_empty_payload(ctx).await,
        ScenarioId::BulkCreate => bulk_create(ctx).await,
        ScenarioId::FilterByName => filter_by_name(ctx).await,
    }
}

// ============================================================================
// SECTION: Creation
// ============================================================================

/// POST the seed company, then read it back by id.
async fn create_valid(ctx: &mut ScenarioContext) -> ScenarioResult {
    let cnpj = ctx.fresh_cnpj()?;
    let id = ctx.create(&CompanyPayload::seed().with_cnpj(&cnpj.formatted())).await?;
    ctx.client()
        .spec()
        .get(company_path(&id))
        .expect_status(200)
        .expect_json_match(json!({ "name": SEED_NAME }))
        .send()
        .await?;
    Ok(vec![format!("created id {id} with cnpj {cnpj}")])
}

/// POST the seed company without `name`.
async fn create_missing_name(ctx: &mut ScenarioContext) -> ScenarioResult {
    let cnpj = ctx.fresh_cnpj()?;
    let payload = CompanyPayload::seed().with_cnpj(&cnpj.formatted()).without_name();
    ctx.post_company(&payload, &[400]).await?;
    Ok(Vec::new())
}

/// POST the seed company with a malformed CNPJ.
async fn create_invalid_cnpj(ctx: &mut ScenarioContext) -> ScenarioResult {
    let payload = CompanyPayload::seed().with_cnpj(INVALID_CNPJ);
    ctx.post_company(&payload, &[400]).await?;
    Ok(Vec::new())
}

/// Create a record, then repeat the identical payload.
async fn create_duplicate_cnpj(ctx: &mut ScenarioContext) -> ScenarioResult {
    let cnpj = ctx.fresh_cnpj()?;
    let payload = CompanyPayload::seed().with_cnpj(&cnpj.formatted());
    let id = ctx.create(&payload).await?;
    ctx.post_company(&payload, &[409]).await?;
    Ok(vec![format!("original id {id} with cnpj {cnpj}")])
}

/// POST the seed company without `cnpj`.
async fn create_missing_cnpj(ctx: &mut ScenarioContext) -> ScenarioResult {
    ctx.post_company(&CompanyPayload::seed().without_cnpj(), &[400]).await?;
    Ok(Vec::new())
}

/// POST the seed company plus `extraField`.
async fn create_extra_field(ctx: &mut ScenarioContext) -> ScenarioResult {
    let cnpj = ctx.fresh_cnpj()?;
    let payload = CompanyPayload::seed()
        .with_cnpj(&cnpj.formatted())
        .with_extra_field(EXTRA_FIELD_NAME, Value::String(EXTRA_FIELD_VALUE.to_string()));
    ctx.post_company(&payload, &[400]).await?;
    Ok(Vec::new())
}

/// POST `{}`.
async fn create_empty_payload(ctx: &mut ScenarioContext) -> ScenarioResult {
    ctx.post_company(&CompanyPayload::empty(), &[400]).await?;
    Ok(Vec::new())
}

/// Sequential creations, each with its own CNPJ, all expecting 201.
async fn bulk_create(ctx: &mut ScenarioContext) -> ScenarioResult {
    let count = ctx.options().bulk_count;
    for index in 0 .. count {
        create_bulk_entry(ctx, index).await.map_err(|err| ScenarioError::Bulk {
            index,
            count,
            source: Box::new(err),
        })?;
    }
    Ok(vec![format!("created {count} companies")])
}

/// Creates `Empresa {index}` with a fresh CNPJ.
async fn create_bulk_entry(ctx: &mut ScenarioContext, index: usize) -> ScenarioResult {
    let cnpj = ctx.fresh_cnpj()?;
    let id = ctx.create(&CompanyPayload::bulk(index, &cnpj)).await?;
    Ok(vec![format!("created id {id}")])
}

// ============================================================================
// SECTION: Reads
// ============================================================================

/// GET the collection.
async fn list_companies(ctx: &mut ScenarioContext) -> ScenarioResult {
    let response = ctx.client().spec().get(COMPANY_PATH).expect_status(200).send().await?;
    Ok(match response.body().as_array() {
        Some(records) => vec![format!("listed {} companies", records.len())],
        None => Vec::new(),
    })
}

/// Create a record, then fetch it and compare every submitted field.
async fn fetch_by_id(ctx: &mut ScenarioContext) -> ScenarioResult {
    let cnpj = ctx.fresh_cnpj()?;
    let payload = CompanyPayload::seed().with_cnpj(&cnpj.formatted());
    let id = ctx.create(&payload).await?;
    read_back(ctx, &id, &payload).await?;
    Ok(vec![format!("fetched id {id}")])
}

/// GETs `id` and checks the record echoes every field of `payload`.
async fn read_back(
    ctx: &ScenarioContext,
    id: &CompanyId,
    payload: &CompanyPayload,
) -> Result<(), ScenarioError> {
    let response = ctx.client().spec().get(company_path(id)).expect_status(200).send().await?;
    let company = response.company()?;
    let mut fields = company.mismatched_fields(payload);
    if company.id != *id {
        fields.insert(0, "id");
    }
    if fields.is_empty() {
        return Ok(());
    }
    Err(ScenarioError::Record {
        id: id.clone(),
        fields,
    })
}

/// Every record returned for `?name=Empresa Teste` must carry that name.
async fn filter_by_name(ctx: &mut ScenarioContext) -> ScenarioResult {
    let response = ctx
        .client()
        .spec()
        .get(COMPANY_PATH)
        .with_query("name", SEED_NAME)
        .expect_status(200)
        .expect_json_match(json!({ "name": SEED_NAME }))
        .send()
        .await?;
    Ok(match response.body().as_array() {
        Some(records) => vec![format!("{} companies named {SEED_NAME}", records.len())],
        None => Vec::new(),
    })
}

// ============================================================================
// SECTION: Mutation
// ============================================================================

/// Create a record, then delete it.
async fn delete_existing(ctx: &mut ScenarioContext) -> ScenarioResult {
    let cnpj = ctx.fresh_cnpj()?;
    let id = ctx.create(&CompanyPayload::seed().with_cnpj(&cnpj.formatted())).await?;
    ctx.client().spec().delete(company_path(&id)).expect_status(200).send().await?;
    ctx.forget(&id);
    Ok(vec![format!("deleted id {id}")])
}

/// DELETE an id the server never issued.
async fn delete_missing(ctx: &mut ScenarioContext) -> ScenarioResult {
    let path = company_path(&ctx.options().missing_company_id);
    ctx.client().spec().delete(path).expect_status(404).send().await?;
    Ok(Vec::new())
}

/// Replace every field, keeping the CNPJ, then confirm the stored record.
async fn update_existing(ctx: &mut ScenarioContext) -> ScenarioResult {
    let cnpj = ctx.fresh_cnpj()?;
    let id = ctx.create(&CompanyPayload::seed().with_cnpj(&cnpj.formatted())).await?;
    let updated = CompanyPayload::updated(&cnpj.formatted());
    ctx.client()
        .spec()
        .put(company_path(&id))
        .with_json(updated.to_json())
        .expect_status(200)
        .send()
        .await?;
    read_back(ctx, &id, &updated).await?;
    Ok(vec![format!("updated id {id}")])
}

/// Create a record, then PUT a malformed CNPJ onto it.
async fn update_invalid_cnpj(ctx: &mut ScenarioContext) -> ScenarioResult {
    let cnpj = ctx.fresh_cnpj()?;
    let id = ctx.create(&CompanyPayload::seed().with_cnpj(&cnpj.formatted())).await?;
    ctx.client()
        .spec()
        .put(company_path(&id))
        .with_json(CompanyPayload::updated(INVALID_CNPJ).to_json())
        .expect_status(400)
        .send()
        .await?;
    Ok(Vec::new())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
