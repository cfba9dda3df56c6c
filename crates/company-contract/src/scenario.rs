// crates/company-contract/src/scenario.rs
// ============================================================================
// Module: Scenario Identity and Context
// Description: Scenario identifiers, contract rows, and per-case context.
// Purpose: Name every case in the catalog and carry what a case needs to run.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! [`ScenarioId`] lists the catalog in execution order. Each id carries a
//! stable snake_case label (used by the CLI and in reports), a group, a
//! human title, and the contract row it asserts.
//!
//! A [`ScenarioContext`] is shared by the cases of one run: the client, the
//! per-run CNPJ allocator, scenario options, and every id the server handed
//! back from a creation call.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::client::ApiClient;
use crate::client::SpecError;
use crate::client::SpecResponse;
use crate::cnpj::Cnpj;
use crate::cnpj::CnpjAllocator;
use crate::cnpj::CnpjError;
use crate::company::CompanyId;
use crate::company::CompanyPayload;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Collection path of the company resource.
pub const COMPANY_PATH: &str = "/company";

/// Status returned for a successful creation.
pub const CREATED: u16 = 201;

// ============================================================================
// SECTION: Scenario Ids
// ============================================================================

/// Catalog scenarios, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioId {
    /// Create the seed company.
    CreateValid,
    /// Create without `name`.
    CreateMissingName,
    /// Create with a malformed `cnpj`.
    CreateInvalidCnpj,
    /// Create the same `cnpj` twice.
    CreateDuplicateCnpj,
    /// Create without `cnpj`.
    CreateMissingCnpj,
    /// Create with a field outside the schema.
    CreateExtraField,
    /// List the collection.
    ListCompanies,
    /// Fetch a freshly created company.
    FetchById,
    /// Delete a freshly created company.
    DeleteExisting,
    /// Delete an id that does not exist.
    DeleteMissing,
    /// Replace the fields of a freshly created company.
    UpdateExisting,
    /// Replace the `cnpj` with a malformed value.
    UpdateInvalidCnpj,
    /// Create with `{}`.
    CreateEmptyPayload,
    /// Create many companies back to back.
    BulkCreate,
    /// Search the collection by name.
    FilterByName,
}

/// Contract row asserted by a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContractRow {
    /// HTTP method of the call under test.
    pub method: &'static str,
    /// Path template of the call under test.
    pub path: &'static str,
    /// Status the call under test must return.
    pub expected_status: u16,
}

/// Error returned when a scenario label is not in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown scenario `{0}`")]
pub struct UnknownScenario(pub String);

impl ScenarioId {
    /// Every scenario, in execution order.
    pub const ALL: [Self; 15] = [
        Self::CreateValid,
        Self::CreateMissingName,
        Self::CreateInvalidCnpj,
        Self::CreateDuplicateCnpj,
        Self::CreateMissingCnpj,
        Self::CreateExtraField,
        Self::ListCompanies,
        Self::FetchById,
        Self::DeleteExisting,
        Self::DeleteMissing,
        Self::UpdateExisting,
        Self::UpdateInvalidCnpj,
        Self::CreateEmptyPayload,
        Self::BulkCreate,
        Self::FilterByName,
    ];

    /// Returns the stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateValid => "create_valid",
            Self::CreateMissingName => "create_missing_name",
            Self::CreateInvalidCnpj => "create_invalid_cnpj",
            Self::CreateDuplicateCnpj => "create_duplicate_cnpj",
            Self::CreateMissingCnpj => "create_missing_cnpj",
            Self::CreateExtraField => "create_extra_field",
            Self::ListCompanies => "list_companies",
            Self::FetchById => "fetch_by_id",
            Self::DeleteExisting => "delete_existing",
            Self::DeleteMissing => "delete_missing",
            Self::UpdateExisting => "update_existing",
            Self::UpdateInvalidCnpj => "update_invalid_cnpj",
            Self::CreateEmptyPayload => "create_empty_payload",
            Self::BulkCreate => "bulk_create",
            Self::FilterByName => "filter_by_name",
        }
    }

    /// Parses a label, ignoring surrounding whitespace and ASCII case.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownScenario`] when no scenario carries the label.
    pub fn parse(label: &str) -> Result<Self, UnknownScenario> {
        let trimmed = label.trim();
        Self::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownScenario(trimmed.to_string()))
    }

    /// Returns the group the scenario is reported under.
    #[must_use]
    pub const fn group(self) -> &'static str {
        match self {
            Self::CreateValid
            | Self::CreateMissingName
            | Self::CreateInvalidCnpj
            | Self::CreateDuplicateCnpj
            | Self::CreateMissingCnpj
            | Self::CreateExtraField
            | Self::CreateEmptyPayload
            | Self::BulkCreate => "create",
            Self::ListCompanies | Self::FetchById | Self::FilterByName => "read",
            Self::UpdateExisting | Self::UpdateInvalidCnpj => "update",
            Self::DeleteExisting | Self::DeleteMissing => "delete",
        }
    }

    /// Returns the human-readable title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::CreateValid => "Create a valid company",
            Self::CreateMissingName => "Create a company without a name",
            Self::CreateInvalidCnpj => "Create a company with an invalid CNPJ",
            Self::CreateDuplicateCnpj => "Create a company with a duplicate CNPJ",
            Self::CreateMissingCnpj => "Create a company without a CNPJ",
            Self::CreateExtraField => "Create a company with extra fields",
            Self::ListCompanies => "List existing companies",
            Self::FetchById => "Fetch a company by valid id",
            Self::DeleteExisting => "Delete an existing company",
            Self::DeleteMissing => "Delete a missing company",
            Self::UpdateExisting => "Update an existing company",
            Self::UpdateInvalidCnpj => "Update the CNPJ to an invalid value",
            Self::CreateEmptyPayload => "Create a company with an empty payload",
            Self::BulkCreate => "Create companies in bulk",
            Self::FilterByName => "Search companies by name",
        }
    }

    /// Returns the contract row the scenario asserts.
    #[must_use]
    pub const fn contract(self) -> ContractRow {
        let (method, path, expected_status) = match self {
            Self::CreateValid | Self::BulkCreate => ("POST", COMPANY_PATH, CREATED),
            Self::CreateMissingName
            | Self::CreateInvalidCnpj
            | Self::CreateMissingCnpj
            | Self::CreateExtraField
            | Self::CreateEmptyPayload => ("POST", COMPANY_PATH, 400),
            Self::CreateDuplicateCnpj => ("POST", COMPANY_PATH, 409),
            Self::ListCompanies => ("GET", COMPANY_PATH, 200),
            Self::FilterByName => ("GET", "/company?name={name}", 200),
            Self::FetchById => ("GET", "/company/{id}", 200),
            Self::DeleteExisting => ("DELETE", "/company/{id}", 200),
            Self::DeleteMissing => ("DELETE", "/company/{id}", 404),
            Self::UpdateExisting => ("PUT", "/company/{id}", 200),
            Self::UpdateInvalidCnpj => ("PUT", "/company/{id}", 400),
        };
        ContractRow {
            method,
            path,
            expected_status,
        }
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Reasons a scenario fails.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// A request failed or did not meet its expectations.
    #[error(transparent)]
    Spec(#[from] SpecError),
    /// No fresh CNPJ could be allocated.
    #[error("cnpj allocation failed: {0}")]
    Cnpj(#[from] CnpjError),
    /// One creation of a bulk sequence failed.
    #[error("bulk creation {index} of {count} failed: {source}")]
    Bulk {
        /// Zero-based index of the failed creation.
        index: usize,
        /// Total creations attempted.
        count: usize,
        /// Underlying failure.
        source: Box<ScenarioError>,
    },
    /// A fetched record does not echo what was written to it.
    #[error("company {id} read back with altered fields: {}", .fields.join(", "))]
    Record {
        /// Id that was fetched.
        id: CompanyId,
        /// Fields that differ, `id` first when the wrong record came back.
        fields: Vec<&'static str>,
    },
}

// ============================================================================
// SECTION: Context
// ============================================================================

/// Tunables that shape individual scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioOptions {
    /// Number of creations in [`ScenarioId::BulkCreate`].
    pub bulk_count: usize,
    /// Id used by [`ScenarioId::DeleteMissing`].
    pub missing_company_id: CompanyId,
}

/// State shared by the cases of one run.
pub struct ScenarioContext {
    /// Client bound to the API under test.
    client: ApiClient,
    /// Source of fresh CNPJs for setup and creation calls.
    cnpjs: CnpjAllocator,
    /// Scenario tunables.
    options: ScenarioOptions,
    /// Ids returned by creation calls, in creation order.
    created: Vec<CompanyId>,
}

impl ScenarioContext {
    /// Creates a context for one run.
    #[must_use]
    pub const fn new(client: ApiClient, cnpjs: CnpjAllocator, options: ScenarioOptions) -> Self {
        Self {
            client,
            cnpjs,
            options,
            created: Vec::new(),
        }
    }

    /// Returns the client.
    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Returns the scenario options.
    #[must_use]
    pub const fn options(&self) -> &ScenarioOptions {
        &self.options
    }

    /// Returns the ids created so far.
    #[must_use]
    pub fn created(&self) -> &[CompanyId] {
        &self.created
    }

    /// Removes and returns the ids created so far.
    pub fn take_created(&mut self) -> Vec<CompanyId> {
        std::mem::take(&mut self.created)
    }

    /// Drops an id the run already deleted.
    pub fn forget(&mut self, id: &CompanyId) {
        self.created.retain(|created| created != id);
    }

    /// Allocates a CNPJ not used earlier in this run.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Cnpj`] when the allocator is exhausted.
    pub fn fresh_cnpj(&mut self) -> Result<Cnpj, ScenarioError> {
        Ok(self.cnpjs.allocate()?)
    }

    /// Creates a company, expecting 201, and records its id.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Spec`] when the creation is not accepted or
    /// the response carries no id.
    pub async fn create(&mut self, payload: &CompanyPayload) -> Result<CompanyId, ScenarioError> {
        let response = self.post_company(payload, &[CREATED]).await?;
        let id = response.company_id()?;
        self.created.push(id.clone());
        Ok(id)
    }

    /// Posts a payload to the collection, expecting one of `statuses`.
    ///
    /// An id in a successful response is recorded even when the status is
    /// not 201, so cleanup can remove records a defective server accepted.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Spec`] when the request fails or the status
    /// is not accepted.
    pub async fn post_company(
        &mut self,
        payload: &CompanyPayload,
        statuses: &[u16],
    ) -> Result<SpecResponse, ScenarioError> {
        let result = self
            .client
            .spec()
            .post(COMPANY_PATH)
            .with_json(payload.to_json())
            .expect_status_in(statuses)
            .send()
            .await;
        match result {
            Ok(response) => Ok(response),
            Err(err) => {
                self.record_stray_creation();
                Err(err.into())
            }
        }
    }

    /// Records the id of the last exchange when the server accepted it.
    fn record_stray_creation(&mut self) {
        let Some(entry) = self.client.last_exchange() else {
            return;
        };
        let accepted = entry.status.is_some_and(|status| (200 .. 300).contains(&status));
        if entry.method != "POST" || !accepted {
            return;
        }
        let Some(id) = entry.response.get("id").and_then(CompanyId::from_json) else {
            return;
        };
        if !self.created.contains(&id) {
            self.created.push(id);
        }
    }
}

/// Returns the member path of one company.
#[must_use]
pub fn company_path(id: &CompanyId) -> String {
    format!("{COMPANY_PATH}/{}", id.as_str())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[path = "scenario_tests.rs"]
mod tests;
