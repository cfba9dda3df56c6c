// crates/company-contract/src/company.rs
// ============================================================================
// Module: Company Resource
// Description: Request payloads and response records for the company API.
// Purpose: Express valid, partial, empty, and over-specified company bodies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The remote API owns the company resource. The suite only needs to build
//! request bodies (including deliberately broken ones) and read back the
//! server-assigned `id` and echoed fields.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::de;
use serde_json::Map;
use serde_json::Value;

use crate::cnpj::Cnpj;

// ============================================================================
// SECTION: Fixture Values
// ============================================================================

/// Name used by the seed company and the name filter.
pub const SEED_NAME: &str = "Empresa Teste";
/// CNPJ carried by the seed company.
pub const SEED_CNPJ: &str = "12.345.678/0001-95";
/// A CNPJ value that fails the server's format check.
pub const INVALID_CNPJ: &str = "CNPJ-Inválido";
/// Unknown field name sent to check strict payload validation.
pub const EXTRA_FIELD_NAME: &str = "extraField";
/// Value carried by the unknown field.
pub const EXTRA_FIELD_VALUE: &str = "Invalido";

// ============================================================================
// SECTION: Identifiers
// ============================================================================

/// Server-assigned company identifier.
///
/// # Invariants
/// - Numeric ids are kept in their decimal string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CompanyId(String);

impl CompanyId {
    /// Wraps an id string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Reads an id from a JSON number or non-empty string.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => Some(Self(number.to_string())),
            Value::String(text) if !text.trim().is_empty() => Some(Self(text.clone())),
            _ => None,
        }
    }

    /// Returns the id as a path segment.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for CompanyId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value)
            .ok_or_else(|| de::Error::custom("company id must be a number or non-empty string"))
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SECTION: Payloads
// ============================================================================

/// Company request body.
///
/// Every field is optional so missing-field payloads can be expressed;
/// `None` fields are omitted from the JSON. `extra` carries fields the API
/// does not define.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyPayload {
    /// Company name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Registry number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cnpj: Option<String>,
    /// State.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// City.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Street address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Business sector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    /// Fields outside the company schema.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl CompanyPayload {
    /// Returns the empty payload `{}`.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the seed company carrying [`SEED_CNPJ`].
    #[must_use]
    pub fn seed() -> Self {
        Self {
            name: Some(SEED_NAME.to_string()),
            cnpj: Some(SEED_CNPJ.to_string()),
            state: Some("São Paulo".to_string()),
            city: Some("São Paulo".to_string()),
            address: Some("Rua Deodoro da Fonseca".to_string()),
            sector: Some("Facção".to_string()),
            extra: BTreeMap::new(),
        }
    }

    /// Returns the replacement fields used by update scenarios.
    #[must_use]
    pub fn updated(cnpj: &str) -> Self {
        Self {
            name: Some("Empresa Atualizada".to_string()),
            cnpj: Some(cnpj.to_string()),
            state: Some("Rio de Janeiro".to_string()),
            city: Some("Rio de Janeiro".to_string()),
            address: Some("Rua Atualizada".to_string()),
            sector: Some("Varejo".to_string()),
            extra: BTreeMap::new(),
        }
    }

    /// Returns the seed company renamed `Empresa {index}`, as used by bulk creation.
    #[must_use]
    pub fn bulk(index: usize, cnpj: &Cnpj) -> Self {
        Self {
            name: Some(format!("Empresa {index}")),
            ..Self::seed().with_cnpj(&cnpj.formatted())
        }
    }

    /// Replaces the CNPJ.
    #[must_use]
    pub fn with_cnpj(mut self, cnpj: &str) -> Self {
        self.cnpj = Some(cnpj.to_string());
        self
    }

    /// Drops the name.
    #[must_use]
    pub fn without_name(mut self) -> Self {
        self.name = None;
        self
    }

    /// Drops the CNPJ.
    #[must_use]
    pub fn without_cnpj(mut self) -> Self {
        self.cnpj = None;
        self
    }

    /// Adds a field outside the company schema.
    #[must_use]
    pub fn with_extra_field(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    /// Serializes the payload to a JSON object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        let fields = [
            ("name", &self.name),
            ("cnpj", &self.cnpj),
            ("state", &self.state),
            ("city", &self.city),
            ("address", &self.address),
            ("sector", &self.sector),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                object.insert(key.to_string(), Value::String(value.clone()));
            }
        }
        for (key, value) in &self.extra {
            object.insert(key.clone(), value.clone());
        }
        Value::Object(object)
    }
}

// ============================================================================
// SECTION: Records
// ============================================================================

/// Company record as returned by the API.
///
/// Unknown response fields (timestamps, database metadata) are preserved in
/// `other` and otherwise ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Company {
    /// Server-assigned identifier.
    pub id: CompanyId,
    /// Company name.
    #[serde(default)]
    pub name: Option<String>,
    /// Registry number.
    #[serde(default)]
    pub cnpj: Option<String>,
    /// State.
    #[serde(default)]
    pub state: Option<String>,
    /// City.
    #[serde(default)]
    pub city: Option<String>,
    /// Street address.
    #[serde(default)]
    pub address: Option<String>,
    /// Business sector.
    #[serde(default)]
    pub sector: Option<String>,
    /// Remaining response fields.
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

impl Company {
    /// Lists the payload fields this record does not echo back unchanged.
    ///
    /// Fields absent from `payload` are not compared; extras never are.
    #[must_use]
    pub fn mismatched_fields(&self, payload: &CompanyPayload) -> Vec<&'static str> {
        let pairs = [
            ("name", &payload.name, &self.name),
            ("cnpj", &payload.cnpj, &self.cnpj),
            ("state", &payload.state, &self.state),
            ("city", &payload.city, &self.city),
            ("address", &payload.address, &self.address),
            ("sector", &payload.sector, &self.sector),
        ];
        pairs
            .into_iter()
            .filter(|(_, sent, stored)| sent.is_some() && sent != stored)
            .map(|(field, _, _)| field)
            .collect()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[path = "company_tests.rs"]
mod tests;
