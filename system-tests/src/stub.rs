// system-tests/src/stub.rs
// ============================================================================
// Module: Company API Stub
// Description: In-memory axum server implementing the company CRUD contract.
// Purpose: Run the contract catalog offline, with switchable defects.
// Dependencies: axum, company-contract, serde_json, tokio
// ============================================================================

//! ## Overview
//! [`spawn_company_stub`] binds an ephemeral loopback port and serves
//! `/docs/company` and `/docs/company/{id}` from a mutex-guarded map. The
//! server runs on its own thread with a current-thread runtime and shuts down
//! when the [`CompanyStubHandle`] is dropped.
//!
//! [`StubDefects`] flips individual rules off so suites can prove the
//! catalog notices each broken behavior.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::net::TcpListener as StdTcpListener;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::Uri;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use company_contract::cnpj::Cnpj;
use company_contract::cnpj::is_well_formed;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use tokio::runtime::Builder;
use tokio::sync::oneshot;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Path prefix mirroring the hosted API's base URL.
pub const STUB_PREFIX: &str = "/docs";

/// Fields a company record may carry.
const COMPANY_FIELDS: [&str; 6] = ["name", "cnpj", "state", "city", "address", "sector"];

/// Address served under [`StubDefects::mangle_fetch`].
const MANGLED_ADDRESS: &str = "Endereço Alterado";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Rules the stub can be told to break.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StubDefects {
    /// Answer successful creations with 200 instead of 201.
    pub create_returns_ok: bool,
    /// Accept a second record with an existing CNPJ.
    pub allow_duplicate_cnpj: bool,
    /// Accept fields outside the company schema.
    pub accept_extra_fields: bool,
    /// Accept any CNPJ text.
    pub skip_cnpj_validation: bool,
    /// Return the full collection regardless of `?name=`.
    pub ignore_name_filter: bool,
    /// Answer deletes of unknown ids with 200.
    pub delete_missing_ok: bool,
    /// Create records that carry no `name`.
    pub accept_missing_name: bool,
    /// Create records that carry no `cnpj`.
    pub accept_missing_cnpj: bool,
    /// Create a record from `{}`.
    pub accept_empty_payload: bool,
    /// Answer updates with 200 and the merged record, but keep the old one.
    pub ignore_updates: bool,
    /// Alter `address` in records fetched by id.
    pub mangle_fetch: bool,
}

/// One request observed by the stub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubRequest {
    /// HTTP method.
    pub method: String,
    /// Path as received.
    pub path: String,
    /// Raw query string, if any.
    pub query: Option<String>,
}

/// Mutable server state.
#[derive(Debug, Default)]
struct StubStore {
    /// Last issued id.
    last_id: u64,
    /// Stored records keyed by id, fields only (no `id`).
    companies: BTreeMap<u64, Map<String, Value>>,
    /// Observed requests, in arrival order.
    requests: Vec<StubRequest>,
}

/// Shared handler state.
#[derive(Clone)]
struct StubState {
    /// Rules to break.
    defects: StubDefects,
    /// Records and request log.
    store: Arc<Mutex<StubStore>>,
}

/// Handle for a running stub; dropping it stops the server.
pub struct CompanyStubHandle {
    /// Base URL to hand to the contract client.
    base_url: String,
    /// Shared state, for inspection.
    store: Arc<Mutex<StubStore>>,
    /// Graceful shutdown trigger.
    shutdown: Option<oneshot::Sender<()>>,
    /// Server thread.
    join: Option<thread::JoinHandle<()>>,
}

impl CompanyStubHandle {
    /// Returns the base URL (`http://127.0.0.1:<port>/docs`).
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the number of stored companies.
    #[must_use]
    pub fn company_count(&self) -> usize {
        self.store.lock().map_or(0, |store| store.companies.len())
    }

    /// Returns stored companies as JSON records, ordered by id.
    #[must_use]
    pub fn companies(&self) -> Vec<Value> {
        self.store.lock().map_or_else(
            |_| Vec::new(),
            |store| store.companies.iter().map(|(id, fields)| record(*id, fields)).collect(),
        )
    }

    /// Returns the observed requests.
    #[must_use]
    pub fn requests(&self) -> Vec<StubRequest> {
        self.store.lock().map_or_else(|_| Vec::new(), |store| store.requests.clone())
    }

    /// Stores a company directly, bypassing validation, and returns its id.
    #[must_use]
    pub fn seed(&self, fields: &Value) -> Option<u64> {
        let fields = fields.as_object()?.clone();
        let mut store = self.store.lock().ok()?;
        store.last_id += 1;
        let id = store.last_id;
        store.companies.insert(id, fields);
        Some(id)
    }
}

impl Drop for CompanyStubHandle {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

// ============================================================================
// SECTION: Spawn
// ============================================================================

/// Spawns a stub that honors every contract rule.
///
/// # Errors
///
/// Returns an error when the loopback listener cannot be bound.
pub fn spawn_company_stub() -> Result<CompanyStubHandle, String> {
    spawn_company_stub_with_defects(StubDefects::default())
}

/// Spawns a stub that breaks the selected rules.
///
/// # Errors
///
/// Returns an error when the loopback listener cannot be bound.
pub fn spawn_company_stub_with_defects(
    defects: StubDefects,
) -> Result<CompanyStubHandle, String> {
    let listener = StdTcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("company stub bind failed: {err}"))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("company stub listener nonblocking failed: {err}"))?;
    let addr =
        listener.local_addr().map_err(|err| format!("company stub local addr failed: {err}"))?;
    let base_url = format!("http://{addr}{STUB_PREFIX}");

    let store = Arc::new(Mutex::new(StubStore::default()));
    let state = StubState {
        defects,
        store: Arc::clone(&store),
    };
    let app = Router::new()
        .route(&format!("{STUB_PREFIX}/company"), get(list_companies).post(create_company))
        .route(
            &format!("{STUB_PREFIX}/company/{{id}}"),
            get(fetch_company).put(update_company).delete(delete_company),
        )
        .with_state(state);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let join = thread::spawn(move || {
        let Ok(runtime) = Builder::new_current_thread().enable_all().build() else {
            return;
        };
        runtime.block_on(async move {
            let Ok(listener) = tokio::net::TcpListener::from_std(listener) else {
                return;
            };
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = server.await;
        });
    });
    Ok(CompanyStubHandle {
        base_url,
        store,
        shutdown: Some(shutdown_tx),
        join: Some(join),
    })
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// `GET /company[?name=]`.
async fn list_companies(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let Ok(mut store) = state.store.lock() else {
        return internal_error();
    };
    store.log(&method, &uri);
    let filter = if state.defects.ignore_name_filter { None } else { query.get("name") };
    let records: Vec<Value> = store
        .companies
        .iter()
        .filter(|(_, fields)| {
            let stored = fields.get("name").and_then(Value::as_str);
            filter.is_none_or(|name| stored == Some(name.as_str()))
        })
        .map(|(id, fields)| record(*id, fields))
        .collect();
    (StatusCode::OK, Json(Value::Array(records))).into_response()
}

/// `POST /company`.
async fn create_company(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let Ok(mut store) = state.store.lock() else {
        return internal_error();
    };
    store.log(&method, &uri);
    let fields = match validate_body(&body, state.defects, true) {
        Ok(fields) => fields,
        Err(message) => return error(StatusCode::BAD_REQUEST, &message),
    };
    if !state.defects.allow_duplicate_cnpj && store.cnpj_taken(&fields, None) {
        return error(StatusCode::CONFLICT, "cnpj already registered");
    }
    store.last_id += 1;
    let id = store.last_id;
    let body = record(id, &fields);
    store.companies.insert(id, fields);
    let status = if state.defects.create_returns_ok { StatusCode::OK } else { StatusCode::CREATED };
    (status, Json(body)).into_response()
}

/// `GET /company/{id}`.
async fn fetch_company(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    Path(id): Path<String>,
) -> Response {
    let Ok(mut store) = state.store.lock() else {
        return internal_error();
    };
    store.log(&method, &uri);
    match id.parse::<u64>().ok().and_then(|id| store.companies.get(&id).map(|f| record(id, f))) {
        Some(mut body) => {
            if state.defects.mangle_fetch {
                body["address"] = Value::String(MANGLED_ADDRESS.to_string());
            }
            (StatusCode::OK, Json(body)).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "company not found"),
    }
}

/// `PUT /company/{id}`.
async fn update_company(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let Ok(mut store) = state.store.lock() else {
        return internal_error();
    };
    store.log(&method, &uri);
    let Some(id) = id.parse::<u64>().ok().filter(|id| store.companies.contains_key(id)) else {
        return error(StatusCode::NOT_FOUND, "company not found");
    };
    let fields = match validate_body(&body, state.defects, false) {
        Ok(fields) => fields,
        Err(message) => return error(StatusCode::BAD_REQUEST, &message),
    };
    if !state.defects.allow_duplicate_cnpj && store.cnpj_taken(&fields, Some(id)) {
        return error(StatusCode::CONFLICT, "cnpj already registered");
    }
    let Some(stored) = store.companies.get_mut(&id) else {
        return error(StatusCode::NOT_FOUND, "company not found");
    };
    let body = if state.defects.ignore_updates {
        let mut merged = stored.clone();
        merged.extend(fields);
        record(id, &merged)
    } else {
        stored.extend(fields);
        record(id, stored)
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// `DELETE /company/{id}`.
async fn delete_company(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    Path(id): Path<String>,
) -> Response {
    let Ok(mut store) = state.store.lock() else {
        return internal_error();
    };
    store.log(&method, &uri);
    let removed = id.parse::<u64>().ok().and_then(|id| store.companies.remove(&id));
    match removed {
        Some(_) => (StatusCode::OK, Json(json!({ "message": "company deleted" }))).into_response(),
        None if state.defects.delete_missing_ok => {
            (StatusCode::OK, Json(json!({ "message": "company deleted" }))).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "company not found"),
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

impl StubStore {
    /// Appends a request to the log.
    fn log(&mut self, method: &Method, uri: &Uri) {
        self.requests.push(StubRequest {
            method: method.to_string(),
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
        });
    }

    /// Returns true when another record already holds the CNPJ in `fields`.
    fn cnpj_taken(&self, fields: &Map<String, Value>, except: Option<u64>) -> bool {
        let Some(cnpj) = fields.get("cnpj") else {
            return false;
        };
        self.companies
            .iter()
            .any(|(id, stored)| Some(*id) != except && stored.get("cnpj") == Some(cnpj))
    }
}

/// Validates a create or update body into stored fields.
fn validate_body(
    body: &[u8],
    defects: StubDefects,
    create: bool,
) -> Result<Map<String, Value>, String> {
    let value: Value =
        serde_json::from_slice(body).map_err(|err| format!("invalid json body: {err}"))?;
    let Value::Object(fields) = value else {
        return Err("body must be a json object".to_string());
    };
    if fields.is_empty() {
        if create && defects.accept_empty_payload {
            return Ok(fields);
        }
        return Err("body must not be empty".to_string());
    }
    for (key, value) in &fields {
        if !COMPANY_FIELDS.contains(&key.as_str()) {
            if defects.accept_extra_fields {
                continue;
            }
            return Err(format!("unknown field `{key}`"));
        }
        if !value.is_string() {
            return Err(format!("field `{key}` must be a string"));
        }
    }
    let name = fields.get("name").and_then(Value::as_str);
    if create && name.is_none() && !defects.accept_missing_name {
        return Err("name is required".to_string());
    }
    if name.is_some_and(|name| name.trim().is_empty()) {
        return Err("name must not be empty".to_string());
    }
    let cnpj = fields.get("cnpj").and_then(Value::as_str);
    if create && cnpj.is_none() && !defects.accept_missing_cnpj {
        return Err("cnpj is required".to_string());
    }
    if let Some(cnpj) = cnpj {
        let valid = is_well_formed(cnpj) && Cnpj::parse(cnpj).is_ok();
        if !valid && !defects.skip_cnpj_validation {
            return Err(format!("invalid cnpj `{cnpj}`"));
        }
    }
    Ok(fields)
}

/// Renders a stored record with its id.
fn record(id: u64, fields: &Map<String, Value>) -> Value {
    let mut object = fields.clone();
    object.insert("id".to_string(), Value::from(id));
    Value::Object(object)
}

/// Builds a JSON error response.
fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Response for a poisoned state lock.
fn internal_error() -> Response {
    error(StatusCode::INTERNAL_SERVER_ERROR, "stub state unavailable")
}
