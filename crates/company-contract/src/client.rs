// crates/company-contract/src/client.rs
// ============================================================================
// Module: Fluent Contract Client
// Description: Request builder with declared expectations over reqwest.
// Purpose: Issue one HTTP call per spec and fail on the first mismatch.
// Dependencies: percent-encoding, reqwest, serde, serde_json, thiserror, tracing, url
// ============================================================================

//! ## Overview
//! [`ApiClient::spec`] starts a [`RequestSpec`]: pick a verb and path, attach
//! a JSON body or query pairs, declare expectations, then [`RequestSpec::send`].
//! Every exchange, passing or not, lands in the client transcript.
//!
//! ## Invariants
//! - Calls under test are never retried.
//! - Paths are joined onto the base URL by segment, so a base URL with or
//!   without a trailing slash yields the same request URL.
//! - Query values are percent-encoded per RFC 3986 (space becomes `%20`).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;
use percent_encoding::utf8_percent_encode;
use reqwest::Client;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::company::Company;
use crate::company::CompanyId;
use crate::config::TargetConfig;
use crate::expectation::Expectation;
use crate::expectation::StatusExpectation;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Characters escaped in query keys and values (everything but RFC 3986 unreserved).
const QUERY_COMPONENT: &AsciiSet =
    &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// User agent sent with every request.
const USER_AGENT: &str = concat!("company-contract/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while constructing an [`ApiClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// Base URL is unparsable or not http(s).
    #[error("invalid base url {url}: {reason}")]
    BaseUrl {
        /// Rejected URL text.
        url: String,
        /// Rejection reason.
        reason: String,
    },
    /// The underlying HTTP client could not be built.
    #[error("failed to build http client: {0}")]
    Build(String),
}

/// Errors raised while sending a [`RequestSpec`] or reading its response.
#[derive(Debug, Error)]
pub enum SpecError {
    /// `send` was called before a verb was chosen.
    #[error("request spec has no method")]
    MissingMethod,
    /// The request path cannot be joined onto the base URL.
    #[error("invalid request path {path}: {reason}")]
    Path {
        /// Rejected path.
        path: String,
        /// Rejection reason.
        reason: String,
    },
    /// The request never produced an HTTP response.
    #[error("{method} {url} failed: {reason}")]
    Transport {
        /// HTTP method.
        method: String,
        /// Request URL.
        url: String,
        /// Transport failure.
        reason: String,
    },
    /// The response did not satisfy a declared expectation.
    #[error("{method} {url}: {reason}")]
    Expectation {
        /// HTTP method.
        method: String,
        /// Request URL.
        url: String,
        /// Mismatch description.
        reason: String,
    },
    /// A field needed for chaining is absent from the response body.
    #[error("{method} {url}: response missing field `{field}`")]
    MissingField {
        /// HTTP method.
        method: String,
        /// Request URL.
        url: String,
        /// Missing field name.
        field: &'static str,
    },
    /// The response body is not the expected record shape.
    #[error("{method} {url}: undecodable response body: {reason}")]
    Decode {
        /// HTTP method.
        method: String,
        /// Request URL.
        url: String,
        /// Decode failure.
        reason: String,
    },
}

// ============================================================================
// SECTION: Transcript
// ============================================================================

/// One recorded request/response exchange.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEntry {
    /// 1-based order of the exchange within the client.
    pub sequence: u64,
    /// HTTP method.
    pub method: String,
    /// Fully resolved request URL.
    pub url: String,
    /// JSON request body, when one was sent.
    pub request: Option<Value>,
    /// Response status, when a response arrived.
    pub status: Option<u16>,
    /// Parsed response body (`null` when empty or absent).
    pub response: Value,
    /// Transport error, when no response arrived.
    pub error: Option<String>,
    /// Wall-clock duration of the exchange in milliseconds.
    pub duration_ms: u64,
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// HTTP client bound to the company API base URL.
#[derive(Clone)]
pub struct ApiClient {
    /// Base URL that request paths are joined onto.
    base_url: Url,
    /// Underlying HTTP client.
    http: Client,
    /// Recorded exchanges.
    transcript: Arc<Mutex<Vec<TranscriptEntry>>>,
    /// Last issued transcript sequence number.
    sequence: Arc<AtomicU64>,
}

impl ApiClient {
    /// Creates a client with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the base URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| ClientError::Build(err.to_string()))?;
        Self::with_client(base_url, http)
    }

    /// Creates a client from the `[target]` settings.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the base URL is invalid or the HTTP client
    /// cannot be built.
    pub fn from_target(target: &TargetConfig) -> Result<Self, ClientError> {
        Self::new(&target.base_url, target.timeout())
    }

    /// Creates a client around an existing reqwest client.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::BaseUrl`] when the base URL is invalid.
    pub fn with_client(base_url: &str, http: Client) -> Result<Self, ClientError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            http,
            transcript: Arc::new(Mutex::new(Vec::new())),
            sequence: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Returns the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Starts a new request spec.
    pub const fn spec(&self) -> RequestSpec<'_> {
        RequestSpec {
            client: self,
            method: None,
            path: String::new(),
            query: Vec::new(),
            body: None,
            expectations: Vec::new(),
        }
    }

    /// Returns a snapshot of the transcript entries.
    #[must_use]
    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.transcript.lock().map_or_else(|_| Vec::new(), |entries| entries.clone())
    }

    /// Returns the most recent transcript entry.
    #[must_use]
    pub fn last_exchange(&self) -> Option<TranscriptEntry> {
        self.transcript.lock().ok().and_then(|entries| entries.last().cloned())
    }

    /// Joins `path` and `query` onto the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Path`] when the path embeds a query or fragment.
    pub fn resolve(&self, path: &str, query: &[(String, String)]) -> Result<Url, SpecError> {
        if path.contains(['?', '#']) {
            return Err(SpecError::Path {
                path: path.to_string(),
                reason: "query and fragment must be passed separately".to_string(),
            });
        }
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        {
            let mut segments = url.path_segments_mut().map_err(|()| SpecError::Path {
                path: path.to_string(),
                reason: "base url cannot carry path segments".to_string(),
            })?;
            segments.pop_if_empty();
            for segment in path.split('/').filter(|segment| !segment.is_empty()) {
                segments.push(segment);
            }
        }
        if !query.is_empty() {
            url.set_query(Some(&encode_query(query)));
        }
        Ok(url)
    }

    /// Sends one request and records it, without judging the response.
    async fn execute(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&Value>,
    ) -> Result<(u16, Value), String> {
        let started = Instant::now();
        debug!(method = %method, url = %url, "sending request");
        let mut request = self.http.request(method.clone(), url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }
        let outcome = match request.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                match response.bytes().await {
                    Ok(bytes) => Ok((status, parse_body(&bytes))),
                    Err(err) => Err(format!("failed to read response body: {err}")),
                }
            }
            Err(err) => Err(err.to_string()),
        };
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let (status, response, error) = match &outcome {
            Ok((status, body)) => (Some(*status), body.clone(), None),
            Err(reason) => (None, Value::Null, Some(reason.clone())),
        };
        debug!(method = %method, url = %url, status = ?status, duration_ms, "request finished");
        self.record(TranscriptEntry {
            sequence: self.sequence.fetch_add(1, Ordering::Relaxed) + 1,
            method: method.to_string(),
            url: url.to_string(),
            request: body.cloned(),
            status,
            response,
            error,
            duration_ms,
        });
        outcome
    }

    /// Appends an entry to the transcript.
    fn record(&self, entry: TranscriptEntry) {
        if let Ok(mut entries) = self.transcript.lock() {
            entries.push(entry);
        }
    }
}

// ============================================================================
// SECTION: Request Spec
// ============================================================================

/// A single request with its declared expectations.
#[must_use = "a request spec does nothing until sent"]
pub struct RequestSpec<'a> {
    /// Client that sends the request.
    client: &'a ApiClient,
    /// Chosen HTTP method.
    method: Option<Method>,
    /// Path relative to the base URL.
    path: String,
    /// Query pairs, in insertion order.
    query: Vec<(String, String)>,
    /// JSON body.
    body: Option<Value>,
    /// Expectations, checked in declaration order.
    expectations: Vec<Expectation>,
}

impl RequestSpec<'_> {
    /// Targets `GET path`.
    pub fn get(self, path: impl Into<String>) -> Self {
        self.target(Method::GET, path.into())
    }

    /// Targets `POST path`.
    pub fn post(self, path: impl Into<String>) -> Self {
        self.target(Method::POST, path.into())
    }

    /// Targets `PUT path`.
    pub fn put(self, path: impl Into<String>) -> Self {
        self.target(Method::PUT, path.into())
    }

    /// Targets `DELETE path`.
    pub fn delete(self, path: impl Into<String>) -> Self {
        self.target(Method::DELETE, path.into())
    }

    /// Appends a query pair.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Attaches a JSON body.
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Expects exactly `code`.
    pub fn expect_status(mut self, code: u16) -> Self {
        self.expectations.push(Expectation::Status(StatusExpectation::exactly(code)));
        self
    }

    /// Expects any of `codes`.
    pub fn expect_status_in(mut self, codes: &[u16]) -> Self {
        self.expectations.push(Expectation::Status(StatusExpectation::any_of(codes)));
        self
    }

    /// Expects the body to contain `fragment` (see [`crate::expectation::json_matches`]).
    pub fn expect_json_match(mut self, fragment: Value) -> Self {
        self.expectations.push(Expectation::JsonMatch(fragment));
        self
    }

    /// Sends the request and checks every expectation.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError`] when the request cannot be sent or an expectation
    /// fails.
    pub async fn send(self) -> Result<SpecResponse, SpecError> {
        let method = self.method.ok_or(SpecError::MissingMethod)?;
        let url = self.client.resolve(&self.path, &self.query)?;
        let (status, body) =
            self.client.execute(&method, &url, self.body.as_ref()).await.map_err(|reason| {
                SpecError::Transport {
                    method: method.to_string(),
                    url: url.to_string(),
                    reason,
                }
            })?;
        for expectation in &self.expectations {
            expectation.check(status, &body).map_err(|reason| SpecError::Expectation {
                method: method.to_string(),
                url: url.to_string(),
                reason,
            })?;
        }
        Ok(SpecResponse {
            method: method.to_string(),
            url: url.to_string(),
            status,
            body,
        })
    }

    /// Sets the method and path.
    fn target(mut self, method: Method, path: String) -> Self {
        self.method = Some(method);
        self.path = path;
        self
    }
}

// ============================================================================
// SECTION: Response
// ============================================================================

/// A response that satisfied all of its expectations.
#[derive(Debug, Clone)]
pub struct SpecResponse {
    /// HTTP method of the request.
    method: String,
    /// Resolved request URL.
    url: String,
    /// Response status.
    status: u16,
    /// Parsed response body.
    body: Value,
}

impl SpecResponse {
    /// Returns the response status.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Returns the parsed body (`null` when empty).
    #[must_use]
    pub const fn body(&self) -> &Value {
        &self.body
    }

    /// Reads the server-assigned `id` off a creation response.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::MissingField`] when the body has no usable `id`.
    pub fn company_id(&self) -> Result<CompanyId, SpecError> {
        self.body.get("id").and_then(CompanyId::from_json).ok_or_else(|| SpecError::MissingField {
            method: self.method.clone(),
            url: self.url.clone(),
            field: "id",
        })
    }

    /// Decodes the body as a company record.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Decode`] when the body is not a company record.
    pub fn company(&self) -> Result<Company, SpecError> {
        serde_json::from_value(self.body.clone()).map_err(|err| SpecError::Decode {
            method: self.method.clone(),
            url: self.url.clone(),
            reason: err.to_string(),
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses and validates the base URL.
fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|err| ClientError::BaseUrl {
        url: trimmed.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::BaseUrl {
            url: trimmed.to_string(),
            reason: "scheme must be http or https".to_string(),
        });
    }
    if url.cannot_be_a_base() {
        return Err(ClientError::BaseUrl {
            url: trimmed.to_string(),
            reason: "url cannot be a base".to_string(),
        });
    }
    Ok(url)
}

/// Encodes query pairs as `key=value&...` with RFC 3986 escaping.
fn encode_query(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, QUERY_COMPONENT),
                utf8_percent_encode(value, QUERY_COMPONENT)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Parses a response body as JSON, falling back to a string or `null`.
fn parse_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
