// crates/storefront-contract/src/checker.rs
// ============================================================================
// Module: HTTP Contract Checker
// Description: Issues requests against the SUT and asserts conformance.
// Purpose: Provide the list, auth, invalid-input, and valid-input checks.
// Dependencies: reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! A [`ContractChecker`] is one test session: a base URL, an HTTP client, an
//! audit sink, and a transcript of every exchange. Each check sends exactly
//! one request, never retries, and returns either a [`CheckOutcome`] or the
//! [`CheckError`] explaining why the response did not conform.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::audit::CheckAuditEvent;
use crate::audit::CheckAuditSink;
use crate::audit::CheckOutcomeLabel;
use crate::audit::NoopAuditSink;
use crate::audit::now_millis;
use crate::contract::BodyShape;
use crate::contract::ContractRequest;
use crate::contract::EndpointContract;
use crate::contract::HttpMethod;
use crate::contract::ShapeViolation;
use crate::contract::StatusSet;
use crate::contract::json_kind;
use crate::error::CheckError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum number of body characters quoted in status failures.
const MAX_BODY_EXCERPT_CHARS: usize = 512;

// ============================================================================
// SECTION: Types
// ============================================================================

/// One request/response exchange captured by the checker.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEntry {
    /// Request sequence number, starting at 1.
    pub sequence: u64,
    /// Request method.
    pub method: HttpMethod,
    /// Request URL.
    pub url: String,
    /// JSON payload sent, if any.
    pub request: Option<Value>,
    /// Response status, if a response arrived.
    pub status: Option<u16>,
    /// Response body as JSON, or as a string when it is not JSON.
    pub response: Value,
    /// Failure message when the check did not pass.
    pub error: Option<String>,
}

/// Result of a passing check.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    /// Request method.
    pub method: HttpMethod,
    /// Request URL.
    pub url: String,
    /// Response status.
    pub status: u16,
    /// Parsed body when the response carried JSON.
    pub body: Option<Value>,
    /// Request duration.
    pub elapsed: Duration,
}

/// HTTP contract checker bound to one SUT base URL.
#[derive(Clone)]
pub struct ContractChecker {
    /// Base URL, normalized to end with `/`.
    base_url: Url,
    /// Shared HTTP client.
    client: Client,
    /// Destination for per-check audit events.
    audit: Arc<dyn CheckAuditSink>,
    /// Captured exchanges.
    transcript: Arc<Mutex<Vec<TranscriptEntry>>>,
    /// Request sequence counter.
    sequence: Arc<AtomicU64>,
}

// ============================================================================
// SECTION: Construction
// ============================================================================

impl ContractChecker {
    /// Creates a checker for `base_url` with an optional request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::InvalidBaseUrl`] when the URL does not parse or is
    /// not http(s), and [`CheckError::Client`] when the client cannot be built.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, CheckError> {
        let base_url = parse_base_url(base_url)?;
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|err| CheckError::Client(err.to_string()))?;
        Ok(Self::with_client(base_url, client))
    }

    /// Creates a checker from an already-validated URL and client.
    #[must_use]
    pub fn with_client(base_url: Url, client: Client) -> Self {
        Self {
            base_url,
            client,
            audit: Arc::new(NoopAuditSink),
            transcript: Arc::new(Mutex::new(Vec::new())),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Routes audit events to `sink`.
    #[must_use]
    pub fn with_audit_sink(mut self, sink: Arc<dyn CheckAuditSink>) -> Self {
        self.audit = sink;
        self
    }

    /// Returns the normalized base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns a snapshot of the transcript entries.
    #[must_use]
    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.transcript.lock().map_or_else(|_| Vec::new(), |entries| entries.clone())
    }

    /// Resolves `path` and `query` against the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::InvalidPath`] when the path cannot be joined.
    pub fn endpoint_url(&self, path: &str, query: &[(String, String)]) -> Result<Url, CheckError> {
        let mut url = self.base_url.join(path.trim_start_matches('/')).map_err(|err| {
            CheckError::InvalidPath {
                path: path.to_string(),
                reason: err.to_string(),
            }
        })?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }
}

// ============================================================================
// SECTION: Checks
// ============================================================================

impl ContractChecker {
    /// Sends GET and asserts a 2xx sequence body.
    ///
    /// Every element must carry `required_fields` (skipped when empty), and a
    /// numeric `limit` query parameter bounds the sequence length.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckError`] when the request fails or the response breaks
    /// the list contract.
    pub async fn check_list_endpoint(
        &self,
        path: &str,
        query: &[(&str, &str)],
        required_fields: &[&str],
    ) -> Result<Vec<Value>, CheckError> {
        let request = ContractRequest::with_query(query);
        let contract = EndpointContract::new(HttpMethod::Get, path, StatusSet::Success)
            .with_shape(BodyShape::Sequence {
                required_fields: required_fields.iter().map(ToString::to_string).collect(),
                max_len: request.limit(),
            });
        let outcome = self.check(&contract, &request).await?;
        sequence_items(outcome)
    }

    /// Sends an unauthenticated request and asserts it is rejected with 401.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckError`] when the request fails or any other status is
    /// returned.
    pub async fn check_auth_required(
        &self,
        method: HttpMethod,
        path: &str,
    ) -> Result<CheckOutcome, CheckError> {
        self.check_status(method, path, StatusSet::exactly(401)).await
    }

    /// Sends POST with an invalid payload and asserts the `expected` error set.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckError`] when the request fails or the SUT accepts the
    /// payload.
    pub async fn check_rejects_invalid_input(
        &self,
        path: &str,
        payload: Value,
        expected: StatusSet,
    ) -> Result<CheckOutcome, CheckError> {
        let contract = EndpointContract::new(HttpMethod::Post, path, expected);
        self.check(&contract, &ContractRequest::with_payload(payload)).await
    }

    /// Sends POST with a valid payload and asserts success.
    ///
    /// `tolerated` lists non-2xx statuses accepted when an optional backend
    /// integration (email delivery, for example) is not configured.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckError`] when the request fails or the status falls
    /// outside 2xx and `tolerated`.
    pub async fn check_accepts_valid_input(
        &self,
        path: &str,
        payload: Value,
        tolerated: &[u16],
    ) -> Result<CheckOutcome, CheckError> {
        let contract =
            EndpointContract::new(HttpMethod::Post, path, StatusSet::SuccessOr(tolerated.to_vec()));
        self.check(&contract, &ContractRequest::with_payload(payload)).await
    }

    /// Sends GET to an endpoint that may not exist; 2xx and 404 both conform.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckError`] on transport failure or any other status.
    pub async fn check_optional_endpoint(&self, path: &str) -> Result<CheckOutcome, CheckError> {
        self.check_status(HttpMethod::Get, path, StatusSet::SuccessOr(vec![404])).await
    }

    /// Sends a bodiless request and asserts only the status.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckError`] on transport failure or a status outside
    /// `statuses`.
    pub async fn check_status(
        &self,
        method: HttpMethod,
        path: &str,
        statuses: StatusSet,
    ) -> Result<CheckOutcome, CheckError> {
        let contract = EndpointContract::new(method, path, statuses);
        self.check(&contract, &ContractRequest::default()).await
    }

    /// Executes one request and evaluates it against `contract`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Transport`] when no response arrives, and a
    /// contract violation when the response does not conform.
    pub async fn check(
        &self,
        contract: &EndpointContract,
        request: &ContractRequest,
    ) -> Result<CheckOutcome, CheckError> {
        let url = self.endpoint_url(&contract.path, &request.query)?;
        let url_text = url.to_string();
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed).saturating_add(1);
        let method = contract.method;
        let mut entry = TranscriptEntry {
            sequence,
            method,
            url: url_text.clone(),
            request: request.payload.clone(),
            status: None,
            response: Value::Null,
            error: None,
        };

        let mut builder = match method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
        };
        if let Some(payload) = &request.payload {
            builder = builder.json(payload);
        }

        let started = Instant::now();
        let exchange = match builder.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                response.bytes().await.map(|bytes| (status, bytes))
            }
            Err(err) => Err(err),
        };
        let elapsed = started.elapsed();

        let (status, bytes) = match exchange {
            Ok(exchange) => exchange,
            Err(err) => {
                let error = CheckError::Transport {
                    method,
                    url: url_text,
                    reason: err.to_string(),
                };
                entry.error = Some(error.to_string());
                self.record(entry, elapsed, 0, Some(&error));
                return Err(error);
            }
        };

        entry.status = Some(status);
        let parsed: Option<Value> = serde_json::from_slice(&bytes).ok();
        entry.response = parsed
            .clone()
            .unwrap_or_else(|| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        let verdict = evaluate(contract, &url_text, status, &bytes);
        entry.error = verdict.as_ref().err().map(ToString::to_string);
        self.record(entry, elapsed, bytes.len(), verdict.as_ref().err());
        verdict.map(|()| CheckOutcome {
            method,
            url: url_text,
            status,
            body: parsed,
            elapsed,
        })
    }

    /// Emits the audit event and stores the transcript entry.
    fn record(
        &self,
        entry: TranscriptEntry,
        elapsed: Duration,
        response_bytes: usize,
        error: Option<&CheckError>,
    ) {
        let (outcome, error_kind) = match error {
            None => (CheckOutcomeLabel::Pass, None),
            Some(err) if err.is_contract_violation() => {
                (CheckOutcomeLabel::Violation, Some(err.kind()))
            }
            Some(err) => (CheckOutcomeLabel::Error, Some(err.kind())),
        };
        self.audit.record(&CheckAuditEvent {
            event: CheckAuditEvent::EVENT,
            timestamp_ms: now_millis(),
            sequence: entry.sequence,
            method: entry.method,
            url: entry.url.clone(),
            status: entry.status,
            outcome,
            error_kind,
            elapsed_ms: elapsed.as_millis(),
            response_bytes,
        });
        if let Ok(mut transcript) = self.transcript.lock() {
            transcript.push(entry);
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses and normalizes the SUT base URL.
fn parse_base_url(raw: &str) -> Result<Url, CheckError> {
    let invalid = |reason: String| CheckError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };
    let mut url = Url::parse(raw.trim()).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
    }
    url.set_query(None);
    url.set_fragment(None);
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Unwraps the elements of a conforming list response.
fn sequence_items(outcome: CheckOutcome) -> Result<Vec<Value>, CheckError> {
    match outcome.body {
        Some(Value::Array(items)) => Ok(items),
        other => Err(CheckError::ShapeMismatch {
            method: outcome.method,
            url: outcome.url,
            status: outcome.status,
            violation: ShapeViolation::NotSequence {
                found: other.as_ref().map_or("empty body", json_kind),
            },
        }),
    }
}

/// Applies the status set and, when accepted, the body shape.
fn evaluate(
    contract: &EndpointContract,
    url: &str,
    status: u16,
    bytes: &[u8],
) -> Result<(), CheckError> {
    if !contract.statuses.admits(status) {
        return Err(CheckError::UnexpectedStatus {
            method: contract.method,
            url: url.to_string(),
            status,
            expected: contract.statuses.clone(),
            body: String::from_utf8_lossy(bytes).chars().take(MAX_BODY_EXCERPT_CHARS).collect(),
        });
    }
    if !contract.shape.inspects_body() {
        return Ok(());
    }
    let body: Value = serde_json::from_slice(bytes).map_err(|err| CheckError::InvalidJson {
        method: contract.method,
        url: url.to_string(),
        status,
        reason: err.to_string(),
    })?;
    contract.shape.check(&body).map_err(|violation| CheckError::ShapeMismatch {
        method: contract.method,
        url: url.to_string(),
        status,
        violation,
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[path = "checker_tests.rs"]
mod tests;
