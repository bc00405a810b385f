// crates/storefront-contract/src/audit.rs
// ============================================================================
// Module: Check Audit Logging
// Description: Structured audit events for contract checks.
// Purpose: Emit one JSON line per check without hard logging dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every completed check produces a [`CheckAuditEvent`]. Sinks decide where
//! the event goes; deployments pick stderr, an append-only file, or nothing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::contract::HttpMethod;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Check outcome classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutcomeLabel {
    /// Response conformed to the contract.
    Pass,
    /// Response broke the contract.
    Violation,
    /// The check aborted before a verdict.
    Error,
}

/// Contract check audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct CheckAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Per-checker request sequence number.
    pub sequence: u64,
    /// Request method.
    pub method: HttpMethod,
    /// Request URL.
    pub url: String,
    /// Response status when one was received.
    pub status: Option<u16>,
    /// Check outcome.
    pub outcome: CheckOutcomeLabel,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Wall-clock duration of the request in milliseconds.
    pub elapsed_ms: u128,
    /// Response body size in bytes.
    pub response_bytes: usize,
}

impl CheckAuditEvent {
    /// Event name used for contract checks.
    pub const EVENT: &'static str = "contract_check";
}

/// Returns the current time in milliseconds since the epoch.
#[must_use]
pub fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for contract check events.
pub trait CheckAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &CheckAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl CheckAuditSink for StderrAuditSink {
    fn record(&self, event: &CheckAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl CheckAuditSink for FileAuditSink {
    fn record(&self, event: &CheckAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl CheckAuditSink for NoopAuditSink {
    fn record(&self, _event: &CheckAuditEvent) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================
