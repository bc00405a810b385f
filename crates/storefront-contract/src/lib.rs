// crates/storefront-contract/src/lib.rs
// ============================================================================
// Module: Storefront Contract Library
// Description: HTTP contract checks for the storefront API surface.
// Purpose: Drive an external web application through its network boundary.
// Dependencies: reqwest, serde, serde_json, thiserror, url
// ============================================================================

//! ## Overview
//! This crate checks a running storefront (products, telemetry, label scan,
//! OTP auth) against static endpoint contracts. It owns no state of the
//! system under test; every check is one request and one verdict.
//!
//! - [`contract`] models methods, status sets, and body shapes.
//! - [`checker`] sends requests and evaluates responses.
//! - [`catalog`] names the endpoints and the full contract table.
//! - [`runner`] runs a table and reports per-case verdicts.
//! - [`audit`] emits one structured event per check.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod catalog;
pub mod checker;
pub mod contract;
pub mod error;
pub mod runner;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use audit::CheckAuditEvent;
pub use audit::CheckAuditSink;
pub use audit::CheckOutcomeLabel;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use catalog::NamedContract;
pub use catalog::storefront_contracts;
pub use checker::CheckOutcome;
pub use checker::ContractChecker;
pub use checker::TranscriptEntry;
pub use contract::BodyShape;
pub use contract::ContractRequest;
pub use contract::EndpointContract;
pub use contract::HttpMethod;
pub use contract::ShapeViolation;
pub use contract::StatusSet;
pub use error::CheckError;
pub use runner::CaseReport;
pub use runner::SuiteReport;
pub use runner::run_contracts;
