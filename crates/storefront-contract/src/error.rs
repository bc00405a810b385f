// crates/storefront-contract/src/error.rs
// ============================================================================
// Module: Check Errors
// Description: Failure taxonomy for contract checks.
// Purpose: Separate contract violations from transport and setup failures.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Contract violations are the expected target of a negative test going
//! wrong: the SUT answered, but not as the contract requires. Transport and
//! setup errors abort the individual check without saying anything about
//! the contract.

use thiserror::Error;

use crate::contract::HttpMethod;
use crate::contract::ShapeViolation;
use crate::contract::StatusSet;

/// Errors raised while executing a contract check.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The configured base URL is unusable.
    #[error("invalid base url `{url}`: {reason}")]
    InvalidBaseUrl {
        /// Raw URL.
        url: String,
        /// Parse or scheme failure.
        reason: String,
    },
    /// The endpoint path cannot be joined onto the base URL.
    #[error("invalid endpoint path `{path}`: {reason}")]
    InvalidPath {
        /// Raw path.
        path: String,
        /// Join failure.
        reason: String,
    },
    /// The HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    Client(String),
    /// The request did not complete.
    #[error("{method} {url} failed: {reason}")]
    Transport {
        /// Request method.
        method: HttpMethod,
        /// Request URL.
        url: String,
        /// Client error text.
        reason: String,
    },
    /// The SUT answered with a status outside the contract.
    #[error("{method} {url} returned {status}, expected {expected}")]
    UnexpectedStatus {
        /// Request method.
        method: HttpMethod,
        /// Request URL.
        url: String,
        /// Received status.
        status: u16,
        /// Accepted statuses.
        expected: StatusSet,
        /// Truncated response body for diagnostics.
        body: String,
    },
    /// The body was expected to be JSON but did not parse.
    #[error("{method} {url} returned {status} with a non-JSON body: {reason}")]
    InvalidJson {
        /// Request method.
        method: HttpMethod,
        /// Request URL.
        url: String,
        /// Received status.
        status: u16,
        /// Parse failure.
        reason: String,
    },
    /// The JSON body failed its shape predicate.
    #[error("{method} {url} returned {status} with a body that violates contract: {violation}")]
    ShapeMismatch {
        /// Request method.
        method: HttpMethod,
        /// Request URL.
        url: String,
        /// Received status.
        status: u16,
        /// Violation detail.
        violation: ShapeViolation,
    },
}

impl CheckError {
    /// Returns true when the SUT answered but broke its contract.
    #[must_use]
    pub const fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedStatus { .. } | Self::InvalidJson { .. } | Self::ShapeMismatch { .. }
        )
    }

    /// Returns the received status when the SUT answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus {
                status,
                ..
            }
            | Self::InvalidJson {
                status,
                ..
            }
            | Self::ShapeMismatch {
                status,
                ..
            } => Some(*status),
            Self::InvalidBaseUrl {
                ..
            }
            | Self::InvalidPath {
                ..
            }
            | Self::Client(_)
            | Self::Transport {
                ..
            } => None,
        }
    }

    /// Stable label for reports and audit events.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidBaseUrl {
                ..
            } => "invalid_base_url",
            Self::InvalidPath {
                ..
            } => "invalid_path",
            Self::Client(_) => "client",
            Self::Transport {
                ..
            } => "transport",
            Self::UnexpectedStatus {
                ..
            } => "unexpected_status",
            Self::InvalidJson {
                ..
            } => "invalid_json",
            Self::ShapeMismatch {
                ..
            } => "shape_mismatch",
        }
    }
}
