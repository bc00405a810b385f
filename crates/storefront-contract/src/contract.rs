// crates/storefront-contract/src/contract.rs
// ============================================================================
// Module: Endpoint Contracts
// Description: Static descriptions of what an endpoint must answer.
// Purpose: Model methods, accepted status sets, and body shape predicates.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! An [`EndpointContract`] pairs a path and method with the set of status
//! codes the endpoint may answer and a predicate over the JSON body. Contracts
//! are immutable values; the request inputs that accompany them live in
//! [`ContractRequest`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Methods
// ============================================================================

/// HTTP methods used by the storefront contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// HTTP GET.
    Get,
    /// HTTP POST.
    Post,
}

impl HttpMethod {
    /// Returns the canonical method token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ============================================================================
// SECTION: Status Sets
// ============================================================================

/// Set of status codes an endpoint is allowed to answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "codes", rename_all = "snake_case")]
pub enum StatusSet {
    /// Any 2xx status.
    Success,
    /// Exactly one of the listed codes.
    AnyOf(Vec<u16>),
    /// Any status outside 2xx.
    NonSuccess,
    /// Any 2xx status or one of the tolerated codes.
    SuccessOr(Vec<u16>),
}

impl StatusSet {
    /// Builds a set admitting a single status code.
    #[must_use]
    pub fn exactly(code: u16) -> Self {
        Self::AnyOf(vec![code])
    }

    /// Returns true when `status` is admitted by this set.
    #[must_use]
    pub fn admits(&self, status: u16) -> bool {
        match self {
            Self::Success => is_success(status),
            Self::AnyOf(codes) => codes.contains(&status),
            Self::NonSuccess => !is_success(status),
            Self::SuccessOr(codes) => is_success(status) || codes.contains(&status),
        }
    }
}

impl fmt::Display for StatusSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("2xx"),
            Self::AnyOf(codes) => write!(f, "one of {}", join_codes(codes)),
            Self::NonSuccess => f.write_str("non-2xx"),
            Self::SuccessOr(codes) => write!(f, "2xx or one of {}", join_codes(codes)),
        }
    }
}

/// Returns true for 2xx status codes.
const fn is_success(status: u16) -> bool {
    status >= 200 && status < 300
}

/// Renders a list of codes as `[a, b, c]`.
fn join_codes(codes: &[u16]) -> String {
    let rendered: Vec<String> = codes.iter().map(ToString::to_string).collect();
    format!("[{}]", rendered.join(", "))
}

// ============================================================================
// SECTION: Body Shapes
// ============================================================================

/// Shape predicate applied to a JSON response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BodyShape {
    /// The body is not inspected.
    Any,
    /// The body must be a JSON array.
    Sequence {
        /// Fields every element must carry.
        required_fields: Vec<String>,
        /// Maximum element count, when bounded.
        max_len: Option<usize>,
    },
    /// The body must be a JSON object.
    Object {
        /// Fields the object must carry.
        required_fields: Vec<String>,
    },
}

impl BodyShape {
    /// Unbounded sequence with no field requirements.
    #[must_use]
    pub const fn sequence() -> Self {
        Self::Sequence {
            required_fields: Vec::new(),
            max_len: None,
        }
    }

    /// Returns true when the body must be parsed to evaluate this shape.
    #[must_use]
    pub const fn inspects_body(&self) -> bool {
        !matches!(self, Self::Any)
    }

    /// Evaluates the predicate against a parsed body.
    ///
    /// # Errors
    ///
    /// Returns the first [`ShapeViolation`] encountered.
    pub fn check(&self, body: &Value) -> Result<(), ShapeViolation> {
        match self {
            Self::Any => Ok(()),
            Self::Sequence {
                required_fields,
                max_len,
            } => {
                let Value::Array(items) = body else {
                    return Err(ShapeViolation::NotSequence {
                        found: json_kind(body),
                    });
                };
                if let Some(max) = max_len
                    && items.len() > *max
                {
                    return Err(ShapeViolation::TooLong {
                        len: items.len(),
                        max: *max,
                    });
                }
                if required_fields.is_empty() {
                    return Ok(());
                }
                for (index, item) in items.iter().enumerate() {
                    let Value::Object(map) = item else {
                        return Err(ShapeViolation::ElementNotObject {
                            index,
                            found: json_kind(item),
                        });
                    };
                    if let Some(field) = required_fields.iter().find(|f| !map.contains_key(*f)) {
                        return Err(ShapeViolation::MissingField {
                            index: Some(index),
                            field: field.clone(),
                        });
                    }
                }
                Ok(())
            }
            Self::Object {
                required_fields,
            } => {
                let Value::Object(map) = body else {
                    return Err(ShapeViolation::NotObject {
                        found: json_kind(body),
                    });
                };
                match required_fields.iter().find(|f| !map.contains_key(*f)) {
                    Some(field) => Err(ShapeViolation::MissingField {
                        index: None,
                        field: field.clone(),
                    }),
                    None => Ok(()),
                }
            }
        }
    }
}

/// Reasons a body fails its shape predicate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeViolation {
    /// Expected an array.
    #[error("expected a JSON array, found {found}")]
    NotSequence {
        /// JSON kind actually received.
        found: &'static str,
    },
    /// Expected an object.
    #[error("expected a JSON object, found {found}")]
    NotObject {
        /// JSON kind actually received.
        found: &'static str,
    },
    /// A sequence element was not an object.
    #[error("element {index} is a {found}, expected an object")]
    ElementNotObject {
        /// Element position.
        index: usize,
        /// JSON kind actually received.
        found: &'static str,
    },
    /// A required field was absent.
    #[error("{} is missing required field `{field}`", describe_position(*.index))]
    MissingField {
        /// Element position for sequences; `None` for objects.
        index: Option<usize>,
        /// Field name.
        field: String,
    },
    /// The sequence exceeded its bound.
    #[error("sequence has {len} elements, limit is {max}")]
    TooLong {
        /// Received length.
        len: usize,
        /// Allowed maximum.
        max: usize,
    },
}

/// Describes where a missing field was expected.
fn describe_position(index: Option<usize>) -> String {
    index.map_or_else(|| "object".to_string(), |index| format!("element {index}"))
}

/// Names the JSON kind of a value for diagnostics.
#[must_use]
pub const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// SECTION: Contracts
// ============================================================================

/// Immutable description of an endpoint's expected behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointContract {
    /// Request method.
    pub method: HttpMethod,
    /// Path relative to the base URL (for example `/api/products`).
    pub path: String,
    /// Accepted status codes.
    pub statuses: StatusSet,
    /// Body predicate evaluated when the status is accepted.
    pub shape: BodyShape,
}

impl EndpointContract {
    /// Creates a contract that does not inspect the body.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>, statuses: StatusSet) -> Self {
        Self {
            method,
            path: path.into(),
            statuses,
            shape: BodyShape::Any,
        }
    }

    /// Replaces the body predicate.
    #[must_use]
    pub fn with_shape(mut self, shape: BodyShape) -> Self {
        self.shape = shape;
        self
    }
}

/// Inputs sent alongside a contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContractRequest {
    /// Query string pairs, in order.
    pub query: Vec<(String, String)>,
    /// JSON payload for POST requests.
    pub payload: Option<Value>,
}

impl ContractRequest {
    /// Request with query pairs and no payload.
    #[must_use]
    pub fn with_query(query: &[(&str, &str)]) -> Self {
        Self {
            query: query.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect(),
            payload: None,
        }
    }

    /// Request carrying a JSON payload.
    #[must_use]
    pub const fn with_payload(payload: Value) -> Self {
        Self {
            query: Vec::new(),
            payload: Some(payload),
        }
    }

    /// Returns the parsed `limit` query parameter, if present and numeric.
    #[must_use]
    pub fn limit(&self) -> Option<usize> {
        self.query.iter().find(|(key, _)| key == "limit").and_then(|(_, value)| value.parse().ok())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[path = "contract_tests.rs"]
mod tests;
