// crates/storefront-contract/src/catalog.rs
// ============================================================================
// Module: Storefront Endpoint Catalog
// Description: Paths, fixtures, and the declarative contract table.
// Purpose: Keep every endpoint the suites exercise in one place.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! The catalog names the storefront API surface consumed by the checker:
//! product listing, telemetry, label scanning, OTP auth, and the auxiliary
//! form endpoints. [`storefront_contracts`] turns that surface into a list
//! of named contracts that can be run in any order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use serde_json::Value;
use serde_json::json;

use crate::contract::BodyShape;
use crate::contract::ContractRequest;
use crate::contract::EndpointContract;
use crate::contract::HttpMethod;
use crate::contract::StatusSet;

// ============================================================================
// SECTION: Paths
// ============================================================================

/// Endpoint paths relative to the SUT base URL.
pub mod paths {
    /// Product listing.
    pub const PRODUCTS: &str = "/api/products";
    /// Optional health probe.
    pub const HEALTH: &str = "/api/health";
    /// Telemetry ingestion.
    pub const TELEMETRY: &str = "/api/telemetry";
    /// Telemetry statistics (admin only).
    pub const TELEMETRY_STATS: &str = "/api/telemetry/stats";
    /// Label image upload.
    pub const LABEL_SCAN: &str = "/api/label-scan";
    /// OTP delivery.
    pub const SEND_OTP: &str = "/api/auth/send-otp";
    /// OTP verification.
    pub const VERIFY_OTP: &str = "/api/auth/verify-otp";
    /// Password step of the OTP login.
    pub const REQUEST_OTP: &str = "/api/auth/request-otp";
    /// Email verification token redemption.
    pub const VERIFY_EMAIL: &str = "/api/auth/verify-email";
    /// Account signup.
    pub const SIGNUP: &str = "/api/auth/signup";
    /// Contact form.
    pub const CONTACT: &str = "/api/contact";
    /// Admin category listing.
    pub const ADMIN_CATEGORIES: &str = "/api/admin/categories";

    /// Path of a single label scan.
    #[must_use]
    pub fn label_scan(id: &str) -> String {
        format!("{LABEL_SCAN}/{id}")
    }
}

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Fields every product in a listing must carry.
pub const PRODUCT_FIELDS: [&str; 3] = ["id", "title", "slug"];

/// Email address used by the auth fixtures.
pub const TEST_EMAIL: &str = "test@example.com";

/// OTP that is never issued to [`TEST_EMAIL`].
pub const WRONG_OTP: &str = "123456";

/// Label scan id that does not exist.
pub const UNKNOWN_SCAN_ID: &str = "scan-does-not-exist";

/// Telemetry event types accepted by the SUT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TelemetryEventType {
    /// Page navigation.
    PageView,
    /// User interaction.
    UserAction,
    /// Client-side API call.
    ApiCall,
    /// Client-side error.
    Error,
    /// Performance measurement.
    Performance,
    /// Feature usage.
    FeatureUsage,
}

impl TelemetryEventType {
    /// Every accepted event type.
    pub const ALL: [Self; 6] = [
        Self::PageView,
        Self::UserAction,
        Self::ApiCall,
        Self::Error,
        Self::Performance,
        Self::FeatureUsage,
    ];

    /// Returns the wire token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PageView => "PAGE_VIEW",
            Self::UserAction => "USER_ACTION",
            Self::ApiCall => "API_CALL",
            Self::Error => "ERROR",
            Self::Performance => "PERFORMANCE",
            Self::FeatureUsage => "FEATURE_USAGE",
        }
    }

    /// Parses a wire token.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == token)
    }
}

/// Telemetry event payload with the standard test path and session.
#[must_use]
pub fn telemetry_event(event_type: &str, event_name: &str) -> Value {
    json!({
        "eventType": event_type,
        "eventName": event_name,
        "path": "/test",
        "sessionId": "test-session",
    })
}

/// Payload requesting an OTP for [`TEST_EMAIL`].
#[must_use]
pub fn send_otp_payload() -> Value {
    json!({ "email": TEST_EMAIL })
}

/// Payload verifying [`WRONG_OTP`] for [`TEST_EMAIL`].
#[must_use]
pub fn verify_otp_payload() -> Value {
    json!({ "email": TEST_EMAIL, "otp": WRONG_OTP })
}

/// Contact form with a malformed email address.
#[must_use]
pub fn contact_with_invalid_email() -> Value {
    json!({
        "name": "Contract Checker",
        "email": "not-an-email",
        "subject": "Contract check",
        "message": "This message must be rejected.",
    })
}

/// Signup with a password that fails the strength rules.
#[must_use]
pub fn signup_with_weak_password() -> Value {
    json!({
        "name": "Contract Checker",
        "email": TEST_EMAIL,
        "password": "weak",
    })
}

// ============================================================================
// SECTION: Contract Table
// ============================================================================

/// Contract plus request inputs, under a stable name.
#[derive(Debug, Clone, Serialize)]
pub struct NamedContract {
    /// Stable case name.
    pub name: &'static str,
    /// Expected behavior.
    pub contract: EndpointContract,
    /// Request inputs.
    pub request: ContractRequest,
}

impl NamedContract {
    /// Creates a named contract.
    #[must_use]
    pub const fn new(
        name: &'static str,
        contract: EndpointContract,
        request: ContractRequest,
    ) -> Self {
        Self {
            name,
            contract,
            request,
        }
    }
}

/// Builds a listing contract bounded by the request's `limit`.
fn product_listing(name: &'static str, query: &[(&str, &str)]) -> NamedContract {
    let request = ContractRequest::with_query(query);
    let contract = EndpointContract::new(HttpMethod::Get, paths::PRODUCTS, StatusSet::Success)
        .with_shape(BodyShape::Sequence {
            required_fields: PRODUCT_FIELDS.iter().map(ToString::to_string).collect(),
            max_len: request.limit(),
        });
    NamedContract::new(name, contract, request)
}

/// Builds a POST contract.
fn post(name: &'static str, path: &str, statuses: StatusSet, payload: Value) -> NamedContract {
    NamedContract::new(
        name,
        EndpointContract::new(HttpMethod::Post, path, statuses),
        ContractRequest::with_payload(payload),
    )
}

/// Builds a bodiless contract.
fn bare(name: &'static str, method: HttpMethod, path: &str, statuses: StatusSet) -> NamedContract {
    NamedContract::new(name, EndpointContract::new(method, path, statuses), ContractRequest::default())
}

/// Returns every storefront contract.
#[must_use]
pub fn storefront_contracts() -> Vec<NamedContract> {
    vec![
        product_listing("products_list", &[]),
        product_listing("products_by_category", &[("category", "dairy")]),
        product_listing("products_search", &[("search", "milk")]),
        product_listing("products_pagination", &[("page", "1"), ("limit", "10")]),
        bare("health_optional", HttpMethod::Get, paths::HEALTH, StatusSet::SuccessOr(vec![404])),
        post(
            "telemetry_accepts_page_view",
            paths::TELEMETRY,
            StatusSet::Success,
            telemetry_event(TelemetryEventType::PageView.as_str(), "test_page_view"),
        ),
        post(
            "telemetry_rejects_invalid_type",
            paths::TELEMETRY,
            StatusSet::exactly(400),
            json!({ "eventType": "INVALID_TYPE", "eventName": "test_event" }),
        ),
        post(
            "telemetry_requires_event_name",
            paths::TELEMETRY,
            StatusSet::exactly(400),
            json!({ "eventType": TelemetryEventType::UserAction.as_str() }),
        ),
        bare(
            "telemetry_stats_requires_auth",
            HttpMethod::Get,
            paths::TELEMETRY_STATS,
            StatusSet::exactly(401),
        ),
        bare(
            "label_scan_get_not_allowed",
            HttpMethod::Get,
            paths::LABEL_SCAN,
            StatusSet::AnyOf(vec![404, 405]),
        ),
        post("label_scan_requires_image", paths::LABEL_SCAN, StatusSet::NonSuccess, json!({})),
        bare(
            "label_scan_unknown_id",
            HttpMethod::Get,
            &paths::label_scan(UNKNOWN_SCAN_ID),
            StatusSet::AnyOf(vec![404, 500]),
        ),
        post(
            "send_otp",
            paths::SEND_OTP,
            StatusSet::SuccessOr(vec![400, 500]),
            send_otp_payload(),
        ),
        post(
            "verify_otp_rejects_wrong_code",
            paths::VERIFY_OTP,
            StatusSet::AnyOf(vec![400, 401]),
            verify_otp_payload(),
        ),
        post(
            "request_otp_requires_password",
            paths::REQUEST_OTP,
            StatusSet::exactly(400),
            json!({ "email": TEST_EMAIL }),
        ),
        post("verify_email_requires_token", paths::VERIFY_EMAIL, StatusSet::exactly(400), json!({})),
        post(
            "signup_rejects_weak_password",
            paths::SIGNUP,
            StatusSet::exactly(400),
            signup_with_weak_password(),
        ),
        post(
            "contact_rejects_invalid_email",
            paths::CONTACT,
            StatusSet::exactly(400),
            contact_with_invalid_email(),
        ),
        bare(
            "admin_categories_requires_auth",
            HttpMethod::Get,
            paths::ADMIN_CATEGORIES,
            StatusSet::exactly(401),
        ),
    ]
}

/// Looks up a contract by name.
#[must_use]
pub fn find_contract(name: &str) -> Option<NamedContract> {
    storefront_contracts().into_iter().find(|entry| entry.name == name)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
