// system-tests/tests/helpers/sut_stub.rs
// ============================================================================
// Module: Storefront Stub
// Description: Minimal in-process storefront API for harness self-tests.
// Purpose: Prove the checker accepts conforming responses and flags faults.
// Dependencies: axum, storefront-contract, tokio
// ============================================================================

//! ## Overview
//! The stub answers the storefront API surface the way a healthy deployment
//! does. [`StubFaults`] switches individual endpoints into a broken mode so
//! suites can assert that the checker reports the breakage.

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
use axum::extract::Request;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header;
use axum::middleware;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use storefront_contract::catalog::TelemetryEventType;
use tokio::runtime::Builder;
use tokio::sync::oneshot;

/// Product fixtures: id, title, slug, category.
const PRODUCTS: &[(&str, &str, &str, &str)] = &[
    ("p-01", "Whole Milk", "whole-milk", "dairy"),
    ("p-02", "Oat Milk", "oat-milk", "dairy"),
    ("p-03", "Greek Yogurt", "greek-yogurt", "dairy"),
    ("p-04", "Aged Cheddar", "aged-cheddar", "dairy"),
    ("p-05", "Kefir", "kefir", "dairy"),
    ("p-06", "Almond Milk", "almond-milk", "dairy"),
    ("p-07", "Rolled Oats", "rolled-oats", "grains"),
    ("p-08", "Brown Rice", "brown-rice", "grains"),
    ("p-09", "Quinoa", "quinoa", "grains"),
    ("p-10", "Spinach", "spinach", "produce"),
    ("p-11", "Blueberries", "blueberries", "produce"),
    ("p-12", "Avocado", "avocado", "produce"),
    ("p-13", "Milk Chocolate", "milk-chocolate", "snacks"),
    ("p-14", "Trail Mix", "trail-mix", "snacks"),
];

/// Total number of product fixtures.
pub const PRODUCT_COUNT: usize = PRODUCTS.len();

/// Switches that make individual endpoints break their contract.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubFaults {
    /// `/api/products` wraps the list in an object.
    pub products_as_object: bool,
    /// `/api/products` ignores `page`/`limit`.
    pub products_ignore_limit: bool,
    /// The last product omits `slug`.
    pub products_missing_slug: bool,
    /// `/api/products` answers an HTML page.
    pub products_as_html: bool,
    /// `/api/telemetry/stats` answers without credentials.
    pub open_telemetry_stats: bool,
    /// `/api/telemetry` accepts any payload.
    pub accept_any_telemetry: bool,
    /// `/api/label-scan` answers GET with 200.
    pub label_scan_get_ok: bool,
    /// `/api/auth/verify-otp` accepts any code.
    pub accept_any_otp: bool,
    /// `/api/health` is not routed.
    pub health_missing: bool,
}

/// Request observed by the stub.
#[derive(Clone, Debug, Serialize)]
pub struct StubRequest {
    /// Request method.
    pub method: String,
    /// Request path.
    pub path: String,
    /// Raw query string.
    pub query: Option<String>,
}

/// Shared handler state.
#[derive(Clone)]
struct StubState {
    /// Enabled faults.
    faults: StubFaults,
    /// Request log shared with the handle.
    requests: Arc<Mutex<Vec<StubRequest>>>,
}

/// Handle for the stub storefront server.
pub struct StubHandle {
    /// Base URL of the running stub.
    base_url: String,
    /// Graceful shutdown trigger.
    shutdown: Option<oneshot::Sender<()>>,
    /// Server thread.
    join: Option<thread::JoinHandle<()>>,
    /// Request log.
    requests: Arc<Mutex<Vec<StubRequest>>>,
}

impl StubHandle {
    /// Returns the stub base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns captured requests.
    pub fn requests(&self) -> Vec<StubRequest> {
        self.requests.lock().map_or_else(|_| Vec::new(), |entries| entries.clone())
    }
}

impl Drop for StubHandle {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Spawn a storefront stub that honors every contract.
pub fn spawn_storefront_stub() -> Result<StubHandle, String> {
    spawn_storefront_stub_with_faults(StubFaults::default())
}

/// Spawn a storefront stub with the given faults enabled.
pub fn spawn_storefront_stub_with_faults(faults: StubFaults) -> Result<StubHandle, String> {
    let listener = StdTcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("storefront stub bind failed: {err}"))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("storefront stub listener nonblocking failed: {err}"))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("storefront stub local addr failed: {err}"))?;
    let base_url = format!("http://{addr}");

    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = StubState {
        faults,
        requests: Arc::clone(&requests),
    };
    let app = router(state);
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
    Ok(StubHandle {
        base_url,
        shutdown: Some(shutdown_tx),
        join: Some(join),
        requests,
    })
}

/// Builds the storefront routes; faults decide which routes exist.
fn router(state: StubState) -> Router {
    let label_scan = if state.faults.label_scan_get_ok {
        post(upload_label).get(list_label_scans)
    } else {
        post(upload_label)
    };
    let mut router: Router<StubState> = Router::new()
        .route("/api/products", get(list_products))
        .route("/api/telemetry", post(track_event))
        .route("/api/telemetry/stats", get(telemetry_stats))
        .route("/api/label-scan", label_scan)
        .route("/api/label-scan/{id}", get(label_scan_by_id))
        .route("/api/auth/send-otp", post(send_otp))
        .route("/api/auth/verify-otp", post(verify_otp))
        .route("/api/auth/request-otp", post(request_otp))
        .route("/api/auth/verify-email", post(verify_email))
        .route("/api/auth/signup", post(signup))
        .route("/api/contact", post(contact))
        .route("/api/admin/categories", get(admin_categories));
    if !state.faults.health_missing {
        router = router.route("/api/health", get(health));
    }
    router.layer(middleware::from_fn_with_state(state.clone(), record_request)).with_state(state)
}

/// Appends every incoming request to the log.
async fn record_request(State(state): State<StubState>, request: Request, next: Next) -> Response {
    let entry = StubRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        query: request.uri().query().map(ToString::to_string),
    };
    if let Ok(mut requests) = state.requests.lock() {
        requests.push(entry);
    }
    next.run(request).await
}

/// JSON error response in the storefront format.
fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Parses a JSON request body.
fn parse_body(body: &Bytes) -> Option<Value> {
    serde_json::from_slice(body).ok()
}

/// Returns a non-blank string field.
fn str_field<'a>(payload: &'a Value, field: &str) -> Option<&'a str> {
    payload.get(field).and_then(Value::as_str).filter(|value| !value.trim().is_empty())
}

/// Returns true when credentials are presented.
fn is_authenticated(headers: &HeaderMap) -> bool {
    headers.contains_key(header::AUTHORIZATION)
}

// ============================================================================
// SECTION: Products
// ============================================================================

/// GET /api/products with category, search, and pagination.
async fn list_products(
    State(state): State<StubState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let faults = state.faults;
    if faults.products_as_html {
        return (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html")],
            "<!doctype html><title>Storefront</title>",
        )
            .into_response();
    }
    let category = params.get("category");
    let search = params.get("search").map(|term| term.to_lowercase());
    let mut items: Vec<Value> = PRODUCTS
        .iter()
        .filter(|(_, _, _, cat)| category.is_none_or(|wanted| wanted.as_str() == *cat))
        .filter(|(_, title, _, _)| {
            search.as_ref().is_none_or(|term| title.to_lowercase().contains(term.as_str()))
        })
        .map(|(id, title, slug, cat)| {
            json!({ "id": id, "title": title, "slug": slug, "category": cat })
        })
        .collect();
    if faults.products_missing_slug
        && let Some(Value::Object(last)) = items.last_mut()
    {
        last.remove("slug");
    }
    let limit = params.get("limit").and_then(|value| value.parse::<usize>().ok());
    if let Some(limit) = limit
        && !faults.products_ignore_limit
    {
        let page = params.get("page").and_then(|value| value.parse::<usize>().ok()).unwrap_or(1);
        let offset = page.saturating_sub(1).saturating_mul(limit);
        items = items.into_iter().skip(offset).take(limit).collect();
    }
    if faults.products_as_object {
        let total = items.len();
        return Json(json!({ "products": items, "total": total })).into_response();
    }
    Json(Value::Array(items)).into_response()
}

/// GET /api/health.
async fn health() -> Response {
    Json(json!({ "status": "ok" })).into_response()
}

// ============================================================================
// SECTION: Telemetry
// ============================================================================

/// POST /api/telemetry.
async fn track_event(State(state): State<StubState>, body: Bytes) -> Response {
    let Some(payload) = parse_body(&body) else {
        return error(StatusCode::BAD_REQUEST, "Invalid JSON");
    };
    if !state.faults.accept_any_telemetry {
        let known = str_field(&payload, "eventType").and_then(TelemetryEventType::parse);
        if known.is_none() {
            return error(StatusCode::BAD_REQUEST, "Invalid event type");
        }
        if str_field(&payload, "eventName").is_none() {
            return error(StatusCode::BAD_REQUEST, "Event name is required");
        }
    }
    Json(json!({ "success": true })).into_response()
}

/// GET /api/telemetry/stats.
async fn telemetry_stats(State(state): State<StubState>, headers: HeaderMap) -> Response {
    if !state.faults.open_telemetry_stats && !is_authenticated(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    Json(json!({ "totalEvents": 0, "eventsByType": [], "topPages": [] })).into_response()
}

// ============================================================================
// SECTION: Label Scan
// ============================================================================

/// POST /api/label-scan; requires a multipart image.
async fn upload_label(headers: HeaderMap) -> Response {
    let is_multipart = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"));
    if !is_multipart {
        return error(StatusCode::BAD_REQUEST, "No image file provided");
    }
    (StatusCode::CREATED, Json(json!({ "scanId": "scan-1" }))).into_response()
}

/// GET /api/label-scan, routed only under the `label_scan_get_ok` fault.
async fn list_label_scans() -> Response {
    Json(json!([])).into_response()
}

/// GET /api/label-scan/{id}; no scan exists.
async fn label_scan_by_id(Path(id): Path<String>) -> Response {
    error(StatusCode::NOT_FOUND, &format!("Scan {id} not found"))
}

// ============================================================================
// SECTION: Auth and Forms
// ============================================================================

/// POST /api/auth/send-otp; email delivery is unconfigured.
async fn send_otp(body: Bytes) -> Response {
    let Some(payload) = parse_body(&body) else {
        return error(StatusCode::BAD_REQUEST, "Invalid JSON");
    };
    if str_field(&payload, "email").is_none() {
        return error(StatusCode::BAD_REQUEST, "Email is required");
    }
    error(StatusCode::INTERNAL_SERVER_ERROR, "Email service not configured")
}

/// POST /api/auth/verify-otp; no OTP is ever valid unless faulted.
async fn verify_otp(State(state): State<StubState>, body: Bytes) -> Response {
    let Some(payload) = parse_body(&body) else {
        return error(StatusCode::BAD_REQUEST, "Invalid JSON");
    };
    if str_field(&payload, "email").is_none() || str_field(&payload, "otp").is_none() {
        return error(StatusCode::BAD_REQUEST, "Email and OTP are required");
    }
    if state.faults.accept_any_otp {
        return Json(json!({ "success": true })).into_response();
    }
    error(StatusCode::UNAUTHORIZED, "Invalid or expired OTP")
}

/// POST /api/auth/request-otp.
async fn request_otp(body: Bytes) -> Response {
    let payload = parse_body(&body).unwrap_or(Value::Null);
    if str_field(&payload, "email").is_none() || str_field(&payload, "password").is_none() {
        return error(StatusCode::BAD_REQUEST, "Email and password are required");
    }
    error(StatusCode::UNAUTHORIZED, "Invalid email or password")
}

/// POST /api/auth/verify-email; no token is valid.
async fn verify_email(body: Bytes) -> Response {
    let payload = parse_body(&body).unwrap_or(Value::Null);
    if str_field(&payload, "token").is_none() {
        return error(StatusCode::BAD_REQUEST, "Verification token is required");
    }
    error(StatusCode::BAD_REQUEST, "Invalid or expired verification token")
}

/// POST /api/auth/signup.
async fn signup(body: Bytes) -> Response {
    let payload = parse_body(&body).unwrap_or(Value::Null);
    let strong = str_field(&payload, "password").is_some_and(|password| {
        password.len() >= 8
            && password.chars().any(|c| c.is_ascii_uppercase())
            && password.chars().any(|c| c.is_ascii_lowercase())
            && password.chars().any(|c| c.is_ascii_digit())
    });
    if str_field(&payload, "name").is_none() || !strong {
        return error(StatusCode::BAD_REQUEST, "Password must be at least 8 characters");
    }
    (StatusCode::CREATED, Json(json!({ "message": "Account created" }))).into_response()
}

/// POST /api/contact.
async fn contact(body: Bytes) -> Response {
    let payload = parse_body(&body).unwrap_or(Value::Null);
    let fields = ["name", "email", "subject", "message"];
    if fields.iter().any(|field| str_field(&payload, field).is_none()) {
        return error(StatusCode::BAD_REQUEST, "All fields are required");
    }
    let email_ok = str_field(&payload, "email")
        .and_then(|email| email.split_once('@'))
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !email_ok {
        return error(StatusCode::BAD_REQUEST, "Invalid email address");
    }
    (StatusCode::CREATED, Json(json!({ "success": true }))).into_response()
}

/// GET /api/admin/categories.
async fn admin_categories(headers: HeaderMap) -> Response {
    if !is_authenticated(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    Json(json!([])).into_response()
}
