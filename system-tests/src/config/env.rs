// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Environment-backed configuration for system tests.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: url
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Base URL used when no override is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Environment keys for system test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Base URL of the system under test.
    BaseUrl,
    /// Optional timeout override in seconds (positive integer).
    TimeoutSeconds,
    /// Optional run root override.
    RunRoot,
    /// Optional JSON-lines audit log path.
    AuditLog,
}

impl SystemTestEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BaseUrl => "STOREFRONT_SYSTEM_TEST_BASE_URL",
            Self::TimeoutSeconds => "STOREFRONT_SYSTEM_TEST_TIMEOUT_SEC",
            Self::RunRoot => "STOREFRONT_SYSTEM_TEST_RUN_ROOT",
            Self::AuditLog => "STOREFRONT_SYSTEM_TEST_AUDIT_LOG",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed system test configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemTestConfig {
    /// Base URL of the system under test.
    pub base_url: String,
    /// Optional timeout override in seconds (positive integer).
    pub timeout: Option<Duration>,
    /// Optional run root override.
    pub run_root: Option<PathBuf>,
    /// Optional audit log path.
    pub audit_log: Option<PathBuf>,
}

impl Default for SystemTestConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            run_root: None,
            audit_log: None,
        }
    }
}

impl SystemTestConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when an environment value is not valid UTF-8, is empty,
    /// or fails validation (for example, a non-http base URL or invalid timeout).
    pub fn load() -> Result<Self, String> {
        let base_url = read_env_nonempty(SystemTestEnv::BaseUrl.as_str())?
            .map(|value| parse_base_url(SystemTestEnv::BaseUrl.as_str(), &value))
            .transpose()?
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout = read_env_nonempty(SystemTestEnv::TimeoutSeconds.as_str())?
            .map(|value| parse_timeout_seconds(SystemTestEnv::TimeoutSeconds.as_str(), &value))
            .transpose()?;
        let run_root = read_env_nonempty(SystemTestEnv::RunRoot.as_str())?.map(PathBuf::from);
        let audit_log = read_env_nonempty(SystemTestEnv::AuditLog.as_str())?.map(PathBuf::from);
        Ok(Self {
            base_url,
            timeout,
            run_root,
            audit_log,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Reads an environment variable and rejects empty values.
///
/// # Errors
///
/// Returns an error when the variable is set but empty or whitespace.
fn read_env_nonempty(name: &str) -> Result<Option<String>, String> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Validates an http(s) base URL and returns it trimmed.
///
/// # Errors
///
/// Returns an error when the value does not parse or uses another scheme.
fn parse_base_url(name: &str, raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|err| format!("{name} must be a valid URL: {err}"))?;
    match url.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        scheme => Err(format!("{name} must use http or https, got {scheme}")),
    }
}

/// Parses a positive timeout value from an environment variable string.
///
/// # Errors
///
/// Returns an error when the value is missing, non-numeric, or zero.
fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(format!("{name} must be a positive integer number of seconds"));
    }
    let secs: u64 = trimmed
        .parse()
        .map_err(|_| format!("{name} must be a positive integer number of seconds"))?;
    if secs == 0 {
        return Err(format!("{name} must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}
