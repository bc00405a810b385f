// system-tests/src/lib.rs
// ============================================================================
// Module: Storefront System Tests Library
// Description: Shared configuration for storefront system test scenarios.
// Purpose: Provide common utilities for the system-test binaries.
// Dependencies: url
// ============================================================================

//! ## Overview
//! This crate hosts shared configuration used by the storefront system-test
//! binaries in `system-tests/tests`. The live suites target the deployment
//! named by `STOREFRONT_SYSTEM_TEST_BASE_URL`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
