// crates/storefront-contract/src/runner.rs
// ============================================================================
// Module: Contract Runner
// Description: Runs a list of named contracts and collects a report.
// Purpose: Back the CLI `check` command and the contract-matrix suite.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Cases run one after another but independently: a failing case never
//! prevents the next one from running, and nothing is retried.

use serde::Serialize;

use crate::catalog::NamedContract;
use crate::checker::ContractChecker;
use crate::contract::HttpMethod;

/// Verdict for a single named contract.
#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    /// Case name.
    pub name: &'static str,
    /// Request method.
    pub method: HttpMethod,
    /// Endpoint path.
    pub path: String,
    /// Whether the response conformed.
    pub passed: bool,
    /// Received status when known.
    pub status: Option<u16>,
    /// Error kind label for failures.
    pub error_kind: Option<&'static str>,
    /// Failure message.
    pub message: Option<String>,
}

/// Verdicts for a full run.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    /// Base URL the cases ran against.
    pub base_url: String,
    /// Passing case count.
    pub passed: usize,
    /// Failing case count.
    pub failed: usize,
    /// Per-case verdicts, in run order.
    pub cases: Vec<CaseReport>,
}

impl SuiteReport {
    /// Returns true when every case passed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Returns the failing cases.
    pub fn failures(&self) -> impl Iterator<Item = &CaseReport> {
        self.cases.iter().filter(|case| !case.passed)
    }
}

/// Runs every contract against `checker`.
pub async fn run_contracts(checker: &ContractChecker, contracts: &[NamedContract]) -> SuiteReport {
    let mut cases = Vec::with_capacity(contracts.len());
    for entry in contracts {
        let result = checker.check(&entry.contract, &entry.request).await;
        let case = match result {
            Ok(outcome) => CaseReport {
                name: entry.name,
                method: entry.contract.method,
                path: entry.contract.path.clone(),
                passed: true,
                status: Some(outcome.status),
                error_kind: None,
                message: None,
            },
            Err(err) => CaseReport {
                name: entry.name,
                method: entry.contract.method,
                path: entry.contract.path.clone(),
                passed: false,
                status: err.status(),
                error_kind: Some(err.kind()),
                message: Some(err.to_string()),
            },
        };
        cases.push(case);
    }
    let passed = cases.iter().filter(|case| case.passed).count();
    SuiteReport {
        base_url: checker.base_url().to_string(),
        passed,
        failed: cases.len().saturating_sub(passed),
        cases,
    }
}
