// crates/storefront-contract/src/main.rs
// ============================================================================
// Module: Contract Check CLI
// Description: CLI entrypoint for running storefront contracts.
// Purpose: Check a live deployment outside the test harness.
// Dependencies: clap, storefront-contract, tokio
// ============================================================================

//! ## Overview
//! `storefront-contract check` runs the contract table against a base URL and
//! writes a JSON report to stdout; the exit code is non-zero when any case
//! fails. `storefront-contract list` prints the table without sending
//! requests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use clap::Subcommand;
use storefront_contract::CheckError;
use storefront_contract::ContractChecker;
use storefront_contract::FileAuditSink;
use storefront_contract::NamedContract;
use storefront_contract::StderrAuditSink;
use storefront_contract::SuiteReport;
use storefront_contract::catalog;
use storefront_contract::run_contracts;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Definition
// ============================================================================

/// Contract checker CLI arguments.
#[derive(Debug, Parser)]
#[command(name = "storefront-contract", about = "Check storefront API contracts.")]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Supported CLI subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Run contracts against a deployment.
    Check {
        /// Base URL of the system under test.
        #[arg(long, value_name = "URL", default_value = "http://localhost:3000")]
        base_url: String,
        /// Request timeout in seconds.
        #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
        timeout_secs: Option<u64>,
        /// Append JSON-lines audit events to this file instead of stderr.
        #[arg(long, value_name = "PATH")]
        audit_log: Option<PathBuf>,
        /// Run only the named contracts.
        #[arg(long, value_name = "NAME")]
        only: Vec<String>,
    },
    /// Print the contract table.
    List,
}

/// CLI failures.
#[derive(Debug, Error)]
enum CliError {
    /// Checker setup failed.
    #[error(transparent)]
    Check(#[from] CheckError),
    /// Output or audit log I/O failed.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// Report serialization failed.
    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
    /// `--only` named a contract that does not exist.
    #[error("unknown contract `{0}`")]
    UnknownContract(String),
}

// ============================================================================
// SECTION: CLI Execution
// ============================================================================

/// Aggregate verdict of a CLI invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunStatus {
    /// Every selected contract passed, or nothing was checked.
    Passed,
    /// At least one contract failed.
    Failed,
}

impl RunStatus {
    /// Maps a suite report onto the CLI verdict.
    const fn from_report(report: &SuiteReport) -> Self {
        if report.is_success() { Self::Passed } else { Self::Failed }
    }

    /// Process exit code for the verdict.
    fn exit_code(self) -> ExitCode {
        match self {
            Self::Passed => ExitCode::SUCCESS,
            Self::Failed => ExitCode::FAILURE,
        }
    }
}

/// CLI entrypoint.
fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(status) => status.exit_code(),
        Err(err) => report_error(&err),
    }
}

/// Executes the parsed CLI command.
fn run(cli: Cli) -> Result<RunStatus, CliError> {
    match cli.command {
        Command::Check {
            base_url,
            timeout_secs,
            audit_log,
            only,
        } => {
            let contracts = resolve_contracts(&only)?;
            let checker = ContractChecker::new(&base_url, timeout_secs.map(Duration::from_secs))?;
            let checker = match audit_log {
                Some(path) => checker.with_audit_sink(Arc::new(FileAuditSink::new(&path)?)),
                None => checker.with_audit_sink(Arc::new(StderrAuditSink)),
            };
            let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
            let report = runtime.block_on(run_contracts(&checker, &contracts));
            write_report(&mut io::stdout(), &report)?;
            Ok(RunStatus::from_report(&report))
        }
        Command::List => {
            write_contract_table(&mut io::stdout(), &catalog::storefront_contracts())?;
            Ok(RunStatus::Passed)
        }
    }
}

/// Selects the contracts named by `--only`, or the full table when empty.
fn resolve_contracts(only: &[String]) -> Result<Vec<NamedContract>, CliError> {
    if only.is_empty() {
        return Ok(catalog::storefront_contracts());
    }
    only.iter()
        .map(|name| {
            catalog::find_contract(name).ok_or_else(|| CliError::UnknownContract(name.clone()))
        })
        .collect()
}

/// Writes the suite report as pretty JSON followed by a newline.
fn write_report<W: Write>(out: &mut W, report: &SuiteReport) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}

/// Writes one aligned line per contract: name, method, path, statuses.
fn write_contract_table<W: Write>(out: &mut W, contracts: &[NamedContract]) -> io::Result<()> {
    for entry in contracts {
        writeln!(
            out,
            "{:<34} {:<5} {:<32} {}",
            entry.name, entry.contract.method, entry.contract.path, entry.contract.statuses
        )?;
    }
    Ok(())
}

/// Reports CLI errors to stderr and returns a failure exit code.
fn report_error(err: &CliError) -> ExitCode {
    let mut stderr = io::stderr();
    let _ = writeln!(stderr, "{err}");
    ExitCode::from(2)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
