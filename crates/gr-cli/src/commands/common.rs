//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use gr_core::Config;
use gr_db::WarehouseDb;
use gr_etl::{PhaseResult, RunStatus, RunSummary};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Commands return `Err(ExitCode(N).into())` instead of calling
/// `std::process::exit(N)` directly so destructors run on the way out.
/// The Display impl is empty because main downcasts this before printing;
/// nothing should ever render it as an error message.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Run results output file format
#[derive(Debug, Serialize)]
pub(crate) struct RunResults {
    timestamp: DateTime<Utc>,
    elapsed_secs: f64,
    success_count: usize,
    failure_count: usize,
    results: Vec<PhaseResult>,
}

impl RunResults {
    pub(crate) fn from_summary(summary: &RunSummary) -> Self {
        let (success_count, failure_count) = phase_counts(summary);
        Self {
            timestamp: Utc::now(),
            elapsed_secs: summary.elapsed_secs,
            success_count,
            failure_count,
            results: summary.phases.clone(),
        }
    }
}

/// Load the project config honoring `--project-dir` and `--config`.
///
/// Returns the project root alongside the config; data and target paths
/// resolve relative to that root.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<(PathBuf, Config)> {
    let root = PathBuf::from(&global.project_dir);
    let config = match &global.config {
        Some(path) => Config::load(Path::new(path)),
        None => Config::load_from_dir(&root),
    }
    .with_context(|| format!("Failed to load project config from '{}'", global.project_dir))?;
    Ok((root, config))
}

/// Open the warehouse at the resolved database path.
///
/// Resolution order: `--database` flag, `GRANARY_DB`, then the config.
pub(crate) fn open_warehouse(config: &Config, global: &GlobalArgs) -> Result<WarehouseDb> {
    let path = config.resolve_database_path(global.database.as_deref());
    WarehouseDb::open(&path).with_context(|| format!("Failed to open warehouse at '{path}'"))
}

/// Print the per-phase result lines for a finished run.
pub(crate) fn print_phases(summary: &RunSummary) {
    for phase in &summary.phases {
        let millis = (phase.duration_secs * 1000.0) as u128;
        match phase.status {
            RunStatus::Success => {
                println!("  ✓ {} ({} records) [{}ms]", phase.phase, phase.records, millis);
            }
            RunStatus::Skipped => {
                println!("  ✓ {} (skipped, already extracted) [{}ms]", phase.phase, millis);
            }
            RunStatus::Error => {
                let message = phase.error.as_deref().unwrap_or("unknown error");
                println!("  ✗ {} - {} [{}ms]", phase.phase, message, millis);
            }
        }
    }
}

/// Print the completion summary line and total elapsed time.
pub(crate) fn print_completion(summary: &RunSummary) {
    let (success_count, failure_count) = phase_counts(summary);
    println!();
    println!(
        "Completed: {} succeeded, {} failed",
        success_count, failure_count
    );
    println!("Total time: {}ms", (summary.elapsed_secs * 1000.0) as u128);
}

/// Write run results to JSON file
pub(crate) fn write_run_results(target_dir: &Path, summary: &RunSummary) -> Result<()> {
    let results = RunResults::from_summary(summary);

    std::fs::create_dir_all(target_dir).context("Failed to create target directory")?;
    let results_path = target_dir.join("run_results.json");
    let results_json =
        serde_json::to_string_pretty(&results).context("Failed to serialize run results")?;
    std::fs::write(&results_path, results_json).context("Failed to write run_results.json")?;

    Ok(())
}

/// Convert a failed run into exit code 4.
pub(crate) fn exit_on_failure(summary: &RunSummary) -> Result<()> {
    if summary.success {
        Ok(())
    } else {
        Err(ExitCode(4).into())
    }
}

/// Succeeded/failed counts for the completion line; skipped phases count
/// as succeeded because the work they guard is already done.
fn phase_counts(summary: &RunSummary) -> (usize, usize) {
    let failures = summary
        .phases
        .iter()
        .filter(|p| p.status == RunStatus::Error)
        .count();
    (summary.phases.len() - failures, failures)
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
