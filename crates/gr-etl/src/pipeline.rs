//! Pipeline coordination.
//!
//! Drives the fixed phase order over one warehouse handle: extract the
//! three feeds, transform them, populate the calendar, then load
//! dimensions, facts, and rollups. A phase failure stops the run; phases
//! already finished keep their committed writes.

use crate::error::EtlResult;
use crate::extract::{ExtractOutcome, Extractor};
use crate::load::Loader;
use crate::transform::Transformer;
use crate::validate::{validate_results, ValidationReport};
use gr_core::{Config, Domain};
use gr_db::WarehouseDb;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

const SEPARATOR: &str = "============================================================";

/// How a single phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Skipped,
    Error,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::Skipped => "skipped",
            RunStatus::Error => "error",
        }
    }
}

/// One executed phase with its timing and record count.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseResult {
    pub phase: String,
    pub status: RunStatus,
    pub records: i64,
    pub duration_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Everything that happened in one pipeline invocation.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub phases: Vec<PhaseResult>,
    pub elapsed_secs: f64,
    pub success: bool,
}

impl RunSummary {
    pub fn total_records(&self) -> i64 {
        self.phases.iter().map(|p| p.records).sum()
    }

    /// The phase that stopped the run, if any.
    pub fn failed_phase(&self) -> Option<&PhaseResult> {
        self.phases.iter().find(|p| p.status == RunStatus::Error)
    }
}

/// Sequences the ETL phases against one warehouse.
pub struct Pipeline<'a> {
    db: &'a WarehouseDb,
    config: &'a Config,
    project_root: PathBuf,
}

impl<'a> Pipeline<'a> {
    pub fn new(db: &'a WarehouseDb, config: &'a Config, project_root: &Path) -> Self {
        Self {
            db,
            config,
            project_root: project_root.to_path_buf(),
        }
    }

    /// Run every phase in order. Stops at the first failure; the summary
    /// carries what ran, what failed, and the timings.
    pub fn run_full(&self) -> RunSummary {
        let started = Instant::now();
        log::info!("{SEPARATOR}");
        log::info!("Starting full pipeline run for '{}'", self.config.name);
        log::info!("{SEPARATOR}");

        let mut phases: Vec<PhaseResult> = Vec::new();
        let success = self.extract_all(&mut phases)
            && self.transform_all(&mut phases)
            && self.load_all(&mut phases);

        let elapsed_secs = started.elapsed().as_secs_f64();
        log::info!("{SEPARATOR}");
        if success {
            log::info!("Pipeline run complete in {elapsed_secs:.2}s");
        } else {
            log::error!("Pipeline run failed after {elapsed_secs:.2}s");
        }
        log::info!("{SEPARATOR}");

        RunSummary {
            phases,
            elapsed_secs,
            success,
        }
    }

    /// Incremental runs ride on the extraction guards: already-extracted
    /// files skip, everything downstream re-runs idempotently.
    pub fn run_incremental(&self) -> RunSummary {
        log::info!("Incremental run requested; running the full phase order over new files");
        self.run_full()
    }

    /// Extraction phases only, all domains.
    pub fn run_extract(&self) -> RunSummary {
        self.run_group(|pipeline, phases| pipeline.extract_all(phases))
    }

    /// Extraction for a single domain.
    pub fn run_extract_domain(&self, domain: Domain) -> RunSummary {
        self.run_group(|pipeline, phases| pipeline.extract_one(domain, phases))
    }

    /// Transform phases only, date dimension included.
    pub fn run_transform(&self) -> RunSummary {
        self.run_group(|pipeline, phases| pipeline.transform_all(phases))
    }

    /// Load phases only.
    pub fn run_load(&self) -> RunSummary {
        self.run_group(|pipeline, phases| pipeline.load_all(phases))
    }

    /// Post-run warehouse summary queries.
    pub fn validate(&self) -> EtlResult<ValidationReport> {
        validate_results(self.db)
    }

    fn run_group<F>(&self, body: F) -> RunSummary
    where
        F: FnOnce(&Self, &mut Vec<PhaseResult>) -> bool,
    {
        let started = Instant::now();
        let mut phases: Vec<PhaseResult> = Vec::new();
        let success = body(self, &mut phases);
        RunSummary {
            phases,
            elapsed_secs: started.elapsed().as_secs_f64(),
            success,
        }
    }

    fn extract_all(&self, phases: &mut Vec<PhaseResult>) -> bool {
        for domain in Domain::ALL {
            if !self.extract_one(domain, phases) {
                return false;
            }
        }
        true
    }

    fn extract_one(&self, domain: Domain, phases: &mut Vec<PhaseResult>) -> bool {
        let path = self.source_path(domain);
        run_phase(phases, &format!("extract_{domain}"), || {
            let outcome = Extractor::new(self.db, self.config).extract_file(domain, &path)?;
            Ok(match outcome {
                ExtractOutcome::Extracted(records) => (RunStatus::Success, records),
                ExtractOutcome::Skipped => (RunStatus::Skipped, 0),
            })
        })
    }

    fn transform_all(&self, phases: &mut Vec<PhaseResult>) -> bool {
        let transformer = Transformer::new(self.db, self.config);
        run_phase(phases, "transform_customers", || {
            Ok((RunStatus::Success, transformer.transform_customers()?))
        }) && run_phase(phases, "transform_products", || {
            Ok((RunStatus::Success, transformer.transform_products()?))
        }) && run_phase(phases, "transform_sales", || {
            Ok((RunStatus::Success, transformer.transform_sales()?))
        }) && run_phase(phases, "date_dimension", || {
            Ok((RunStatus::Success, transformer.populate_date_dimension()?))
        })
    }

    fn load_all(&self, phases: &mut Vec<PhaseResult>) -> bool {
        let loader = Loader::new(self.db, self.config);
        run_phase(phases, "load_dim_customers", || {
            Ok((RunStatus::Success, loader.load_dim_customers()?.versions_written()))
        }) && run_phase(phases, "load_dim_products", || {
            Ok((RunStatus::Success, loader.load_dim_products()?.versions_written()))
        }) && run_phase(phases, "load_fact_sales", || {
            Ok((RunStatus::Success, loader.load_fact_sales()?.inserted))
        }) && run_phase(phases, "aggregates", || {
            Ok((RunStatus::Success, loader.create_aggregates()?))
        })
    }

    fn source_path(&self, domain: Domain) -> PathBuf {
        self.config
            .data_file_absolute(&self.project_root, domain.file_name(&self.config.data))
    }
}

/// Time one phase and record its result. Returns false when the phase
/// failed and the run should stop.
fn run_phase<F>(phases: &mut Vec<PhaseResult>, name: &str, body: F) -> bool
where
    F: FnOnce() -> EtlResult<(RunStatus, i64)>,
{
    log::info!("Phase {name} starting");
    let started = Instant::now();
    let result = body();
    let duration_secs = started.elapsed().as_secs_f64();

    match result {
        Ok((status, records)) => {
            log::info!("Phase {name} finished: {records} records in {duration_secs:.2}s");
            phases.push(PhaseResult {
                phase: name.to_string(),
                status,
                records,
                duration_secs,
                error: None,
            });
            true
        }
        Err(e) => {
            log::error!("Phase {name} failed: {e}");
            phases.push(PhaseResult {
                phase: name.to_string(),
                status: RunStatus::Error,
                records: 0,
                duration_secs,
                error: Some(e.to_string()),
            });
            false
        }
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
