//! ETL metadata tracking.
//!
//! Every pipeline phase brackets its work with a row in `etl_metadata`:
//! RUNNING at start, then COMPLETED with a record count or FAILED with the
//! error text. The COMPLETED rows double as the extraction idempotency
//! guard.

use crate::error::{EtlResult, SqlResultExt};
use gr_db::WarehouseDb;

/// Phase lifecycle status persisted in `etl_metadata.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseStatus {
    Running,
    Completed,
    Failed,
}

impl PhaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseStatus::Running => "RUNNING",
            PhaseStatus::Completed => "COMPLETED",
            PhaseStatus::Failed => "FAILED",
        }
    }
}

/// Record count reported by a completed phase, routed to the matching
/// `etl_metadata` column.
#[derive(Debug, Clone, Copy)]
pub enum PhaseCounts {
    Extracted(i64),
    Transformed(i64),
    Loaded(i64),
}

impl PhaseCounts {
    fn column(&self) -> &'static str {
        match self {
            PhaseCounts::Extracted(_) => "records_extracted",
            PhaseCounts::Transformed(_) => "records_transformed",
            PhaseCounts::Loaded(_) => "records_loaded",
        }
    }

    fn value(&self) -> i64 {
        match self {
            PhaseCounts::Extracted(n) | PhaseCounts::Transformed(n) | PhaseCounts::Loaded(n) => *n,
        }
    }
}

/// Records phase executions in `etl_metadata`.
pub struct Tracker<'a> {
    db: &'a WarehouseDb,
}

impl<'a> Tracker<'a> {
    pub fn new(db: &'a WarehouseDb) -> Self {
        Self { db }
    }

    /// Insert a RUNNING row for a phase and return its process_id.
    ///
    /// The id is read back with a follow-up select; the pipeline is
    /// single-threaded, so the newest row for the process is ours.
    pub fn begin_phase(&self, process_name: &str, source_file: Option<&str>) -> EtlResult<i64> {
        self.db
            .conn()
            .execute(
                "INSERT INTO etl_metadata (process_name, source_file, status) \
                 VALUES (?, ?, ?)",
                duckdb::params![process_name, source_file, PhaseStatus::Running.as_str()],
            )
            .sql_context("insert etl_metadata")?;

        let process_id: i64 = self
            .db
            .conn()
            .query_row(
                "SELECT process_id FROM etl_metadata WHERE process_name = ? \
                 ORDER BY process_id DESC LIMIT 1",
                duckdb::params![process_name],
                |row| row.get(0),
            )
            .sql_context("select process_id")?;

        Ok(process_id)
    }

    /// Mark a phase COMPLETED with its record count.
    pub fn complete_phase(&self, process_id: i64, counts: PhaseCounts) -> EtlResult<()> {
        let sql = format!(
            "UPDATE etl_metadata SET end_time = now(), status = ?, {} = ? \
             WHERE process_id = ?",
            counts.column()
        );
        self.db
            .conn()
            .execute(
                &sql,
                duckdb::params![PhaseStatus::Completed.as_str(), counts.value(), process_id],
            )
            .sql_context("complete etl_metadata")?;
        Ok(())
    }

    /// Mark a phase FAILED, keeping the error text.
    pub fn fail_phase(&self, process_id: i64, error_message: &str) -> EtlResult<()> {
        self.db
            .conn()
            .execute(
                "UPDATE etl_metadata SET end_time = now(), status = ?, \
                 error_message = ? WHERE process_id = ?",
                duckdb::params![PhaseStatus::Failed.as_str(), error_message, process_id],
            )
            .sql_context("fail etl_metadata")?;
        Ok(())
    }

    /// Best-effort [`Self::fail_phase`]: logs and swallows tracker errors so
    /// the phase's own error stays primary.
    pub fn fail_phase_logged(&self, process_id: i64, error_message: &str) {
        if let Err(e) = self.fail_phase(process_id, error_message) {
            log::warn!("Could not record phase failure for process {process_id}: {e}");
        }
    }

    /// True when a COMPLETED row exists for this (process, source file)
    /// pair. This is the extraction idempotency guard.
    pub fn already_completed(&self, process_name: &str, source_file: &str) -> EtlResult<bool> {
        let count: i64 = self
            .db
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM etl_metadata \
                 WHERE process_name = ? AND source_file = ? AND status = ?",
                duckdb::params![process_name, source_file, PhaseStatus::Completed.as_str()],
                |row| row.get(0),
            )
            .sql_context("check completed extraction")?;
        Ok(count > 0)
    }
}

#[cfg(test)]
#[path = "meta_test.rs"]
mod tests;
