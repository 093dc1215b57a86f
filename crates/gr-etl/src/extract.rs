//! CSV extraction into the staging area.
//!
//! Rows are copied as-is; business-rule validation happens later in the
//! transform phase. Completed extractions are recorded in `etl_metadata`,
//! and re-extracting the same file is a logged no-op.

use crate::error::{EtlError, EtlResult};
use crate::meta::{PhaseCounts, Tracker};
use chrono::NaiveDate;
use gr_core::{Config, Domain};
use gr_db::WarehouseDb;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;

/// Result of one file extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractOutcome {
    /// Rows copied into staging.
    Extracted(i64),
    /// A completed run already extracted this file; nothing was done.
    Skipped,
}

impl ExtractOutcome {
    pub fn records(&self) -> i64 {
        match self {
            ExtractOutcome::Extracted(n) => *n,
            ExtractOutcome::Skipped => 0,
        }
    }
}

/// One sales order line as it appears in the source CSV.
#[derive(Debug, Deserialize)]
struct SalesRecord {
    order_id: String,
    order_date: NaiveDate,
    customer_id: String,
    product_id: String,
    quantity: i64,
    unit_price: f64,
    total_amount: f64,
}

/// One customer master record. Everything past the id may be missing.
#[derive(Debug, Deserialize)]
struct CustomerRecord {
    customer_id: String,
    customer_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    city: Option<String>,
    country: Option<String>,
    registration_date: Option<NaiveDate>,
}

/// One product master record. Everything past the id may be missing.
#[derive(Debug, Deserialize)]
struct ProductRecord {
    product_id: String,
    product_name: Option<String>,
    category: Option<String>,
    subcategory: Option<String>,
    supplier: Option<String>,
    cost_price: Option<f64>,
    msrp: Option<f64>,
}

/// Copies source CSV files into their staging tables.
pub struct Extractor<'a> {
    db: &'a WarehouseDb,
    config: &'a Config,
}

impl<'a> Extractor<'a> {
    pub fn new(db: &'a WarehouseDb, config: &'a Config) -> Self {
        Self { db, config }
    }

    /// Extract one domain's CSV file into its staging table.
    ///
    /// Skips the file when a COMPLETED metadata row already exists for it.
    /// The sales file is copied in chunks of `etl.chunk_size` rows, each
    /// chunk in its own transaction; customer and product files are small
    /// enough to land in a single transaction.
    pub fn extract_file(&self, domain: Domain, path: &Path) -> EtlResult<ExtractOutcome> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let tracker = Tracker::new(self.db);
        if tracker.already_completed(domain.extract_process(), &file_name)? {
            log::info!("Skipping {domain} extraction: '{file_name}' already extracted");
            return Ok(ExtractOutcome::Skipped);
        }

        let process_id = tracker.begin_phase(domain.extract_process(), Some(&file_name))?;

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                let err = EtlError::Io {
                    path: path.display().to_string(),
                    source: e,
                };
                tracker.fail_phase_logged(process_id, &err.to_string());
                return Err(err);
            }
        };
        let reader = csv::Reader::from_reader(file);

        let copied = match domain {
            Domain::Sales => self.copy_sales(reader, path, &file_name),
            Domain::Customers => self.copy_customers(reader, path, &file_name),
            Domain::Products => self.copy_products(reader, path, &file_name),
        };

        match copied {
            Ok(count) => {
                tracker.complete_phase(process_id, PhaseCounts::Extracted(count))?;
                log::info!(
                    "Extracted {count} {domain} rows from '{file_name}' into {}",
                    domain.staging_table()
                );
                Ok(ExtractOutcome::Extracted(count))
            }
            Err(e) => {
                tracker.fail_phase_logged(process_id, &e.to_string());
                Err(e)
            }
        }
    }

    fn copy_sales(
        &self,
        mut reader: csv::Reader<File>,
        path: &Path,
        file_name: &str,
    ) -> EtlResult<i64> {
        let chunk_size = self.config.etl.chunk_size;
        let mut chunk: Vec<SalesRecord> = Vec::with_capacity(chunk_size);
        let mut total = 0i64;

        for result in reader.deserialize() {
            chunk.push(result.map_err(|e| csv_error(path, e))?);
            if chunk.len() >= chunk_size {
                total += self.insert_sales_chunk(&chunk, file_name)?;
                chunk.clear();
            }
        }
        if !chunk.is_empty() {
            total += self.insert_sales_chunk(&chunk, file_name)?;
        }

        Ok(total)
    }

    fn insert_sales_chunk(&self, chunk: &[SalesRecord], file_name: &str) -> EtlResult<i64> {
        let count = self.db.transaction(|conn| {
            let mut stmt = conn.prepare(
                "INSERT INTO staging_sales (order_id, order_date, customer_id, product_id, \
                 quantity, unit_price, total_amount, file_name) \
                 VALUES (?, CAST(? AS DATE), ?, ?, ?, ?, ?, ?)",
            )?;
            for record in chunk {
                stmt.execute(duckdb::params![
                    record.order_id,
                    record.order_date.to_string(),
                    record.customer_id,
                    record.product_id,
                    record.quantity,
                    record.unit_price,
                    record.total_amount,
                    file_name,
                ])?;
            }
            Ok(chunk.len() as i64)
        })?;
        log::debug!("Staged {count} sales rows from '{file_name}'");
        Ok(count)
    }

    fn copy_customers(
        &self,
        mut reader: csv::Reader<File>,
        path: &Path,
        file_name: &str,
    ) -> EtlResult<i64> {
        let mut records: Vec<CustomerRecord> = Vec::new();
        for result in reader.deserialize() {
            records.push(result.map_err(|e| csv_error(path, e))?);
        }

        let count = self.db.transaction(|conn| {
            let mut stmt = conn.prepare(
                "INSERT INTO staging_customers (customer_id, customer_name, email, phone, \
                 address, city, country, registration_date, file_name) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, CAST(? AS DATE), ?)",
            )?;
            for record in &records {
                stmt.execute(duckdb::params![
                    record.customer_id,
                    record.customer_name,
                    record.email,
                    record.phone,
                    record.address,
                    record.city,
                    record.country,
                    record.registration_date.map(|d| d.to_string()),
                    file_name,
                ])?;
            }
            Ok(records.len() as i64)
        })?;
        Ok(count)
    }

    fn copy_products(
        &self,
        mut reader: csv::Reader<File>,
        path: &Path,
        file_name: &str,
    ) -> EtlResult<i64> {
        let mut records: Vec<ProductRecord> = Vec::new();
        for result in reader.deserialize() {
            records.push(result.map_err(|e| csv_error(path, e))?);
        }

        let count = self.db.transaction(|conn| {
            let mut stmt = conn.prepare(
                "INSERT INTO staging_products (product_id, product_name, category, \
                 subcategory, supplier, cost_price, msrp, file_name) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )?;
            for record in &records {
                stmt.execute(duckdb::params![
                    record.product_id,
                    record.product_name,
                    record.category,
                    record.subcategory,
                    record.supplier,
                    record.cost_price,
                    record.msrp,
                    file_name,
                ])?;
            }
            Ok(records.len() as i64)
        })?;
        Ok(count)
    }
}

fn csv_error(path: &Path, source: csv::Error) -> EtlError {
    EtlError::Csv {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
