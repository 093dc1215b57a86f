//! Staging validation and cleansing.
//!
//! All transforms run in place against the staging tables: normalize text,
//! flag rows that break a business rule, then mark the clean rows
//! processed. Flagged rows stay in staging with their error text and are
//! excluded from every later phase.

use crate::dates::calendar_rows;
use crate::error::{EtlResult, SqlResultExt};
use crate::meta::{PhaseCounts, Tracker};
use gr_core::{Config, Domain};
use gr_db::WarehouseDb;

/// Validates and cleanses staged rows ahead of the warehouse load.
pub struct Transformer<'a> {
    db: &'a WarehouseDb,
    config: &'a Config,
}

impl<'a> Transformer<'a> {
    pub fn new(db: &'a WarehouseDb, config: &'a Config) -> Self {
        Self { db, config }
    }

    /// Validate staged sales rows, mark the valid ones processed, and drop
    /// duplicate (order_id, product_id) lines keeping the newest.
    ///
    /// Returns the number of rows marked valid.
    pub fn transform_sales(&self) -> EtlResult<i64> {
        self.run_tracked(Domain::Sales.transform_process(), || {
            self.validate_and_clean_sales()
        })
    }

    /// Normalize and validate staged customer rows.
    ///
    /// Returns the accumulated statement counts across the normalize, flag,
    /// and mark steps.
    pub fn transform_customers(&self) -> EtlResult<i64> {
        self.run_tracked(Domain::Customers.transform_process(), || {
            self.cleanse_customers()
        })
    }

    /// Normalize and validate staged product rows.
    pub fn transform_products(&self) -> EtlResult<i64> {
        self.run_tracked(Domain::Products.transform_process(), || {
            self.cleanse_products()
        })
    }

    /// Fill `dim_date` for the configured validation window, one row per
    /// calendar day. Days already present are left untouched.
    ///
    /// Returns the number of newly inserted rows.
    pub fn populate_date_dimension(&self) -> EtlResult<i64> {
        let rows = calendar_rows(
            self.config.validation.start_date,
            self.config.validation.end_date,
        );

        let inserted = self.db.transaction(|conn| {
            let mut stmt = conn.prepare(
                "INSERT OR IGNORE INTO dim_date (date_key, full_date, day, month, quarter, \
                 year, day_of_week, day_name, month_name, is_weekend, is_holiday) \
                 VALUES (?, CAST(? AS DATE), ?, ?, ?, ?, ?, ?, ?, ?, FALSE)",
            )?;
            let mut inserted = 0i64;
            for row in &rows {
                inserted += stmt.execute(duckdb::params![
                    row.date_key,
                    row.full_date.to_string(),
                    row.day,
                    row.month,
                    row.quarter,
                    row.year,
                    row.day_of_week,
                    row.day_name,
                    row.month_name,
                    row.is_weekend,
                ])? as i64;
            }
            Ok(inserted)
        })?;

        log::info!("Date dimension populated: {inserted} new rows");
        Ok(inserted)
    }

    /// Bracket a transform step with begin/complete/fail metadata rows.
    fn run_tracked<F>(&self, process: &str, body: F) -> EtlResult<i64>
    where
        F: FnOnce() -> EtlResult<i64>,
    {
        let tracker = Tracker::new(self.db);
        let process_id = tracker.begin_phase(process, None)?;

        match body() {
            Ok(count) => {
                tracker.complete_phase(process_id, PhaseCounts::Transformed(count))?;
                log::info!("{process} complete: {count} records");
                Ok(count)
            }
            Err(e) => {
                tracker.fail_phase_logged(process_id, &e.to_string());
                Err(e)
            }
        }
    }

    /// Flag, mark, and de-duplicate staged sales rows in one transaction.
    ///
    /// Rule precedence is fixed: quantity bounds, then unit price bounds,
    /// then the total-amount identity, then the order-date window. The
    /// first matching rule wins; rows matching none stay unflagged.
    fn validate_and_clean_sales(&self) -> EtlResult<i64> {
        let rules = &self.config.validation;

        let valid = self.db.transaction(|conn| {
            conn.execute(
                "UPDATE staging_sales SET error_message = CASE \
                   WHEN quantity < ? THEN 'Quantity below minimum' \
                   WHEN quantity > ? THEN 'Quantity above maximum' \
                   WHEN unit_price < ? THEN 'Unit price below minimum' \
                   WHEN unit_price > ? THEN 'Unit price above maximum' \
                   WHEN total_amount <> quantity * unit_price THEN 'Total amount mismatch' \
                   WHEN order_date < CAST(? AS DATE) OR order_date > CAST(? AS DATE) \
                     THEN 'Order date out of range' \
                   ELSE NULL END \
                 WHERE processed_flag = FALSE AND error_message IS NULL",
                duckdb::params![
                    rules.min_quantity,
                    rules.max_quantity,
                    rules.min_unit_price,
                    rules.max_unit_price,
                    rules.start_date.to_string(),
                    rules.end_date.to_string(),
                ],
            )?;

            let valid = conn.execute(
                "UPDATE staging_sales SET processed_flag = TRUE \
                 WHERE processed_flag = FALSE AND error_message IS NULL",
                [],
            )? as i64;

            // Same (order_id, product_id) staged more than once: the newest
            // staging row wins, earlier ones go.
            let removed = conn.execute(
                "DELETE FROM staging_sales \
                 WHERE processed_flag = TRUE AND error_message IS NULL \
                   AND EXISTS ( \
                     SELECT 1 FROM staging_sales later \
                     WHERE later.order_id = staging_sales.order_id \
                       AND later.product_id = staging_sales.product_id \
                       AND later.staging_id > staging_sales.staging_id \
                       AND later.processed_flag = TRUE \
                       AND later.error_message IS NULL)",
                [],
            )? as i64;
            if removed > 0 {
                log::info!("Removed {removed} duplicate sales rows");
            }

            Ok(valid)
        })?;

        Ok(valid)
    }

    /// Three-step customer cleanse. Each statement commits on its own, so a
    /// later step failing leaves the earlier normalization in place.
    fn cleanse_customers(&self) -> EtlResult<i64> {
        let conn = self.db.conn();

        let normalized = conn
            .execute(
                "UPDATE staging_customers SET \
                   customer_name = TRIM(customer_name), \
                   email = LOWER(TRIM(email)), \
                   phone = TRIM(phone), \
                   address = TRIM(address), \
                   city = TRIM(city), \
                   country = TRIM(country) \
                 WHERE processed_flag = FALSE",
                [],
            )
            .sql_context("normalize staging_customers")? as i64;

        // NULL email yields NULL here, which does not match; absent emails
        // pass through unflagged.
        let flagged = conn
            .execute(
                "UPDATE staging_customers SET error_message = 'Invalid email format' \
                 WHERE processed_flag = FALSE AND error_message IS NULL \
                   AND email NOT LIKE '%@%.%'",
                [],
            )
            .sql_context("flag staging_customers")? as i64;

        let marked = conn
            .execute(
                "UPDATE staging_customers SET processed_flag = TRUE \
                 WHERE processed_flag = FALSE AND error_message IS NULL",
                [],
            )
            .sql_context("mark staging_customers processed")? as i64;

        Ok(normalized + flagged + marked)
    }

    /// Three-step product cleanse, same shape as the customer one.
    fn cleanse_products(&self) -> EtlResult<i64> {
        let conn = self.db.conn();

        let normalized = conn
            .execute(
                "UPDATE staging_products SET \
                   product_name = TRIM(product_name), \
                   category = UPPER(category), \
                   subcategory = UPPER(SUBSTR(subcategory, 1, 1)) || \
                     LOWER(SUBSTR(subcategory, 2)), \
                   supplier = TRIM(supplier) \
                 WHERE processed_flag = FALSE",
                [],
            )
            .sql_context("normalize staging_products")? as i64;

        let flagged = conn
            .execute(
                "UPDATE staging_products SET error_message = CASE \
                   WHEN cost_price <= 0 THEN 'Invalid cost price' \
                   WHEN msrp <= 0 THEN 'Invalid MSRP' \
                   ELSE 'MSRP lower than cost' END \
                 WHERE processed_flag = FALSE AND error_message IS NULL \
                   AND (cost_price <= 0 OR msrp <= 0 OR msrp < cost_price)",
                [],
            )
            .sql_context("flag staging_products")? as i64;

        let marked = conn
            .execute(
                "UPDATE staging_products SET processed_flag = TRUE \
                 WHERE processed_flag = FALSE AND error_message IS NULL",
                [],
            )
            .sql_context("mark staging_products processed")? as i64;

        Ok(normalized + flagged + marked)
    }
}

#[cfg(test)]
#[path = "transform_test.rs"]
mod tests;
