//! Post-run warehouse sanity queries.

use crate::error::{EtlResult, SqlResultExt};
use gr_db::WarehouseDb;
use serde::Serialize;

/// Aggregate counts summarizing the warehouse after a run.
///
/// A human-readable summary, not a pass/fail gate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub total_customers: i64,
    pub total_products: i64,
    pub total_sales_records: i64,
    pub total_sales_amount: f64,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
    pub unique_orders: i64,
}

impl ValidationReport {
    /// Label/value pairs in display order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let date_range = match (&self.first_date, &self.last_date) {
            (Some(first), Some(last)) => format!("{first} to {last}"),
            _ => "empty".to_string(),
        };
        vec![
            ("Total Customers", self.total_customers.to_string()),
            ("Total Products", self.total_products.to_string()),
            ("Total Sales Records", self.total_sales_records.to_string()),
            (
                "Total Sales Amount",
                format!("{:.2}", self.total_sales_amount),
            ),
            ("Date Range", date_range),
            ("Unique Orders", self.unique_orders.to_string()),
        ]
    }
}

/// Run the fixed validation query set against the warehouse.
pub fn validate_results(db: &WarehouseDb) -> EtlResult<ValidationReport> {
    let total_customers =
        db.query_count("SELECT COUNT(*) FROM dim_customer WHERE is_current = TRUE")?;
    let total_products =
        db.query_count("SELECT COUNT(*) FROM dim_product WHERE is_current = TRUE")?;
    let total_sales_records = db.query_count("SELECT COUNT(*) FROM fact_sales")?;

    let total_sales_amount: f64 = db
        .conn()
        .query_row(
            "SELECT COALESCE(CAST(SUM(total_amount) AS DOUBLE), 0) FROM fact_sales",
            [],
            |row| row.get(0),
        )
        .sql_context("sum fact sales amount")?;

    let (first_date, last_date): (Option<String>, Option<String>) = db
        .conn()
        .query_row(
            "SELECT CAST(MIN(full_date) AS VARCHAR), CAST(MAX(full_date) AS VARCHAR) \
             FROM dim_date",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .sql_context("dim_date range")?;

    let unique_orders = db.query_count("SELECT COUNT(DISTINCT order_id) FROM fact_sales")?;

    Ok(ValidationReport {
        total_customers,
        total_products,
        total_sales_records,
        total_sales_amount,
        first_date,
        last_date,
        unique_orders,
    })
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
