//! Star-schema loads: SCD Type 2 dimensions, the sales fact table, and the
//! daily rollups.
//!
//! Dimension history is versioned, never overwritten. A changed natural key
//! closes its current row and opens a new one in the same transaction, so
//! `is_current = TRUE` always points at exactly one row per key and every
//! prior version survives with its validity window intact.

use crate::dates::date_key;
use crate::error::{EtlError, EtlResult, SqlResultExt};
use crate::meta::{PhaseCounts, Tracker};
use chrono::NaiveDate;
use gr_core::derive::{customer_segment, profit_margin_pct, round2};
use gr_core::Config;
use gr_db::WarehouseDb;
use std::collections::HashMap;

/// Outcome of one dimension load.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DimensionLoadStats {
    /// Natural keys seen for the first time.
    pub new_records: i64,
    /// Keys whose tracked attributes changed, closing the old version.
    pub updated_records: i64,
    /// Keys whose current version already matched.
    pub unchanged_records: i64,
}

impl DimensionLoadStats {
    /// Version rows written this run (new plus re-versioned).
    pub fn versions_written(&self) -> i64 {
        self.new_records + self.updated_records
    }
}

/// Outcome of one fact load.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FactLoadStats {
    /// Fact rows actually inserted.
    pub inserted: i64,
    /// Rows ignored because their (order_id, product_id) already exists.
    pub skipped_duplicates: i64,
    /// Rows dropped because a dimension had no current version for them.
    pub dropped_orphans: i64,
}

/// One incoming customer version built from valid staging rows.
struct CustomerVersion {
    customer_id: String,
    customer_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    city: Option<String>,
    country: Option<String>,
    registration_date: Option<String>,
}

/// The current dimension row for a customer natural key.
struct CurrentCustomer {
    customer_key: i64,
    customer_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    city: Option<String>,
    country: Option<String>,
}

impl CustomerVersion {
    /// Tracked-attribute comparison; any single difference means a new
    /// version. registration_date is carried but not tracked.
    fn differs_from(&self, current: &CurrentCustomer) -> bool {
        self.customer_name != current.customer_name
            || self.email != current.email
            || self.phone != current.phone
            || self.address != current.address
            || self.city != current.city
            || self.country != current.country
    }
}

struct ProductVersion {
    product_id: String,
    product_name: Option<String>,
    category: Option<String>,
    subcategory: Option<String>,
    supplier: Option<String>,
    cost_price: Option<f64>,
    msrp: Option<f64>,
}

struct CurrentProduct {
    product_key: i64,
    product_name: Option<String>,
    category: Option<String>,
    subcategory: Option<String>,
    supplier: Option<String>,
    cost_price: Option<f64>,
    msrp: Option<f64>,
}

impl ProductVersion {
    fn differs_from(&self, current: &CurrentProduct) -> bool {
        self.product_name != current.product_name
            || self.category != current.category
            || self.subcategory != current.subcategory
            || self.supplier != current.supplier
            || self.cost_price != current.cost_price
            || self.msrp != current.msrp
    }
}

/// One staged sales row joined with its product cost, ready for the fact
/// table.
struct FactSource {
    order_id: String,
    order_date: String,
    customer_id: String,
    product_id: String,
    quantity: i64,
    unit_price: f64,
    total_amount: f64,
    cost_price: Option<f64>,
}

/// A fully resolved fact row with surrogate keys and derived measures.
struct FactRow {
    date_key: i32,
    customer_key: i64,
    product_key: i64,
    order_id: String,
    product_id: String,
    quantity: i64,
    unit_price: f64,
    total_amount: f64,
    cost_amount: Option<f64>,
    profit_amount: Option<f64>,
    profit_margin: Option<f64>,
    order_date: String,
}

/// Loads valid staging rows into the star schema.
pub struct Loader<'a> {
    db: &'a WarehouseDb,
    config: &'a Config,
}

impl<'a> Loader<'a> {
    pub fn new(db: &'a WarehouseDb, config: &'a Config) -> Self {
        Self { db, config }
    }

    /// SCD Type 2 load of the customer dimension from valid staging rows.
    ///
    /// A natural key staged more than once collapses to its newest staging
    /// row, so each load writes at most one version per key.
    pub fn load_dim_customers(&self) -> EtlResult<DimensionLoadStats> {
        self.run_tracked(
            "LOAD_DIM_CUSTOMERS",
            || self.upsert_customers(),
            |stats| stats.versions_written(),
        )
    }

    /// SCD Type 2 load of the product dimension.
    pub fn load_dim_products(&self) -> EtlResult<DimensionLoadStats> {
        self.run_tracked(
            "LOAD_DIM_PRODUCTS",
            || self.upsert_products(),
            |stats| stats.versions_written(),
        )
    }

    /// Load valid staged sales into `fact_sales`, batch by batch.
    ///
    /// Surrogate keys come from pre-loaded maps of the current dimension
    /// versions. Rows whose customer or product has no current version are
    /// dropped and counted; duplicates of an already-loaded
    /// (order_id, product_id) insert nothing.
    pub fn load_fact_sales(&self) -> EtlResult<FactLoadStats> {
        self.run_tracked(
            "LOAD_FACT_SALES",
            || self.insert_facts(),
            |stats| stats.inserted,
        )
    }

    /// Rebuild `agg_sales_daily` from scratch: clear it, then insert the
    /// date, date-customer, and date-product rollups in one statement.
    pub fn create_aggregates(&self) -> EtlResult<i64> {
        let inserted = self.db.transaction(|conn| {
            conn.execute("DELETE FROM agg_sales_daily", [])?;
            let inserted = conn.execute(
                "INSERT INTO agg_sales_daily (date_key, customer_key, product_key, \
                 total_quantity, total_amount, avg_unit_price, order_count, unique_customers) \
                 SELECT date_key, NULL, NULL, SUM(quantity), SUM(total_amount), \
                        AVG(unit_price), COUNT(DISTINCT order_id), COUNT(DISTINCT customer_key) \
                 FROM fact_sales GROUP BY date_key \
                 UNION ALL \
                 SELECT date_key, customer_key, NULL, SUM(quantity), SUM(total_amount), \
                        AVG(unit_price), COUNT(DISTINCT order_id), 1 \
                 FROM fact_sales GROUP BY date_key, customer_key \
                 UNION ALL \
                 SELECT date_key, NULL, product_key, SUM(quantity), SUM(total_amount), \
                        AVG(unit_price), COUNT(DISTINCT order_id), COUNT(DISTINCT customer_key) \
                 FROM fact_sales GROUP BY date_key, product_key",
                [],
            )? as i64;
            Ok(inserted)
        })?;

        log::info!("Aggregates rebuilt: {inserted} rollup rows");
        Ok(inserted)
    }

    /// Bracket a load step with begin/complete/fail metadata rows.
    fn run_tracked<T, F, G>(&self, process: &str, body: F, loaded: G) -> EtlResult<T>
    where
        F: FnOnce() -> EtlResult<T>,
        G: FnOnce(&T) -> i64,
    {
        let tracker = Tracker::new(self.db);
        let process_id = tracker.begin_phase(process, None)?;

        match body() {
            Ok(value) => {
                tracker.complete_phase(process_id, PhaseCounts::Loaded(loaded(&value)))?;
                Ok(value)
            }
            Err(e) => {
                tracker.fail_phase_logged(process_id, &e.to_string());
                Err(e)
            }
        }
    }

    fn upsert_customers(&self) -> EtlResult<DimensionLoadStats> {
        let incoming = self.staged_customers()?;
        let current = self.current_customers()?;

        let mut stats = DimensionLoadStats::default();
        self.db.transaction(|conn| {
            let mut close_stmt = conn.prepare(
                "UPDATE dim_customer \
                 SET valid_to = CAST(current_date - INTERVAL 1 DAY AS DATE), is_current = FALSE \
                 WHERE customer_key = ?",
            )?;
            let mut insert_stmt = conn.prepare(
                "INSERT INTO dim_customer (customer_id, customer_name, email, phone, address, \
                 city, country, customer_segment, registration_date, valid_from, valid_to, \
                 is_current) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, CAST(? AS DATE), current_date, NULL, TRUE)",
            )?;

            for record in &incoming {
                let segment = customer_segment(
                    record.country.as_deref().unwrap_or(""),
                    record.city.as_deref().unwrap_or(""),
                );
                match current.get(&record.customer_id) {
                    Some(existing) if !record.differs_from(existing) => {
                        stats.unchanged_records += 1;
                    }
                    Some(existing) => {
                        close_stmt.execute(duckdb::params![existing.customer_key])?;
                        insert_customer(&mut insert_stmt, record, segment)?;
                        stats.updated_records += 1;
                    }
                    None => {
                        insert_customer(&mut insert_stmt, record, segment)?;
                        stats.new_records += 1;
                    }
                }
            }
            Ok(())
        })?;

        log::info!(
            "Customer dimension: {} new, {} re-versioned, {} unchanged",
            stats.new_records,
            stats.updated_records,
            stats.unchanged_records
        );
        Ok(stats)
    }

    fn upsert_products(&self) -> EtlResult<DimensionLoadStats> {
        let incoming = self.staged_products()?;
        let current = self.current_products()?;

        let mut stats = DimensionLoadStats::default();
        self.db.transaction(|conn| {
            let mut close_stmt = conn.prepare(
                "UPDATE dim_product \
                 SET valid_to = CAST(current_date - INTERVAL 1 DAY AS DATE), is_current = FALSE \
                 WHERE product_key = ?",
            )?;
            let mut insert_stmt = conn.prepare(
                "INSERT INTO dim_product (product_id, product_name, category, subcategory, \
                 supplier, cost_price, msrp, profit_margin, valid_from, valid_to, is_current) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, current_date, NULL, TRUE)",
            )?;

            for record in &incoming {
                let margin = match (record.cost_price, record.msrp) {
                    (Some(cost), Some(msrp)) => Some(profit_margin_pct(cost, msrp)),
                    _ => None,
                };
                match current.get(&record.product_id) {
                    Some(existing) if !record.differs_from(existing) => {
                        stats.unchanged_records += 1;
                    }
                    Some(existing) => {
                        close_stmt.execute(duckdb::params![existing.product_key])?;
                        insert_product(&mut insert_stmt, record, margin)?;
                        stats.updated_records += 1;
                    }
                    None => {
                        insert_product(&mut insert_stmt, record, margin)?;
                        stats.new_records += 1;
                    }
                }
            }
            Ok(())
        })?;

        log::info!(
            "Product dimension: {} new, {} re-versioned, {} unchanged",
            stats.new_records,
            stats.updated_records,
            stats.unchanged_records
        );
        Ok(stats)
    }

    fn insert_facts(&self) -> EtlResult<FactLoadStats> {
        let customer_keys = self.current_key_map(
            "SELECT customer_id, customer_key FROM dim_customer WHERE is_current = TRUE",
            "load current customer keys",
        )?;
        let product_keys = self.current_key_map(
            "SELECT product_id, product_key FROM dim_product WHERE is_current = TRUE",
            "load current product keys",
        )?;

        let batch_size = self.config.etl.load_batch_size;
        let mut stats = FactLoadStats::default();
        let mut offset = 0usize;
        loop {
            let batch = self.staged_sales_batch(batch_size, offset)?;
            if batch.is_empty() {
                break;
            }
            offset += batch.len();
            self.insert_fact_batch(&batch, &customer_keys, &product_keys, &mut stats)?;
        }

        log::info!(
            "Fact load: {} inserted, {} duplicates ignored",
            stats.inserted,
            stats.skipped_duplicates
        );
        if stats.dropped_orphans > 0 {
            log::warn!(
                "Dropped {} sales rows with no current dimension version",
                stats.dropped_orphans
            );
        }
        Ok(stats)
    }

    /// One page of valid staged sales joined to their product cost.
    ///
    /// Ordered by order date with staging_id as tiebreak so pagination is
    /// deterministic; the scan targets are not modified during the load, so
    /// offsets stay stable across batches.
    fn staged_sales_batch(&self, limit: usize, offset: usize) -> EtlResult<Vec<FactSource>> {
        let mut stmt = self
            .db
            .conn()
            .prepare(
                "SELECT s.order_id, CAST(s.order_date AS VARCHAR), s.customer_id, \
                 s.product_id, s.quantity, CAST(s.unit_price AS DOUBLE), \
                 CAST(s.total_amount AS DOUBLE), CAST(p.cost_price AS DOUBLE) \
                 FROM staging_sales s \
                 JOIN staging_products p ON s.product_id = p.product_id \
                 WHERE s.processed_flag = TRUE AND s.error_message IS NULL \
                   AND p.processed_flag = TRUE AND p.error_message IS NULL \
                 ORDER BY s.order_date, s.staging_id \
                 LIMIT ? OFFSET ?",
            )
            .sql_context("prepare fact batch scan")?;

        let rows = stmt
            .query_map(duckdb::params![limit as i64, offset as i64], |row| {
                Ok(FactSource {
                    order_id: row.get(0)?,
                    order_date: row.get(1)?,
                    customer_id: row.get(2)?,
                    product_id: row.get(3)?,
                    quantity: row.get(4)?,
                    unit_price: row.get(5)?,
                    total_amount: row.get(6)?,
                    cost_price: row.get(7)?,
                })
            })
            .sql_context("scan fact batch")?;

        let mut batch = Vec::new();
        for row in rows {
            batch.push(row.sql_context("read fact batch row")?);
        }
        Ok(batch)
    }

    /// Resolve and insert one batch in its own transaction.
    fn insert_fact_batch(
        &self,
        batch: &[FactSource],
        customer_keys: &HashMap<String, i64>,
        product_keys: &HashMap<String, i64>,
        stats: &mut FactLoadStats,
    ) -> EtlResult<()> {
        let mut prepared: Vec<FactRow> = Vec::with_capacity(batch.len());
        for source in batch {
            let (Some(&customer_key), Some(&product_key)) = (
                customer_keys.get(&source.customer_id),
                product_keys.get(&source.product_id),
            ) else {
                stats.dropped_orphans += 1;
                continue;
            };

            let order_date = NaiveDate::parse_from_str(&source.order_date, "%Y-%m-%d")
                .map_err(|e| EtlError::Data {
                    context: "staging_sales.order_date".to_string(),
                    message: format!("'{}': {e}", source.order_date),
                })?;

            let cost_amount = source.cost_price.map(|c| round2(c * source.quantity as f64));
            let profit_amount = cost_amount.map(|c| round2(source.total_amount - c));
            let profit_margin = profit_amount.map(|p| {
                if source.total_amount > 0.0 {
                    round2(p / source.total_amount * 100.0)
                } else {
                    0.0
                }
            });

            prepared.push(FactRow {
                date_key: date_key(order_date),
                customer_key,
                product_key,
                order_id: source.order_id.clone(),
                product_id: source.product_id.clone(),
                quantity: source.quantity,
                unit_price: source.unit_price,
                total_amount: source.total_amount,
                cost_amount,
                profit_amount,
                profit_margin,
                order_date: source.order_date.clone(),
            });
        }

        let inserted = self.db.transaction(|conn| {
            let mut stmt = conn.prepare(
                "INSERT OR IGNORE INTO fact_sales (date_key, customer_key, product_key, \
                 order_id, product_id, quantity, unit_price, total_amount, cost_amount, \
                 profit_amount, profit_margin, order_timestamp) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, CAST(? AS TIMESTAMP))",
            )?;
            let mut inserted = 0i64;
            for fact in &prepared {
                inserted += stmt.execute(duckdb::params![
                    fact.date_key,
                    fact.customer_key,
                    fact.product_key,
                    fact.order_id,
                    fact.product_id,
                    fact.quantity,
                    fact.unit_price,
                    fact.total_amount,
                    fact.cost_amount,
                    fact.profit_amount,
                    fact.profit_margin,
                    fact.order_date,
                ])? as i64;
            }
            Ok(inserted)
        })?;

        stats.inserted += inserted;
        stats.skipped_duplicates += prepared.len() as i64 - inserted;
        Ok(())
    }

    /// Valid staged customer rows collapsed to the newest per natural key.
    fn staged_customers(&self) -> EtlResult<Vec<CustomerVersion>> {
        let mut stmt = self
            .db
            .conn()
            .prepare(
                "SELECT customer_id, customer_name, email, phone, address, city, country, \
                 CAST(registration_date AS VARCHAR) \
                 FROM staging_customers \
                 WHERE processed_flag = TRUE AND error_message IS NULL \
                 ORDER BY staging_id",
            )
            .sql_context("prepare staged customer scan")?;

        let rows = stmt
            .query_map([], |row| {
                Ok(CustomerVersion {
                    customer_id: row.get(0)?,
                    customer_name: row.get(1)?,
                    email: row.get(2)?,
                    phone: row.get(3)?,
                    address: row.get(4)?,
                    city: row.get(5)?,
                    country: row.get(6)?,
                    registration_date: row.get(7)?,
                })
            })
            .sql_context("scan staged customers")?;

        let mut latest: HashMap<String, CustomerVersion> = HashMap::new();
        for row in rows {
            let record = row.sql_context("read staged customer")?;
            latest.insert(record.customer_id.clone(), record);
        }

        let mut incoming: Vec<CustomerVersion> = latest.into_values().collect();
        incoming.sort_by(|a, b| a.customer_id.cmp(&b.customer_id));
        Ok(incoming)
    }

    fn current_customers(&self) -> EtlResult<HashMap<String, CurrentCustomer>> {
        let mut stmt = self
            .db
            .conn()
            .prepare(
                "SELECT customer_key, customer_id, customer_name, email, phone, address, \
                 city, country \
                 FROM dim_customer WHERE is_current = TRUE",
            )
            .sql_context("prepare current customer scan")?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(1)?,
                    CurrentCustomer {
                        customer_key: row.get(0)?,
                        customer_name: row.get(2)?,
                        email: row.get(3)?,
                        phone: row.get(4)?,
                        address: row.get(5)?,
                        city: row.get(6)?,
                        country: row.get(7)?,
                    },
                ))
            })
            .sql_context("scan current customers")?;

        let mut current = HashMap::new();
        for row in rows {
            let (customer_id, record) = row.sql_context("read current customer")?;
            current.insert(customer_id, record);
        }
        Ok(current)
    }

    /// Valid staged product rows collapsed to the newest per natural key.
    fn staged_products(&self) -> EtlResult<Vec<ProductVersion>> {
        let mut stmt = self
            .db
            .conn()
            .prepare(
                "SELECT product_id, product_name, category, subcategory, supplier, \
                 CAST(cost_price AS DOUBLE), CAST(msrp AS DOUBLE) \
                 FROM staging_products \
                 WHERE processed_flag = TRUE AND error_message IS NULL \
                 ORDER BY staging_id",
            )
            .sql_context("prepare staged product scan")?;

        let rows = stmt
            .query_map([], |row| {
                Ok(ProductVersion {
                    product_id: row.get(0)?,
                    product_name: row.get(1)?,
                    category: row.get(2)?,
                    subcategory: row.get(3)?,
                    supplier: row.get(4)?,
                    cost_price: row.get(5)?,
                    msrp: row.get(6)?,
                })
            })
            .sql_context("scan staged products")?;

        let mut latest: HashMap<String, ProductVersion> = HashMap::new();
        for row in rows {
            let record = row.sql_context("read staged product")?;
            latest.insert(record.product_id.clone(), record);
        }

        let mut incoming: Vec<ProductVersion> = latest.into_values().collect();
        incoming.sort_by(|a, b| a.product_id.cmp(&b.product_id));
        Ok(incoming)
    }

    fn current_products(&self) -> EtlResult<HashMap<String, CurrentProduct>> {
        let mut stmt = self
            .db
            .conn()
            .prepare(
                "SELECT product_key, product_id, product_name, category, subcategory, \
                 supplier, CAST(cost_price AS DOUBLE), CAST(msrp AS DOUBLE) \
                 FROM dim_product WHERE is_current = TRUE",
            )
            .sql_context("prepare current product scan")?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(1)?,
                    CurrentProduct {
                        product_key: row.get(0)?,
                        product_name: row.get(2)?,
                        category: row.get(3)?,
                        subcategory: row.get(4)?,
                        supplier: row.get(5)?,
                        cost_price: row.get(6)?,
                        msrp: row.get(7)?,
                    },
                ))
            })
            .sql_context("scan current products")?;

        let mut current = HashMap::new();
        for row in rows {
            let (product_id, record) = row.sql_context("read current product")?;
            current.insert(product_id, record);
        }
        Ok(current)
    }

    fn current_key_map(&self, sql: &str, context: &str) -> EtlResult<HashMap<String, i64>> {
        let mut stmt = self.db.conn().prepare(sql).sql_context(context)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })
            .sql_context(context)?;

        let mut map = HashMap::new();
        for row in rows {
            let (natural_key, surrogate_key) = row.sql_context(context)?;
            map.insert(natural_key, surrogate_key);
        }
        Ok(map)
    }
}

fn insert_customer(
    stmt: &mut duckdb::Statement<'_>,
    record: &CustomerVersion,
    segment: &str,
) -> Result<usize, duckdb::Error> {
    stmt.execute(duckdb::params![
        record.customer_id,
        record.customer_name,
        record.email,
        record.phone,
        record.address,
        record.city,
        record.country,
        segment,
        record.registration_date,
    ])
}

fn insert_product(
    stmt: &mut duckdb::Statement<'_>,
    record: &ProductVersion,
    margin: Option<f64>,
) -> Result<usize, duckdb::Error> {
    stmt.execute(duckdb::params![
        record.product_id,
        record.product_name,
        record.category,
        record.subcategory,
        record.supplier,
        record.cost_price,
        record.msrp,
        margin,
    ])
}

#[cfg(test)]
#[path = "load_test.rs"]
mod tests;
