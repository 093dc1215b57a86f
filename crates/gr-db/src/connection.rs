//! Warehouse database connection wrapper.
//!
//! [`WarehouseDb`] owns a DuckDB [`Connection`] and provides helpers for
//! opening, migrating, and transacting against the warehouse. One handle is
//! opened per pipeline run and passed by reference to every phase.

use crate::error::{DbError, DbResult};
use crate::migration::run_migrations;
use duckdb::Connection;
use std::path::Path;

/// Wrapper around a DuckDB connection to the warehouse database.
///
/// Single-threaded by contract; the pipeline phases run sequentially on
/// one thread, so there is no `Mutex` here.
pub struct WarehouseDb {
    conn: Connection,
}

impl WarehouseDb {
    /// Open (or create) the warehouse database and run pending migrations.
    ///
    /// `":memory:"` opens a transient in-memory database.
    pub fn open(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            return Self::open_memory();
        }
        let conn = Connection::open(Path::new(path))
            .map_err(|e| DbError::ConnectionError(format!("{e}: {path}")))?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Create an in-memory warehouse with all migrations applied.
    ///
    /// Useful for unit tests that don't need persistence.
    pub fn open_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Borrow the underlying DuckDB connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Execute `body` within a `BEGIN` / `COMMIT` transaction, rolling back on
    /// error.
    pub fn transaction<F, T>(&self, body: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T>,
    {
        self.conn
            .execute_batch("BEGIN TRANSACTION")
            .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {e}")))?;

        let result = body(&self.conn);

        match &result {
            Ok(_) => {
                if let Err(commit_err) = self.conn.execute_batch("COMMIT") {
                    let _ = self.conn.execute_batch("ROLLBACK");
                    return Err(DbError::TransactionError(format!(
                        "COMMIT failed: {commit_err}"
                    )));
                }
            }
            Err(_) => {
                let _ = self.conn.execute_batch("ROLLBACK");
            }
        }
        result
    }

    /// Count rows returned by an arbitrary `SELECT COUNT(*)`-shaped query.
    pub fn query_count(&self, sql: &str) -> DbResult<i64> {
        let count: i64 = self
            .conn
            .query_row(sql, [], |row| row.get(0))
            .map_err(|e| DbError::QueryError(format!("{sql}: {e}")))?;
        Ok(count)
    }
}

#[cfg(test)]
#[path = "connection_test.rs"]
mod tests;
