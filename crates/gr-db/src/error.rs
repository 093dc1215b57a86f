//! Error types for the warehouse database.

use thiserror::Error;

/// Warehouse database errors.
#[derive(Error, Debug)]
pub enum DbError {
    /// Failed to open or create the warehouse database (D001).
    #[error("[D001] Warehouse connection failed: {0}")]
    ConnectionError(String),

    /// Schema migration failed (D002).
    #[error("[D002] Warehouse migration failed: {0}")]
    MigrationError(String),

    /// SQL execution error (D003).
    #[error("[D003] Warehouse query failed: {0}")]
    QueryError(String),

    /// Transaction management error (D004).
    #[error("[D004] Warehouse transaction failed: {0}")]
    TransactionError(String),

    /// DuckDB driver error with preserved source chain (D005).
    #[error("[D005] DuckDB error")]
    DuckDb(#[source] duckdb::Error),
}

/// Result type alias for [`DbError`].
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        DbError::DuckDb(err)
    }
}
