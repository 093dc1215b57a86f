//! Error types for the ETL pipeline.

use gr_db::DbError;
use thiserror::Error;

/// ETL pipeline errors.
#[derive(Error, Debug)]
pub enum EtlError {
    /// CSV read or parse failure (P001).
    #[error("[P001] Failed to read CSV '{path}': {source}")]
    Csv { path: String, source: csv::Error },

    /// IO failure with path context (P002).
    #[error("[P002] Failed to open '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// SQL execution failure with statement context (P003).
    #[error("[P003] {context}: {message}")]
    Sql { context: String, message: String },

    /// Unexpected value in a warehouse row (P004).
    #[error("[P004] Invalid data in {context}: {message}")]
    Data { context: String, message: String },

    /// Warehouse database error (P005).
    #[error("[P005] Warehouse error")]
    Db(#[source] DbError),
}

/// Result type alias for [`EtlError`].
pub type EtlResult<T> = Result<T, EtlError>;

impl From<DbError> for EtlError {
    fn from(err: DbError) -> Self {
        EtlError::Db(err)
    }
}

/// Attach statement context to raw DuckDB results.
pub(crate) trait SqlResultExt<T> {
    fn sql_context(self, context: &str) -> EtlResult<T>;
}

impl<T> SqlResultExt<T> for Result<T, duckdb::Error> {
    fn sql_context(self, context: &str) -> EtlResult<T> {
        self.map_err(|e| EtlError::Sql {
            context: context.to_string(),
            message: e.to_string(),
        })
    }
}
