//! gr-db - Warehouse database layer for Granary
//!
//! Provides a DuckDB-backed store holding the staging area, the star schema,
//! and the ETL metadata table, with embedded schema migrations and scoped
//! transaction helpers.

pub mod connection;
pub mod ddl;
pub mod error;
pub mod migration;

pub use connection::WarehouseDb;
pub use error::{DbError, DbResult};
