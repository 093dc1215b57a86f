//! gr-etl - ETL pipeline engine for Granary
//!
//! Implements the three pipeline phases over the warehouse database: CSV
//! extraction into staging tables, in-place validation and cleansing, and
//! the star-schema load (SCD Type 2 dimensions, sales facts, daily
//! aggregates), plus the metadata tracking that makes extraction
//! idempotent.

pub mod dates;
pub mod error;
pub mod extract;
pub mod load;
pub mod meta;
pub mod pipeline;
pub mod transform;
pub mod validate;

pub use error::{EtlError, EtlResult};
pub use extract::{ExtractOutcome, Extractor};
pub use load::{DimensionLoadStats, FactLoadStats, Loader};
pub use meta::Tracker;
pub use pipeline::{PhaseResult, Pipeline, RunStatus, RunSummary};
pub use transform::Transformer;
pub use validate::{validate_results, ValidationReport};
