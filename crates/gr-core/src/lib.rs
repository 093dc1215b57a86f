//! gr-core - Core library for Granary
//!
//! This crate provides the project configuration (`granary.yml`), shared
//! error codes, the source-domain vocabulary, and the pure functions that
//! compute derived dimension attributes.

pub mod config;
pub mod derive;
pub mod domain;
pub mod error;

pub use config::Config;
pub use domain::Domain;
pub use error::{CoreError, CoreResult};
