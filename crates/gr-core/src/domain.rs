//! Source domains handled by the pipeline

use crate::config::DataFiles;
use serde::{Deserialize, Serialize};

/// A source data domain (one CSV feed and its staging table)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// Sales order lines
    Sales,
    /// Customer master records
    Customers,
    /// Product master records
    Products,
}

impl Domain {
    /// All domains in pipeline execution order (masters before transactions)
    pub const ALL: [Domain; 3] = [Domain::Customers, Domain::Products, Domain::Sales];

    /// Metadata process name for this domain's extraction phase
    pub fn extract_process(&self) -> &'static str {
        match self {
            Domain::Sales => "EXTRACT_SALES",
            Domain::Customers => "EXTRACT_CUSTOMERS",
            Domain::Products => "EXTRACT_PRODUCTS",
        }
    }

    /// Metadata process name for this domain's transform phase
    pub fn transform_process(&self) -> &'static str {
        match self {
            Domain::Sales => "TRANSFORM_SALES",
            Domain::Customers => "TRANSFORM_CUSTOMERS",
            Domain::Products => "TRANSFORM_PRODUCTS",
        }
    }

    /// Staging table fed by this domain
    pub fn staging_table(&self) -> &'static str {
        match self {
            Domain::Sales => "staging_sales",
            Domain::Customers => "staging_customers",
            Domain::Products => "staging_products",
        }
    }

    /// Configured CSV file name for this domain
    pub fn file_name<'a>(&self, files: &'a DataFiles) -> &'a str {
        match self {
            Domain::Sales => &files.sales_file,
            Domain::Customers => &files.customers_file,
            Domain::Products => &files.products_file,
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Domain::Sales => write!(f, "sales"),
            Domain::Customers => write!(f, "customers"),
            Domain::Products => write!(f, "products"),
        }
    }
}

#[cfg(test)]
#[path = "domain_test.rs"]
mod tests;
