//! Configuration types and parsing for granary.yml

use crate::error::{CoreError, CoreResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main project configuration from granary.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Warehouse database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Batch sizing for extraction and fact loading
    #[serde(default)]
    pub etl: EtlSettings,

    /// Business-rule bounds applied during the transform phase
    #[serde(default)]
    pub validation: ValidationRules,

    /// Source CSV locations
    #[serde(default)]
    pub data: DataFiles,

    /// Output directory for run results
    #[serde(default = "default_target_path")]
    pub target_path: String,

    /// Log file path; logs go to stderr when unset
    #[serde(default)]
    pub log_file: Option<String>,
}

/// Warehouse database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database path (file-based or :memory:)
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Row-batch sizing for the extract and load phases
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtlSettings {
    /// Rows per staging insert transaction for the sales file
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Rows per page when scanning staging during the fact load
    #[serde(default = "default_load_batch_size")]
    pub load_batch_size: usize,
}

impl Default for EtlSettings {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            load_batch_size: default_load_batch_size(),
        }
    }
}

/// Validation bounds for staged sales rows and the calendar span
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationRules {
    /// Minimum accepted order quantity
    #[serde(default = "default_min_quantity")]
    pub min_quantity: i64,

    /// Maximum accepted order quantity
    #[serde(default = "default_max_quantity")]
    pub max_quantity: i64,

    /// Minimum accepted unit price
    #[serde(default = "default_min_unit_price")]
    pub min_unit_price: f64,

    /// Maximum accepted unit price
    #[serde(default = "default_max_unit_price")]
    pub max_unit_price: f64,

    /// First accepted order date; also the first calendar dimension day
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,

    /// Last accepted order date; also the last calendar dimension day
    #[serde(default = "default_end_date")]
    pub end_date: NaiveDate,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            min_quantity: default_min_quantity(),
            max_quantity: default_max_quantity(),
            min_unit_price: default_min_unit_price(),
            max_unit_price: default_max_unit_price(),
            start_date: default_start_date(),
            end_date: default_end_date(),
        }
    }
}

/// Source CSV directory and file names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataFiles {
    /// Directory containing the source CSV files
    #[serde(default = "default_data_dir")]
    pub dir: String,

    /// Sales transactions file
    #[serde(default = "default_sales_file")]
    pub sales_file: String,

    /// Customer master file
    #[serde(default = "default_customers_file")]
    pub customers_file: String,

    /// Product master file
    #[serde(default = "default_products_file")]
    pub products_file: String,
}

impl Default for DataFiles {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            sales_file: default_sales_file(),
            customers_file: default_customers_file(),
            products_file: default_products_file(),
        }
    }
}

fn default_db_path() -> String {
    "warehouse.duckdb".to_string()
}

fn default_chunk_size() -> usize {
    50_000
}

fn default_load_batch_size() -> usize {
    5_000
}

fn default_min_quantity() -> i64 {
    1
}

fn default_max_quantity() -> i64 {
    1_000
}

fn default_min_unit_price() -> f64 {
    0.01
}

fn default_max_unit_price() -> f64 {
    10_000.0
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
}

fn default_end_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_sales_file() -> String {
    "sales.csv".to_string()
}

fn default_customers_file() -> String {
    "customers.csv".to_string()
}

fn default_products_file() -> String {
    "products.csv".to_string()
}

fn default_target_path() -> String {
    "target".to_string()
}

impl Config {
    /// Load configuration from a specific file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        log::debug!("Loaded config '{}' from {}", config.name, path.display());
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for granary.yml or granary.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("granary.yml");
        let yaml_path = dir.join("granary.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: dir.join("granary.yml").display().to_string(),
            })
        }
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.name.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }

        if self.etl.chunk_size == 0 || self.etl.load_batch_size == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "etl.chunk_size and etl.load_batch_size must be at least 1".to_string(),
            });
        }

        if self.validation.min_quantity > self.validation.max_quantity {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "validation.min_quantity ({}) exceeds max_quantity ({})",
                    self.validation.min_quantity, self.validation.max_quantity
                ),
            });
        }

        if self.validation.min_unit_price > self.validation.max_unit_price {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "validation.min_unit_price ({}) exceeds max_unit_price ({})",
                    self.validation.min_unit_price, self.validation.max_unit_price
                ),
            });
        }

        if self.validation.start_date > self.validation.end_date {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "validation.start_date ({}) is after end_date ({})",
                    self.validation.start_date, self.validation.end_date
                ),
            });
        }

        Ok(())
    }

    /// Get the absolute data directory relative to a project root
    pub fn data_dir_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.data.dir)
    }

    /// Get the absolute path of a source CSV file relative to a project root
    pub fn data_file_absolute(&self, root: &Path, file_name: &str) -> PathBuf {
        self.data_dir_absolute(root).join(file_name)
    }

    /// Get absolute target path relative to a project root
    pub fn target_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.target_path)
    }

    /// Get the absolute log file path relative to a project root, if configured
    pub fn log_file_absolute(&self, root: &Path) -> Option<PathBuf> {
        self.log_file.as_ref().map(|f| root.join(f))
    }

    /// Resolve the database path from CLI flag, GRANARY_DB environment
    /// variable, or the config value
    ///
    /// Priority: CLI flag > GRANARY_DB env var > config
    pub fn resolve_database_path(&self, cli_path: Option<&str>) -> String {
        cli_path
            .map(String::from)
            .or_else(|| std::env::var("GRANARY_DB").ok())
            .unwrap_or_else(|| self.database.path.clone())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
