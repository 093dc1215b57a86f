//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use gr_core::Domain;

/// Granary - a star-schema ETL runner for CSV sales feeds
#[derive(Parser, Debug)]
#[command(name = "granary")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override warehouse database path
    #[arg(short, long, global = true, env = "GRANARY_DB")]
    pub database: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scaffold a new Granary project
    Init(InitArgs),

    /// Extract source CSV files into staging tables
    Extract(ExtractArgs),

    /// Validate and cleanse staged rows and populate the calendar
    Transform,

    /// Load dimensions, facts, and daily rollups
    Load,

    /// Run the full pipeline end to end
    Run(RunArgs),

    /// Print warehouse summary statistics
    Validate(ValidateArgs),
}

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Name of the project directory to create
    pub name: String,

    /// Warehouse database path written into granary.yml
    #[arg(long, default_value = "warehouse.duckdb")]
    pub database_path: String,
}

/// Arguments for the extract command
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Extract a single source feed (default: all three)
    #[arg(long, value_enum)]
    pub domain: Option<DomainArg>,
}

/// Source feed selector for the extract command
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainArg {
    /// Customer master feed
    Customers,
    /// Product master feed
    Products,
    /// Sales order feed
    Sales,
}

impl From<DomainArg> for Domain {
    fn from(arg: DomainArg) -> Self {
        match arg {
            DomainArg::Customers => Domain::Customers,
            DomainArg::Products => Domain::Products,
            DomainArg::Sales => Domain::Sales,
        }
    }
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Process only source files not yet extracted
    #[arg(long)]
    pub incremental: bool,
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: ValidateOutput,
}

/// Validate output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidateOutput {
    /// Aligned metric table
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
