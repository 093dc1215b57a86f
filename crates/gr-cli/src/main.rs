//! Granary CLI - a star-schema ETL runner for CSV sales feeds

use clap::Parser;
use std::path::{Path, PathBuf};

mod cli;
mod commands;

use cli::{Cli, GlobalArgs};
use commands::common::ExitCode;
use commands::{extract, init, load, run, transform, validate};
use gr_core::Config;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.global);
    log::debug!("granary {} starting", env!("CARGO_PKG_VERSION"));

    let result = match &cli.command {
        cli::Commands::Init(args) => init::execute(args, &cli.global),
        cli::Commands::Extract(args) => extract::execute(args, &cli.global),
        cli::Commands::Transform => transform::execute(&cli.global),
        cli::Commands::Load => load::execute(&cli.global),
        cli::Commands::Run(args) => run::execute(args, &cli.global),
        cli::Commands::Validate(args) => validate::execute(args, &cli.global),
    };

    if let Err(err) = result {
        match err.downcast_ref::<ExitCode>() {
            Some(code) => std::process::exit(code.0),
            None => {
                eprintln!("Error: {err:#}");
                std::process::exit(1);
            }
        }
    }
}

/// Set up the env_logger backend before the command runs.
///
/// `--verbose` raises the default filter to debug; an explicit `RUST_LOG`
/// still wins. When the project config names a `log_file` the backend
/// writes there instead of stderr.
fn init_logging(global: &GlobalArgs) {
    let level = if global.verbose { "debug" } else { "info" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));

    if let Some(path) = configured_log_file(global) {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => eprintln!("Warning: cannot open log file '{}': {e}", path.display()),
        }
    }

    builder.init();
}

/// Best-effort peek at the configured log file. Config errors are swallowed
/// here so `granary init` works without a config present; the command itself
/// loads the config again and reports problems.
fn configured_log_file(global: &GlobalArgs) -> Option<PathBuf> {
    let root = Path::new(&global.project_dir);
    let config = match &global.config {
        Some(path) => Config::load(Path::new(path)),
        None => Config::load_from_dir(root),
    }
    .ok()?;
    config.log_file_absolute(root)
}
