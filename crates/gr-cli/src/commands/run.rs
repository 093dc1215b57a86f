//! Run command implementation - executes the full pipeline

use anyhow::Result;
use gr_etl::Pipeline;

use crate::cli::{GlobalArgs, RunArgs};
use crate::commands::common;

/// Execute the run command
pub(crate) fn execute(args: &RunArgs, global: &GlobalArgs) -> Result<()> {
    let (root, config) = common::load_config(global)?;
    let db = common::open_warehouse(&config, global)?;
    let pipeline = Pipeline::new(&db, &config, &root);

    println!("Running pipeline for project '{}'...\n", config.name);

    let summary = if args.incremental {
        pipeline.run_incremental()
    } else {
        pipeline.run_full()
    };

    common::print_phases(&summary);

    if let Err(e) = common::write_run_results(&config.target_path_absolute(&root), &summary) {
        eprintln!("Warning: Failed to save run results: {}", e);
    }

    common::print_completion(&summary);
    common::exit_on_failure(&summary)
}

#[cfg(test)]
#[path = "run_test.rs"]
mod tests;
