//! Transform command implementation

use anyhow::Result;
use gr_etl::Pipeline;

use crate::cli::GlobalArgs;
use crate::commands::common;

/// Execute the transform command
pub(crate) fn execute(global: &GlobalArgs) -> Result<()> {
    let (root, config) = common::load_config(global)?;
    let db = common::open_warehouse(&config, global)?;
    let pipeline = Pipeline::new(&db, &config, &root);

    println!("Transforming staged rows...\n");

    let summary = pipeline.run_transform();

    common::print_phases(&summary);
    common::print_completion(&summary);
    common::exit_on_failure(&summary)
}
