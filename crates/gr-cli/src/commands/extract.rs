//! Extract command implementation

use anyhow::Result;
use gr_core::Domain;
use gr_etl::Pipeline;

use crate::cli::{ExtractArgs, GlobalArgs};
use crate::commands::common;

/// Execute the extract command
pub(crate) fn execute(args: &ExtractArgs, global: &GlobalArgs) -> Result<()> {
    let (root, config) = common::load_config(global)?;
    let db = common::open_warehouse(&config, global)?;
    let pipeline = Pipeline::new(&db, &config, &root);

    let summary = match args.domain {
        Some(arg) => {
            let domain = Domain::from(arg);
            println!("Extracting {domain} feed...\n");
            pipeline.run_extract_domain(domain)
        }
        None => {
            println!("Extracting all source feeds...\n");
            pipeline.run_extract()
        }
    };

    common::print_phases(&summary);
    common::print_completion(&summary);
    common::exit_on_failure(&summary)
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
