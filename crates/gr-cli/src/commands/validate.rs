//! Validate command implementation - prints warehouse summary statistics

use anyhow::{Context, Result};
use gr_etl::{Pipeline, ValidationReport};

use crate::cli::{GlobalArgs, ValidateArgs, ValidateOutput};
use crate::commands::common;

/// Execute the validate command
pub(crate) fn execute(args: &ValidateArgs, global: &GlobalArgs) -> Result<()> {
    let (root, config) = common::load_config(global)?;
    let db = common::open_warehouse(&config, global)?;
    let pipeline = Pipeline::new(&db, &config, &root);

    let report = pipeline.validate()?;

    match args.output {
        ValidateOutput::Table => print_table(&report),
        ValidateOutput::Json => print_json(&report)?,
    }

    Ok(())
}

/// Print the report as an aligned metric table
fn print_table(report: &ValidationReport) {
    let rows = report.rows();

    // Calculate column widths
    let metric_width = rows
        .iter()
        .map(|(label, _)| label.len())
        .max()
        .unwrap_or(6)
        .max(6);
    let value_width = rows
        .iter()
        .map(|(_, value)| value.len())
        .max()
        .unwrap_or(5)
        .max(5);

    // Print header
    println!(
        "{:<metric_width$}  VALUE",
        "METRIC",
        metric_width = metric_width
    );

    // Print separator
    println!(
        "{:-<metric_width$}  {:-<value_width$}",
        "",
        "",
        metric_width = metric_width,
        value_width = value_width
    );

    for (label, value) in &rows {
        println!("{label:<metric_width$}  {value}");
    }
}

/// Print the report in JSON format
fn print_json(report: &ValidationReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize to JSON")?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
