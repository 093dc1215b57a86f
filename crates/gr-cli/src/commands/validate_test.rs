use super::*;
use std::path::Path;
use tempfile::tempdir;

// ── Helpers ──

fn scaffold_config(root: &Path) {
    std::fs::write(root.join("granary.yml"), "name: granary_test\n").unwrap();
}

fn global_for(root: &Path, db_path: &Path) -> GlobalArgs {
    GlobalArgs {
        verbose: false,
        project_dir: root.display().to_string(),
        config: None,
        database: Some(db_path.display().to_string()),
    }
}

// ── Tests ──

#[test]
fn test_validate_table_output_on_empty_warehouse() {
    let temp_dir = tempdir().unwrap();
    scaffold_config(temp_dir.path());
    let db_path = temp_dir.path().join("wh.duckdb");

    let args = ValidateArgs {
        output: ValidateOutput::Table,
    };
    execute(&args, &global_for(temp_dir.path(), &db_path)).unwrap();
}

#[test]
fn test_validate_json_output_on_empty_warehouse() {
    let temp_dir = tempdir().unwrap();
    scaffold_config(temp_dir.path());
    let db_path = temp_dir.path().join("wh.duckdb");

    let args = ValidateArgs {
        output: ValidateOutput::Json,
    };
    execute(&args, &global_for(temp_dir.path(), &db_path)).unwrap();
}

#[test]
fn test_validate_without_config_reports_error() {
    let temp_dir = tempdir().unwrap();
    let db_path = temp_dir.path().join("wh.duckdb");

    let args = ValidateArgs {
        output: ValidateOutput::Table,
    };
    let err = execute(&args, &global_for(temp_dir.path(), &db_path)).unwrap_err();
    assert!(err.to_string().contains("Failed to load project config"));
}
