use super::*;
use gr_core::Config;
use tempfile::tempdir;

fn global_for(dir: &Path) -> GlobalArgs {
    GlobalArgs {
        verbose: false,
        project_dir: dir.display().to_string(),
        config: None,
        database: None,
    }
}

#[test]
fn test_init_scaffolds_project_layout() {
    let temp_dir = tempdir().unwrap();
    let args = InitArgs {
        name: "depot".to_string(),
        database_path: "warehouse.duckdb".to_string(),
    };

    execute(&args, &global_for(temp_dir.path())).unwrap();

    let project = temp_dir.path().join("depot");
    assert!(project.join("granary.yml").exists());
    assert!(project.join("data/sales.csv").exists());
    assert!(project.join("data/customers.csv").exists());
    assert!(project.join("data/products.csv").exists());
    assert!(project.join("logs").is_dir());
    assert!(project.join("target").is_dir());
    assert!(project.join(".gitignore").exists());
}

#[test]
fn test_init_config_is_loadable() {
    let temp_dir = tempdir().unwrap();
    let args = InitArgs {
        name: "depot".to_string(),
        database_path: "dw/warehouse.duckdb".to_string(),
    };

    execute(&args, &global_for(temp_dir.path())).unwrap();

    let config = Config::load_from_dir(&temp_dir.path().join("depot")).unwrap();
    assert_eq!(config.name, "depot");
    assert_eq!(config.database.path, "dw/warehouse.duckdb");
    assert_eq!(config.data.sales_file, "sales.csv");
}

#[test]
fn test_init_rejects_existing_directory() {
    let temp_dir = tempdir().unwrap();
    std::fs::create_dir(temp_dir.path().join("depot")).unwrap();
    let args = InitArgs {
        name: "depot".to_string(),
        database_path: "warehouse.duckdb".to_string(),
    };

    let err = execute(&args, &global_for(temp_dir.path())).unwrap_err();
    assert!(err.to_string().contains("already exists"));
}

#[test]
fn test_init_rejects_traversal_names() {
    let temp_dir = tempdir().unwrap();
    for name in ["../escape", "a/b", ".hidden", "-flag"] {
        let args = InitArgs {
            name: name.to_string(),
            database_path: "warehouse.duckdb".to_string(),
        };
        let err = execute(&args, &global_for(temp_dir.path())).unwrap_err();
        assert!(
            err.to_string().contains("Invalid project name"),
            "name '{name}' should be rejected"
        );
    }
}
