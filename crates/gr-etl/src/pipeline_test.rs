use super::*;
use gr_core::Config;
use gr_db::WarehouseDb;
use tempfile::TempDir;

const ALL_PHASES: [&str; 11] = [
    "extract_customers",
    "extract_products",
    "extract_sales",
    "transform_customers",
    "transform_products",
    "transform_sales",
    "date_dimension",
    "load_dim_customers",
    "load_dim_products",
    "load_fact_sales",
    "aggregates",
];

fn memory_db() -> WarehouseDb {
    WarehouseDb::open_memory().expect("in-memory warehouse")
}

fn test_config() -> Config {
    serde_yaml::from_str(
        "name: granary_test\nvalidation:\n  start_date: 2024-03-01\n  end_date: 2024-03-07",
    )
    .expect("test config")
}

fn scaffold_project(with_sales: bool) -> TempDir {
    let root = TempDir::new().unwrap();
    let data = root.path().join("data");
    std::fs::create_dir_all(&data).unwrap();

    std::fs::write(
        data.join("customers.csv"),
        "customer_id,customer_name,email,phone,address,city,country,registration_date\n\
         CUST-1,Alice Nguyen,alice@example.com,555-0100,1 Main St,Hanoi,Vietnam,2023-04-01\n\
         CUST-2,Bob Tran,bob@example.com,555-0101,2 Oak Ave,Boston,USA,2023-05-12\n",
    )
    .unwrap();
    std::fs::write(
        data.join("products.csv"),
        "product_id,product_name,category,subcategory,supplier,cost_price,msrp\n\
         PROD-1,Widget,hardware,fasteners,Acme,60.00,100.00\n",
    )
    .unwrap();
    if with_sales {
        std::fs::write(
            data.join("sales.csv"),
            "order_id,order_date,customer_id,product_id,quantity,unit_price,total_amount\n\
             ORD-1,2024-03-01,CUST-1,PROD-1,3,100.00,300.00\n\
             ORD-2,2024-03-02,CUST-2,PROD-1,1,25.50,25.50\n",
        )
        .unwrap();
    }
    root
}

#[test]
fn full_run_executes_phases_in_order() {
    let root = scaffold_project(true);
    let db = memory_db();
    let config = test_config();

    let summary = Pipeline::new(&db, &config, root.path()).run_full();

    assert!(summary.success);
    assert!(summary.failed_phase().is_none());
    let names: Vec<&str> = summary.phases.iter().map(|p| p.phase.as_str()).collect();
    assert_eq!(names, ALL_PHASES);
    assert!(summary
        .phases
        .iter()
        .all(|p| p.status == RunStatus::Success));
    assert_eq!(db.query_count("SELECT COUNT(*) FROM fact_sales").unwrap(), 2);
}

#[test]
fn second_run_skips_extraction() {
    let root = scaffold_project(true);
    let db = memory_db();
    let config = test_config();
    let pipeline = Pipeline::new(&db, &config, root.path());

    pipeline.run_full();
    let second = pipeline.run_full();

    assert!(second.success);
    for phase in &second.phases {
        if phase.phase.starts_with("extract_") {
            assert_eq!(phase.status, RunStatus::Skipped, "{}", phase.phase);
            assert_eq!(phase.records, 0);
        }
    }
    assert_eq!(db.query_count("SELECT COUNT(*) FROM fact_sales").unwrap(), 2);
    assert_eq!(
        db.query_count("SELECT COUNT(*) FROM staging_sales").unwrap(),
        2
    );
}

#[test]
fn missing_sales_file_stops_the_run() {
    let root = scaffold_project(false);
    let db = memory_db();
    let config = test_config();

    let summary = Pipeline::new(&db, &config, root.path()).run_full();

    assert!(!summary.success);
    let names: Vec<&str> = summary.phases.iter().map(|p| p.phase.as_str()).collect();
    assert_eq!(
        names,
        vec!["extract_customers", "extract_products", "extract_sales"]
    );
    let failed = summary.failed_phase().expect("a failed phase");
    assert_eq!(failed.phase, "extract_sales");
    assert!(failed.error.as_deref().unwrap_or("").contains("[P002]"));
}

#[test]
fn group_runners_cover_their_phases() {
    let root = scaffold_project(true);
    let db = memory_db();
    let config = test_config();
    let pipeline = Pipeline::new(&db, &config, root.path());

    let extract = pipeline.run_extract();
    assert!(extract.success);
    assert_eq!(extract.phases.len(), 3);

    let transform = pipeline.run_transform();
    assert!(transform.success);
    assert_eq!(transform.phases.len(), 4);

    let load = pipeline.run_load();
    assert!(load.success);
    assert_eq!(load.phases.len(), 4);
    assert_eq!(db.query_count("SELECT COUNT(*) FROM fact_sales").unwrap(), 2);
}

#[test]
fn single_domain_extraction_runs_one_phase() {
    let root = scaffold_project(true);
    let db = memory_db();
    let config = test_config();

    let summary = Pipeline::new(&db, &config, root.path()).run_extract_domain(Domain::Sales);

    assert!(summary.success);
    assert_eq!(summary.phases.len(), 1);
    assert_eq!(summary.phases[0].phase, "extract_sales");
    assert_eq!(summary.phases[0].records, 2);
    assert_eq!(summary.total_records(), 2);
}

#[test]
fn run_status_strings() {
    assert_eq!(RunStatus::Success.as_str(), "success");
    assert_eq!(RunStatus::Skipped.as_str(), "skipped");
    assert_eq!(RunStatus::Error.as_str(), "error");
}
