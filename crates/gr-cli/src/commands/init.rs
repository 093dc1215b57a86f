//! Init command implementation - scaffolds a new Granary project

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::cli::{GlobalArgs, InitArgs};

/// Execute the init command
pub(crate) fn execute(args: &InitArgs, global: &GlobalArgs) -> Result<()> {
    // Reject names that could cause path traversal or confusing directory names
    if args.name.contains('/')
        || args.name.contains('\\')
        || args.name.contains("..")
        || args.name.starts_with('.')
        || args.name.starts_with('-')
    {
        anyhow::bail!(
            "Invalid project name '{}': must not contain '/', '\\', '..', or start with '.' or '-'",
            args.name
        );
    }

    let project_dir = Path::new(&global.project_dir).join(&args.name);

    if project_dir.exists() {
        anyhow::bail!(
            "Directory '{}' already exists. Choose a different project name.",
            args.name
        );
    }

    println!("Creating new Granary project: {}\n", args.name);

    // Create directory structure
    let dirs = ["", "data", "logs", "target"];
    for dir in &dirs {
        let path = project_dir.join(dir);
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    }

    // Generate granary.yml
    // Escape YAML special characters in interpolated values
    let safe_name = args.name.replace('"', "\\\"");
    let safe_db_path = args.database_path.replace('"', "\\\"");
    let config_content = format!(
        r#"name: "{name}"

database:
  path: "{db_path}"

data:
  dir: "data"
  sales_file: "sales.csv"
  customers_file: "customers.csv"
  products_file: "products.csv"

target_path: "target"

# etl:
#   chunk_size: 50000        # staging insert batch for the sales feed
#   load_batch_size: 5000    # staging scan page for the fact load

# validation:
#   min_quantity: 1
#   max_quantity: 1000
#   min_unit_price: 0.01
#   max_unit_price: 10000.0
#   start_date: 2020-01-01   # order-date window and calendar start
#   end_date: 2025-12-31

# log_file: "logs/granary.log"
"#,
        name = safe_name,
        db_path = safe_db_path,
    );
    fs::write(project_dir.join("granary.yml"), config_content)
        .context("Failed to write granary.yml")?;

    // Generate small sample feeds so a fresh project runs end to end
    let sample_customers = "\
customer_id,customer_name,email,phone,address,city,country,registration_date
CUST-001,Alice Nguyen,alice@example.com,555-0101,12 Oak St,New York,USA,2023-06-15
CUST-002,Bob Tran,bob@example.com,555-0102,9 Elm Ave,Toronto,Canada,2023-08-02
";
    fs::write(project_dir.join("data/customers.csv"), sample_customers)
        .context("Failed to write sample customers.csv")?;

    let sample_products = "\
product_id,product_name,category,subcategory,supplier,cost_price,msrp
PROD-001,Mechanical Keyboard,electronics,keyboards,Keystone Supply,45.00,89.99
PROD-002,Laptop Stand,accessories,stands,Deskworks,22.50,49.99
";
    fs::write(project_dir.join("data/products.csv"), sample_products)
        .context("Failed to write sample products.csv")?;

    let sample_sales = "\
order_id,order_date,customer_id,product_id,quantity,unit_price,total_amount
ORD-0001,2024-01-15,CUST-001,PROD-001,1,89.99,89.99
ORD-0002,2024-01-16,CUST-002,PROD-002,2,49.99,99.98
ORD-0002,2024-01-16,CUST-002,PROD-001,1,89.99,89.99
";
    fs::write(project_dir.join("data/sales.csv"), sample_sales)
        .context("Failed to write sample sales.csv")?;

    // Generate .gitignore
    let gitignore = "target/\nlogs/\n*.duckdb\n*.duckdb.wal\n";
    fs::write(project_dir.join(".gitignore"), gitignore).context("Failed to write .gitignore")?;

    println!("  Created granary.yml");
    println!("  Created data/customers.csv");
    println!("  Created data/products.csv");
    println!("  Created data/sales.csv");
    println!("  Created .gitignore");
    println!();
    println!("Next steps:");
    println!("  cd {}", args.name);
    println!("  granary run");

    Ok(())
}

#[cfg(test)]
#[path = "init_test.rs"]
mod tests;
