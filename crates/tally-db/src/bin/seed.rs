//! # Seed Data Generator
//!
//! Populates a database with the demo catalog.
//!
//! ## Usage
//! ```bash
//! cargo run -p tally-db --bin seed
//!
//! # Specify database path
//! cargo run -p tally-db --bin seed -- --db ./data/tally.db
//! ```

use std::env;
use tally_db::seed::seed_demo_catalog;
use tally_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./tally.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Tally demo catalog seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./tally.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => {
                eprintln!("Ignoring unknown argument: {}", other);
            }
        }
        i += 1;
    }

    println!("Database: {}", db_path);

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let summary = seed_demo_catalog(&db).await?;

    if summary.is_empty() {
        println!("Catalog already populated, nothing to do.");
    } else {
        println!(
            "Inserted {} products and {} promotions.",
            summary.products, summary.promotions
        );
    }

    for product in db.products().list_all().await? {
        println!(
            "  #{:<3} {:<8} {:<16} {:>9}  qty {}",
            product.product_id,
            product.sku,
            product.name,
            product.price().to_string(),
            product.qty
        );
    }

    db.close().await;
    Ok(())
}
