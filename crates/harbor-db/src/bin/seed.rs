//! # Demo Data Seeder
//!
//! Fills a database with enough data to exercise settlement and the store
//! switcher end to end.
//!
//! ## Usage
//! ```bash
//! cargo run -p harbor-db --bin seed
//! cargo run -p harbor-db --bin seed -- --db ./data/harbor.db
//! ```
//!
//! ## What Gets Created
//! - 3 customers
//! - 3 stores, `WEST-03` inactive
//! - user `manager` attached to all three stores
//! - one sale per customer plus one walk-in sale
//! - one return per sale (one of them with tax)

use chrono::Utc;
use std::env;

use harbor_core::{Customer, Sale, SaleReturn, Store};
use harbor_db::{Database, DbConfig};

const CUSTOMERS: &[(&str, &str, &str)] = &[
    ("42", "Ada Lovelace", "ada@example.com"),
    ("43", "Alan Turing", "alan@example.com"),
    ("44", "Katherine Johnson", "katherine@example.com"),
];

/// (id, name, code, is_active)
const STORES: &[(&str, &str, &str, bool)] = &[
    ("store-downtown", "Downtown", "DT-01", true),
    ("store-harbor", "Harbor Front", "HF-02", true),
    ("store-west", "West Side", "WEST-03", false),
];

const MANAGER_ID: &str = "manager";

/// (sale id, store, customer, total, refund, tax refund)
const SALES: &[(&str, &str, Option<&str>, i64, i64, i64)] = &[
    ("sale-1001", "store-downtown", Some("42"), 15000, 15000, 0),
    ("sale-1002", "store-downtown", Some("43"), 10825, 10825, 825),
    ("sale-1003", "store-harbor", Some("44"), 4999, 1999, 0),
    ("sale-1004", "store-harbor", None, 2500, 2500, 0),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./harbor_dev.db");

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
                println!("Harbor Back Office Demo Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./harbor_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Harbor Back Office Demo Seeder");
    println!("=================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.sale_returns().count_returns().await?;
    if existing > 0 {
        println!("⚠ Database already has {} sale returns", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let now = Utc::now();

    for (id, name, email) in CUSTOMERS {
        db.balances()
            .insert_customer(&Customer {
                id: id.to_string(),
                name: name.to_string(),
                email: Some(email.to_string()),
                created_at: now,
            })
            .await?;
    }
    println!("✓ {} customers", CUSTOMERS.len());

    db.stores()
        .insert_user(MANAGER_ID, "Store Manager", "manager@example.com")
        .await?;
    for (id, name, code, is_active) in STORES {
        db.stores()
            .insert_store(&Store {
                id: id.to_string(),
                name: name.to_string(),
                code: code.to_string(),
                is_active: *is_active,
                created_at: now,
            })
            .await?;
        db.stores().add_member(id, MANAGER_ID).await?;
    }
    println!("✓ {} stores, user '{}' attached to all", STORES.len(), MANAGER_ID);

    for (n, (sale_id, store_id, customer_id, total, refund, tax)) in SALES.iter().enumerate() {
        db.sale_returns()
            .insert_sale(&Sale {
                id: sale_id.to_string(),
                store_id: store_id.to_string(),
                customer_id: customer_id.map(str::to_string),
                receipt_number: format!("R-{:05}", n + 1),
                total_cents: *total,
                created_at: now,
            })
            .await?;

        let return_id = format!("ret-{}", &sale_id["sale-".len()..]);
        db.sale_returns()
            .insert_return(&SaleReturn {
                id: return_id.clone(),
                sale_id: Some(sale_id.to_string()),
                store_id: store_id.to_string(),
                total_refund_cents: *refund,
                tax_refund_cents: *tax,
                reason: Some("demo return".to_string()),
                created_at: now,
            })
            .await?;

        println!(
            "  {} → {} ({})",
            sale_id,
            return_id,
            customer_id.unwrap_or("walk-in")
        );
    }
    println!("✓ {} sales with returns", SALES.len());

    println!();
    println!("🎉 Seed complete. Try:");
    println!("   backoffice settle ret-1001 ret-1002 ret-1003 ret-1004");
    println!("   backoffice balance 42");

    Ok(())
}
