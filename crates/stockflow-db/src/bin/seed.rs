//! # Seed Data Generator
//!
//! Populates a tenant with demo products, a customer and a supplier.
//!
//! ## Usage
//! ```bash
//! # Seed tenant "demo" in ./stockflow_dev.db
//! cargo run -p stockflow-db --bin seed
//!
//! # Custom tenant and database
//! cargo run -p stockflow-db --bin seed -- --tenant acme --db ./data/stockflow.db
//! ```
//!
//! Each product has:
//! - Unique SKU: `{CATEGORY}-{ABBR}-{INDEX}`
//! - Price between 1.99 and 9.99 plus a size add-on
//! - Cost at 60-80% of price
//! - Stock 0 - 100, reorder threshold 10
//! - Roughly one in four products priced VAT-inclusive

use chrono::Utc;
use std::env;
use stockflow_core::{Customer, Product, Supplier, TaxType};
use stockflow_db::{Database, DbConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Product categories for realistic demo data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "BEV",
        &["Cola", "Lemon Soda", "Mineral Water", "Orange Juice", "Iced Tea", "Ground Coffee"],
    ),
    (
        "SNK",
        &["Salted Crisps", "Chocolate Bar", "Oat Cookies", "Pretzels", "Trail Mix"],
    ),
    (
        "GRO",
        &["White Rice", "Spaghetti", "Canned Beans", "Sunflower Oil", "Wheat Flour", "Sugar"],
    ),
    (
        "HOM",
        &["Dish Soap", "Laundry Powder", "Paper Towels", "Bin Bags"],
    ),
];

/// Size variants and their price add-on in cents
const SIZES: &[(&str, i64)] = &[("Small", 0), ("Medium", 100), ("Large", 250)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./stockflow_dev.db");
    let mut tenant_id = String::from("demo");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--tenant" | "-t" => {
                if i + 1 < args.len() {
                    tenant_id = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockflow Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>      Database file path (default: ./stockflow_dev.db)");
                println!("  -t, --tenant <ID>    Tenant to seed (default: demo)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    info!(db = %db_path, tenant = %tenant_id, "Seeding database");

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let existing = db.products().count(&tenant_id).await?;
    if existing > 0 {
        warn!(existing, "Tenant already has products, skipping seed");
        return Ok(());
    }

    let start = std::time::Instant::now();
    let mut generated = 0usize;

    for (category_idx, (category_code, names)) in CATEGORIES.iter().enumerate() {
        for (name_idx, name) in names.iter().enumerate() {
            for (size_idx, (size, price_addon)) in SIZES.iter().enumerate() {
                let seed = category_idx * 100 + name_idx * 10 + size_idx;
                let product = generate_product(&tenant_id, category_code, name, size, *price_addon, seed);

                if let Err(e) = db.products().insert(&product).await {
                    warn!(sku = %product.sku, error = %e, "Failed to insert product");
                    continue;
                }
                generated += 1;
            }
        }
    }

    let now = Utc::now();
    db.customers()
        .insert(&Customer {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.clone(),
            name: "Walk-in Customer".to_string(),
            email: None,
            phone: None,
            created_at: now,
        })
        .await?;

    db.suppliers()
        .insert(&Supplier {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.clone(),
            name: "Central Wholesale Ltd".to_string(),
            email: Some("orders@central-wholesale.test".to_string()),
            phone: Some("+254 700 000 000".to_string()),
            created_at: now,
        })
        .await?;

    let low = db.products().list_below_reorder(&tenant_id).await?;

    info!(
        products = generated,
        below_reorder = low.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Seed complete"
    );

    db.close().await;
    Ok(())
}

/// Generates a single product with deterministic, realistic data.
fn generate_product(
    tenant_id: &str,
    category: &str,
    name: &str,
    size: &str,
    price_addon: i64,
    seed: usize,
) -> Product {
    let now = Utc::now();

    let abbr: String = name
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .take(3)
        .collect::<String>()
        .to_uppercase();
    let sku = format!("{category}-{abbr}-{seed:03}");

    let base_price = 199 + ((seed * 17) % 800) as i64;
    let unit_price_minor = base_price + price_addon;

    let cost_pct = 60 + (seed % 20) as i64;
    let unit_cost_minor = unit_price_minor * cost_pct / 100;

    let tax_type = if seed % 4 == 0 {
        TaxType::Inclusive
    } else {
        TaxType::Exclusive
    };

    Product {
        id: Uuid::new_v4().to_string(),
        tenant_id: tenant_id.to_string(),
        sku,
        name: format!("{name} {size}"),
        stock_quantity: (seed % 101) as i64,
        reorder_threshold: 10,
        unit_cost_minor,
        unit_price_minor,
        tax_type,
        created_at: now,
        updated_at: now,
    }
}
