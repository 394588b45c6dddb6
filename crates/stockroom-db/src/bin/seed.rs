//! # Seed Data Generator
//!
//! Populates a store with demo products and sales, then prints the
//! summary.
//!
//! ## Usage
//! ```bash
//! # Seed the hosted store named by PUBLIC_SUPABASE_URL / _ANON_KEY
//! cargo run -p stockroom-db --bin seed
//!
//! # Custom amounts
//! cargo run -p stockroom-db --bin seed -- --products 20 --sales 50
//!
//! # Dry run against in-process tables
//! cargo run -p stockroom-db --bin seed -- --memory
//! ```
//!
//! Without an endpoint configured the seed falls back to the in-memory
//! store.

use std::env;

use chrono::{Duration, Utc};
use stockroom_core::{NewProduct, NewSale, Product};
use stockroom_db::{Store, StoreConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Demo catalog: (name, price)
const CATALOG: &[(&str, f64)] = &[
    ("Coffee Beans 1kg", 18.5),
    ("Green Tea 100g", 6.25),
    ("Whole Milk 1L", 1.2),
    ("Oat Milk 1L", 2.4),
    ("Sourdough Loaf", 4.75),
    ("Butter 250g", 3.1),
    ("Free Range Eggs x12", 4.2),
    ("Cheddar 400g", 5.6),
    ("Dark Chocolate 100g", 2.9),
    ("Orange Juice 1L", 3.3),
    ("Honey 500g", 7.8),
    ("Granola 750g", 5.45),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut product_count: usize = CATALOG.len();
    let mut sale_count: usize = 20;
    let mut force_memory = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--products" | "-p" => {
                if i + 1 < args.len() {
                    product_count = args[i + 1].parse().unwrap_or(CATALOG.len());
                    i += 1;
                }
            }
            "--sales" | "-s" => {
                if i + 1 < args.len() {
                    sale_count = args[i + 1].parse().unwrap_or(20);
                    i += 1;
                }
            }
            "--memory" | "-m" => force_memory = true,
            "--help" | "-h" => {
                println!("Stockroom Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -p, --products <N>  Number of products to create (default: {})", CATALOG.len());
                println!("  -s, --sales <N>     Number of sales to record (default: 20)");
                println!("  -m, --memory        Use in-process tables instead of the hosted store");
                println!("  -h, --help          Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let config = StoreConfig::from_env()?;
    let store = if force_memory {
        Store::in_memory()
    } else if config.url.is_empty() {
        warn!("PUBLIC_SUPABASE_URL is not set, seeding the in-memory store");
        Store::in_memory()
    } else {
        Store::connect(config)?
    };

    info!(products = product_count, sales = sale_count, "Seeding store");

    let mut products: Vec<Product> = Vec::with_capacity(product_count);
    for index in 0..product_count {
        let (name, price) = CATALOG[index % CATALOG.len()];
        let name = if index < CATALOG.len() {
            name.to_string()
        } else {
            format!("{} #{}", name, index / CATALOG.len() + 1)
        };
        // Every fourth product starts out of stock
        let stock = if index % 4 == 3 { 0 } else { (index as i64 * 7) % 40 + 1 };

        match store.products().create(&NewProduct::new(name, price, stock)).await {
            Ok(product) => products.push(product),
            Err(e) => warn!(error = %e, "Failed to insert product"),
        }
    }

    if products.is_empty() {
        warn!("No products created, skipping sales");
    } else {
        let now = Utc::now();
        for index in 0..sale_count {
            let product = &products[(index * 5) % products.len()];
            let quantity = (index % 3 + 1) as f64;
            let sale = NewSale::new(product.id.clone(), product.price * quantity)
                .dated(now - Duration::hours(index as i64 * 6));

            if let Err(e) = store.sales().create(&sale).await {
                warn!(error = %e, product_id = %product.id, "Failed to record sale");
            }
        }
    }

    let summary = store.summary().get_summary().await?;
    info!(
        total_sales = summary.total_sales,
        total_stock = summary.total_stock,
        products_in_stock = summary.products_in_stock,
        total_products = summary.total_products,
        "Seed complete"
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
