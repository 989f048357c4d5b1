//! # Seed Data Generator
//!
//! Populates the database with demo clothing-store data for development.
//!
//! ## Usage
//! ```bash
//! # Generate 60 products (default)
//! cargo run -p stylestock-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p stylestock-db --bin seed -- --count 200
//!
//! # Specify database path
//! cargo run -p stylestock-db --bin seed -- --db ./data/stylestock.db
//! ```
//!
//! ## Generated Data
//! Products across clothing categories (shirts, pants, dresses, jackets,
//! shoes, accessories), each with a unique code, cost, margin, and stock
//! level. Everything goes through the repositories, so seeded stock shows
//! up in the movement ledger exactly like operator-entered stock would.
//!
//! A handful of demo customers is created as well. Login accounts are not
//! seeded here; the server bootstraps them on first start.

use std::env;

use stylestock_core::{NewCustomer, NewProduct};
use stylestock_db::{Database, DbConfig};

/// Clothing categories: (code prefix, category name, item names).
const CATEGORIES: &[(&str, &str, &[&str])] = &[
    (
        "SH",
        "Shirts",
        &[
            "Linen Shirt",
            "Oxford Shirt",
            "Flannel Shirt",
            "Polo Shirt",
            "Silk Blouse",
            "Denim Shirt",
            "Henley Shirt",
            "Printed Tee",
        ],
    ),
    (
        "PN",
        "Pants",
        &[
            "Slim Jeans",
            "Straight Jeans",
            "Chino Pants",
            "Cargo Pants",
            "Linen Trousers",
            "Jogger Pants",
            "Pleated Trousers",
            "Wide-Leg Pants",
        ],
    ),
    (
        "DR",
        "Dresses",
        &[
            "Wrap Dress",
            "Maxi Dress",
            "Shirt Dress",
            "Slip Dress",
            "Knit Dress",
            "Floral Midi Dress",
        ],
    ),
    (
        "JK",
        "Jackets",
        &[
            "Denim Jacket",
            "Bomber Jacket",
            "Blazer",
            "Trench Coat",
            "Puffer Jacket",
            "Leather Jacket",
        ],
    ),
    (
        "FT",
        "Shoes",
        &[
            "Canvas Sneakers",
            "Leather Boots",
            "Loafers",
            "Espadrilles",
            "Running Shoes",
            "Sandals",
        ],
    ),
    (
        "AC",
        "Accessories",
        &[
            "Leather Belt",
            "Wool Scarf",
            "Baseball Cap",
            "Tote Bag",
            "Sunglasses",
            "Beanie",
        ],
    ),
];

/// Size variants and their cost addon in cents.
const SIZES: &[(&str, i64)] = &[("P", 0), ("M", 0), ("G", 200), ("GG", 400)];

/// Margins in basis points (40%, 50%, 60%, 80%).
const MARGINS: &[u32] = &[4000, 5000, 6000, 8000];

/// Demo customers.
const CUSTOMERS: &[(&str, &str)] = &[
    ("Ana Lima", "ana.lima@example.com"),
    ("Bruno Carvalho", "bruno.c@example.com"),
    ("Carla Mendes", "carla.mendes@example.com"),
    ("Diego Santos", "diego.s@example.com"),
    ("Elisa Ferreira", "elisa.f@example.com"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 60;
    let mut db_path = String::from("./stylestock_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(60);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("StyleStock Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 60)");
                println!("  -d, --db <PATH>    Database file path (default: ./stylestock_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 StyleStock Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing products
    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Generate products
    println!();
    println!("Generating products...");

    let mut generated = 0;
    let start = std::time::Instant::now();

    'outer: for (prefix, category, items) in CATEGORIES {
        for item in *items {
            for (size, cost_addon) in SIZES {
                if generated >= count {
                    break 'outer;
                }

                let new = generate_product(prefix, category, item, size, *cost_addon, generated);

                if let Err(e) = db.products().create(&new).await {
                    eprintln!("Failed to insert {}: {}", new.code, e);
                    continue;
                }

                generated += 1;

                if generated % 50 == 0 {
                    println!("  Generated {} products...", generated);
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);

    // Demo customers
    println!();
    println!("Creating demo customers...");
    for (name, email) in CUSTOMERS {
        let new = NewCustomer {
            name: (*name).to_string(),
            phone: None,
            email: Some((*email).to_string()),
        };
        if let Err(e) = db.customers().create(&new).await {
            eprintln!("Failed to insert customer {}: {}", name, e);
        }
    }
    println!("✓ Created {} customers", CUSTOMERS.len());

    // Every seeded product with stock left an "Initial stock" ledger entry
    let movements = db.movements().count().await?;
    println!();
    println!("✓ Ledger entries: {}", movements);
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single product with deterministic demo data.
fn generate_product(
    prefix: &str,
    category: &str,
    item: &str,
    size: &str,
    cost_addon: i64,
    seed: usize,
) -> NewProduct {
    // Unique code: {PREFIX}-{NNN}
    let code = format!("{}-{:03}", prefix, seed + 1);

    // Cost between R$ 25.00 and R$ 180.00, deterministic per index
    let base_cost = 2500 + ((seed * 731) % 15500) as i64;
    let cost_cents = base_cost + cost_addon;

    let margin_bps = MARGINS[seed % MARGINS.len()];

    // Stock 0 - 30; roughly one product in ten starts sold out
    let initial_stock = if seed % 10 == 9 {
        0
    } else {
        (3 + seed * 7 % 28) as i64
    };

    NewProduct {
        code,
        name: format!("{} {}", item, size),
        category: (*category).to_string(),
        cost_cents,
        margin_bps,
        initial_stock,
    }
}
