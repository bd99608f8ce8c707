//! # Seed Data Generator
//!
//! Populates the database with a small salon for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p salon-db --bin seed
//!
//! # Specify database path
//! cargo run -p salon-db --bin seed -- --db ./data/salon.db
//! ```
//!
//! ## Generated Data
//! - Users: one owner, one cashier, four stylists
//! - Services with prices and durations
//! - Products across categories
//! - Packages of pre-paid services

use salon_core::{Money, Package, Product, Role, Service, StaffMember};
use salon_db::{collections, Database, DbConfig};
use std::env;

/// (name, role, phone)
const USERS: &[(&str, Role, &str)] = &[
    ("Juan Propietario", Role::Owner, "+502 1234-5678"),
    ("María Caja", Role::Cashier, "+502 2345-6789"),
    ("Ana Estilista", Role::Stylist, "+502 3456-7890"),
    ("Laura Estilista", Role::Stylist, "+502 4567-8901"),
    ("Carmen Estilista", Role::Stylist, "+502 5678-9012"),
    ("Rosa Estilista", Role::Stylist, "+502 6789-0123"),
];

/// (name, price in quetzales, minutes)
const SERVICES: &[(&str, i64, u32)] = &[
    ("Corte de cabello", 150, 45),
    ("Tinte completo", 450, 120),
    ("Mechas", 550, 150),
    ("Peinado", 200, 60),
    ("Maquillaje", 250, 60),
    ("Tratamiento capilar", 300, 60),
    ("Manicure", 120, 45),
];

/// (name, category, price in quetzales, stock)
const PRODUCTS: &[(&str, &str, i64, i64)] = &[
    ("Shampoo reparador", "shampoo", 85, 24),
    ("Shampoo sin sal", "shampoo", 95, 18),
    ("Acondicionador hidratante", "acondicionador", 90, 20),
    ("Mascarilla de keratina", "tratamiento", 160, 10),
    ("Aceite de argán", "tratamiento", 140, 12),
    ("Spray fijador", "styling", 75, 30),
];

/// (name, index into SERVICES, credits, price in quetzales)
const PACKAGES: &[(&str, usize, u32, i64)] = &[
    ("5 Cortes", 0, 5, 650),
    ("4 Tratamientos", 5, 4, 1000),
    ("10 Manicures", 6, 10, 1000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./salon_dev.db");

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
                println!("Salon Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./salon_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Salon Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.sqlite_store().count(collections::SERVICES).await?;
    if existing > 0 {
        println!("⚠ Database already has {} services", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let catalog = db.catalog();

    for (name, role, phone) in USERS {
        let mut user = StaffMember {
            id: String::new(),
            name: name.to_string(),
            role: *role,
            phone: phone.to_string(),
            active: true,
        };
        catalog.insert_user(&mut user).await?;
        println!("  + user {} ({})", user.name, user.role);
    }

    let mut service_ids = Vec::with_capacity(SERVICES.len());
    for (name, price, minutes) in SERVICES {
        let mut service = Service {
            id: String::new(),
            name: name.to_string(),
            price: Money::from_quetzales(*price),
            duration_minutes: Some(*minutes),
            active: true,
        };
        let id = catalog.insert_service(&mut service).await?;
        service_ids.push((id, service.name.clone()));
        println!("  + service {} {}", service.name, service.price);
    }

    for (name, category, price, stock) in PRODUCTS {
        let mut product = Product {
            id: String::new(),
            name: name.to_string(),
            price: Money::from_quetzales(*price),
            stock: *stock,
            category: Some(category.to_string()),
            active: true,
        };
        catalog.insert_product(&mut product).await?;
        println!("  + product {} {}", product.name, product.price);
    }

    for (name, service_idx, credits, price) in PACKAGES {
        let Some((service_id, service_name)) = service_ids.get(*service_idx) else {
            continue;
        };
        let mut package = Package {
            id: String::new(),
            name: name.to_string(),
            service_id: service_id.clone(),
            service_name: service_name.clone(),
            quantity: *credits,
            price: Money::from_quetzales(*price),
            active: true,
        };
        catalog.insert_package(&mut package).await?;
        println!("  + package {} {}", package.name, package.price);
    }

    println!();
    println!(
        "✓ Seeded {} users, {} services, {} products, {} packages",
        USERS.len(),
        SERVICES.len(),
        PRODUCTS.len(),
        PACKAGES.len()
    );

    db.close().await;
    Ok(())
}
