//! # Salon Back-end
//!
//! Opens the configured database and prints the day sheet: today's
//! appointments and orders in the business timezone.
//!
//! ## Usage
//! ```bash
//! cargo run -p salon-backend
//!
//! # Explicit config file
//! cargo run -p salon-backend -- --config ./salon.toml
//! ```

use chrono::Utc;
use std::env;
use std::path::PathBuf;
use tracing::info;

use salon_backend::{init_tracing, AppConfig, Backend};
use salon_core::time::{business_today, format_date_display, format_local};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Salon Back-end");
                println!();
                println!("Usage: salon-backend [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>  Config file (default: platform config dir)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let config = AppConfig::load_or_default(config_path);
    init_tracing(config.log_filter());
    info!(business = %config.business.name, "Starting salon back-end");

    let backend = Backend::start(config).await?;
    let offset = backend.config.business_offset();
    let today = business_today(Utc::now(), offset);

    println!("{}", backend.config.business.name);
    println!("{}", "=".repeat(backend.config.business.name.chars().count()));
    println!("Fecha: {}", format_date_display(today));
    println!();

    let appointments = backend.appointments.list_by_date(today).await?;
    println!("Citas ({})", appointments.len());
    for appointment in &appointments {
        println!(
            "  {}  {:<30} {}",
            appointment.start_time, appointment.client.name, appointment.status
        );
    }
    println!();

    let orders = backend.orders.list_today().await?;
    println!("Comandas ({})", orders.len());
    for order in &orders {
        let closed = order
            .closed_at
            .filter(|_| order.is_closed())
            .map(|at| format_local(at, offset))
            .unwrap_or_default();
        println!(
            "  #{}  {:<30} {:>10}  {:<6} {}",
            order.order_number, order.client_name, order.totals.total, order.status, closed
        );
    }

    backend.db.close().await;
    Ok(())
}
