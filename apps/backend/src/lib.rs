//! # Salon Back-end Library
//!
//! Application services for the salon: the appointment manager, the
//! order ledger and the client-package ledger, wired to a database built
//! from [`AppConfig`].
//!
//! ## Module Organization
//! ```text
//! salon_backend/
//! ├── lib.rs          ◄─── You are here (startup & logging)
//! ├── config.rs       ◄─── AppConfig (TOML + environment)
//! ├── session.rs      ◄─── Signed-in user and role
//! ├── state/
//! │   ├── mod.rs      ◄─── View-model exports
//! │   └── editor.rs   ◄─── OrderEditor + CatalogSnapshot
//! ├── services/
//! │   ├── mod.rs                   ◄─── Service exports
//! │   ├── appointment_manager.rs   ◄─── Booking, status, cancel, delete
//! │   ├── order_ledger.rs          ◄─── Edit, save, close, reopen
//! │   └── client_package_ledger.rs ◄─── Grant, redeem, list credits
//! └── error.rs        ◄─── API error type for services
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Back-end Startup                                  │
//! │                                                                         │
//! │  1. Load Configuration ───────────────────────────────────────────────► │
//! │     • config.toml, then SALON_* environment overrides                  │
//! │                                                                         │
//! │  2. Initialize Logging ───────────────────────────────────────────────► │
//! │     • tracing-subscriber with env filter                                │
//! │     • RUST_LOG wins over the configured filter                          │
//! │                                                                         │
//! │  3. Connect to Database ──────────────────────────────────────────────► │
//! │     • SQLite with WAL mode                                              │
//! │     • Run pending migrations                                            │
//! │                                                                         │
//! │  4. Build Services ───────────────────────────────────────────────────► │
//! │     • OrderLedger (business timezone from config)                       │
//! │     • AppointmentManager (shares the ledger)                            │
//! │     • ClientPackageLedger                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod services;
pub mod session;
pub mod state;

use tracing::info;
use tracing_subscriber::EnvFilter;

use salon_db::{Database, DbConfig};

pub use config::AppConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use services::{AppointmentManager, Booking, ClientPackageLedger, OrderLedger};
pub use session::Session;
pub use state::{CatalogSnapshot, OrderEditor};

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=salon=trace` - Show trace for salon crates only
/// - Otherwise `filter` (from `[logging] filter`)
///
/// Calling it again after a subscriber is installed does nothing.
pub fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// The wired-up back-end.
#[derive(Clone)]
pub struct Backend {
    pub config: AppConfig,
    pub db: Database,
    pub appointments: AppointmentManager,
    pub orders: OrderLedger,
    pub packages: ClientPackageLedger,
}

impl Backend {
    /// Opens the configured database and builds the services.
    pub async fn start(config: AppConfig) -> ApiResult<Self> {
        let db_path = config.database_path();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                tracing::error!(?parent, "Could not create data directory: {}", e);
                ApiError::internal("Could not create data directory")
            })?;
        }
        info!(?db_path, "Database path determined");

        let db_config = DbConfig::new(db_path).max_connections(config.database.max_connections);
        let db = Database::new(db_config).await?;
        info!("Database connected and migrations applied");

        Ok(Self::with_database(db, config))
    }

    /// Builds the services over an already open database.
    pub fn with_database(db: Database, config: AppConfig) -> Self {
        let orders = OrderLedger::new(&db, config.business_offset());
        let appointments = AppointmentManager::new(&db, orders.clone());
        let packages = ClientPackageLedger::new(&db);

        Backend {
            config,
            db,
            appointments,
            orders,
            packages,
        }
    }

    /// A fresh in-memory back-end with default settings.
    pub async fn in_memory() -> ApiResult<Self> {
        let db = Database::new(DbConfig::in_memory()).await?;
        Ok(Self::with_database(db, AppConfig::default()))
    }
}
