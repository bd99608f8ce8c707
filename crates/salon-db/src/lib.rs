//! # salon-db: Document Store Layer for the Salon
//!
//! This crate provides persistence for the salon back-end: a generic
//! document store (collections of JSON documents) backed by SQLite, and
//! typed repositories on top of it.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Salon Data Flow                                  │
//! │                                                                         │
//! │  OrderLedger::close (salon-backend)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     salon-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │    Store     │  │   │
//! │  │   │   (pool.rs)   │    │               │    │              │  │   │
//! │  │   │               │    │ OrderRepo     │    │ DocumentStore│  │   │
//! │  │   │ SqlitePool    │───►│ AppointmentRe │───►│ WriteBatch   │  │   │
//! │  │   │ Migrations    │    │ ClientPackage │    │ Filter       │  │   │
//! │  │   │               │    │ CatalogRepo   │    │ SQLite impl  │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  SQLite: documents(collection, id, data JSON, …) + counters     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - `DocumentStore` trait, filters, write batches, SQLite impl
//! - [`repository`] - Typed repositories per collection
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use salon_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./salon.db")).await?;
//! let number = db.orders().next_order_number().await?;
//! let credits = db.client_packages().list_active_for_client("c-1").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use store::{collections, Document, DocumentStore, Fields, Filter, WriteBatch, WriteOp};

// Repository re-exports for convenience
pub use repository::{
    AppointmentRepository, CatalogRepository, ClientPackageRepository, OrderRepository,
};
