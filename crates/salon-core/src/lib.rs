//! # salon-core: Pure Business Logic for the Salon
//!
//! This crate holds the rules behind the salon's point of sale: the
//! order (comanda) ledger, the client-package credit ledger and the
//! appointment lifecycle. Nothing in here touches the document store.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Salon Belleza Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web Front-end (out of scope)                 │   │
//! │  │    Calendar ──► Order editor ──► Close modal ──► Packages       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    salon-backend services                       │   │
//! │  │  AppointmentManager, OrderLedger, ClientPackageLedger           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ salon-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────────┐  ┌───────┐  │   │
//! │  │   │   order   │  │   money   │  │ client_package │  │ appt  │  │   │
//! │  │   │  lines    │  │   Money   │  │  credits       │  │status │  │   │
//! │  │   │  totals   │  │ centavos  │  │  redemption    │  │ rules │  │   │
//! │  │   └───────────┘  └───────────┘  └────────────────┘  └───────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 salon-db (Document Store Layer)                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Catalog records, roles, payment methods, statuses
//! - [`money`] - Money type with integer arithmetic (centavos)
//! - [`order`] - Order ledger: line items, tips, totals, open/close
//! - [`client_package`] - Pre-paid service credits
//! - [`appointment`] - Appointment records and status transitions
//! - [`time`] - Business-timezone date helpers
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use salon_core::money::Money;
//!
//! let haircut = Money::from_quetzales(150);
//! let tip = Money::from_quetzales(20);
//! assert_eq!((haircut + tip).to_string(), "Q170.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod appointment;
pub mod client_package;
pub mod error;
pub mod money;
pub mod order;
pub mod time;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use appointment::{Appointment, NewAppointment};
pub use client_package::{ClientPackage, PackageGrant};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use order::{
    NewOrder, Order, OrderTotals, PackageSaleLine, ProductLine, ServiceLine, Tip,
    ORDER_NUMBER_BASELINE,
};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single product line, and maximum package
/// purchase multiplier.
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Generates a new document identifier (UUID v4).
///
/// Identifiers are generated before a document is written so that
/// several documents can reference each other inside one atomic batch.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
