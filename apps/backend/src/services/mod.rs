//! # Services
//!
//! The operations a front-end calls. Each service holds cheap clones of
//! the repositories it needs and returns [`ApiResult`](crate::error::ApiResult).
//!
//! - [`AppointmentManager`] - booking and appointment lifecycle
//! - [`OrderLedger`] - order editing, save, close and reopen
//! - [`ClientPackageLedger`] - pre-paid credits per client

mod appointment_manager;
mod client_package_ledger;
mod order_ledger;

pub use appointment_manager::{AppointmentManager, Booking};
pub use client_package_ledger::ClientPackageLedger;
pub use order_ledger::OrderLedger;
