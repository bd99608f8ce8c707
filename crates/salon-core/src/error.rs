//! # Error Types
//!
//! Domain-specific error types for salon-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  salon-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule + permission violations          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  salon-db errors (separate crate)                                      │
//! │  └── DbError          - Document store failures                        │
//! │                                                                         │
//! │  salon-backend errors                                                  │
//! │  └── ApiError         - What the front-end sees (serialized)           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Front-end              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A rule violation is always reported before anything is mutated: an
//! operation that returns `Err` leaves the order, package or appointment
//! exactly as it was.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The acting user's role is not allowed to perform the operation.
    ///
    /// ## When This Occurs
    /// - Opening a closed order for edit without the owner role
    /// - Reopening an order without the owner role
    #[error("Permission denied: {action} requires the owner role")]
    PermissionDenied { action: String },

    /// A service line was toggled before a stylist was assigned to it.
    #[error("Select a stylist for '{service}' first")]
    StylistRequired { service: String },

    /// Closing an order whose total is zero.
    #[error("Order {order_number} is empty")]
    EmptyOrder { order_number: i64 },

    /// Order is not in a state that allows the requested operation.
    ///
    /// ## When This Occurs
    /// - Editing line items of a closed order
    /// - Closing an order that is already closed
    /// - Reopening an order that is open
    #[error("Order {order_number} is {current_status}, cannot {action}")]
    InvalidOrderStatus {
        order_number: i64,
        current_status: String,
        action: String,
    },

    /// A line index does not point at an existing line.
    #[error("No {kind} line at index {index}")]
    LineNotFound { kind: String, index: usize },

    /// A referenced catalog entry is missing or inactive.
    #[error("{kind} not found in active catalog: {id}")]
    NotInCatalog { kind: String, id: String },

    /// A tip was set for a stylist who has no selected service line.
    #[error("Stylist {stylist_id} has no selected service on this order")]
    TipNotAllowed { stylist_id: String },

    /// The credits of a sold package line already went to a client.
    ///
    /// ## When This Occurs
    /// - Granting the same sale line twice
    /// - Removing a sale line whose credits were granted
    #[error("Package line {index} of order {order_number} was already granted as {client_package_id}")]
    PackageAlreadyGranted {
        order_number: i64,
        index: usize,
        client_package_id: String,
    },

    /// Redeeming a credit from a package with nothing left.
    #[error("Client package {id} has no remaining credits")]
    PackageDepleted { id: String },

    /// Appointment status change not allowed from the current status.
    #[error("Appointment {id} cannot go from {from} to {to}")]
    InvalidAppointmentTransition { id: String, from: String, to: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a PermissionDenied error for the given action.
    pub fn permission_denied(action: impl Into<String>) -> Self {
        CoreError::PermissionDenied {
            action: action.into(),
        }
    }

    /// Creates a NotInCatalog error.
    pub fn not_in_catalog(kind: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotInCatalog {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Returns true for errors caused by the caller's role.
    pub fn is_permission(&self) -> bool {
        matches!(self, CoreError::PermissionDenied { .. })
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Invalid format (e.g., invalid time, unknown tag).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates a Required error.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates an InvalidFormat error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
