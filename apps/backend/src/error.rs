//! # API Error Type
//!
//! Unified error type returned by every back-end service.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Salon Belleza                          │
//! │                                                                         │
//! │  Front-end                   Rust Back-end                              │
//! │  ─────────                   ─────────────                              │
//! │                                                                         │
//! │  ledger.close(order, "efectivo")                                        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Service Method                                                  │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Store Error? ─── DbError::QueryFailed("...") ─────┐            │  │
//! │  │         │          (logged, generic message)        │            │  │
//! │  │         ▼                                           ▼            │  │
//! │  │  Rule Broken? ─── CoreError::EmptyOrder ───────── ApiError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  e.code    = "VALIDATION_ERROR"                                         │
//! │  e.message = "Order 60288 is empty"                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every failure is scoped to the one action that triggered it. Rule
//! violations are rejected before anything is written.

use serde::Serialize;
use salon_core::CoreError;
use salon_db::DbError;

/// API error returned from service methods.
///
/// ## Serialization
/// ```json
/// {
///   "code": "PERMISSION_DENIED",
///   "message": "Permission denied: reopening an order requires the owner role"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed, or a required selection is missing
    ValidationError,

    /// The session's role may not perform the action
    PermissionDenied,

    /// Business rule violated (wrong status, depleted package, ...)
    BusinessLogic,

    /// Document store operation failed
    DatabaseError,

    /// Internal error
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts store errors to API errors.
///
/// Lookup failures keep their detail. Anything that went wrong inside the
/// store is logged and replaced by a generic message.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::InvalidDocument {
                collection,
                id,
                reason,
            } => {
                tracing::error!(%collection, %id, "Invalid document: {}", reason);
                ApiError::new(ErrorCode::DatabaseError, "Stored record is unreadable")
            }
            DbError::InvalidQuery(e) => {
                tracing::error!("Invalid query: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Serialization(e) => {
                tracing::error!("Serialization failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts business-rule errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::PermissionDenied { .. } => {
                ApiError::new(ErrorCode::PermissionDenied, message)
            }
            CoreError::StylistRequired { .. }
            | CoreError::EmptyOrder { .. }
            | CoreError::LineNotFound { .. }
            | CoreError::TipNotAllowed { .. } => ApiError::validation(message),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
            CoreError::NotInCatalog { .. } => ApiError::new(ErrorCode::NotFound, message),
            CoreError::InvalidOrderStatus { .. }
            | CoreError::PackageDepleted { .. }
            | CoreError::PackageAlreadyGranted { .. }
            | CoreError::InvalidAppointmentTransition { .. } => {
                ApiError::new(ErrorCode::BusinessLogic, message)
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for service methods.
pub type ApiResult<T> = Result<T, ApiError>;
