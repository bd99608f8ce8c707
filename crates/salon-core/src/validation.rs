//! # Validation Module
//!
//! Input validation for the order editor, the booking form and the
//! package ledger.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Front-end form                                               │
//! │  └── Parses text inputs (quantity "2", tip "20")                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Ranges, required names, HH:MM times, line indexes                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Repository decode                                            │
//! │  └── Typed records reject malformed documents                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every validator runs before the value it guards is used, so a
//! rejected input never leaves a half-applied change behind.

use chrono::NaiveTime;

use crate::error::ValidationError;
use crate::money::Money;
use crate::MAX_LINE_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of client, catalog and user names.
pub const MAX_NAME_LENGTH: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (client, service, product ...).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use salon_core::validation::validate_name;
///
/// assert!(validate_name("client name", "Ana").is_ok());
/// assert!(validate_name("client name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required(field));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validates a 24-hour `HH:MM` start time and returns it parsed.
///
/// ## Example
/// ```rust
/// use salon_core::validation::validate_start_time;
///
/// assert!(validate_start_time("10:00").is_ok());
/// assert!(validate_start_time("9:5").is_err());
/// assert!(validate_start_time("25:00").is_err());
/// ```
pub fn validate_start_time(time: &str) -> ValidationResult<NaiveTime> {
    let time = time.trim();

    // chrono accepts single-digit fields, the booking form never sends them
    if time.len() != 5 || time.as_bytes()[2] != b':' {
        return Err(ValidationError::invalid_format(
            "start time",
            format!("'{}' is not HH:MM", time),
        ));
    }

    NaiveTime::parse_from_str(time, "%H:%M").map_err(|_| {
        ValidationError::invalid_format("start time", format!("'{}' is not a valid time", time))
    })
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a product line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Order editor: Add product                                              │
/// │                                                                         │
/// │  User picks "Shampoo", quantity: 2                                     │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(2) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0?  → Error: "quantity must be positive"              │
/// │       ├── qty > 999? → Error: "quantity must be between 1 and 999"     │
/// │       └── OK → ProductLine appended                                    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    validate_count("quantity", qty)
}

/// Validates a package purchase multiplier (same bounds as a quantity).
pub fn validate_multiplier(multiplier: i64) -> ValidationResult<()> {
    validate_count("multiplier", multiplier)
}

fn validate_count(field: &str, value: i64) -> ValidationResult<()> {
    if value <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    if value > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price or tip amount.
///
/// ## Rules
/// - Must be non-negative; zero is allowed
///
/// ## Example
/// ```rust
/// use salon_core::money::Money;
/// use salon_core::validation::validate_price;
///
/// assert!(validate_price("price", Money::from_quetzales(150)).is_ok());
/// assert!(validate_price("price", Money::zero()).is_ok());
/// assert!(validate_price("tip", Money::from_cents(-1)).is_err());
/// ```
pub fn validate_price(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates that `index` points into a list of `len` lines.
pub fn validate_line_index(kind: &str, index: usize, len: usize) -> ValidationResult<()> {
    if index >= len {
        return Err(ValidationError::OutOfRange {
            field: format!("{} line index", kind),
            min: 0,
            max: len as i64 - 1,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
