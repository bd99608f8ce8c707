//! # Domain Types
//!
//! Catalog records, roles and the enumerations shared by the ledgers.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Catalog (read-only to the ledgers)                                    │
//! │  ┌───────────────┐ ┌───────────────┐ ┌───────────────┐ ┌─────────────┐ │
//! │  │   Service     │ │   Product     │ │   Package     │ │ StaffMember │ │
//! │  │  name, price  │ │  name, price  │ │ service, qty  │ │ name, role  │ │
//! │  └───────────────┘ └───────────────┘ └───────────────┘ └─────────────┘ │
//! │                                                                         │
//! │  Enumerations (persisted literal tags)                                 │
//! │  ┌───────────────┐ ┌───────────────┐ ┌──────────────────┐ ┌──────────┐ │
//! │  │ PaymentMethod │ │ OrderStatus   │ │AppointmentStatus │ │  Role    │ │
//! │  │ efectivo ...  │ │ open, closed  │ │ scheduled ...    │ │ owner... │ │
//! │  └───────────────┘ └───────────────┘ └──────────────────┘ └──────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every record carries the identifier of the document it was read from.
//! The identifier is not part of the document body (`#[serde(skip)]`);
//! repositories fill it in after decoding.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Role
// =============================================================================

/// Role of a salon user.
///
/// Only the owner holds the elevated role that can edit or reopen closed
/// orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Role {
    /// Salon owner (`propietario`).
    #[serde(rename = "propietario")]
    Owner,
    /// Front desk (`caja`).
    #[serde(rename = "caja")]
    Cashier,
    /// Service provider (`estilista`).
    #[serde(rename = "estilista")]
    Stylist,
}

impl Role {
    /// Returns true for the role allowed to edit and reopen closed orders.
    #[inline]
    pub fn is_elevated(&self) -> bool {
        matches!(self, Role::Owner)
    }

    /// Returns the persisted tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "propietario",
            Role::Cashier => "caja",
            Role::Stylist => "estilista",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the tags in any case (`ESTILISTA`, `estilista`) plus English names.
impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "propietario" | "owner" => Ok(Role::Owner),
            "caja" | "cashier" => Ok(Role::Cashier),
            "estilista" | "stylist" => Ok(Role::Stylist),
            other => Err(ValidationError::invalid_format(
                "role",
                format!("unknown role '{}'", other),
            )),
        }
    }
}

// =============================================================================
// Catalog Records
// =============================================================================

/// A salon user; stylists are the users with [`Role::Stylist`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StaffMember {
    #[serde(skip)]
    pub id: String,
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub phone: String,
    pub active: bool,
}

impl StaffMember {
    /// Returns true when this user can be assigned to service lines.
    pub fn is_active_stylist(&self) -> bool {
        self.active && self.role == Role::Stylist
    }

    /// Returns the stylist view of this user, if they are one.
    pub fn as_stylist(&self) -> Option<Stylist> {
        (self.role == Role::Stylist).then(|| Stylist {
            id: self.id.clone(),
            name: self.name.clone(),
            active: self.active,
        })
    }
}

/// A service provider assignable to service lines and eligible for tips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Stylist {
    pub id: String,
    pub name: String,
    pub active: bool,
}

/// A service offered by the salon (haircut, colour, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Service {
    #[serde(skip)]
    pub id: String,
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    pub active: bool,
}

/// A physical product sold at the front desk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    #[serde(skip)]
    pub id: String,
    pub name: String,
    pub price: Money,
    /// Informational only; selling does not deduct stock.
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub category: Option<String>,
    pub active: bool,
}

/// A pre-paid bundle of `quantity` units of one service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Package {
    #[serde(skip)]
    pub id: String,
    pub name: String,
    pub service_id: String,
    pub service_name: String,
    /// Credits granted per package bought.
    pub quantity: u32,
    pub price: Money,
    pub active: bool,
}

/// Denormalised client reference carried by appointments.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ClientRef {
    #[serde(rename = "clientId", default)]
    pub id: Option<String>,
    #[serde(rename = "clientName")]
    pub name: String,
    #[serde(rename = "clientPhone", default)]
    pub phone: String,
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a closed order was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaymentMethod {
    /// Cash.
    #[serde(rename = "efectivo")]
    Cash,
    /// Card (VISA terminal).
    #[serde(rename = "visa")]
    Card,
    /// Check.
    #[serde(rename = "cheque")]
    Check,
    /// Store credit.
    #[serde(rename = "credito")]
    Credit,
    /// Paid by redeeming pre-paid package credits.
    #[serde(rename = "paquete")]
    PackageRedemption,
}

impl PaymentMethod {
    /// All methods, in the order the close dialog offers them.
    pub const ALL: [PaymentMethod; 5] = [
        PaymentMethod::Cash,
        PaymentMethod::Card,
        PaymentMethod::Check,
        PaymentMethod::Credit,
        PaymentMethod::PackageRedemption,
    ];

    /// Returns the persisted tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "efectivo",
            PaymentMethod::Card => "visa",
            PaymentMethod::Check => "cheque",
            PaymentMethod::Credit => "credito",
            PaymentMethod::PackageRedemption => "paquete",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "efectivo" | "cash" => Ok(PaymentMethod::Cash),
            "visa" | "card" => Ok(PaymentMethod::Card),
            "cheque" | "check" => Ok(PaymentMethod::Check),
            "credito" | "crédito" | "credit" => Ok(PaymentMethod::Credit),
            "paquete" | "package" => Ok(PaymentMethod::PackageRedemption),
            other => Err(ValidationError::invalid_format(
                "payment method",
                format!(
                    "unknown method '{}'. Valid options: efectivo, visa, cheque, credito, paquete",
                    other
                ),
            )),
        }
    }
}

// =============================================================================
// Statuses
// =============================================================================

/// Order state. Orders cycle `open → closed → open` indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum OrderStatus {
    #[default]
    Open,
    Closed,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Open => write!(f, "open"),
            OrderStatus::Closed => write!(f, "closed"),
        }
    }
}

/// Appointment state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Arrived,
    InProgress,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Returns true once no further status change is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }

    /// Returns the persisted tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Arrived => "arrived",
            AppointmentStatus::InProgress => "in-progress",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-package state, always derived from `remaining`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ClientPackageStatus {
    #[default]
    Active,
    Depleted,
}

/// Older documents were written with `consumed` for a depleted package.
impl<'de> Deserialize<'de> for ClientPackageStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        match tag.as_str() {
            "active" => Ok(ClientPackageStatus::Active),
            "depleted" | "consumed" => Ok(ClientPackageStatus::Depleted),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &["active", "depleted"],
            )),
        }
    }
}

impl fmt::Display for ClientPackageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientPackageStatus::Active => write!(f, "active"),
            ClientPackageStatus::Depleted => write!(f, "depleted"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_tags() {
        for method in PaymentMethod::ALL {
            let json = serde_json::to_string(&method).unwrap();
            assert_eq!(json, format!("\"{}\"", method.as_str()));
            assert_eq!(method.as_str().parse::<PaymentMethod>().unwrap(), method);
        }
        assert_eq!("cash".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("VISA".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
        assert!("bitcoin".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_role_parsing_and_elevation() {
        assert_eq!("PROPIETARIO".parse::<Role>().unwrap(), Role::Owner);
        assert_eq!("Estilista".parse::<Role>().unwrap(), Role::Stylist);
        assert!("caja".parse::<Role>().unwrap() == Role::Cashier);
        assert!("janitor".parse::<Role>().is_err());

        assert!(Role::Owner.is_elevated());
        assert!(!Role::Cashier.is_elevated());
        assert!(!Role::Stylist.is_elevated());
    }

    #[test]
    fn test_appointment_status_tags() {
        let json = serde_json::to_string(&AppointmentStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        assert!(AppointmentStatus::Cancelled.is_terminal());
        assert!(AppointmentStatus::Completed.is_terminal());
        assert!(!AppointmentStatus::Arrived.is_terminal());
    }

    #[test]
    fn test_client_package_status_accepts_legacy_tag() {
        let status: ClientPackageStatus = serde_json::from_str("\"consumed\"").unwrap();
        assert_eq!(status, ClientPackageStatus::Depleted);
        let status: ClientPackageStatus = serde_json::from_str("\"depleted\"").unwrap();
        assert_eq!(status, ClientPackageStatus::Depleted);
        assert!(serde_json::from_str::<ClientPackageStatus>("\"gone\"").is_err());
        assert_eq!(
            serde_json::to_string(&ClientPackageStatus::Depleted).unwrap(),
            "\"depleted\""
        );
    }

    #[test]
    fn test_client_ref_field_names() {
        let client = ClientRef {
            id: Some("c1".to_string()),
            name: "Ana".to_string(),
            phone: "5555-0000".to_string(),
        };
        let value = serde_json::to_value(&client).unwrap();
        assert_eq!(value["clientId"], "c1");
        assert_eq!(value["clientName"], "Ana");
        assert_eq!(value["clientPhone"], "5555-0000");
    }

    #[test]
    fn test_staff_member_is_active_stylist() {
        let mut member = StaffMember {
            id: "u1".to_string(),
            name: "Laura".to_string(),
            role: Role::Stylist,
            phone: String::new(),
            active: true,
        };
        assert!(member.is_active_stylist());
        member.active = false;
        assert!(!member.is_active_stylist());
        assert_eq!(member.as_stylist().map(|s| s.active), Some(false));
        member.active = true;
        member.role = Role::Cashier;
        assert!(!member.is_active_stylist());
        assert!(member.as_stylist().is_none());
    }
}
