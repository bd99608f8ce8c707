//! # Client-Package Credits
//!
//! A client package is a client's remaining balance of a purchased
//! bundle of one service.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  grant(quantity = 5)     remaining 5  ── active                         │
//! │  redeem()                remaining 4  ── active                         │
//! │  ...                                                                    │
//! │  redeem()                remaining 0  ── depleted                       │
//! │  redeem()                ✗ PackageDepleted (nothing changes)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `0 <= remaining <= quantity` always holds, and `status` is always
//! derived from `remaining`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::order::PackageSaleLine;
use crate::types::{ClientPackageStatus, ClientRef, Package};
use crate::validation::{validate_name, validate_price};

/// Snapshot of the package being granted.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageGrant {
    pub package_id: String,
    pub package_name: String,
    pub service_id: String,
    pub service_name: String,
    pub quantity: i64,
    pub price: Money,
}

impl PackageGrant {
    /// Grant for one catalog package.
    pub fn from_package(package: &Package) -> Self {
        Self {
            package_id: package.id.clone(),
            package_name: package.name.clone(),
            service_id: package.service_id.clone(),
            service_name: package.service_name.clone(),
            quantity: i64::from(package.quantity),
            price: package.price,
        }
    }

    /// Grant for everything sold on an order line (all multiplied credits).
    pub fn from_sale_line(line: &PackageSaleLine) -> Self {
        Self {
            package_id: line.package_id.clone(),
            package_name: line.name.clone(),
            service_id: line.service_id.clone(),
            service_name: line.service_name.clone(),
            quantity: line.quantity,
            price: line.subtotal,
        }
    }
}

/// A credit ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ClientPackage {
    #[serde(skip)]
    pub id: String,
    pub client_id: String,
    pub client_name: String,
    pub package_id: String,
    pub package_name: String,
    pub service_id: String,
    pub service_name: String,
    /// Credits granted at purchase.
    pub quantity: i64,
    pub remaining: i64,
    pub price: Money,
    pub status: ClientPackageStatus,
    #[ts(as = "String")]
    pub purchased_at: DateTime<Utc>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub last_used_at: Option<DateTime<Utc>>,
}

/// Status implied by a remaining balance.
#[inline]
pub fn status_for(remaining: i64) -> ClientPackageStatus {
    if remaining == 0 {
        ClientPackageStatus::Depleted
    } else {
        ClientPackageStatus::Active
    }
}

impl ClientPackage {
    /// Creates a fresh entry with `remaining = quantity`.
    ///
    /// The client must have an identifier; credits are looked up by it.
    pub fn grant(
        id: String,
        client: &ClientRef,
        grant: PackageGrant,
        now: DateTime<Utc>,
    ) -> CoreResult<Self> {
        let client_id = client
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ValidationError::required("client id"))?;
        validate_name("client name", &client.name)?;
        validate_price("package price", grant.price)?;
        if grant.quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "package quantity".to_string(),
            }
            .into());
        }

        Ok(Self {
            id,
            client_id,
            client_name: client.name.clone(),
            package_id: grant.package_id,
            package_name: grant.package_name,
            service_id: grant.service_id,
            service_name: grant.service_name,
            quantity: grant.quantity,
            remaining: grant.quantity,
            price: grant.price,
            status: ClientPackageStatus::Active,
            purchased_at: now,
            last_used_at: None,
        })
    }

    /// Uses one credit. Rejected when nothing is left.
    pub fn redeem(&mut self, now: DateTime<Utc>) -> CoreResult<i64> {
        if self.remaining <= 0 {
            return Err(CoreError::PackageDepleted {
                id: self.id.clone(),
            });
        }

        self.remaining -= 1;
        self.status = status_for(self.remaining);
        self.last_used_at = Some(now);
        Ok(self.remaining)
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }

    /// Checks the stored balance against the granted quantity.
    pub fn check_invariants(&self) -> Result<(), ValidationError> {
        if self.remaining < 0 || self.remaining > self.quantity {
            return Err(ValidationError::OutOfRange {
                field: "remaining".to_string(),
                min: 0,
                max: self.quantity,
            });
        }
        if self.status != status_for(self.remaining) {
            return Err(ValidationError::invalid_format(
                "status",
                format!("{} does not match remaining {}", self.status, self.remaining),
            ));
        }
        Ok(())
    }
}
