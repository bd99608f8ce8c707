//! # Order Ledger Rules
//!
//! The order (comanda) is a client visit's running bill. This module owns
//! every rule about its line items, tips, totals and open/closed state.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Order Lifecycle                                │
//! │                                                                         │
//! │   book appointment                                                      │
//! │         │                                                               │
//! │         ▼                                                               │
//! │   ┌──────────┐   close(method)   ┌──────────┐                           │
//! │   │   OPEN   │ ────────────────► │  CLOSED  │                           │
//! │   │          │ ◄──────────────── │          │                           │
//! │   └──────────┘   reopen (owner)  └──────────┘                           │
//! │        │                                                                │
//! │        ├── assign_stylist / toggle_service                              │
//! │        ├── add_product / remove_product                                 │
//! │        ├── add_package_sale / remove_package_sale                       │
//! │        └── set_tip                                                      │
//! │                                                                         │
//! │   No terminal state: orders can cycle open/closed indefinitely.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Totals
//! ```text
//! subtotalServices = Σ price of selected service lines
//! subtotalProducts = Σ product line subtotals
//! subtotalPackages = Σ package-sale line subtotals
//! subtotal         = subtotalServices + subtotalProducts + subtotalPackages
//! totalTips        = Σ tip amounts
//! total            = subtotal + totalTips
//! ```
//! Totals are always recomputed from the line items, never patched.
//! Every mutation refreshes them, and so do save and close.
//!
//! ## Atomicity
//! Each operation checks all of its preconditions before touching the
//! order. An `Err` means nothing changed.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{ClientRef, OrderStatus, Package, PaymentMethod, Product, Role, Service, Stylist};
use crate::validation::{validate_line_index, validate_multiplier, validate_price, validate_quantity};

/// Order numbers continue from this value; the first order ever is 60288.
pub const ORDER_NUMBER_BASELINE: i64 = 60287;

// =============================================================================
// Line Items
// =============================================================================

/// One selectable service on the order.
///
/// Every active service is offered as a line; only `selected` lines count
/// toward the total, and a line can only be selected once a stylist is
/// assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ServiceLine {
    pub service_id: String,
    pub name: String,
    /// Snapshot of the catalog price when the line was created.
    pub price: Money,
    #[serde(default)]
    pub stylist_id: Option<String>,
    #[serde(default)]
    pub stylist_name: Option<String>,
    #[serde(default)]
    pub selected: bool,
}

impl ServiceLine {
    /// Creates an unassigned, unselected line from a catalog service.
    pub fn from_service(service: &Service) -> Self {
        Self {
            service_id: service.id.clone(),
            name: service.name.clone(),
            price: service.price,
            stylist_id: None,
            stylist_name: None,
            selected: false,
        }
    }
}

/// A product sold on the order. Price is snapshotted at add time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductLine {
    pub product_id: String,
    pub name: String,
    pub price: Money,
    pub quantity: i64,
    pub subtotal: Money,
}

/// A service package sold on the order.
///
/// Recording the sale does not grant credits to the client; that is a
/// separate step on the client-package ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PackageSaleLine {
    pub package_id: String,
    pub name: String,
    pub service_id: String,
    pub service_name: String,
    /// Total credits sold: catalog quantity × multiplier.
    pub quantity: i64,
    /// Unit price of one package.
    pub price: Money,
    /// price × multiplier.
    pub subtotal: Money,
    /// How many packages were bought.
    pub quantity_purchased: i64,
    /// Id of the client-package entry these credits went to, once granted.
    #[serde(default)]
    pub granted: Option<String>,
}

/// Tip for one stylist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Tip {
    pub stylist_name: String,
    pub amount: Money,
}

/// Derived monetary totals, flattened into the order document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderTotals {
    pub subtotal_services: Money,
    pub subtotal_products: Money,
    pub subtotal_packages: Money,
    pub subtotal: Money,
    pub total_tips: Money,
    pub total: Money,
}

// =============================================================================
// Order
// =============================================================================

/// Input for creating the order of a freshly booked appointment.
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Identifier for the new order document.
    pub id: String,
    pub appointment_id: String,
    pub client: ClientRef,
    pub date: NaiveDate,
}

/// A client visit's running bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Order {
    #[serde(skip)]
    pub id: String,
    pub order_number: i64,
    pub appointment_id: String,
    #[serde(default)]
    pub client_id: Option<String>,
    pub client_name: String,
    #[serde(default)]
    pub client_phone: String,
    /// Business day of the visit, `YYYY-MM-DD`.
    #[ts(as = "String")]
    pub date: NaiveDate,

    #[serde(default)]
    pub services: Vec<ServiceLine>,
    #[serde(default)]
    pub products: Vec<ProductLine>,
    #[serde(default)]
    pub packages_sold: Vec<PackageSaleLine>,
    /// Keyed by stylist id.
    #[serde(default)]
    pub tips: BTreeMap<String, Tip>,

    #[serde(flatten)]
    pub totals: OrderTotals,

    pub status: OrderStatus,
    /// Method of the most recent close. Kept when the order is reopened.
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closed_by: Option<String>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub reopened_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reopened_by: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Creates the empty, open order for a booked appointment.
    pub fn from_appointment(new: NewOrder, order_number: i64, now: DateTime<Utc>) -> Self {
        Self {
            id: new.id,
            order_number,
            appointment_id: new.appointment_id,
            client_id: new.client.id,
            client_name: new.client.name,
            client_phone: new.client.phone,
            date: new.date,
            services: Vec::new(),
            products: Vec::new(),
            packages_sold: Vec::new(),
            tips: BTreeMap::new(),
            totals: OrderTotals::default(),
            status: OrderStatus::Open,
            payment_method: None,
            paid: false,
            closed_at: None,
            closed_by: None,
            reopened_at: None,
            reopened_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == OrderStatus::Open
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.status == OrderStatus::Closed
    }

    fn ensure_open(&self, action: &str) -> CoreResult<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(CoreError::InvalidOrderStatus {
                order_number: self.order_number,
                current_status: self.status.to_string(),
                action: action.to_string(),
            })
        }
    }

    // -------------------------------------------------------------------------
    // Opening
    // -------------------------------------------------------------------------

    /// Prepares the order for the editor.
    ///
    /// A closed order can only be opened by the owner, and stays
    /// view-only until reopened. When the order has no service lines yet,
    /// one unselected line per active service is created.
    pub fn open_for_edit(&mut self, role: Role, active_services: &[Service]) -> CoreResult<()> {
        if self.is_closed() && !role.is_elevated() {
            return Err(CoreError::permission_denied("opening a closed order"));
        }

        if self.services.is_empty() {
            self.services = active_services
                .iter()
                .filter(|s| s.active)
                .map(ServiceLine::from_service)
                .collect();
        }

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Service Lines
    // -------------------------------------------------------------------------

    /// Records the stylist on a service line. Does not select the line.
    pub fn assign_stylist(&mut self, index: usize, stylist: &Stylist) -> CoreResult<()> {
        self.ensure_open("assign a stylist")?;
        validate_line_index("service", index, self.services.len())?;
        if !stylist.active {
            return Err(CoreError::not_in_catalog("stylist", &stylist.id));
        }

        let line = &mut self.services[index];
        line.stylist_id = Some(stylist.id.clone());
        line.stylist_name = Some(stylist.name.clone());
        self.drop_orphaned_tips();
        self.refresh_totals();
        Ok(())
    }

    /// Flips `selected` on a service line and returns the new value.
    ///
    /// Rejected when no stylist is assigned to the line.
    pub fn toggle_service(&mut self, index: usize) -> CoreResult<bool> {
        self.ensure_open("select a service")?;
        validate_line_index("service", index, self.services.len())?;

        let line = &mut self.services[index];
        if line.stylist_id.is_none() {
            return Err(CoreError::StylistRequired {
                service: line.name.clone(),
            });
        }

        line.selected = !line.selected;
        let selected = line.selected;
        self.drop_orphaned_tips();
        self.refresh_totals();
        Ok(selected)
    }

    /// Ids of the stylists on selected service lines, in line order.
    pub fn assigned_stylists(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for line in self.services.iter().filter(|l| l.selected) {
            if let Some(id) = &line.stylist_id {
                if !ids.contains(id) {
                    ids.push(id.clone());
                }
            }
        }
        ids
    }

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    /// Appends a product line with `subtotal = price × quantity`.
    pub fn add_product(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        self.ensure_open("add a product")?;
        if !product.active {
            return Err(CoreError::not_in_catalog("product", &product.id));
        }
        validate_quantity(quantity)?;

        self.products.push(ProductLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            quantity,
            subtotal: product.price * quantity,
        });
        self.refresh_totals();
        Ok(())
    }

    /// Removes a product line. No inventory side effect.
    pub fn remove_product(&mut self, index: usize) -> CoreResult<ProductLine> {
        self.ensure_open("remove a product")?;
        if index >= self.products.len() {
            return Err(CoreError::LineNotFound {
                kind: "product".to_string(),
                index,
            });
        }

        let line = self.products.remove(index);
        self.refresh_totals();
        Ok(line)
    }

    // -------------------------------------------------------------------------
    // Package Sales
    // -------------------------------------------------------------------------

    /// Records the sale of `multiplier` packages.
    pub fn add_package_sale(&mut self, package: &Package, multiplier: i64) -> CoreResult<()> {
        self.ensure_open("sell a package")?;
        if !package.active {
            return Err(CoreError::not_in_catalog("package", &package.id));
        }
        validate_multiplier(multiplier)?;

        self.packages_sold.push(PackageSaleLine {
            package_id: package.id.clone(),
            name: package.name.clone(),
            service_id: package.service_id.clone(),
            service_name: package.service_name.clone(),
            quantity: i64::from(package.quantity) * multiplier,
            price: package.price,
            subtotal: package.price * multiplier,
            quantity_purchased: multiplier,
            granted: None,
        });
        self.refresh_totals();
        Ok(())
    }

    /// Removes a package-sale line. A line whose credits were granted stays.
    pub fn remove_package_sale(&mut self, index: usize) -> CoreResult<PackageSaleLine> {
        self.ensure_open("remove a package")?;
        let line = self.packages_sold.get(index).ok_or(CoreError::LineNotFound {
            kind: "package".to_string(),
            index,
        })?;
        if let Some(client_package_id) = &line.granted {
            return Err(CoreError::PackageAlreadyGranted {
                order_number: self.order_number,
                index,
                client_package_id: client_package_id.clone(),
            });
        }

        let line = self.packages_sold.remove(index);
        self.refresh_totals();
        Ok(line)
    }

    // -------------------------------------------------------------------------
    // Tips
    // -------------------------------------------------------------------------

    /// Sets (overwrites) the tip for a stylist on a selected service line.
    pub fn set_tip(&mut self, stylist: &Stylist, amount: Money) -> CoreResult<()> {
        self.ensure_open("set a tip")?;
        validate_price("tip", amount)?;
        if !self.assigned_stylists().contains(&stylist.id) {
            return Err(CoreError::TipNotAllowed {
                stylist_id: stylist.id.clone(),
            });
        }

        self.tips.insert(
            stylist.id.clone(),
            Tip {
                stylist_name: stylist.name.clone(),
                amount,
            },
        );
        self.refresh_totals();
        Ok(())
    }

    /// Removes tips of stylists no longer on a selected service line.
    fn drop_orphaned_tips(&mut self) {
        let assigned = self.assigned_stylists();
        self.tips.retain(|stylist_id, _| assigned.contains(stylist_id));
    }

    // -------------------------------------------------------------------------
    // Totals
    // -------------------------------------------------------------------------

    /// Computes totals from the current line items. Pure.
    pub fn compute_totals(&self) -> OrderTotals {
        let subtotal_services: Money = self
            .services
            .iter()
            .filter(|l| l.selected)
            .map(|l| l.price)
            .sum();
        let subtotal_products: Money = self.products.iter().map(|l| l.subtotal).sum();
        let subtotal_packages: Money = self.packages_sold.iter().map(|l| l.subtotal).sum();
        let subtotal = subtotal_services + subtotal_products + subtotal_packages;
        let total_tips: Money = self.tips.values().map(|t| t.amount).sum();

        OrderTotals {
            subtotal_services,
            subtotal_products,
            subtotal_packages,
            subtotal,
            total_tips,
            total: subtotal + total_tips,
        }
    }

    /// Replaces the stored totals with freshly computed ones.
    pub fn refresh_totals(&mut self) -> &OrderTotals {
        self.totals = self.compute_totals();
        &self.totals
    }

    /// Prepares an in-place save: totals recomputed, `updatedAt` bumped.
    /// Status is untouched.
    pub fn prepare_save(&mut self, now: DateTime<Utc>) {
        self.drop_orphaned_tips();
        self.refresh_totals();
        self.updated_at = now;
    }

    // -------------------------------------------------------------------------
    // State Transitions
    // -------------------------------------------------------------------------

    /// Closes the order.
    ///
    /// ## Preconditions
    /// - status is `open`
    /// - recomputed total is greater than zero
    ///
    /// Tips of stylists without a selected service line are dropped first.
    pub fn close(
        &mut self,
        method: PaymentMethod,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        self.ensure_open("close")?;

        let mut closing = self.clone();
        closing.drop_orphaned_tips();
        let totals = closing.compute_totals();
        if !totals.total.is_positive() {
            return Err(CoreError::EmptyOrder {
                order_number: self.order_number,
            });
        }

        self.tips = closing.tips;
        self.totals = totals;
        self.status = OrderStatus::Closed;
        self.payment_method = Some(method);
        self.paid = true;
        self.closed_at = Some(now);
        self.closed_by = Some(user_id.to_string());
        self.updated_at = now;
        Ok(())
    }

    /// Reopens a closed order. Owner only.
    ///
    /// The last close (method, paid, closedAt, closedBy) is kept as
    /// history; line items and totals are untouched.
    pub fn reopen(&mut self, role: Role, user_id: &str, now: DateTime<Utc>) -> CoreResult<()> {
        if !role.is_elevated() {
            return Err(CoreError::permission_denied("reopening an order"));
        }
        if !self.is_closed() {
            return Err(CoreError::InvalidOrderStatus {
                order_number: self.order_number,
                current_status: self.status.to_string(),
                action: "reopen".to_string(),
            });
        }

        self.status = OrderStatus::Open;
        self.reopened_at = Some(now);
        self.reopened_by = Some(user_id.to_string());
        self.updated_at = now;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Package Credits
    // -------------------------------------------------------------------------

    /// The client the order was booked for.
    pub fn client(&self) -> ClientRef {
        ClientRef {
            id: self.client_id.clone(),
            name: self.client_name.clone(),
            phone: self.client_phone.clone(),
        }
    }

    /// Records that the credits of a sold package line went to
    /// `client_package_id`.
    ///
    /// ## Preconditions
    /// - the order is closed and paid
    /// - the line exists and was not granted before
    pub fn mark_package_granted(
        &mut self,
        index: usize,
        client_package_id: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<&PackageSaleLine> {
        if !self.is_closed() || !self.paid {
            return Err(CoreError::InvalidOrderStatus {
                order_number: self.order_number,
                current_status: self.status.to_string(),
                action: "grant package credits".to_string(),
            });
        }
        let order_number = self.order_number;
        let line = self
            .packages_sold
            .get_mut(index)
            .ok_or(CoreError::LineNotFound {
                kind: "package".to_string(),
                index,
            })?;
        if let Some(existing) = &line.granted {
            return Err(CoreError::PackageAlreadyGranted {
                order_number,
                index,
                client_package_id: existing.clone(),
            });
        }

        line.granted = Some(client_package_id.to_string());
        self.updated_at = now;
        Ok(&self.packages_sold[index])
    }
}

// =============================================================================
// Input Helpers
// =============================================================================

/// Parses the tip text field (whole quetzales).
///
/// Reads a leading integer the way a lenient form does: `"20"` and
/// `"20.50"` give Q20, empty or non-numeric text gives zero. A negative
/// amount is rejected.
///
/// ## Example
/// ```rust
/// use salon_core::money::Money;
/// use salon_core::order::parse_tip_amount;
///
/// assert_eq!(parse_tip_amount("20").unwrap(), Money::from_quetzales(20));
/// assert_eq!(parse_tip_amount("abc").unwrap(), Money::zero());
/// assert!(parse_tip_amount("-5").is_err());
/// ```
pub fn parse_tip_amount(raw: &str) -> Result<Money, ValidationError> {
    let text = raw.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let leading: String = digits.chars().take_while(|c| c.is_ascii_digit()).collect();
    if leading.is_empty() {
        return Ok(Money::zero());
    }

    let quetzales: i64 = leading.parse().map_err(|_| ValidationError::OutOfRange {
        field: "tip".to_string(),
        min: 0,
        max: i64::MAX / 100,
    })?;

    if negative && quetzales > 0 {
        return Err(ValidationError::Negative {
            field: "tip".to_string(),
        });
    }

    quetzales
        .checked_mul(100)
        .map(Money::from_cents)
        .ok_or(ValidationError::OutOfRange {
            field: "tip".to_string(),
            min: 0,
            max: i64::MAX / 100,
        })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 16, 0, 0).unwrap()
    }

    fn service(id: &str, name: &str, quetzales: i64) -> Service {
        Service {
            id: id.to_string(),
            name: name.to_string(),
            price: Money::from_quetzales(quetzales),
            duration_minutes: None,
            active: true,
        }
    }

    fn product(id: &str, quetzales: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            price: Money::from_quetzales(quetzales),
            stock: 10,
            category: None,
            active: true,
        }
    }

    fn package(id: &str, credits: u32, quetzales: i64) -> Package {
        Package {
            id: id.to_string(),
            name: format!("Package {}", id),
            service_id: "svc-cut".to_string(),
            service_name: "Corte".to_string(),
            quantity: credits,
            price: Money::from_quetzales(quetzales),
            active: true,
        }
    }

    fn stylist(id: &str) -> Stylist {
        Stylist {
            id: id.to_string(),
            name: format!("Stylist {}", id),
            active: true,
        }
    }

    fn catalog() -> Vec<Service> {
        vec![
            service("svc-cut", "Corte", 150),
            service("svc-color", "Tinte", 300),
            Service {
                active: false,
                ..service("svc-old", "Retired", 80)
            },
        ]
    }

    fn new_order() -> Order {
        let mut order = Order::from_appointment(
            NewOrder {
                id: "order-1".to_string(),
                appointment_id: "appt-1".to_string(),
                client: ClientRef {
                    id: None,
                    name: "Ana".to_string(),
                    phone: "5555-1234".to_string(),
                },
                date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            },
            ORDER_NUMBER_BASELINE + 1,
            now(),
        );
        order.open_for_edit(Role::Cashier, &catalog()).unwrap();
        order
    }

    fn assert_totals_consistent(order: &Order) {
        let t = order.totals;
        assert_eq!(t, order.compute_totals());
        assert_eq!(
            t.subtotal,
            t.subtotal_services + t.subtotal_products + t.subtotal_packages
        );
        assert_eq!(t.total, t.subtotal + t.total_tips);
    }

    #[test]
    fn test_new_order_is_open_and_zeroed() {
        let order = Order::from_appointment(
            NewOrder {
                id: "o".to_string(),
                appointment_id: "a".to_string(),
                client: ClientRef::default(),
                date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            },
            60288,
            now(),
        );
        assert!(order.is_open());
        assert_eq!(order.order_number, 60288);
        assert_eq!(order.totals, OrderTotals::default());
        assert!(order.services.is_empty());
        assert!(order.products.is_empty());
        assert!(order.packages_sold.is_empty());
        assert!(order.tips.is_empty());
        assert!(!order.paid);
    }

    #[test]
    fn test_open_for_edit_initialises_active_services_once() {
        let order = new_order();
        assert_eq!(order.services.len(), 2);
        assert!(order.services.iter().all(|l| !l.selected && l.stylist_id.is_none()));

        // catalog price changes do not touch existing lines
        let mut order = order;
        let repriced = vec![service("svc-cut", "Corte", 999)];
        order.open_for_edit(Role::Cashier, &repriced).unwrap();
        assert_eq!(order.services.len(), 2);
        assert_eq!(order.services[0].price, Money::from_quetzales(150));
    }

    #[test]
    fn test_closed_order_requires_owner_to_open() {
        let mut order = new_order();
        order.add_product(&product("p1", 50), 1).unwrap();
        order.close(PaymentMethod::Cash, "cashier-1", now()).unwrap();

        let err = order.open_for_edit(Role::Cashier, &catalog()).unwrap_err();
        assert!(err.is_permission());
        assert!(order.open_for_edit(Role::Owner, &catalog()).is_ok());

        // view-only until reopened
        assert!(matches!(
            order.add_product(&product("p2", 10), 1),
            Err(CoreError::InvalidOrderStatus { .. })
        ));
    }

    #[test]
    fn test_toggle_requires_stylist() {
        let mut order = new_order();
        let err = order.toggle_service(0).unwrap_err();
        assert!(matches!(err, CoreError::StylistRequired { .. }));
        assert!(!order.services[0].selected);
        assert!(order.totals.total.is_zero());
    }

    #[test]
    fn test_toggle_is_reversible() {
        let mut order = new_order();
        order.assign_stylist(0, &stylist("x")).unwrap();
        assert!(!order.services[0].selected);

        assert!(order.toggle_service(0).unwrap());
        assert_eq!(order.totals.subtotal_services, Money::from_quetzales(150));
        assert!(!order.toggle_service(0).unwrap());
        assert!(order.totals.subtotal_services.is_zero());
    }

    #[test]
    fn test_assign_stylist_rejects_bad_input() {
        let mut order = new_order();
        assert!(order.assign_stylist(7, &stylist("x")).is_err());
        let inactive = Stylist {
            active: false,
            ..stylist("y")
        };
        assert!(matches!(
            order.assign_stylist(0, &inactive),
            Err(CoreError::NotInCatalog { .. })
        ));
        assert!(order.services[0].stylist_id.is_none());
    }

    #[test]
    fn test_product_lines() {
        let mut order = new_order();
        order.add_product(&product("p1", 50), 2).unwrap();
        assert_eq!(order.products[0].subtotal, Money::from_quetzales(100));
        assert_eq!(order.totals.subtotal_products, Money::from_quetzales(100));

        assert!(order.add_product(&product("p2", 50), 0).is_err());
        let inactive = Product {
            active: false,
            ..product("p3", 5)
        };
        assert!(order.add_product(&inactive, 1).is_err());
        assert_eq!(order.products.len(), 1);

        let removed = order.remove_product(0).unwrap();
        assert_eq!(removed.product_id, "p1");
        assert!(order.totals.total.is_zero());
        assert!(matches!(
            order.remove_product(0),
            Err(CoreError::LineNotFound { .. })
        ));
    }

    #[test]
    fn test_package_sale_lines() {
        let mut order = new_order();
        order.add_package_sale(&package("pk", 5, 600), 2).unwrap();

        let line = &order.packages_sold[0];
        assert_eq!(line.quantity, 10);
        assert_eq!(line.quantity_purchased, 2);
        assert_eq!(line.subtotal, Money::from_quetzales(1200));
        assert_eq!(order.totals.subtotal_packages, Money::from_quetzales(1200));
        assert_eq!(order.totals.total, Money::from_quetzales(1200));

        order.remove_package_sale(0).unwrap();
        assert!(order.packages_sold.is_empty());
        assert!(order.totals.total.is_zero());
    }

    #[test]
    fn test_tip_requires_selected_stylist() {
        let mut order = new_order();
        order.assign_stylist(0, &stylist("x")).unwrap();

        // assigned but not selected
        assert!(matches!(
            order.set_tip(&stylist("x"), Money::from_quetzales(20)),
            Err(CoreError::TipNotAllowed { .. })
        ));

        order.toggle_service(0).unwrap();
        order.set_tip(&stylist("x"), Money::from_quetzales(20)).unwrap();
        order.set_tip(&stylist("x"), Money::from_quetzales(25)).unwrap();
        assert_eq!(order.tips.len(), 1);
        assert_eq!(order.totals.total_tips, Money::from_quetzales(25));

        assert!(order.set_tip(&stylist("x"), Money::from_cents(-1)).is_err());
        assert_eq!(order.assigned_stylists(), vec!["x".to_string()]);
    }

    #[test]
    fn test_deselecting_a_line_drops_its_tip() {
        let mut order = new_order();
        order.assign_stylist(0, &stylist("x")).unwrap();
        order.toggle_service(0).unwrap();
        order.set_tip(&stylist("x"), Money::from_quetzales(20)).unwrap();
        assert_eq!(order.totals.total, Money::from_quetzales(170));

        assert!(!order.toggle_service(0).unwrap());
        assert!(order.tips.is_empty());
        assert!(order.totals.total.is_zero());
        assert_totals_consistent(&order);

        // nothing left to charge
        let err = order.close(PaymentMethod::Cash, "u1", now()).unwrap_err();
        assert!(matches!(err, CoreError::EmptyOrder { .. }));
    }

    #[test]
    fn test_reassigning_a_line_drops_the_previous_stylists_tip() {
        let mut order = new_order();
        order.assign_stylist(0, &stylist("x")).unwrap();
        order.toggle_service(0).unwrap();
        order.set_tip(&stylist("x"), Money::from_quetzales(20)).unwrap();

        order.assign_stylist(0, &stylist("y")).unwrap();
        assert!(order.tips.is_empty());
        assert_eq!(order.totals.total, Money::from_quetzales(150));

        // a stylist still on another selected line keeps the tip
        order.assign_stylist(1, &stylist("y")).unwrap();
        order.toggle_service(1).unwrap();
        order.set_tip(&stylist("y"), Money::from_quetzales(10)).unwrap();
        order.toggle_service(0).unwrap();
        assert_eq!(order.totals.total_tips, Money::from_quetzales(10));
        assert_totals_consistent(&order);
    }

    #[test]
    fn test_close_ignores_stale_tips() {
        let mut order = new_order();
        order.add_product(&product("p1", 50), 1).unwrap();
        // as if loaded from a document written before tips were pruned
        order.tips.insert(
            "ghost".to_string(),
            Tip {
                stylist_name: "Ghost".to_string(),
                amount: Money::from_quetzales(20),
            },
        );

        order.close(PaymentMethod::Cash, "u1", now()).unwrap();
        assert!(order.tips.is_empty());
        assert_eq!(order.totals.total, Money::from_quetzales(50));
    }

    #[test]
    fn test_package_line_granted_once_after_payment() {
        let mut order = new_order();
        order.add_package_sale(&package("pk", 5, 600), 1).unwrap();

        // still open
        assert!(matches!(
            order.mark_package_granted(0, "cp-1", now()),
            Err(CoreError::InvalidOrderStatus { .. })
        ));

        order.close(PaymentMethod::Cash, "u1", now()).unwrap();
        let line = order.mark_package_granted(0, "cp-1", now()).unwrap();
        assert_eq!(line.granted.as_deref(), Some("cp-1"));

        assert!(matches!(
            order.mark_package_granted(0, "cp-2", now()),
            Err(CoreError::PackageAlreadyGranted { .. })
        ));
        assert!(matches!(
            order.mark_package_granted(1, "cp-2", now()),
            Err(CoreError::LineNotFound { .. })
        ));
        assert_eq!(order.packages_sold[0].granted.as_deref(), Some("cp-1"));

        // a granted line survives a reopen
        order.reopen(Role::Owner, "owner", now()).unwrap();
        assert!(matches!(
            order.remove_package_sale(0),
            Err(CoreError::PackageAlreadyGranted { .. })
        ));
        assert_eq!(order.packages_sold.len(), 1);
    }

    #[test]
    fn test_totals_independent_of_mutation_order() {
        let mut a = new_order();
        a.add_product(&product("p1", 50), 2).unwrap();
        a.assign_stylist(1, &stylist("x")).unwrap();
        a.toggle_service(1).unwrap();
        a.add_package_sale(&package("pk", 3, 400), 1).unwrap();
        a.set_tip(&stylist("x"), Money::from_quetzales(30)).unwrap();

        let mut b = new_order();
        b.assign_stylist(1, &stylist("x")).unwrap();
        b.toggle_service(1).unwrap();
        b.set_tip(&stylist("x"), Money::from_quetzales(30)).unwrap();
        b.add_package_sale(&package("pk", 3, 400), 1).unwrap();
        b.add_product(&product("p1", 50), 2).unwrap();

        assert_totals_consistent(&a);
        assert_totals_consistent(&b);
        assert_eq!(a.totals, b.totals);
        assert_eq!(a.totals.total, Money::from_quetzales(100 + 300 + 400 + 30));
    }

    #[test]
    fn test_close_rejects_empty_order() {
        let mut order = new_order();
        let err = order.close(PaymentMethod::Cash, "u1", now()).unwrap_err();
        assert!(matches!(err, CoreError::EmptyOrder { .. }));
        assert!(order.is_open());
        assert!(order.payment_method.is_none());
        assert!(!order.paid);
    }

    #[test]
    fn test_close_then_reopen_keeps_lines_and_totals() {
        let mut order = new_order();
        order.add_product(&product("p1", 50), 2).unwrap();
        order.assign_stylist(0, &stylist("x")).unwrap();
        order.toggle_service(0).unwrap();
        let lines_before = (order.services.clone(), order.products.clone());
        let totals_before = order.totals;

        order.close(PaymentMethod::Card, "u1", now()).unwrap();
        assert!(order.is_closed());
        assert!(order.paid);
        assert_eq!(order.closed_by.as_deref(), Some("u1"));
        assert!(order.close(PaymentMethod::Card, "u1", now()).is_err());

        assert!(order.reopen(Role::Cashier, "u2", now()).unwrap_err().is_permission());
        assert!(order.is_closed());

        order.reopen(Role::Owner, "owner", now()).unwrap();
        assert!(order.is_open());
        assert_eq!((order.services.clone(), order.products.clone()), lines_before);
        assert_eq!(order.totals, totals_before);
        // history of the last close is kept
        assert_eq!(order.payment_method, Some(PaymentMethod::Card));
        assert_eq!(order.reopened_by.as_deref(), Some("owner"));

        assert!(matches!(
            order.reopen(Role::Owner, "owner", now()),
            Err(CoreError::InvalidOrderStatus { .. })
        ));
    }

    #[test]
    fn test_visit_scenario_total() {
        let mut order = new_order();
        order.add_product(&product("p1", 50), 2).unwrap();
        assert_eq!(order.totals.subtotal_products, Money::from_quetzales(100));

        order.assign_stylist(0, &stylist("x")).unwrap();
        order.toggle_service(0).unwrap();
        assert_eq!(order.totals.subtotal_services, Money::from_quetzales(150));

        let tip = parse_tip_amount("20").unwrap();
        order.set_tip(&stylist("x"), tip).unwrap();
        assert_eq!(order.totals.total, Money::from_quetzales(270));

        order.close(PaymentMethod::Cash, "cashier", now()).unwrap();
        assert!(order.is_closed());
        assert!(order.paid);
    }

    #[test]
    fn test_parse_tip_amount() {
        assert_eq!(parse_tip_amount("").unwrap(), Money::zero());
        assert_eq!(parse_tip_amount("  15 ").unwrap(), Money::from_quetzales(15));
        assert_eq!(parse_tip_amount("20.75").unwrap(), Money::from_quetzales(20));
        assert_eq!(parse_tip_amount("12abc").unwrap(), Money::from_quetzales(12));
        assert_eq!(parse_tip_amount("-0").unwrap(), Money::zero());
        assert!(matches!(
            parse_tip_amount("-5"),
            Err(ValidationError::Negative { .. })
        ));
    }

    #[test]
    fn test_document_field_names() {
        let mut order = new_order();
        order.add_product(&product("p1", 50), 1).unwrap();
        let value = serde_json::to_value(&order).unwrap();

        assert_eq!(value["orderNumber"], 60288);
        assert_eq!(value["appointmentId"], "appt-1");
        assert_eq!(value["date"], "2025-06-01");
        assert_eq!(value["status"], "open");
        assert_eq!(value["subtotalProducts"], 5000);
        assert_eq!(value["total"], 5000);
        assert!(value.get("id").is_none());
        assert!(value["packagesSold"].is_array());

        let back: Order = serde_json::from_value(value).unwrap();
        assert_eq!(back.totals, order.totals);
    }
}
