//! # Order Editor
//!
//! The view-model behind the order (comanda) screen.
//!
//! ## Editing Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Order Editor Operations                              │
//! │                                                                         │
//! │  Front-end Action        Editor Method             Order Change         │
//! │  ────────────────        ─────────────             ────────────         │
//! │                                                                         │
//! │  Pick stylist ─────────► assign_stylist(i, id) ──► services[i].stylist │
//! │                                                                         │
//! │  Tick service ─────────► toggle_service(i) ──────► services[i].selected│
//! │                                                                         │
//! │  Add product ──────────► add_product(id, qty) ───► products.push(..)   │
//! │                                                                         │
//! │  Sell package ─────────► add_package(id, n) ─────► packagesSold.push   │
//! │                                                                         │
//! │  Type tip ─────────────► set_tip(id, "20") ──────► tips[id] = 20       │
//! │                                                                         │
//! │  Every change recomputes totals. Nothing is written until the ledger   │
//! │  saves or closes the editor.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Catalog Snapshot
//! Identifiers coming from the front-end are resolved against the active
//! catalog loaded when the editor was opened. An id that is not in the
//! snapshot (unknown or inactive) is rejected with `NotInCatalog`.

use salon_core::order::parse_tip_amount;
use salon_core::{
    CoreError, CoreResult, Order, OrderTotals, Package, Product, Service, Stylist,
};
use salon_db::{CatalogRepository, DbResult};

// =============================================================================
// Catalog Snapshot
// =============================================================================

/// Active catalog entries at the moment an order was opened.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub services: Vec<Service>,
    pub products: Vec<Product>,
    pub packages: Vec<Package>,
    pub stylists: Vec<Stylist>,
}

impl CatalogSnapshot {
    /// Loads every active catalog.
    pub async fn load(catalog: &CatalogRepository) -> DbResult<Self> {
        Ok(CatalogSnapshot {
            services: catalog.active_services().await?,
            products: catalog.active_products().await?,
            packages: catalog.active_packages().await?,
            stylists: catalog.active_stylists().await?,
        })
    }

    pub fn service(&self, id: &str) -> CoreResult<&Service> {
        self.services
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| CoreError::not_in_catalog("service", id))
    }

    pub fn product(&self, id: &str) -> CoreResult<&Product> {
        self.products
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| CoreError::not_in_catalog("product", id))
    }

    pub fn package(&self, id: &str) -> CoreResult<&Package> {
        self.packages
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| CoreError::not_in_catalog("package", id))
    }

    pub fn stylist(&self, id: &str) -> CoreResult<&Stylist> {
        self.stylists
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| CoreError::not_in_catalog("stylist", id))
    }
}

// =============================================================================
// Editor
// =============================================================================

/// An order being edited, plus the catalog it is edited against.
#[derive(Debug, Clone)]
pub struct OrderEditor {
    order: Order,
    catalog: CatalogSnapshot,
}

impl OrderEditor {
    /// Wraps an order that has already passed `Order::open_for_edit`.
    pub fn new(order: Order, catalog: CatalogSnapshot) -> Self {
        OrderEditor { order, catalog }
    }

    pub fn order(&self) -> &Order {
        &self.order
    }

    pub(crate) fn order_mut(&mut self) -> &mut Order {
        &mut self.order
    }

    pub fn into_order(self) -> Order {
        self.order
    }

    pub fn catalog(&self) -> &CatalogSnapshot {
        &self.catalog
    }

    pub fn totals(&self) -> &OrderTotals {
        &self.order.totals
    }

    /// A closed order opened by the owner can be viewed but not changed
    /// until it is reopened.
    pub fn is_read_only(&self) -> bool {
        self.order.is_closed()
    }

    // -------------------------------------------------------------------------
    // Service Lines
    // -------------------------------------------------------------------------

    pub fn assign_stylist(&mut self, index: usize, stylist_id: &str) -> CoreResult<()> {
        let stylist = self.catalog.stylist(stylist_id)?;
        self.order.assign_stylist(index, stylist)
    }

    /// Returns the new `selected` value.
    pub fn toggle_service(&mut self, index: usize) -> CoreResult<bool> {
        self.order.toggle_service(index)
    }

    // -------------------------------------------------------------------------
    // Products & Packages
    // -------------------------------------------------------------------------

    pub fn add_product(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        let product = self.catalog.product(product_id)?;
        self.order.add_product(product, quantity)
    }

    pub fn remove_product(&mut self, index: usize) -> CoreResult<()> {
        self.order.remove_product(index).map(|_| ())
    }

    pub fn add_package(&mut self, package_id: &str, multiplier: i64) -> CoreResult<()> {
        let package = self.catalog.package(package_id)?;
        self.order.add_package_sale(package, multiplier)
    }

    pub fn remove_package(&mut self, index: usize) -> CoreResult<()> {
        self.order.remove_package_sale(index).map(|_| ())
    }

    // -------------------------------------------------------------------------
    // Tips
    // -------------------------------------------------------------------------

    /// Stylists that can receive a tip: those on selected service lines.
    pub fn tip_candidates(&self) -> Vec<&Stylist> {
        self.order
            .assigned_stylists()
            .iter()
            .filter_map(|id| self.catalog.stylist(id).ok())
            .collect()
    }

    /// Sets a tip from the raw text of the tip field.
    pub fn set_tip(&mut self, stylist_id: &str, raw_amount: &str) -> CoreResult<()> {
        let amount = parse_tip_amount(raw_amount)?;
        let stylist = self.catalog.stylist(stylist_id)?;
        self.order.set_tip(stylist, amount)
    }
}
