//! # Order Ledger
//!
//! Owns the life of an order (comanda).
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   booking ──► OPEN ──── close(method) ────► CLOSED                     │
//! │                 ▲                              │                        │
//! │                 └────── reopen() [owner] ──────┘                        │
//! │                                                                         │
//! │   • save() writes lines + totals, never status                         │
//! │   • close() writes lines + totals + closed fields in one update        │
//! │   • orders can cycle open/closed any number of times                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes always work on a copy of the editor's order. The editor only
//! takes the new state once the store accepted it, so a failed write
//! leaves the screen as it was.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use tracing::{debug, info, warn};

use salon_core::time::{business_today, business_yesterday};
use salon_core::{Appointment, CoreError, Order, PaymentMethod};
use salon_db::{CatalogRepository, Database, OrderRepository};

use crate::error::{ApiError, ApiResult};
use crate::session::Session;
use crate::state::{CatalogSnapshot, OrderEditor};

#[derive(Clone)]
pub struct OrderLedger {
    orders: OrderRepository,
    catalog: CatalogRepository,
    offset: FixedOffset,
}

impl OrderLedger {
    /// `offset` is the business timezone used for "today"/"yesterday".
    pub fn new(db: &Database, offset: FixedOffset) -> Self {
        OrderLedger {
            orders: db.orders(),
            catalog: db.catalog(),
            offset,
        }
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Builds (does not write) the empty order for an appointment,
    /// drawing its order number.
    pub async fn prepare_for_appointment(
        &self,
        appointment: &Appointment,
        now: DateTime<Utc>,
    ) -> ApiResult<Order> {
        let number = self.orders.next_order_number().await?;
        debug!(appointment_id = %appointment.id, order_number = number, "Order number drawn");
        Ok(Order::from_appointment(
            appointment.new_order(salon_core::new_id()),
            number,
            now,
        ))
    }

    /// Creates the order of an appointment that does not have one yet.
    ///
    /// Returns the existing order when there already is one.
    pub async fn create_for_appointment(&self, appointment: &Appointment) -> ApiResult<Order> {
        if let Some(existing) = self.orders.find_by_appointment(&appointment.id).await? {
            debug!(appointment_id = %appointment.id, "Appointment already has an order");
            return Ok(existing);
        }

        let order = self.prepare_for_appointment(appointment, Utc::now()).await?;
        self.orders.insert(&order).await?;
        info!(
            order_id = %order.id,
            order_number = order.order_number,
            appointment_id = %appointment.id,
            "Order created"
        );
        Ok(order)
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub async fn get(&self, id: &str) -> ApiResult<Order> {
        self.orders
            .get(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Order", id))
    }

    pub async fn find_by_appointment(&self, appointment_id: &str) -> ApiResult<Option<Order>> {
        Ok(self.orders.find_by_appointment(appointment_id).await?)
    }

    /// Orders of the current business day, newest first.
    pub async fn list_today(&self) -> ApiResult<Vec<Order>> {
        self.list_by_date(business_today(Utc::now(), self.offset)).await
    }

    /// Orders of the previous business day, newest first.
    pub async fn list_yesterday(&self) -> ApiResult<Vec<Order>> {
        self.list_by_date(business_yesterday(Utc::now(), self.offset))
            .await
    }

    pub async fn list_by_date(&self, date: NaiveDate) -> ApiResult<Vec<Order>> {
        Ok(self.orders.list_by_date(date).await?)
    }

    /// Case-insensitive client-name search, newest first.
    pub async fn search_by_client(&self, query: &str) -> ApiResult<Vec<Order>> {
        Ok(self.orders.search_by_client(query).await?)
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Loads an order and the active catalog into an editor.
    ///
    /// On first open the service lines are created from the active
    /// service catalog and written, so later opens see the same snapshot.
    pub async fn open_for_edit(&self, session: &Session, id: &str) -> ApiResult<OrderEditor> {
        debug!(order_id = id, user = %session.user_id, "Opening order for edit");
        let mut order = self.get(id).await?;
        let catalog = CatalogSnapshot::load(&self.catalog).await?;

        let had_services = !order.services.is_empty();
        if let Err(e) = order.open_for_edit(session.role, &catalog.services) {
            warn!(order_number = order.order_number, role = %session.role, "Open for edit rejected: {}", e);
            return Err(e.into());
        }

        if !had_services && !order.services.is_empty() && order.is_open() {
            order.prepare_save(Utc::now());
            self.orders.save_lines_and_totals(&order).await?;
            debug!(order_number = order.order_number, lines = order.services.len(), "Service lines initialized");
        }

        Ok(OrderEditor::new(order, catalog))
    }

    /// Persists line items and fresh totals. Status is untouched.
    pub async fn save(&self, editor: &mut OrderEditor) -> ApiResult<()> {
        let mut order = editor.order().clone();
        if order.is_closed() {
            return Err(CoreError::InvalidOrderStatus {
                order_number: order.order_number,
                current_status: order.status.to_string(),
                action: "save".to_string(),
            }
            .into());
        }

        order.prepare_save(Utc::now());
        self.orders.save_lines_and_totals(&order).await?;
        debug!(order_number = order.order_number, total = %order.totals.total, "Order saved");

        *editor.order_mut() = order;
        Ok(())
    }

    /// Closes the order with a payment method.
    ///
    /// Lines, totals and the closed fields go out in a single update, so
    /// the stored order is never half closed.
    pub async fn close(
        &self,
        editor: &mut OrderEditor,
        method: PaymentMethod,
        session: &Session,
    ) -> ApiResult<()> {
        let mut order = editor.order().clone();
        if let Err(e) = order.close(method, &session.user_id, Utc::now()) {
            warn!(order_number = order.order_number, "Close rejected: {}", e);
            return Err(e.into());
        }

        self.orders.save(&order).await?;
        info!(
            order_number = order.order_number,
            total = %order.totals.total,
            method = %method,
            closed_by = %session.user_id,
            "Order closed"
        );

        *editor.order_mut() = order;
        Ok(())
    }

    /// Reopens a closed order. Owner only.
    pub async fn reopen(&self, session: &Session, id: &str) -> ApiResult<Order> {
        let mut order = self.get(id).await?;
        if let Err(e) = order.reopen(session.role, &session.user_id, Utc::now()) {
            warn!(order_number = order.order_number, role = %session.role, "Reopen rejected: {}", e);
            return Err(e.into());
        }

        self.orders.save(&order).await?;
        info!(order_number = order.order_number, reopened_by = %session.user_id, "Order reopened");
        Ok(order)
    }
}
