//! # Appointment Manager
//!
//! Books, updates, cancels and deletes appointments, keeping each one's
//! order in step.
//!
//! ## Appointment ↔ Order Linkage
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  book(form)                                                            │
//! │    1. validate form                       (nothing written on error)   │
//! │    2. draw order number                   (atomic counter)             │
//! │    3. commit ┌──────────────────────────────┐                          │
//! │              │ create appointments/{id}     │  one batch: both or      │
//! │              │ create orders/{id}           │  neither                 │
//! │              └──────────────────────────────┘                          │
//! │                                                                         │
//! │  cancel(id)   commit { update appointment (cancelled), delete order }  │
//! │  delete(id)   commit { delete appointment, delete order }              │
//! │               a missing order is not an error                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use salon_core::time::week_dates;
use salon_core::{Appointment, AppointmentStatus, NewAppointment, Order};
use salon_db::repository::{create_op, delete_op, update_op, Record};
use salon_db::{AppointmentRepository, Database, DocumentStore, OrderRepository, WriteBatch};

use crate::error::{ApiError, ApiResult};
use crate::services::OrderLedger;

/// A freshly booked appointment and the order created with it.
#[derive(Debug, Clone)]
pub struct Booking {
    pub appointment: Appointment,
    pub order: Order,
}

#[derive(Clone)]
pub struct AppointmentManager {
    store: Arc<dyn DocumentStore>,
    appointments: AppointmentRepository,
    orders: OrderRepository,
    ledger: OrderLedger,
}

impl AppointmentManager {
    pub fn new(db: &Database, ledger: OrderLedger) -> Self {
        AppointmentManager {
            store: db.store(),
            appointments: db.appointments(),
            orders: db.orders(),
            ledger,
        }
    }

    // =========================================================================
    // Booking
    // =========================================================================

    /// Books an appointment and creates its order in the same batch.
    pub async fn book(&self, form: NewAppointment) -> ApiResult<Booking> {
        let now = Utc::now();
        let appointment = Appointment::book(salon_core::new_id(), form, now)?;
        let order = self.ledger.prepare_for_appointment(&appointment, now).await?;

        let mut batch = WriteBatch::new();
        batch.push(create_op(&appointment)?);
        batch.push(create_op(&order)?);
        self.store.commit(batch).await?;

        info!(
            appointment_id = %appointment.id,
            order_number = order.order_number,
            date = %appointment.date,
            start_time = %appointment.start_time,
            "Appointment booked"
        );
        Ok(Booking { appointment, order })
    }

    /// Changes client, date, time or notes. The order's client snapshot
    /// is not re-synced.
    pub async fn update_details(&self, id: &str, form: NewAppointment) -> ApiResult<Appointment> {
        let mut appointment = self.get(id).await?;
        appointment.update_details(form, Utc::now())?;
        self.appointments.save(&appointment).await?;
        debug!(appointment_id = id, "Appointment updated");
        Ok(appointment)
    }

    // =========================================================================
    // Status
    // =========================================================================

    pub async fn mark_arrived(&self, id: &str) -> ApiResult<Appointment> {
        self.transition(id, AppointmentStatus::Arrived).await
    }

    pub async fn start(&self, id: &str) -> ApiResult<Appointment> {
        self.transition(id, AppointmentStatus::InProgress).await
    }

    pub async fn complete(&self, id: &str) -> ApiResult<Appointment> {
        self.transition(id, AppointmentStatus::Completed).await
    }

    async fn transition(&self, id: &str, to: AppointmentStatus) -> ApiResult<Appointment> {
        let mut appointment = self.get(id).await?;
        if let Err(e) = appointment.transition(to, Utc::now()) {
            warn!(appointment_id = id, "Status change rejected: {}", e);
            return Err(e.into());
        }

        self.appointments.save(&appointment).await?;
        info!(appointment_id = id, status = %appointment.status, "Appointment status changed");
        Ok(appointment)
    }

    /// Cancels the appointment and deletes its order.
    pub async fn cancel(&self, id: &str) -> ApiResult<Appointment> {
        let mut appointment = self.get(id).await?;
        if let Err(e) = appointment.cancel(Utc::now()) {
            warn!(appointment_id = id, "Cancel rejected: {}", e);
            return Err(e.into());
        }

        let mut batch = WriteBatch::new();
        batch.push(update_op(&appointment)?);
        let order = self.orders.find_by_appointment(id).await?;
        if let Some(order) = &order {
            batch.push(delete_op(Order::COLLECTION, &order.id));
        }
        self.store.commit(batch).await?;

        info!(
            appointment_id = id,
            order_deleted = order.is_some(),
            "Appointment cancelled"
        );
        Ok(appointment)
    }

    /// Deletes the appointment and its order, if it has one.
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        let appointment = self.get(id).await?;

        let mut batch = WriteBatch::new();
        batch.push(delete_op(Appointment::COLLECTION, &appointment.id));
        let order = self.orders.find_by_appointment(id).await?;
        match &order {
            Some(order) => {
                batch.push(delete_op(Order::COLLECTION, &order.id));
            }
            None => debug!(appointment_id = id, "No order to delete"),
        }
        self.store.commit(batch).await?;

        info!(
            appointment_id = id,
            order_deleted = order.is_some(),
            "Appointment deleted"
        );
        Ok(())
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub async fn get(&self, id: &str) -> ApiResult<Appointment> {
        self.appointments
            .get(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Appointment", id))
    }

    /// One calendar day, by start time.
    pub async fn list_by_date(&self, date: NaiveDate) -> ApiResult<Vec<Appointment>> {
        Ok(self.appointments.list_by_date(date).await?)
    }

    /// `start..=end`, by date then start time.
    pub async fn list_by_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ApiResult<Vec<Appointment>> {
        Ok(self.appointments.list_by_date_range(start, end).await?)
    }

    /// The Monday-to-Sunday week containing `date`.
    pub async fn list_week(&self, date: NaiveDate) -> ApiResult<Vec<Appointment>> {
        let days = week_dates(date);
        match (days.first(), days.last()) {
            (Some(first), Some(last)) => self.list_by_range(*first, *last).await,
            _ => Ok(Vec::new()),
        }
    }
}
