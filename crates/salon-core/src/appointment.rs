//! # Appointments
//!
//! Appointment records and their status rules.
//!
//! ## Status Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  scheduled ──► arrived ──► in-progress ──► completed                    │
//! │      │            │             │                                       │
//! │      └────────────┴─────────────┴──────► cancelled                      │
//! │                                                                         │
//! │  Forward moves may skip steps (scheduled → completed).                  │
//! │  completed and cancelled are terminal.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each transition stamps its own timestamp (`arrivedAt`, `startedAt`,
//! `completedAt`, `cancelledAt`).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::order::NewOrder;
use crate::types::{AppointmentStatus, ClientRef};
use crate::validation::{validate_name, validate_start_time};

/// Booking form input. Also used for detail updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    pub client: ClientRef,
    pub date: NaiveDate,
    /// `HH:MM`, 24-hour.
    pub start_time: String,
    pub notes: String,
}

impl NewAppointment {
    /// Validates the form before anything is written.
    pub fn validate(&self) -> CoreResult<()> {
        validate_name("client name", &self.client.name)?;
        validate_start_time(&self.start_time)?;
        Ok(())
    }
}

/// A booked visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Appointment {
    #[serde(skip)]
    pub id: String,
    #[serde(flatten)]
    pub client: ClientRef,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub start_time: String,
    #[serde(default)]
    pub notes: String,
    pub status: AppointmentStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub arrived_at: Option<DateTime<Utc>>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub cancelled_at: Option<DateTime<Utc>>,
}

/// Position along the forward path. Cancelled is off the path.
fn rank(status: AppointmentStatus) -> Option<u8> {
    match status {
        AppointmentStatus::Scheduled => Some(0),
        AppointmentStatus::Arrived => Some(1),
        AppointmentStatus::InProgress => Some(2),
        AppointmentStatus::Completed => Some(3),
        AppointmentStatus::Cancelled => None,
    }
}

impl Appointment {
    /// Creates a `scheduled` appointment from a validated form.
    pub fn book(id: String, new: NewAppointment, now: DateTime<Utc>) -> CoreResult<Self> {
        new.validate()?;
        Ok(Self {
            id,
            client: new.client,
            date: new.date,
            start_time: new.start_time.trim().to_string(),
            notes: new.notes,
            status: AppointmentStatus::Scheduled,
            created_at: now,
            updated_at: now,
            arrived_at: None,
            started_at: None,
            completed_at: None,
            cancelled_at: None,
        })
    }

    /// Input for the order created alongside this appointment.
    pub fn new_order(&self, order_id: String) -> NewOrder {
        NewOrder {
            id: order_id,
            appointment_id: self.id.clone(),
            client: self.client.clone(),
            date: self.date,
        }
    }

    /// Returns true when `self.status → to` is allowed.
    pub fn can_transition(&self, to: AppointmentStatus) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        match (rank(self.status), rank(to)) {
            (_, None) => true,
            (Some(from), Some(to)) => to > from,
            (None, Some(_)) => false,
        }
    }

    /// Moves to `to`, stamping the matching timestamp.
    pub fn transition(&mut self, to: AppointmentStatus, now: DateTime<Utc>) -> CoreResult<()> {
        if !self.can_transition(to) {
            return Err(CoreError::InvalidAppointmentTransition {
                id: self.id.clone(),
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }

        match to {
            AppointmentStatus::Scheduled => {}
            AppointmentStatus::Arrived => self.arrived_at = Some(now),
            AppointmentStatus::InProgress => self.started_at = Some(now),
            AppointmentStatus::Completed => self.completed_at = Some(now),
            AppointmentStatus::Cancelled => self.cancelled_at = Some(now),
        }
        self.status = to;
        self.updated_at = now;
        Ok(())
    }

    pub fn mark_arrived(&mut self, now: DateTime<Utc>) -> CoreResult<()> {
        self.transition(AppointmentStatus::Arrived, now)
    }

    pub fn start(&mut self, now: DateTime<Utc>) -> CoreResult<()> {
        self.transition(AppointmentStatus::InProgress, now)
    }

    pub fn complete(&mut self, now: DateTime<Utc>) -> CoreResult<()> {
        self.transition(AppointmentStatus::Completed, now)
    }

    pub fn cancel(&mut self, now: DateTime<Utc>) -> CoreResult<()> {
        self.transition(AppointmentStatus::Cancelled, now)
    }

    /// Replaces client snapshot, date, time and notes.
    ///
    /// The linked order keeps its own client snapshot.
    pub fn update_details(&mut self, details: NewAppointment, now: DateTime<Utc>) -> CoreResult<()> {
        if self.status.is_terminal() {
            return Err(CoreError::InvalidAppointmentTransition {
                id: self.id.clone(),
                from: self.status.to_string(),
                to: "edited".to_string(),
            });
        }
        details.validate()?;

        self.client = details.client;
        self.date = details.date;
        self.start_time = details.start_time.trim().to_string();
        self.notes = details.notes;
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 16, 0, 0).unwrap()
    }

    fn form(name: &str, time: &str) -> NewAppointment {
        NewAppointment {
            client: ClientRef {
                id: None,
                name: name.to_string(),
                phone: "5555-1234".to_string(),
            },
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            start_time: time.to_string(),
            notes: String::new(),
        }
    }

    fn booked() -> Appointment {
        Appointment::book("appt-1".to_string(), form("Ana", "10:00"), now()).unwrap()
    }

    #[test]
    fn test_book_validates_form() {
        let appt = booked();
        assert_eq!(appt.status, AppointmentStatus::Scheduled);
        assert_eq!(appt.created_at, now());

        assert!(Appointment::book("x".to_string(), form("", "10:00"), now()).is_err());
        assert!(Appointment::book("x".to_string(), form("Ana", "10h"), now()).is_err());
    }

    #[test]
    fn test_forward_transitions_stamp_times() {
        let mut appt = booked();
        appt.mark_arrived(now()).unwrap();
        appt.start(now()).unwrap();
        appt.complete(now()).unwrap();

        assert_eq!(appt.status, AppointmentStatus::Completed);
        assert!(appt.arrived_at.is_some());
        assert!(appt.started_at.is_some());
        assert!(appt.completed_at.is_some());
        assert!(appt.cancelled_at.is_none());
    }

    #[test]
    fn test_skips_and_backwards() {
        let mut appt = booked();
        appt.complete(now()).unwrap();
        assert!(appt.arrived_at.is_none());

        let mut appt = booked();
        appt.start(now()).unwrap();
        assert!(appt.mark_arrived(now()).is_err());
        assert_eq!(appt.status, AppointmentStatus::InProgress);
    }

    #[test]
    fn test_terminal_states() {
        let mut appt = booked();
        appt.cancel(now()).unwrap();
        assert!(appt.cancelled_at.is_some());
        assert!(matches!(
            appt.mark_arrived(now()),
            Err(CoreError::InvalidAppointmentTransition { .. })
        ));
        assert!(appt.cancel(now()).is_err());
        assert!(appt.update_details(form("Ana", "11:00"), now()).is_err());

        let mut appt = booked();
        appt.complete(now()).unwrap();
        assert!(appt.cancel(now()).is_err());
    }

    #[test]
    fn test_update_details() {
        let mut appt = booked();
        appt.update_details(form("Ana María", "11:30"), now()).unwrap();
        assert_eq!(appt.client.name, "Ana María");
        assert_eq!(appt.start_time, "11:30");

        assert!(appt.update_details(form("Ana", "99:99"), now()).is_err());
        assert_eq!(appt.start_time, "11:30");
    }

    #[test]
    fn test_new_order_links_appointment() {
        let appt = booked();
        let new = appt.new_order("order-1".to_string());
        assert_eq!(new.appointment_id, "appt-1");
        assert_eq!(new.client.name, "Ana");
        assert_eq!(new.date, appt.date);
    }

    #[test]
    fn test_document_shape() {
        let value = serde_json::to_value(booked()).unwrap();
        assert_eq!(value["clientName"], "Ana");
        assert_eq!(value["startTime"], "10:00");
        assert_eq!(value["status"], "scheduled");
        assert_eq!(value["date"], "2025-06-01");
    }
}
