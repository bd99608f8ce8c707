//! # Appointment Repository
//!
//! Appointments by id, business date and date range.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

use salon_core::Appointment;

use super::{create_op, decode, decode_all, update_op, Record};
use crate::error::DbResult;
use crate::store::{DocumentStore, Filter, WriteBatch};

/// Repository for the `appointments` collection.
#[derive(Clone)]
pub struct AppointmentRepository {
    store: Arc<dyn DocumentStore>,
}

impl AppointmentRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        AppointmentRepository { store }
    }

    /// Gets an appointment by id.
    pub async fn get(&self, id: &str) -> DbResult<Option<Appointment>> {
        self.store
            .get(Appointment::COLLECTION, id)
            .await?
            .map(decode)
            .transpose()
    }

    /// Appointments on one day, by start time.
    pub async fn list_by_date(&self, date: NaiveDate) -> DbResult<Vec<Appointment>> {
        debug!(%date, "Listing appointments by date");
        let docs = self
            .store
            .list(Appointment::COLLECTION, &[Filter::eq("date", date.to_string())])
            .await?;

        let mut appointments: Vec<Appointment> = decode_all(docs)?;
        appointments.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        Ok(appointments)
    }

    /// Appointments from `start` to `end` inclusive, by date then time.
    ///
    /// `YYYY-MM-DD` strings order the same way as the dates.
    pub async fn list_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<Vec<Appointment>> {
        debug!(%start, %end, "Listing appointments by date range");
        if end < start {
            return Ok(Vec::new());
        }

        let after = start.pred_opt().unwrap_or(start);
        let docs = self
            .store
            .list(Appointment::COLLECTION, &[Filter::gt("date", after.to_string())])
            .await?;

        let mut appointments: Vec<Appointment> = decode_all::<Appointment>(docs)?
            .into_iter()
            .filter(|a: &Appointment| a.date >= start && a.date <= end)
            .collect();
        appointments.sort_by(|a, b| (a.date, &a.start_time).cmp(&(b.date, &b.start_time)));
        Ok(appointments)
    }

    /// Every appointment, by date then time.
    pub async fn list_all(&self) -> DbResult<Vec<Appointment>> {
        let docs = self.store.list(Appointment::COLLECTION, &[]).await?;
        let mut appointments: Vec<Appointment> = decode_all(docs)?;
        appointments.sort_by(|a, b| (a.date, &a.start_time).cmp(&(b.date, &b.start_time)));
        Ok(appointments)
    }

    /// Inserts an appointment on its own (no order).
    pub async fn insert(&self, appointment: &Appointment) -> DbResult<()> {
        debug!(id = %appointment.id, "Inserting appointment");
        let mut batch = WriteBatch::new();
        batch.push(create_op(appointment)?);
        self.store.commit(batch).await
    }

    /// Writes the full appointment body.
    pub async fn save(&self, appointment: &Appointment) -> DbResult<()> {
        debug!(id = %appointment.id, status = %appointment.status, "Saving appointment");
        let mut batch = WriteBatch::new();
        batch.push(update_op(appointment)?);
        self.store.commit(batch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use salon_core::{ClientRef, NewAppointment};

    fn appointment(id: &str, date: (i32, u32, u32), time: &str) -> Appointment {
        Appointment::book(
            id.to_string(),
            NewAppointment {
                client: ClientRef {
                    id: None,
                    name: format!("Client {}", id),
                    phone: String::new(),
                },
                date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
                start_time: time.to_string(),
                notes: String::new(),
            },
            Utc::now(),
        )
        .unwrap()
    }

    async fn repo() -> AppointmentRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().appointments()
    }

    #[tokio::test]
    async fn test_insert_get_save() {
        let repo = repo().await;
        let mut appt = appointment("a1", (2025, 6, 1), "10:00");
        repo.insert(&appt).await.unwrap();

        let loaded = repo.get("a1").await.unwrap().unwrap();
        assert_eq!(loaded.id, "a1");
        assert_eq!(loaded.client.name, "Client a1");

        appt.mark_arrived(Utc::now()).unwrap();
        repo.save(&appt).await.unwrap();
        let loaded = repo.get("a1").await.unwrap().unwrap();
        assert!(loaded.arrived_at.is_some());

        assert!(repo.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_by_date_and_range() {
        let repo = repo().await;
        for appt in [
            appointment("late", (2025, 6, 1), "15:00"),
            appointment("early", (2025, 6, 1), "09:30"),
            appointment("next", (2025, 6, 2), "10:00"),
            appointment("before", (2025, 5, 31), "10:00"),
            appointment("after", (2025, 6, 9), "10:00"),
        ] {
            repo.insert(&appt).await.unwrap();
        }

        let day = repo
            .list_by_date(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
            .await
            .unwrap();
        let ids: Vec<&str> = day.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late"]);

        let range = repo
            .list_by_date_range(
                NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 6, 7).unwrap(),
            )
            .await
            .unwrap();
        let ids: Vec<&str> = range.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late", "next"]);

        assert_eq!(repo.list_all().await.unwrap().len(), 5);
    }
}
