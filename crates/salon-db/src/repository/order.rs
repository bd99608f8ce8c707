//! # Order Repository
//!
//! Database operations for orders (comandas).
//!
//! ## Order Numbers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  next_order_number()                                                    │
//! │     ├── floor = max(60287, highest stored orderNumber)  (once per repo) │
//! │     └── store.next_sequence("orderNumber", floor)                       │
//! │            ├── first ever  → floor + 1  (60288 on an empty store)       │
//! │            └── afterwards  → previous + 1  (single atomic statement)    │
//! │                                                                         │
//! │  Two simultaneous bookings can never draw the same number. A booking   │
//! │  whose batch fails leaves a gap in the sequence.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use salon_core::{Order, ORDER_NUMBER_BASELINE};

use super::{create_op, decode, decode_all, partial_update_op, update_op, Record};
use crate::error::DbResult;
use crate::store::{DocumentStore, Filter, WriteBatch, WriteOp};

/// Counter name for order numbers.
pub const ORDER_NUMBER_SEQUENCE: &str = "orderNumber";

/// Body keys written by an in-place save.
const LINES_AND_TOTALS: &[&str] = &[
    "services",
    "products",
    "packagesSold",
    "tips",
    "subtotalServices",
    "subtotalProducts",
    "subtotalPackages",
    "subtotal",
    "totalTips",
    "total",
    "updatedAt",
];

/// Repository for the `orders` collection.
#[derive(Clone)]
pub struct OrderRepository {
    store: Arc<dyn DocumentStore>,
    number_floor: Arc<OnceCell<i64>>,
}

impl OrderRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        OrderRepository {
            store,
            number_floor: Arc::new(OnceCell::new()),
        }
    }

    /// Gets an order by id.
    pub async fn get(&self, id: &str) -> DbResult<Option<Order>> {
        self.store
            .get(Order::COLLECTION, id)
            .await?
            .map(decode)
            .transpose()
    }

    /// The order linked to an appointment, if any.
    pub async fn find_by_appointment(&self, appointment_id: &str) -> DbResult<Option<Order>> {
        debug!(appointment_id, "Finding order by appointment");
        let docs = self
            .store
            .list(
                Order::COLLECTION,
                &[Filter::eq("appointmentId", appointment_id)],
            )
            .await?;

        Ok(decode_all::<Order>(docs)?.into_iter().next())
    }

    /// Orders for one business day, newest number first.
    pub async fn list_by_date(&self, date: NaiveDate) -> DbResult<Vec<Order>> {
        debug!(%date, "Listing orders by date");
        let docs = self
            .store
            .list(Order::COLLECTION, &[Filter::eq("date", date.to_string())])
            .await?;

        let mut orders: Vec<Order> = decode_all(docs)?;
        sort_newest_first(&mut orders);
        Ok(orders)
    }

    /// Orders whose client name contains `query` (case-insensitive),
    /// newest number first. An empty query matches every order.
    pub async fn search_by_client(&self, query: &str) -> DbResult<Vec<Order>> {
        let needle = query.trim().to_lowercase();
        debug!(query = %needle, "Searching orders by client");

        let docs = self.store.list(Order::COLLECTION, &[]).await?;
        let mut orders: Vec<Order> = decode_all::<Order>(docs)?
            .into_iter()
            .filter(|o: &Order| o.client_name.to_lowercase().contains(&needle))
            .collect();
        sort_newest_first(&mut orders);
        Ok(orders)
    }

    /// Draws the next order number (first ever is 60288).
    ///
    /// Orders already in the store count too: the number is always above
    /// the highest stored `orderNumber`, even without a counter row.
    pub async fn next_order_number(&self) -> DbResult<i64> {
        let floor = *self
            .number_floor
            .get_or_try_init(|| self.highest_stored_number())
            .await?;
        self.store.next_sequence(ORDER_NUMBER_SEQUENCE, floor).await
    }

    async fn highest_stored_number(&self) -> DbResult<i64> {
        let docs = self.store.list(Order::COLLECTION, &[]).await?;
        let highest = docs
            .iter()
            .filter_map(|doc| doc.fields.get("orderNumber").and_then(Value::as_i64))
            .fold(ORDER_NUMBER_BASELINE, i64::max);

        if highest > ORDER_NUMBER_BASELINE {
            info!(highest, "Order numbers continue after stored orders");
        }
        Ok(highest)
    }

    /// Inserts an order on its own.
    pub async fn insert(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, order_number = order.order_number, "Inserting order");
        let mut batch = WriteBatch::new();
        batch.push(create_op(order)?);
        self.store.commit(batch).await
    }

    /// Persists line items and totals in place. Status is not written.
    pub async fn save_lines_and_totals(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, total = %order.totals.total, "Saving order lines");
        let mut batch = WriteBatch::new();
        batch.push(Self::lines_and_totals_op(order)?);
        self.store.commit(batch).await
    }

    /// Writes the full order body (lines, totals and state) at once.
    pub async fn save(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, status = %order.status, "Saving order");
        let mut batch = WriteBatch::new();
        batch.push(update_op(order)?);
        self.store.commit(batch).await
    }

    /// Update op for an in-place save.
    pub fn lines_and_totals_op(order: &Order) -> DbResult<WriteOp> {
        partial_update_op(order, LINES_AND_TOTALS)
    }
}

fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.order_number.cmp(&a.order_number));
}
