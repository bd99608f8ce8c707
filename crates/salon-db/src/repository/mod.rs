//! # Repository Module
//!
//! Typed access to each collection of the document store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  OrderLedger (salon-backend)                                           │
//! │       │                                                                 │
//! │       │  db.orders().list_by_date(today)                               │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── Filter::eq("date", "2025-06-01")                                  │
//! │  ├── decode each Document into Order  ← malformed → InvalidDocument    │
//! │  └── sort by orderNumber desc                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Arc<dyn DocumentStore>                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes that must land together are exposed as [`WriteOp`] builders
//! so services can put them in one [`WriteBatch`](crate::store::WriteBatch).
//!
//! ## Available Repositories
//!
//! - [`AppointmentRepository`] - Appointments by date and range
//! - [`OrderRepository`] - Orders, order numbers, client search
//! - [`ClientPackageRepository`] - Package credits per client
//! - [`CatalogRepository`] - Active services, products, packages, stylists

pub mod appointment;
pub mod catalog;
pub mod client_package;
pub mod order;

pub use appointment::AppointmentRepository;
pub use catalog::CatalogRepository;
pub use client_package::ClientPackageRepository;
pub use order::OrderRepository;

use serde::de::DeserializeOwned;
use serde::Serialize;

use salon_core::{Appointment, ClientPackage, Order, Package, Product, Service, StaffMember};

use crate::error::DbResult;
use crate::store::{collections, to_fields, Document, Fields, WriteOp};

// =============================================================================
// Record Trait
// =============================================================================

/// A typed record stored in one collection.
///
/// The id lives outside the document body; decoding fills it in.
pub trait Record: Serialize + DeserializeOwned {
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
}

macro_rules! impl_record {
    ($ty:ty, $collection:expr) => {
        impl Record for $ty {
            const COLLECTION: &'static str = $collection;

            fn id(&self) -> &str {
                &self.id
            }

            fn set_id(&mut self, id: String) {
                self.id = id;
            }
        }
    };
}

impl_record!(Appointment, collections::APPOINTMENTS);
impl_record!(Order, collections::ORDERS);
impl_record!(ClientPackage, collections::CLIENT_PACKAGES);
impl_record!(Service, collections::SERVICES);
impl_record!(Product, collections::PRODUCTS);
impl_record!(Package, collections::PACKAGES);
impl_record!(StaffMember, collections::USERS);

// =============================================================================
// Decode / Encode Helpers
// =============================================================================

/// Decodes one document of `T`'s collection.
pub fn decode<T: Record>(doc: Document) -> DbResult<T> {
    let mut record: T = doc.decode(T::COLLECTION)?;
    record.set_id(doc.id);
    Ok(record)
}

/// Decodes a list of documents, failing on the first malformed one.
pub fn decode_all<T: Record>(docs: Vec<Document>) -> DbResult<Vec<T>> {
    docs.into_iter().map(decode).collect()
}

/// Insert op for a record under its own id.
pub fn create_op<T: Record>(record: &T) -> DbResult<WriteOp> {
    Ok(WriteOp::Create {
        collection: T::COLLECTION.to_string(),
        id: record.id().to_string(),
        fields: to_fields(record)?,
    })
}

/// Full-body update op for a record.
pub fn update_op<T: Record>(record: &T) -> DbResult<WriteOp> {
    Ok(WriteOp::Update {
        collection: T::COLLECTION.to_string(),
        id: record.id().to_string(),
        fields: to_fields(record)?,
    })
}

/// Update op carrying only `keys` of the record's body.
pub fn partial_update_op<T: Record>(record: &T, keys: &[&str]) -> DbResult<WriteOp> {
    let body = to_fields(record)?;
    let fields: Fields = keys
        .iter()
        .filter_map(|k| body.get(*k).map(|v| (k.to_string(), v.clone())))
        .collect();

    Ok(WriteOp::Update {
        collection: T::COLLECTION.to_string(),
        id: record.id().to_string(),
        fields,
    })
}

/// Delete op.
pub fn delete_op(collection: &str, id: &str) -> WriteOp {
    WriteOp::Delete {
        collection: collection.to_string(),
        id: id.to_string(),
    }
}
