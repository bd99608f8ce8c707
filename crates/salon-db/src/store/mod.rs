//! # Document Store
//!
//! The generic document-store interface the ledgers are written against.
//!
//! ## Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Document Store                                   │
//! │                                                                         │
//! │  collection "orders"                                                   │
//! │  ├── Document { id: "9f1c…", fields: { orderNumber: 60288, … } }       │
//! │  ├── Document { id: "a41e…", fields: { orderNumber: 60289, … } }       │
//! │  └── …                                                                  │
//! │                                                                         │
//! │  list(collection, [Filter::eq("date", "2025-06-01")])                  │
//! │  get / create / update (shallow merge) / delete (idempotent)           │
//! │  commit(WriteBatch)        ← several documents, all or nothing         │
//! │  next_sequence(name, floor) ← atomic counter                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The identifier is never part of `fields`; it travels next to them.

pub mod sqlite;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{DbError, DbResult};

pub use sqlite::SqliteDocumentStore;

/// A document body: a JSON object.
pub type Fields = serde_json::Map<String, Value>;

// =============================================================================
// Collections
// =============================================================================

/// Collection names.
pub mod collections {
    pub const APPOINTMENTS: &str = "appointments";
    pub const ORDERS: &str = "orders";
    pub const CLIENT_PACKAGES: &str = "clientPackages";
    pub const SERVICES: &str = "services";
    pub const PRODUCTS: &str = "products";
    pub const PACKAGES: &str = "packages";
    pub const USERS: &str = "users";
}

// =============================================================================
// Document
// =============================================================================

/// A stored document: identifier plus body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    /// Decodes the body into a record type.
    ///
    /// Any mismatch (missing field, unknown tag) is reported as
    /// [`DbError::InvalidDocument`] so malformed data never reaches the
    /// ledgers.
    pub fn decode<T: DeserializeOwned>(&self, collection: &str) -> DbResult<T> {
        serde_json::from_value(Value::Object(self.fields.clone()))
            .map_err(|e| DbError::invalid_document(collection, &self.id, e))
    }
}

/// Encodes a record as a document body.
pub fn to_fields<T: Serialize>(record: &T) -> DbResult<Fields> {
    match serde_json::to_value(record)? {
        Value::Object(fields) => Ok(fields),
        other => Err(DbError::Serialization(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

// =============================================================================
// Filters
// =============================================================================

/// Comparison applied by a [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gt,
}

/// A condition on a top-level field.
///
/// ## Example
/// ```rust
/// use salon_db::store::Filter;
///
/// let by_client = Filter::eq("clientId", "c-1");
/// let with_credits = Filter::gt("remaining", 0);
/// assert_eq!(by_client.field(), "clientId");
/// assert!(with_credits.validate().is_ok());
/// assert!(Filter::eq("date') OR 1=1 --", "x").validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    field: String,
    op: FilterOp,
    value: Value,
}

impl Filter {
    /// `field == value`
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter {
            field: field.into(),
            op: FilterOp::Eq,
            value: value.into(),
        }
    }

    /// `field > value`
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter {
            field: field.into(),
            op: FilterOp::Gt,
            value: value.into(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn op(&self) -> FilterOp {
        self.op
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Field names are limited to `[A-Za-z0-9_]` and values to scalars.
    pub fn validate(&self) -> DbResult<()> {
        let valid_name = !self.field.is_empty()
            && self
                .field
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_name {
            return Err(DbError::InvalidQuery(format!(
                "invalid field name '{}'",
                self.field
            )));
        }

        match (&self.value, self.op) {
            (Value::Array(_) | Value::Object(_), _) => Err(DbError::InvalidQuery(format!(
                "filter on '{}' must compare a scalar",
                self.field
            ))),
            (Value::Null, FilterOp::Gt) => Err(DbError::InvalidQuery(format!(
                "'{}' > null is not a valid filter",
                self.field
            ))),
            _ => Ok(()),
        }
    }
}

// =============================================================================
// Write Batches
// =============================================================================

/// One write inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Insert a new document. Fails if the id exists.
    Create {
        collection: String,
        id: String,
        fields: Fields,
    },
    /// Shallow-merge fields into an existing document. Fails if absent.
    Update {
        collection: String,
        id: String,
        fields: Fields,
    },
    /// Remove a document. A missing document is not an error.
    Delete { collection: String, id: String },
}

impl WriteOp {
    pub fn collection(&self) -> &str {
        match self {
            WriteOp::Create { collection, .. }
            | WriteOp::Update { collection, .. }
            | WriteOp::Delete { collection, .. } => collection,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            WriteOp::Create { id, .. } | WriteOp::Update { id, .. } | WriteOp::Delete { id, .. } => {
                id
            }
        }
    }
}

/// A group of writes applied atomically: either every op lands or none.
///
/// Replaces multi-step sequences such as "create appointment, then
/// create order" or "save lines, then mark closed".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends any op.
    pub fn push(&mut self, op: WriteOp) -> &mut Self {
        self.ops.push(op);
        self
    }

    pub fn create(&mut self, collection: &str, id: &str, fields: Fields) -> &mut Self {
        self.push(WriteOp::Create {
            collection: collection.to_string(),
            id: id.to_string(),
            fields,
        })
    }

    pub fn update(&mut self, collection: &str, id: &str, fields: Fields) -> &mut Self {
        self.push(WriteOp::Update {
            collection: collection.to_string(),
            id: id.to_string(),
            fields,
        })
    }

    pub fn delete(&mut self, collection: &str, id: &str) -> &mut Self {
        self.push(WriteOp::Delete {
            collection: collection.to_string(),
            id: id.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

// =============================================================================
// DocumentStore Trait
// =============================================================================

/// Collection-oriented persistence.
///
/// Single-document operations are atomic per document. Anything touching
/// more than one document goes through [`DocumentStore::commit`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Documents in `collection` matching every filter.
    async fn list(&self, collection: &str, filters: &[Filter]) -> DbResult<Vec<Document>>;

    /// A single document, or `None` when absent.
    async fn get(&self, collection: &str, id: &str) -> DbResult<Option<Document>>;

    /// Inserts a document under a caller-chosen id.
    async fn create_with_id(&self, collection: &str, id: &str, fields: Fields) -> DbResult<()>;

    /// Inserts a document under a fresh id and returns it.
    async fn create(&self, collection: &str, fields: Fields) -> DbResult<String> {
        let id = salon_core::new_id();
        self.create_with_id(collection, &id, fields).await?;
        Ok(id)
    }

    /// Shallow merge: each top-level key in `fields` replaces the stored
    /// value. Fails with [`DbError::NotFound`] when the document is absent.
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> DbResult<()>;

    /// Removes a document. Deleting a missing document succeeds.
    async fn delete(&self, collection: &str, id: &str) -> DbResult<()>;

    /// Applies every op in `batch` or none of them.
    async fn commit(&self, batch: WriteBatch) -> DbResult<()>;

    /// Atomically draws the next value of a named counter.
    ///
    /// The first value ever returned is `floor + 1`, and a value is never
    /// handed out twice.
    async fn next_sequence(&self, name: &str, floor: i64) -> DbResult<i64>;
}
