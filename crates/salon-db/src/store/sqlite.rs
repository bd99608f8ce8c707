//! # SQLite Document Store
//!
//! [`DocumentStore`] on a single `documents` table.
//!
//! ```text
//! documents (collection, id, data JSON, created_at, updated_at)
//!            └──── PK ────┘
//!
//! list   → SELECT … WHERE collection = ? AND json_extract(data, '$.f') = ?
//! update → read, merge top-level keys, write (one transaction)
//! commit → every op in one transaction
//! counters (name, value) → INSERT … ON CONFLICT DO UPDATE … RETURNING
//! ```

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, warn};

use super::{Document, DocumentStore, Fields, Filter, FilterOp, WriteBatch, WriteOp};
use crate::error::{DbError, DbResult};

/// SQLite-backed document store.
#[derive(Debug, Clone)]
pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    /// Creates a store on an already migrated pool.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteDocumentStore { pool }
    }

    /// Number of documents in a collection.
    pub async fn count(&self, collection: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection = ?1")
            .bind(collection)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Row Helpers
// =============================================================================

enum BindValue {
    Text(String),
    Int(i64),
    Real(f64),
}

fn bind_value(value: &Value) -> DbResult<BindValue> {
    match value {
        Value::String(s) => Ok(BindValue::Text(s.clone())),
        // json_extract returns 1/0 for JSON booleans
        Value::Bool(b) => Ok(BindValue::Int(i64::from(*b))),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(BindValue::Int(i)),
            None => n
                .as_f64()
                .map(BindValue::Real)
                .ok_or_else(|| DbError::InvalidQuery(format!("unsupported number {}", n))),
        },
        other => Err(DbError::InvalidQuery(format!(
            "cannot bind {} as a filter value",
            other
        ))),
    }
}

fn parse_fields(collection: &str, id: &str, data: &str) -> DbResult<Fields> {
    match serde_json::from_str::<Value>(data) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(DbError::invalid_document(collection, id, "body is not an object")),
        Err(e) => Err(DbError::invalid_document(collection, id, e)),
    }
}

fn now_rfc3339() -> String {
    rfc3339(Utc::now())
}

/// Fixed-width UTC timestamp, so `ORDER BY created_at` sorts in time order.
fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

// =============================================================================
// Single Writes (shared by the trait methods and commit)
// =============================================================================

async fn insert_doc(
    conn: &mut SqliteConnection,
    collection: &str,
    id: &str,
    fields: &Fields,
) -> DbResult<()> {
    let data = serde_json::to_string(fields)?;
    let now = now_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO documents (collection, id, data, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?4)
        "#,
    )
    .bind(collection)
    .bind(id)
    .bind(data)
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(|e| match DbError::from(e) {
        DbError::UniqueViolation { .. } => DbError::duplicate(format!("{} id", collection), id),
        other => other,
    })?;

    Ok(())
}

async fn merge_doc(
    conn: &mut SqliteConnection,
    collection: &str,
    id: &str,
    fields: Fields,
) -> DbResult<()> {
    let data: Option<String> =
        sqlx::query_scalar("SELECT data FROM documents WHERE collection = ?1 AND id = ?2")
            .bind(collection)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

    let Some(data) = data else {
        return Err(DbError::not_found(collection, id));
    };

    let mut stored = parse_fields(collection, id, &data)?;
    for (key, value) in fields {
        stored.insert(key, value);
    }

    sqlx::query(
        r#"
        UPDATE documents
        SET data = ?3, updated_at = ?4
        WHERE collection = ?1 AND id = ?2
        "#,
    )
    .bind(collection)
    .bind(id)
    .bind(serde_json::to_string(&stored)?)
    .bind(now_rfc3339())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn delete_doc(conn: &mut SqliteConnection, collection: &str, id: &str) -> DbResult<u64> {
    let result = sqlx::query("DELETE FROM documents WHERE collection = ?1 AND id = ?2")
        .bind(collection)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

// =============================================================================
// DocumentStore Implementation
// =============================================================================

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn list(&self, collection: &str, filters: &[Filter]) -> DbResult<Vec<Document>> {
        let mut sql = String::from("SELECT id, data FROM documents WHERE collection = ?");
        let mut binds = Vec::with_capacity(filters.len());

        for filter in filters {
            filter.validate()?;
            // field names are validated to [A-Za-z0-9_], safe to inline
            let path = format!("json_extract(data, '$.{}')", filter.field());
            match (filter.op(), filter.value()) {
                (FilterOp::Eq, Value::Null) => {
                    sql.push_str(&format!(" AND {} IS NULL", path));
                }
                (FilterOp::Eq, value) => {
                    sql.push_str(&format!(" AND {} = ?", path));
                    binds.push(bind_value(value)?);
                }
                (FilterOp::Gt, value) => {
                    sql.push_str(&format!(" AND {} > ?", path));
                    binds.push(bind_value(value)?);
                }
            }
        }
        sql.push_str(" ORDER BY created_at, id");

        debug!(collection, filters = filters.len(), "Listing documents");

        let mut query = sqlx::query_as::<_, (String, String)>(&sql).bind(collection);
        for bind in binds {
            query = match bind {
                BindValue::Text(s) => query.bind(s),
                BindValue::Int(i) => query.bind(i),
                BindValue::Real(f) => query.bind(f),
            };
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter()
            .map(|(id, data)| {
                let fields = parse_fields(collection, &id, &data)?;
                Ok(Document { id, fields })
            })
            .collect()
    }

    async fn get(&self, collection: &str, id: &str) -> DbResult<Option<Document>> {
        debug!(collection, id, "Getting document");

        let data: Option<String> =
            sqlx::query_scalar("SELECT data FROM documents WHERE collection = ?1 AND id = ?2")
                .bind(collection)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        data.map(|data| {
            Ok(Document {
                id: id.to_string(),
                fields: parse_fields(collection, id, &data)?,
            })
        })
        .transpose()
    }

    async fn create_with_id(&self, collection: &str, id: &str, fields: Fields) -> DbResult<()> {
        debug!(collection, id, "Creating document");
        let mut conn = self.pool.acquire().await?;
        insert_doc(&mut conn, collection, id, &fields).await
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> DbResult<()> {
        debug!(collection, id, keys = fields.len(), "Updating document");
        let mut tx = self.pool.begin().await?;
        merge_doc(&mut tx, collection, id, fields).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        let removed = delete_doc(&mut conn, collection, id).await?;
        debug!(collection, id, removed, "Deleted document");
        Ok(())
    }

    async fn commit(&self, batch: WriteBatch) -> DbResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let ops = batch.into_ops();
        debug!(ops = ops.len(), "Committing write batch");

        let mut tx = self.pool.begin().await?;
        for op in ops {
            let result = match op {
                WriteOp::Create {
                    collection,
                    id,
                    fields,
                } => insert_doc(&mut tx, &collection, &id, &fields).await,
                WriteOp::Update {
                    collection,
                    id,
                    fields,
                } => merge_doc(&mut tx, &collection, &id, fields).await,
                WriteOp::Delete { collection, id } => {
                    delete_doc(&mut tx, &collection, &id).await.map(|_| ())
                }
            };

            if let Err(e) = result {
                warn!(error = %e, "Write batch rejected, rolling back");
                tx.rollback().await?;
                return Err(e);
            }
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        Ok(())
    }

    async fn next_sequence(&self, name: &str, floor: i64) -> DbResult<i64> {
        // MAX keeps the counter above the floor even if the floor is raised
        let value: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO counters (name, value) VALUES (?1, ?2 + 1)
            ON CONFLICT (name)
            DO UPDATE SET value = MAX(counters.value, excluded.value - 1) + 1
            RETURNING value
            "#,
        )
        .bind(name)
        .bind(floor)
        .fetch_one(&self.pool)
        .await?;

        debug!(name, value, "Drew sequence value");
        Ok(value)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::store::collections;
    use serde_json::json;

    async fn store() -> SqliteDocumentStore {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        SqliteDocumentStore::new(db.pool().clone())
    }

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[tokio::test]
    async fn test_create_get_delete() {
        let store = store().await;
        let id = store
            .create(collections::ORDERS, fields(json!({"orderNumber": 60288})))
            .await
            .unwrap();

        let doc = store.get(collections::ORDERS, &id).await.unwrap().unwrap();
        assert_eq!(doc.fields["orderNumber"], 60288);
        assert!(doc.fields.get("id").is_none());

        // same id in another collection is a different document
        assert!(store.get(collections::APPOINTMENTS, &id).await.unwrap().is_none());

        store.delete(collections::ORDERS, &id).await.unwrap();
        assert!(store.get(collections::ORDERS, &id).await.unwrap().is_none());
        // idempotent
        store.delete(collections::ORDERS, &id).await.unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let store = store().await;
        store
            .create_with_id(collections::ORDERS, "o1", Fields::new())
            .await
            .unwrap();
        let err = store
            .create_with_id(collections::ORDERS, "o1", Fields::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_is_shallow_merge() {
        let store = store().await;
        store
            .create_with_id(
                collections::ORDERS,
                "o1",
                fields(json!({"status": "open", "tips": {"a": 1, "b": 2}, "paid": false})),
            )
            .await
            .unwrap();

        store
            .update(collections::ORDERS, "o1", fields(json!({"tips": {"a": 5}, "paid": true})))
            .await
            .unwrap();

        let doc = store.get(collections::ORDERS, "o1").await.unwrap().unwrap();
        assert_eq!(doc.fields["status"], "open");
        assert_eq!(doc.fields["paid"], true);
        // nested values are replaced, not merged
        assert_eq!(doc.fields["tips"], json!({"a": 5}));

        let err = store
            .update(collections::ORDERS, "missing", Fields::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_filters() {
        let store = store().await;
        for (id, client, remaining) in [("p1", "c1", 3), ("p2", "c1", 0), ("p3", "c2", 5)] {
            store
                .create_with_id(
                    collections::CLIENT_PACKAGES,
                    id,
                    fields(json!({"clientId": client, "remaining": remaining, "active": true})),
                )
                .await
                .unwrap();
        }

        let active = store
            .list(
                collections::CLIENT_PACKAGES,
                &[Filter::eq("clientId", "c1"), Filter::gt("remaining", 0)],
            )
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "p1");

        let all = store.list(collections::CLIENT_PACKAGES, &[]).await.unwrap();
        assert_eq!(all.len(), 3);

        let flagged = store
            .list(collections::CLIENT_PACKAGES, &[Filter::eq("active", true)])
            .await
            .unwrap();
        assert_eq!(flagged.len(), 3);

        let bad = store
            .list(collections::CLIENT_PACKAGES, &[Filter::eq("x') --", 1)])
            .await;
        assert!(matches!(bad, Err(DbError::InvalidQuery(_))));
    }

    #[tokio::test]
    async fn test_commit_is_all_or_nothing() {
        let store = store().await;
        store
            .create_with_id(collections::ORDERS, "existing", Fields::new())
            .await
            .unwrap();

        let mut batch = WriteBatch::new();
        batch
            .create(collections::APPOINTMENTS, "a1", Fields::new())
            .create(collections::ORDERS, "existing", Fields::new());
        assert!(store.commit(batch).await.is_err());
        assert!(store.get(collections::APPOINTMENTS, "a1").await.unwrap().is_none());

        let mut batch = WriteBatch::new();
        batch
            .create(collections::APPOINTMENTS, "a1", Fields::new())
            .update(collections::ORDERS, "missing", Fields::new());
        assert!(store.commit(batch).await.unwrap_err().is_not_found());
        assert!(store.get(collections::APPOINTMENTS, "a1").await.unwrap().is_none());

        let mut batch = WriteBatch::new();
        batch
            .create(collections::APPOINTMENTS, "a1", Fields::new())
            .delete(collections::ORDERS, "existing")
            .delete(collections::ORDERS, "never-existed");
        store.commit(batch).await.unwrap();
        assert!(store.get(collections::APPOINTMENTS, "a1").await.unwrap().is_some());
        assert!(store.get(collections::ORDERS, "existing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_next_sequence() {
        let store = store().await;
        assert_eq!(store.next_sequence("orderNumber", 60287).await.unwrap(), 60288);
        assert_eq!(store.next_sequence("orderNumber", 60287).await.unwrap(), 60289);
        assert_eq!(store.next_sequence("other", 0).await.unwrap(), 1);
        // a raised floor moves the counter forward
        assert_eq!(store.next_sequence("orderNumber", 70000).await.unwrap(), 70001);
    }

    #[test]
    fn test_timestamps_sort_in_time_order() {
        use chrono::{Duration, TimeZone};

        let whole = Utc.with_ymd_and_hms(2025, 6, 1, 16, 0, 0).unwrap();
        let later = whole + Duration::milliseconds(500);
        assert_eq!(rfc3339(whole), "2025-06-01T16:00:00.000000Z");
        assert_eq!(rfc3339(later), "2025-06-01T16:00:00.500000Z");
        assert!(rfc3339(whole) < rfc3339(later));
        assert_eq!(now_rfc3339().len(), rfc3339(whole).len());
    }

    #[tokio::test]
    async fn test_count() {
        let store = store().await;
        assert_eq!(store.count(collections::SERVICES).await.unwrap(), 0);
        store
            .create(collections::SERVICES, Fields::new())
            .await
            .unwrap();
        assert_eq!(store.count(collections::SERVICES).await.unwrap(), 1);
    }
}
