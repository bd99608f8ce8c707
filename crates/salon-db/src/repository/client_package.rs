//! # Client-Package Repository
//!
//! Credit ledger entries per client.

use std::sync::Arc;
use tracing::debug;

use salon_core::ClientPackage;

use super::{create_op, decode, decode_all, partial_update_op, Record};
use crate::error::DbResult;
use crate::store::{DocumentStore, Filter, WriteBatch, WriteOp};

/// Body keys written by a redemption.
const REDEMPTION: &[&str] = &["remaining", "status", "lastUsedAt"];

/// Repository for the `clientPackages` collection.
#[derive(Clone)]
pub struct ClientPackageRepository {
    store: Arc<dyn DocumentStore>,
}

impl ClientPackageRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        ClientPackageRepository { store }
    }

    /// Gets an entry by id.
    pub async fn get(&self, id: &str) -> DbResult<Option<ClientPackage>> {
        self.store
            .get(ClientPackage::COLLECTION, id)
            .await?
            .map(decode)
            .transpose()
    }

    /// Entries of a client with credits left (`remaining > 0`).
    pub async fn list_active_for_client(&self, client_id: &str) -> DbResult<Vec<ClientPackage>> {
        debug!(client_id, "Listing active client packages");
        let docs = self
            .store
            .list(
                ClientPackage::COLLECTION,
                &[Filter::eq("clientId", client_id), Filter::gt("remaining", 0)],
            )
            .await?;
        decode_all(docs)
    }

    /// Every entry of a client, depleted ones included.
    pub async fn list_for_client(&self, client_id: &str) -> DbResult<Vec<ClientPackage>> {
        let docs = self
            .store
            .list(ClientPackage::COLLECTION, &[Filter::eq("clientId", client_id)])
            .await?;
        decode_all(docs)
    }

    /// Inserts a new entry.
    pub async fn insert(&self, entry: &ClientPackage) -> DbResult<()> {
        debug!(id = %entry.id, client_id = %entry.client_id, quantity = entry.quantity, "Granting client package");
        let mut batch = WriteBatch::new();
        batch.push(create_op(entry)?);
        self.store.commit(batch).await
    }

    /// Persists the balance after a redemption.
    pub async fn save_redemption(&self, entry: &ClientPackage) -> DbResult<()> {
        debug!(id = %entry.id, remaining = entry.remaining, "Saving redemption");
        let mut batch = WriteBatch::new();
        batch.push(Self::redemption_op(entry)?);
        self.store.commit(batch).await
    }

    /// Update op for a redemption.
    pub fn redemption_op(entry: &ClientPackage) -> DbResult<WriteOp> {
        partial_update_op(entry, REDEMPTION)
    }
}
