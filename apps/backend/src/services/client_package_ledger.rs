//! # Client-Package Ledger
//!
//! Pre-paid service credits per client.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  grant(client, package)            ──► remaining = quantity, active    │
//! │  grant_from_sale_line(order, i)    ──► same, from a paid package line  │
//! │                                         once per line, order's client  │
//! │  redeem(id)                        ──► remaining − 1                   │
//! │                                         0 → depleted, below 0 refused  │
//! │  list_active(client)               ──► entries with remaining > 0      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Selling a package on an order never grants credits by itself. Granting
//! from a sale line is a separate, explicit step. The new entry and the
//! line's `granted` marker are committed in one batch.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use salon_core::{ClientPackage, ClientRef, CoreError, PackageGrant};
use salon_db::repository::{create_op, partial_update_op};
use salon_db::{
    CatalogRepository, ClientPackageRepository, Database, DocumentStore, OrderRepository,
    WriteBatch,
};

use crate::error::{ApiError, ApiResult};

#[derive(Clone)]
pub struct ClientPackageLedger {
    store: Arc<dyn DocumentStore>,
    entries: ClientPackageRepository,
    orders: OrderRepository,
    catalog: CatalogRepository,
}

impl ClientPackageLedger {
    pub fn new(db: &Database) -> Self {
        ClientPackageLedger {
            store: db.store(),
            entries: db.client_packages(),
            orders: db.orders(),
            catalog: db.catalog(),
        }
    }

    /// Grants a catalog package to a client.
    pub async fn grant(&self, client: &ClientRef, package_id: &str) -> ApiResult<ClientPackage> {
        let package = self
            .catalog
            .get_package(package_id)
            .await?
            .filter(|p| p.active)
            .ok_or_else(|| CoreError::not_in_catalog("package", package_id))?;

        let entry = ClientPackage::grant(
            salon_core::new_id(),
            client,
            PackageGrant::from_package(&package),
            Utc::now(),
        )?;
        self.entries.insert(&entry).await?;
        log_granted(&entry);
        Ok(entry)
    }

    /// Grants the credits of a sold package line to the order's client.
    ///
    /// The order must be closed and paid, and each line is granted once.
    pub async fn grant_from_sale_line(
        &self,
        order_id: &str,
        line_index: usize,
    ) -> ApiResult<ClientPackage> {
        let mut order = self
            .orders
            .get(order_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Order", order_id))?;

        let now = Utc::now();
        let order_number = order.order_number;
        let entry_id = salon_core::new_id();
        let grant = match order.mark_package_granted(line_index, &entry_id, now) {
            Ok(line) => PackageGrant::from_sale_line(line),
            Err(e) => {
                warn!(order_number, line_index, "Grant rejected: {}", e);
                return Err(e.into());
            }
        };
        let entry = ClientPackage::grant(entry_id, &order.client(), grant, now)?;

        debug!(order_number, package_id = %entry.package_id, "Granting from sale line");
        let mut batch = WriteBatch::new();
        batch.push(create_op(&entry)?);
        batch.push(partial_update_op(&order, &["packagesSold", "updatedAt"])?);
        self.store.commit(batch).await?;

        log_granted(&entry);
        Ok(entry)
    }

    /// Uses one credit. Refused once nothing is left.
    pub async fn redeem(&self, id: &str) -> ApiResult<ClientPackage> {
        let mut entry = self
            .entries
            .get(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Client package", id))?;

        if let Err(e) = entry.redeem(Utc::now()) {
            warn!(id, "Redemption rejected: {}", e);
            return Err(e.into());
        }

        self.entries.save_redemption(&entry).await?;
        info!(id, remaining = entry.remaining, status = %entry.status, "Credit redeemed");
        Ok(entry)
    }

    /// Credits a client can pay with.
    pub async fn list_active(&self, client_id: &str) -> ApiResult<Vec<ClientPackage>> {
        Ok(self.entries.list_active_for_client(client_id).await?)
    }

    /// Every entry of a client, depleted ones included.
    pub async fn list_for_client(&self, client_id: &str) -> ApiResult<Vec<ClientPackage>> {
        Ok(self.entries.list_for_client(client_id).await?)
    }
}

fn log_granted(entry: &ClientPackage) {
    info!(
        id = %entry.id,
        client_id = %entry.client_id,
        package = %entry.package_name,
        credits = entry.quantity,
        "Client package granted"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use chrono::NaiveDate;
    use salon_core::{ClientPackageStatus, Money, NewOrder, Order, Package, PaymentMethod, Role};
    use salon_db::DbConfig;

    fn client() -> ClientRef {
        ClientRef {
            id: Some("c-ana".to_string()),
            name: "Ana".to_string(),
            phone: String::new(),
        }
    }

    async fn setup() -> (Database, ClientPackageLedger, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let package_id = db
            .catalog()
            .insert_package(&mut Package {
                id: String::new(),
                name: "Cortes x2".to_string(),
                service_id: "svc-corte".to_string(),
                service_name: "Corte".to_string(),
                quantity: 2,
                price: Money::from_quetzales(280),
                active: true,
            })
            .await
            .unwrap();
        let ledger = ClientPackageLedger::new(&db);
        (db, ledger, package_id)
    }

    #[tokio::test]
    async fn test_redeem_until_depleted() {
        let (_db, ledger, package_id) = setup().await;
        let entry = ledger.grant(&client(), &package_id).await.unwrap();
        assert_eq!(entry.remaining, 2);
        assert_eq!(entry.status, ClientPackageStatus::Active);

        let after = ledger.redeem(&entry.id).await.unwrap();
        assert_eq!(after.remaining, 1);
        assert_eq!(after.status, ClientPackageStatus::Active);

        let after = ledger.redeem(&entry.id).await.unwrap();
        assert_eq!(after.remaining, 0);
        assert_eq!(after.status, ClientPackageStatus::Depleted);
        assert!(ledger.list_active("c-ana").await.unwrap().is_empty());

        let err = ledger.redeem(&entry.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
        assert_eq!(ledger.list_for_client("c-ana").await.unwrap()[0].remaining, 0);
    }

    #[tokio::test]
    async fn test_redeem_missing_entry() {
        let (_db, ledger, _) = setup().await;
        let err = ledger.redeem("nope").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_grant_requires_client_and_catalog_package() {
        let (_db, ledger, package_id) = setup().await;
        let anonymous = ClientRef {
            id: None,
            name: "Walk-in".to_string(),
            phone: String::new(),
        };
        assert!(ledger.grant(&anonymous, &package_id).await.is_err());

        let err = ledger.grant(&client(), "pkg-missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    async fn sell_package(db: &Database, package_id: &str, multiplier: i64, close: bool) {
        let package = db.catalog().get_package(package_id).await.unwrap().unwrap();
        let mut order = Order::from_appointment(
            NewOrder {
                id: "o-1".to_string(),
                appointment_id: "a-1".to_string(),
                client: client(),
                date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            },
            60288,
            Utc::now(),
        );
        order.open_for_edit(Role::Cashier, &[]).unwrap();
        order.add_package_sale(&package, multiplier).unwrap();
        if close {
            order.close(PaymentMethod::Cash, "u-caja", Utc::now()).unwrap();
        }
        db.orders().insert(&order).await.unwrap();
    }

    #[tokio::test]
    async fn test_grant_from_sale_line() {
        let (db, ledger, package_id) = setup().await;
        sell_package(&db, &package_id, 3, true).await;

        // selling alone grants nothing
        assert!(ledger.list_active("c-ana").await.unwrap().is_empty());

        let entry = ledger.grant_from_sale_line("o-1", 0).await.unwrap();
        assert_eq!(entry.client_id, "c-ana");
        assert_eq!(entry.quantity, 6);
        assert_eq!(entry.remaining, 6);
        assert_eq!(entry.price, Money::from_quetzales(840));
        assert_eq!(ledger.list_active("c-ana").await.unwrap().len(), 1);

        let stored = db.orders().get("o-1").await.unwrap().unwrap();
        assert_eq!(stored.packages_sold[0].granted.as_deref(), Some(entry.id.as_str()));

        let err = ledger.grant_from_sale_line("o-1", 1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_sale_line_granted_only_once() {
        let (db, ledger, package_id) = setup().await;
        sell_package(&db, &package_id, 1, true).await;

        ledger.grant_from_sale_line("o-1", 0).await.unwrap();
        let err = ledger.grant_from_sale_line("o-1", 0).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);

        let entries = ledger.list_for_client("c-ana").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_unpaid_sale_line_is_not_granted() {
        let (db, ledger, package_id) = setup().await;
        sell_package(&db, &package_id, 1, false).await;

        let err = ledger.grant_from_sale_line("o-1", 0).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
        assert!(ledger.list_for_client("c-ana").await.unwrap().is_empty());
        let stored = db.orders().get("o-1").await.unwrap().unwrap();
        assert!(stored.packages_sold[0].granted.is_none());

        let err = ledger.grant_from_sale_line("o-missing", 0).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
