//! # Catalog Repository
//!
//! Read access to the external catalogs the order editor resolves
//! against: services, products, packages and stylists (users with the
//! stylist role). Inserts exist for seeding.

use std::sync::Arc;
use tracing::debug;

use salon_core::{Package, Product, Role, Service, StaffMember, Stylist};

use super::{create_op, decode, decode_all, Record};
use crate::error::DbResult;
use crate::store::{DocumentStore, Filter, WriteBatch};

/// Repository for the catalog collections.
#[derive(Clone)]
pub struct CatalogRepository {
    store: Arc<dyn DocumentStore>,
}

impl CatalogRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        CatalogRepository { store }
    }

    async fn active<T: Record>(&self) -> DbResult<Vec<T>> {
        debug!(collection = T::COLLECTION, "Listing active catalog entries");
        let docs = self
            .store
            .list(T::COLLECTION, &[Filter::eq("active", true)])
            .await?;
        decode_all(docs)
    }

    async fn get<T: Record>(&self, id: &str) -> DbResult<Option<T>> {
        self.store.get(T::COLLECTION, id).await?.map(decode).transpose()
    }

    async fn insert<T: Record>(&self, record: &mut T) -> DbResult<String> {
        if record.id().is_empty() {
            record.set_id(salon_core::new_id());
        }
        debug!(collection = T::COLLECTION, id = record.id(), "Inserting catalog entry");

        let mut batch = WriteBatch::new();
        batch.push(create_op(record)?);
        self.store.commit(batch).await?;
        Ok(record.id().to_string())
    }

    // -------------------------------------------------------------------------
    // Active Listings (name order)
    // -------------------------------------------------------------------------

    pub async fn active_services(&self) -> DbResult<Vec<Service>> {
        let mut services: Vec<Service> = self.active().await?;
        services.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(services)
    }

    pub async fn active_products(&self) -> DbResult<Vec<Product>> {
        let mut products: Vec<Product> = self.active().await?;
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    pub async fn active_packages(&self) -> DbResult<Vec<Package>> {
        let mut packages: Vec<Package> = self.active().await?;
        packages.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(packages)
    }

    /// Users with the stylist role that are active.
    pub async fn active_stylists(&self) -> DbResult<Vec<Stylist>> {
        let docs = self
            .store
            .list(
                StaffMember::COLLECTION,
                &[
                    Filter::eq("role", Role::Stylist.as_str()),
                    Filter::eq("active", true),
                ],
            )
            .await?;

        let mut stylists: Vec<Stylist> = decode_all::<StaffMember>(docs)?
            .iter()
            .filter_map(StaffMember::as_stylist)
            .collect();
        stylists.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(stylists)
    }

    // -------------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------------

    pub async fn get_service(&self, id: &str) -> DbResult<Option<Service>> {
        self.get(id).await
    }

    pub async fn get_product(&self, id: &str) -> DbResult<Option<Product>> {
        self.get(id).await
    }

    pub async fn get_package(&self, id: &str) -> DbResult<Option<Package>> {
        self.get(id).await
    }

    pub async fn get_user(&self, id: &str) -> DbResult<Option<StaffMember>> {
        self.get(id).await
    }

    // -------------------------------------------------------------------------
    // Inserts (seeding)
    // -------------------------------------------------------------------------

    pub async fn insert_service(&self, service: &mut Service) -> DbResult<String> {
        self.insert(service).await
    }

    pub async fn insert_product(&self, product: &mut Product) -> DbResult<String> {
        self.insert(product).await
    }

    pub async fn insert_package(&self, package: &mut Package) -> DbResult<String> {
        self.insert(package).await
    }

    pub async fn insert_user(&self, user: &mut StaffMember) -> DbResult<String> {
        self.insert(user).await
    }
}
