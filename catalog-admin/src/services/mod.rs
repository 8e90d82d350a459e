//! CRUD services behind the admin screens
//!
//! Each service reads whole tables (no pagination) and joins owners in
//! memory by id. Deletes never cascade.

pub mod addon_variants;
pub mod addons;
pub mod categories;
pub mod variants;

pub use addon_variants::{AddonVariantEdit, AddonVariantService};
pub use addons::AddonService;
pub use categories::CategoryService;
pub use variants::{VariantEdit, VariantService};

use std::collections::HashMap;

use shared::backend::query_as;
use shared::models::{Product, tables};
use shared::{DataStore, Filter};
use serde::de::DeserializeOwned;

use crate::error::{CatalogError, CatalogResult, Resource};

/// Fetch exactly one row by id
pub(crate) async fn fetch_one<T: DeserializeOwned>(
    store: &dyn DataStore,
    table: &str,
    resource: Resource,
    id: i64,
) -> CatalogResult<T> {
    query_as::<T>(store, table, &[Filter::id(id)])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| CatalogError::not_found(resource, id))
}

/// All products keyed by id
pub(crate) async fn products_by_id(store: &dyn DataStore) -> CatalogResult<HashMap<i64, Product>> {
    let products: Vec<Product> = query_as(store, tables::PRODUCTS, &[]).await?;
    Ok(products.into_iter().map(|p| (p.id, p)).collect())
}
