//! Add-on category service

use std::sync::Arc;

use shared::backend::{query_as, update_with};
use shared::models::{AddonCategory, AddonCategoryUpdate, AddonListing, tables};
use shared::{DataStore, Filter};
use validator::Validate;

use super::{fetch_one, products_by_id};
use crate::error::{CatalogError, CatalogResult, Resource};

#[derive(Clone)]
pub struct AddonService {
    store: Arc<dyn DataStore>,
}

impl AddonService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Every add-on category joined with its product (absent when orphaned)
    pub async fn list(&self) -> CatalogResult<Vec<AddonListing>> {
        let addons: Vec<AddonCategory> = query_as(self.store.as_ref(), tables::ADDONS, &[]).await?;
        let products = products_by_id(self.store.as_ref()).await?;

        Ok(addons
            .into_iter()
            .map(|addon| {
                let product = products.get(&addon.product_id).cloned();
                AddonListing { addon, product }
            })
            .collect())
    }

    pub async fn rename(&self, id: i64, payload: AddonCategoryUpdate) -> CatalogResult<AddonCategory> {
        let title = payload.title.trim().to_string();
        if title.is_empty() {
            return Err(CatalogError::Required("title"));
        }
        payload
            .validate()
            .map_err(|e| CatalogError::validation(e.to_string()))?;

        let mut addon: AddonCategory =
            fetch_one(self.store.as_ref(), tables::ADDONS, Resource::AddonCategory, id).await?;
        update_with(
            self.store.as_ref(),
            tables::ADDONS,
            &[Filter::id(id)],
            &AddonCategoryUpdate { title: title.clone() },
        )
        .await?;
        tracing::info!(addon_id = id, title = %title, "Add-on category renamed");

        addon.title = title;
        Ok(addon)
    }

    /// Delete the category; its add-on variants stay
    pub async fn delete(&self, id: i64) -> CatalogResult<()> {
        fetch_one::<AddonCategory>(self.store.as_ref(), tables::ADDONS, Resource::AddonCategory, id)
            .await?;
        self.store.delete(tables::ADDONS, &[Filter::id(id)]).await?;
        tracing::info!(addon_id = id, "Add-on category deleted");
        Ok(())
    }
}
