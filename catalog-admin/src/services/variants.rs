//! Variant service (the product data table and the edit page)

use std::sync::Arc;

use rust_decimal::Decimal;
use shared::backend::{query_as, update_with};
use shared::models::{ImageLocator, Variant, VariantListing, VariantUpdate, tables};
use shared::Filter;

use super::{fetch_one, products_by_id};
use crate::backend::{Backend, ImageUpload};
use crate::catalog::keys;
use crate::error::{CatalogError, CatalogResult, Resource};

/// Changes submitted from the edit page
#[derive(Debug, Clone, Default)]
pub struct VariantEdit {
    pub title: Option<String>,
    pub price: Option<Decimal>,
    pub details: Option<String>,
    /// Replaces the main image (uploaded with upsert)
    pub main_image: Option<ImageUpload>,
    /// Appended to the existing additional images
    pub additional_images: Vec<ImageUpload>,
}

#[derive(Clone)]
pub struct VariantService {
    backend: Backend,
    images: Arc<ImageLocator>,
}

impl VariantService {
    pub fn new(backend: Backend, images: Arc<ImageLocator>) -> Self {
        Self { backend, images }
    }

    /// Every variant joined with its product
    pub async fn list(&self) -> CatalogResult<Vec<VariantListing>> {
        let store = self.backend.store();
        let variants: Vec<Variant> = query_as(store, tables::PRODUCT_VARIANTS, &[]).await?;
        let products = products_by_id(store).await?;

        Ok(variants
            .into_iter()
            .map(|v| {
                let product = products.get(&v.product_id).cloned();
                VariantListing::new(v, product, &self.images)
            })
            .collect())
    }

    pub async fn get(&self, id: i64) -> CatalogResult<VariantListing> {
        let variant = self.fetch(id).await?;
        self.listing(variant).await
    }

    /// Delete the row; stored images are left in place
    pub async fn delete(&self, id: i64) -> CatalogResult<()> {
        self.fetch(id).await?;
        self.backend
            .store()
            .delete(tables::PRODUCT_VARIANTS, &[Filter::id(id)])
            .await?;
        tracing::info!(variant_id = id, "Variant deleted");
        Ok(())
    }

    /// Apply an edit: uploads first, then one row update
    ///
    /// Any failed upload aborts the edit before the row is touched, and the
    /// images this edit already stored are removed again.
    pub async fn edit(&self, id: i64, edit: VariantEdit) -> CatalogResult<VariantListing> {
        let mut variant = self.fetch(id).await?;

        if let Some(title) = &edit.title
            && title.trim().is_empty()
        {
            return Err(CatalogError::Required("title"));
        }
        if edit.price.is_some_and(|p| p.is_sign_negative()) {
            return Err(CatalogError::validation("price must not be negative"));
        }

        let mut update = VariantUpdate {
            title: edit.title.map(|t| t.trim().to_string()),
            price: edit.price,
            details: edit.details,
            ..Default::default()
        };

        // The main image upserts over the live object, so it is uploaded last
        let mut appended = Vec::new();
        if !edit.additional_images.is_empty() {
            let millis = chrono::Utc::now().timestamp_millis();
            let items: Vec<(String, &ImageUpload)> = edit
                .additional_images
                .iter()
                .enumerate()
                .map(|(i, image)| {
                    (keys::edited_variant_additional(&image.file_name, id, millis, i), image)
                })
                .collect();
            let batch = self.backend.upload_all(&items, false).await;
            if let Some((index, error)) = batch.failed.first() {
                self.discard(id, &batch.keys).await;
                return Err(CatalogError::Upload {
                    key: items[*index].0.clone(),
                    source: error.clone(),
                });
            }
            appended = batch.keys;
        }

        if let Some(image) = &edit.main_image {
            let key = keys::edited_variant_main(&image.file_name, id);
            let uploaded = self.backend.upload(&key, image, true).await;
            match uploaded {
                Ok(stored) => update.image = Some(stored),
                Err(source) => {
                    self.discard(id, &appended).await;
                    return Err(CatalogError::Upload { key, source });
                }
            }
        }

        if !appended.is_empty() {
            let mut all = variant.additional_images.clone();
            all.extend(appended);
            update.additional_images = Some(all);
        }

        if update.is_empty() {
            return self.listing(variant).await;
        }

        update_with(self.backend.store(), tables::PRODUCT_VARIANTS, &[Filter::id(id)], &update)
            .await?;
        tracing::info!(variant_id = id, "Variant updated");

        apply(&mut variant, update);
        self.listing(variant).await
    }

    /// Drop one key from the additional images (the stored object is kept)
    pub async fn remove_additional_image(&self, id: i64, key: &str) -> CatalogResult<VariantListing> {
        let mut variant = self.fetch(id).await?;
        if !variant.additional_images.iter().any(|k| k == key) {
            return Err(CatalogError::not_found(Resource::Image, key));
        }

        let remaining: Vec<String> = variant
            .additional_images
            .iter()
            .filter(|k| k.as_str() != key)
            .cloned()
            .collect();
        let update = VariantUpdate {
            additional_images: Some(remaining),
            ..Default::default()
        };
        update_with(self.backend.store(), tables::PRODUCT_VARIANTS, &[Filter::id(id)], &update)
            .await?;
        tracing::info!(variant_id = id, key, "Additional image removed");

        apply(&mut variant, update);
        self.listing(variant).await
    }

    /// Remove uploads of an aborted edit
    async fn discard(&self, id: i64, keys: &[String]) {
        if keys.is_empty() {
            return;
        }
        if let Err(e) = self.backend.remove_images(keys).await {
            tracing::warn!(variant_id = id, error = %e, "Could not remove partial uploads");
        }
    }

    async fn fetch(&self, id: i64) -> CatalogResult<Variant> {
        fetch_one(self.backend.store(), tables::PRODUCT_VARIANTS, Resource::Variant, id).await
    }

    async fn listing(&self, variant: Variant) -> CatalogResult<VariantListing> {
        let product = query_as(
            self.backend.store(),
            tables::PRODUCTS,
            &[Filter::id(variant.product_id)],
        )
        .await?
        .into_iter()
        .next();
        Ok(VariantListing::new(variant, product, &self.images))
    }
}

fn apply(variant: &mut Variant, update: VariantUpdate) {
    if let Some(title) = update.title {
        variant.title = title;
    }
    if let Some(price) = update.price {
        variant.price = price;
    }
    if let Some(details) = update.details {
        variant.details = Some(details);
    }
    if let Some(image) = update.image {
        variant.image = Some(image);
    }
    if let Some(additional) = update.additional_images {
        variant.additional_images = additional;
    }
}
