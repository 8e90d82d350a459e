//! Add-on variant service

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use shared::backend::{query_as, update_with};
use shared::models::{
    AddonCategory, AddonVariant, AddonVariantListing, AddonVariantUpdate, ImageLocator, tables,
};
use shared::Filter;

use super::fetch_one;
use crate::backend::{Backend, ImageUpload};
use crate::catalog::keys;
use crate::error::{CatalogError, CatalogResult, Resource};

/// Changes submitted from the add-on variant edit page
#[derive(Debug, Clone, Default)]
pub struct AddonVariantEdit {
    pub title: Option<String>,
    pub price: Option<Decimal>,
    /// Replaces the image (uploaded with upsert)
    pub image: Option<ImageUpload>,
}

#[derive(Clone)]
pub struct AddonVariantService {
    backend: Backend,
    images: Arc<ImageLocator>,
}

impl AddonVariantService {
    pub fn new(backend: Backend, images: Arc<ImageLocator>) -> Self {
        Self { backend, images }
    }

    /// Every add-on variant with its add-on category title and image URL
    pub async fn list(&self) -> CatalogResult<Vec<AddonVariantListing>> {
        let store = self.backend.store();
        let variants: Vec<AddonVariant> = query_as(store, tables::ADDON_VARIANTS, &[]).await?;
        let addons: Vec<AddonCategory> = query_as(store, tables::ADDONS, &[]).await?;
        let titles: HashMap<i64, String> = addons.into_iter().map(|a| (a.id, a.title)).collect();

        Ok(variants
            .into_iter()
            .map(|v| {
                let title = titles.get(&v.addon_id).cloned();
                AddonVariantListing::new(v, title, &self.images)
            })
            .collect())
    }

    pub async fn get(&self, id: i64) -> CatalogResult<AddonVariantListing> {
        let variant = self.fetch(id).await?;
        self.listing(variant).await
    }

    pub async fn edit(&self, id: i64, edit: AddonVariantEdit) -> CatalogResult<AddonVariantListing> {
        let mut variant = self.fetch(id).await?;

        let title = match edit.title {
            Some(t) if t.trim().is_empty() => return Err(CatalogError::Required("title")),
            Some(t) => Some(t.trim().to_string()),
            None => None,
        };
        if edit.price.is_some_and(|p| p.is_sign_negative()) {
            return Err(CatalogError::validation("price must not be negative"));
        }

        let mut update = AddonVariantUpdate {
            title,
            price: edit.price,
            image: None,
        };

        if let Some(image) = &edit.image {
            let effective_title = update.title.as_deref().unwrap_or(&variant.title);
            let key = keys::edited_addon_variant(effective_title, id);
            let stored = self
                .backend
                .upload(&key, image, true)
                .await
                .map_err(|source| CatalogError::Upload { key, source })?;
            update.image = Some(stored);
        }

        if update.is_empty() {
            return self.listing(variant).await;
        }

        update_with(self.backend.store(), tables::ADDON_VARIANTS, &[Filter::id(id)], &update)
            .await?;
        tracing::info!(addon_variant_id = id, "Add-on variant updated");

        if let Some(title) = update.title {
            variant.title = title;
        }
        if let Some(price) = update.price {
            variant.price = price;
        }
        if let Some(image) = update.image {
            variant.image = Some(image);
        }
        self.listing(variant).await
    }

    pub async fn delete(&self, id: i64) -> CatalogResult<()> {
        self.fetch(id).await?;
        self.backend
            .store()
            .delete(tables::ADDON_VARIANTS, &[Filter::id(id)])
            .await?;
        tracing::info!(addon_variant_id = id, "Add-on variant deleted");
        Ok(())
    }

    async fn fetch(&self, id: i64) -> CatalogResult<AddonVariant> {
        fetch_one(self.backend.store(), tables::ADDON_VARIANTS, Resource::AddonVariant, id).await
    }

    async fn listing(&self, variant: AddonVariant) -> CatalogResult<AddonVariantListing> {
        let addon: Option<AddonCategory> =
            query_as(self.backend.store(), tables::ADDONS, &[Filter::id(variant.addon_id)])
                .await?
                .into_iter()
                .next();
        Ok(AddonVariantListing::new(
            variant,
            addon.map(|a| a.title),
            &self.images,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use serde_json::json;

    fn service() -> (AddonVariantService, Arc<MemoryBackend>) {
        let (backend, memory) = Backend::memory("addon");
        memory.seed(tables::ADDONS, [json!({ "id": 3, "title": "Cushions", "productid": 2 })]);
        memory.seed(
            tables::ADDON_VARIANTS,
            [
                json!({ "id": 1, "addonid": 3, "title": "Linen Cover", "price": 15, "image": "Linen Cover-3" }),
                json!({ "id": 2, "addonid": 30, "title": "Wool", "price": 20, "image": null }),
            ],
        );
        let images = Arc::new(ImageLocator::new("https://cdn.test/public", "addon"));
        (AddonVariantService::new(backend, images), memory)
    }

    #[tokio::test]
    async fn test_list_joins_addon_title() {
        let (service, _) = service();
        let listings = service.list().await.unwrap();
        assert_eq!(listings[0].addon_title.as_deref(), Some("Cushions"));
        assert_eq!(
            listings[0].image_url.as_deref(),
            Some("https://cdn.test/public/addon/Linen Cover-3")
        );
        assert!(listings[1].addon_title.is_none());
        assert!(listings[1].image_url.is_none());
    }

    #[tokio::test]
    async fn test_edit_with_image_uses_title_key() {
        let (service, memory) = service();
        let edit = AddonVariantEdit {
            price: Some(Decimal::new(18, 0)),
            image: Some(ImageUpload::new("x.png", "image/png", vec![7])),
            ..Default::default()
        };
        let listing = service.edit(1, edit).await.unwrap();
        assert_eq!(listing.variant.image.as_deref(), Some("Linen_Cover-1"));
        assert_eq!(listing.variant.price, Decimal::new(18, 0));
        assert_eq!(memory.rows(tables::ADDON_VARIANTS)[0]["image"], "Linen_Cover-1");
    }

    #[tokio::test]
    async fn test_get_and_delete() {
        let (service, memory) = service();
        assert_eq!(service.get(2).await.unwrap().variant.title, "Wool");
        service.delete(2).await.unwrap();
        assert_eq!(memory.rows(tables::ADDON_VARIANTS).len(), 1);
        assert!(matches!(service.get(2).await, Err(CatalogError::NotFound { .. })));
    }
}
