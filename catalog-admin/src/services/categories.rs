//! Category service

use shared::backend::{insert_as, query_as, update_with};
use shared::models::{
    Category, CategoryCreate, CategoryOption, CategoryUpdate, next_category_id, parse_subcategories,
    tables,
};
use shared::{DataStore, Filter};
use std::sync::Arc;
use validator::Validate;

use super::fetch_one;
use crate::error::{CatalogError, CatalogResult, Resource};

#[derive(Clone)]
pub struct CategoryService {
    store: Arc<dyn DataStore>,
}

impl CategoryService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// All categories, ascending by id
    pub async fn list(&self) -> CatalogResult<Vec<Category>> {
        let mut categories: Vec<Category> =
            query_as(self.store.as_ref(), tables::CATEGORIES, &[]).await?;
        categories.sort_by_key(|c| c.id);
        Ok(categories)
    }

    /// Options for the creation form
    pub async fn options(&self) -> CatalogResult<Vec<CategoryOption>> {
        Ok(self.list().await?.into_iter().map(Into::into).collect())
    }

    /// Create a category with id `max(id) + 1`
    ///
    /// Two concurrent creates can compute the same id; the store rejects the
    /// second insert as a conflict.
    pub async fn create(&self, payload: CategoryCreate) -> CatalogResult<Category> {
        check(&payload)?;

        let existing = self.list().await?;
        let category = payload.into_category(next_category_id(&existing));
        let stored: Category = insert_as(self.store.as_ref(), tables::CATEGORIES, &category).await?;
        tracing::info!(category_id = stored.id, name = %stored.name, "Category created");
        Ok(stored)
    }

    /// Replace name and subcategories
    pub async fn update(&self, id: i64, payload: CategoryCreate) -> CatalogResult<Category> {
        check(&payload)?;
        let mut category: Category =
            fetch_one(self.store.as_ref(), tables::CATEGORIES, Resource::Category, id).await?;

        let patch = CategoryUpdate {
            name: Some(payload.name.trim().to_string()),
            subcategories: Some(parse_subcategories(&payload.subcategories)),
        };
        update_with(self.store.as_ref(), tables::CATEGORIES, &[Filter::id(id)], &patch).await?;

        if let Some(name) = patch.name {
            category.name = name;
        }
        if let Some(subcategories) = patch.subcategories {
            category.subcategories = subcategories;
        }
        tracing::info!(category_id = id, "Category updated");
        Ok(category)
    }

    pub async fn delete(&self, id: i64) -> CatalogResult<()> {
        fetch_one::<Category>(self.store.as_ref(), tables::CATEGORIES, Resource::Category, id).await?;
        self.store.delete(tables::CATEGORIES, &[Filter::id(id)]).await?;
        tracing::info!(category_id = id, "Category deleted");
        Ok(())
    }
}

/// Name and at least one subcategory are required
fn check(payload: &CategoryCreate) -> CatalogResult<()> {
    payload
        .validate()
        .map_err(|e| CatalogError::validation(e.to_string()))?;
    if payload.name.trim().is_empty() {
        return Err(CatalogError::Required("name"));
    }
    if parse_subcategories(&payload.subcategories).is_empty() {
        return Err(CatalogError::Required("subcategories"));
    }
    Ok(())
}
