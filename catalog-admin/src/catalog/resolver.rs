//! Catalog resolver: find or create the product for a category path

use shared::backend::{insert_as, query_as};
use shared::models::{Product, tables};
use shared::{BackendError, DataStore};

use super::draft::CategoryPath;
use crate::error::{CatalogError, CatalogResult};

/// Resolved product
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub product_id: i64,
    /// True when the product row was inserted by this call
    pub created: bool,
}

pub struct CatalogResolver<'a> {
    store: &'a dyn DataStore,
}

impl<'a> CatalogResolver<'a> {
    pub fn new(store: &'a dyn DataStore) -> Self {
        Self { store }
    }

    /// Return the id of the product matching `path`, inserting it if absent
    ///
    /// More than one match is an error: duplicates need operator attention
    /// before anything else is attached to either of them.
    pub async fn resolve(&self, path: &CategoryPath) -> CatalogResult<Resolution> {
        let matches: Vec<Product> =
            match query_as(self.store, tables::PRODUCTS, &path.filters()).await {
                Ok(rows) => rows,
                // "No rows" is the expected not-found signal
                Err(BackendError::NotFound(_)) => Vec::new(),
                Err(e) => return Err(e.into()),
            };

        match matches.as_slice() {
            [] => {
                let product: Product =
                    insert_as(self.store, tables::PRODUCTS, &path.to_create()).await?;
                tracing::info!(product_id = product.id, path = %path, "Product created");
                Ok(Resolution {
                    product_id: product.id,
                    created: true,
                })
            }
            [product] => {
                tracing::info!(product_id = product.id, path = %path, "Product reused");
                Ok(Resolution {
                    product_id: product.id,
                    created: false,
                })
            }
            many => {
                let ids: Vec<i64> = many.iter().map(|p| p.id).collect();
                tracing::warn!(?ids, path = %path, "Ambiguous category path");
                Err(CatalogError::AmbiguousProduct {
                    path: path.to_string(),
                    count: many.len(),
                })
            }
        }
    }
}
