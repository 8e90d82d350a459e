//! Service-layer error for catalog-admin
//!
//! `CatalogError` covers everything the catalog flow and the CRUD services
//! can fail with, and converts into the API-layer `AppError` so handlers can
//! propagate with `?`.

use axum::response::IntoResponse;
use shared::{AppError, BackendError, ErrorCode};
use thiserror::Error;

/// Catalog entity kinds, used for not-found reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Category,
    Product,
    Variant,
    AddonCategory,
    AddonVariant,
    Image,
}

impl Resource {
    pub fn name(&self) -> &'static str {
        match self {
            Resource::Category => "category",
            Resource::Product => "product",
            Resource::Variant => "variant",
            Resource::AddonCategory => "add-on category",
            Resource::AddonVariant => "add-on variant",
            Resource::Image => "image",
        }
    }

    fn not_found_code(&self) -> ErrorCode {
        match self {
            Resource::Category => ErrorCode::CategoryNotFound,
            Resource::Product => ErrorCode::ProductNotFound,
            Resource::Variant => ErrorCode::VariantNotFound,
            Resource::AddonCategory => ErrorCode::AddonCategoryNotFound,
            Resource::AddonVariant => ErrorCode::AddonVariantNotFound,
            Resource::Image => ErrorCode::NotFound,
        }
    }
}

/// Catalog error type
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Draft or payload failed validation
    #[error("{0}")]
    Validation(String),

    /// A required field was missing
    #[error("{0} is required")]
    Required(&'static str),

    /// Addressed entity does not exist
    #[error("{} {id} not found", resource.name())]
    NotFound { resource: Resource, id: String },

    /// More than one product row matches a category path
    #[error("{count} products match category path {path}")]
    AmbiguousProduct { path: String, count: usize },

    /// Blob upload failed
    #[error("Image upload failed for {key}: {source}")]
    Upload {
        key: String,
        #[source]
        source: BackendError,
    },

    /// Row write or read failed
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl CatalogError {
    pub fn not_found(resource: Resource, id: impl ToString) -> Self {
        CatalogError::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        CatalogError::Validation(msg.into())
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(msg) => AppError::validation(msg),
            CatalogError::Required(field) => AppError::required(field),
            CatalogError::NotFound { resource, id } => AppError::with_message(
                resource.not_found_code(),
                format!("{} {id} not found", resource.name()),
            )
            .with_detail("resource", resource.name())
            .with_detail("id", id),
            CatalogError::AmbiguousProduct { path, count } => AppError::with_message(
                ErrorCode::ProductAmbiguous,
                format!("{count} products match category path {path}"),
            )
            .with_detail("path", path)
            .with_detail("count", count),
            CatalogError::Upload { key, source } => {
                tracing::error!(key = %key, error = %source, "Image upload failed");
                AppError::with_message(ErrorCode::ImageUploadFailed, source.to_string())
                    .with_detail("key", key)
            }
            CatalogError::Backend(e) => {
                tracing::error!(error = %e, "Backend error");
                e.into()
            }
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

/// Convenience type alias for catalog results
pub type CatalogResult<T> = Result<T, CatalogError>;
