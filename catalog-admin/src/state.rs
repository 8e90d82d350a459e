//! Application state

use std::sync::Arc;

use catalog_client::{ClientConfig, RestBackend};
use shared::models::ImageLocator;

use crate::backend::Backend;
use crate::catalog::{SubmissionPolicy, SubmissionService};
use crate::config::{BackendKind, Config};
use crate::services::{AddonService, AddonVariantService, CategoryService, VariantService};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub backend: Backend,
    /// Public URL builder for stored images
    pub images: Arc<ImageLocator>,
    pub policy: SubmissionPolicy,
}

impl AppState {
    /// Build state from configuration
    pub fn new(config: &Config) -> Result<Self, BoxError> {
        let backend = match config.backend {
            BackendKind::Rest => {
                let client_config = ClientConfig::new(&config.backend_url, &config.backend_api_key)
                    .with_timeout(config.request_timeout_secs);
                let rest = Arc::new(RestBackend::new(&client_config)?);
                tracing::info!(url = %config.backend_url, "Using REST backend");
                Backend::new(rest.clone(), rest, &config.storage_bucket)
            }
            BackendKind::Memory => {
                tracing::warn!("Using in-memory backend; data is lost on restart");
                Backend::memory(&config.storage_bucket).0
            }
        };

        let images = ImageLocator::new(&config.public_storage_url, &config.storage_bucket);
        Ok(Self::with_backend(backend, images, config.policy))
    }

    /// Build state around an existing backend
    pub fn with_backend(backend: Backend, images: ImageLocator, policy: SubmissionPolicy) -> Self {
        Self {
            backend,
            images: Arc::new(images),
            policy,
        }
    }

    pub fn categories(&self) -> CategoryService {
        CategoryService::new(self.backend.store.clone())
    }

    pub fn variants(&self) -> VariantService {
        VariantService::new(self.backend.clone(), self.images.clone())
    }

    pub fn addons(&self) -> AddonService {
        AddonService::new(self.backend.store.clone())
    }

    pub fn addon_variants(&self) -> AddonVariantService {
        AddonVariantService::new(self.backend.clone(), self.images.clone())
    }

    pub fn submissions(&self) -> SubmissionService {
        SubmissionService::new(self.backend.clone(), self.policy)
    }
}
