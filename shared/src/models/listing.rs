//! Listing views
//!
//! Read models for the admin tables: a row joined with its owner and with
//! its image keys resolved to public URLs.

use serde::{Deserialize, Serialize};

use super::{AddonCategory, AddonVariant, ImageLocator, Product, Variant};

/// Variant row joined with its product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantListing {
    #[serde(flatten)]
    pub variant: Variant,
    pub image_url: Option<String>,
    pub additional_image_urls: Vec<String>,
    /// `None` when the owning product no longer exists
    pub product: Option<Product>,
}

impl VariantListing {
    pub fn new(variant: Variant, product: Option<Product>, images: &ImageLocator) -> Self {
        let image_url = variant.image.as_deref().and_then(|k| images.url(k));
        let additional_image_urls = images.urls(&variant.additional_images);
        Self {
            variant,
            image_url,
            additional_image_urls,
            product,
        }
    }
}

/// Add-on category joined with its product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddonListing {
    #[serde(flatten)]
    pub addon: AddonCategory,
    pub product: Option<Product>,
}

/// Add-on variant joined with its add-on category title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddonVariantListing {
    #[serde(flatten)]
    pub variant: AddonVariant,
    pub image_url: Option<String>,
    pub addon_title: Option<String>,
}

impl AddonVariantListing {
    pub fn new(variant: AddonVariant, addon_title: Option<String>, images: &ImageLocator) -> Self {
        let image_url = variant.image.as_deref().and_then(|k| images.url(k));
        Self {
            variant,
            image_url,
            addon_title,
        }
    }
}
