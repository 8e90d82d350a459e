//! Add-on Models
//!
//! An add-on category (`addons` table) groups optional extras for one
//! product; each extra is an add-on variant (`addon_variants` table).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::serde_helpers;

/// Add-on category entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddonCategory {
    pub id: i64,
    pub title: String,
    #[serde(rename = "productid")]
    pub product_id: i64,
}

/// Create add-on category payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddonCategoryCreate {
    pub title: String,
    #[serde(rename = "productid")]
    pub product_id: i64,
}

/// Rename add-on category payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddonCategoryUpdate {
    #[validate(length(min = 1, max = 200, message = "title must not be empty"))]
    pub title: String,
}

/// Add-on variant entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddonVariant {
    pub id: i64,
    #[serde(rename = "addonid")]
    pub addon_id: i64,
    pub title: String,
    pub price: Decimal,
    #[serde(default, deserialize_with = "serde_helpers::non_empty_string")]
    pub image: Option<String>,
}

/// Create add-on variant payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddonVariantCreate {
    #[serde(rename = "addonid")]
    pub addon_id: i64,
    pub title: String,
    pub price: Decimal,
    pub image: String,
}

/// Update add-on variant payload (only present fields are written)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddonVariantUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl AddonVariantUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.price.is_none() && self.image.is_none()
    }
}
