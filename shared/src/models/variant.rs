//! Product Variant Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::serde_helpers;

/// Product variant entity (`product_variants` table)
///
/// `image` and `additional_images` hold storage keys, not URLs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: i64,
    pub product_id: i64,
    pub title: String,
    pub price: Decimal,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::non_empty_string")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::string_list")]
    pub additional_images: Vec<String>,
    // Read-only columns maintained outside this service
    #[serde(default)]
    pub dimensions: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub segment: Option<String>,
}

/// Create variant payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantCreate {
    pub product_id: i64,
    pub title: String,
    pub price: Decimal,
    pub details: Option<String>,
    pub image: String,
    pub additional_images: Vec<String>,
}

/// Update variant payload (only present fields are written)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_images: Option<Vec<String>>,
}

impl VariantUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.price.is_none()
            && self.details.is_none()
            && self.image.is_none()
            && self.additional_images.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_variant_tolerates_sparse_rows() {
        let variant: Variant = serde_json::from_value(json!({
            "id": 11,
            "product_id": 2,
            "title": "Oak",
            "price": 129.5,
            "additional_images": "[\"Oak-0-2\"]"
        }))
        .unwrap();
        assert_eq!(variant.price, Decimal::new(1295, 1));
        assert_eq!(variant.image, None);
        assert_eq!(variant.additional_images, vec!["Oak-0-2"]);
    }

    #[test]
    fn test_update_skips_absent_fields() {
        let update = VariantUpdate {
            title: Some("Walnut".into()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({ "title": "Walnut" }));
        assert!(VariantUpdate::default().is_empty());
    }
}
