//! Product Model
//!
//! A product is identified by its category path. It carries no data of its
//! own; variants and add-on categories hang off it.

use serde::{Deserialize, Serialize};

use super::serde_helpers;

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub category: String,
    #[serde(default, deserialize_with = "serde_helpers::non_empty_string")]
    pub subcategory: Option<String>,
    /// Third level of the category path
    #[serde(
        rename = "subcategory1",
        default,
        deserialize_with = "serde_helpers::non_empty_string"
    )]
    pub sub_subcategory: Option<String>,
}

/// Create product payload
///
/// Absent levels are written as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCreate {
    pub category: String,
    pub subcategory: Option<String>,
    #[serde(rename = "subcategory1")]
    pub sub_subcategory: Option<String>,
}
