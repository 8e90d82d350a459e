//! Data models
//!
//! Row types mirror the backend tables one to one; payload types carry
//! what the admin service writes. All IDs are `i64`.

pub mod addon;
pub mod category;
pub mod image;
pub mod listing;
pub mod product;
pub mod serde_helpers;
pub mod variant;

// Re-exports
pub use addon::*;
pub use category::*;
pub use image::*;
pub use listing::*;
pub use product::*;
pub use variant::*;

/// Backend table names
pub mod tables {
    pub const CATEGORIES: &str = "categories";
    pub const PRODUCTS: &str = "products";
    pub const PRODUCT_VARIANTS: &str = "product_variants";
    pub const ADDONS: &str = "addons";
    pub const ADDON_VARIANTS: &str = "addon_variants";
}
