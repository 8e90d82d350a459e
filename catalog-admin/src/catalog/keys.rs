//! Storage keys for catalog images
//!
//! Keys are derived from titles and owning ids. Two variants with the same
//! title under one product collide; uploads never overwrite (no upsert), so
//! the second one fails instead of replacing the first image.

/// Main image of a new variant: `{title}-main-{productId}`
pub fn variant_main(title: &str, product_id: i64) -> String {
    format!("{title}-main-{product_id}")
}

/// Additional image of a new variant: `{title}-{index}-{productId}`
pub fn variant_additional(title: &str, index: usize, product_id: i64) -> String {
    format!("{title}-{index}-{product_id}")
}

/// Image of a new add-on variant: `{title}-{addonCategoryId}`
pub fn addon_variant(title: &str, addon_id: i64) -> String {
    format!("{title}-{addon_id}")
}

/// Replacement main image of an edited variant: `{fileStem}-{variantId}`
pub fn edited_variant_main(file_name: &str, variant_id: i64) -> String {
    format!("{}-{variant_id}", file_stem(file_name))
}

/// Appended additional image of an edited variant:
/// `{fileStem}-{variantId}-{millis}-{index}`
///
/// `index` is the position in the upload batch, so files sharing a stem in
/// one edit get distinct keys.
pub fn edited_variant_additional(
    file_name: &str,
    variant_id: i64,
    millis: i64,
    index: usize,
) -> String {
    format!("{}-{variant_id}-{millis}-{index}", file_stem(file_name))
}

/// Replacement image of an edited add-on variant; whitespace runs become `_`
pub fn edited_addon_variant(title: &str, id: i64) -> String {
    let joined = title.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{joined}-{id}")
}

/// Everything before the first `.`
fn file_stem(file_name: &str) -> &str {
    file_name
        .split('.')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("image")
}
