//! Submission draft
//!
//! The creation form arrives as one immutable [`ProductDraft`]. Validation
//! looks at the draft as a whole and produces a [`ValidatedDraft`], where
//! each variant and add-on is either ready to persist or skipped with the
//! missing fields named.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;
use shared::Filter;
use shared::models::ProductCreate;

use crate::backend::ImageUpload;
use crate::error::{CatalogError, CatalogResult};

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Category / subcategory / sub-subcategory triple identifying a product
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryPath {
    pub category: String,
    pub subcategory: Option<String>,
    pub sub_subcategory: Option<String>,
}

impl CategoryPath {
    /// Build a path; blank levels become absent
    pub fn new(
        category: impl Into<String>,
        subcategory: Option<String>,
        sub_subcategory: Option<String>,
    ) -> Self {
        Self {
            category: category.into().trim().to_string(),
            subcategory: normalize(subcategory),
            sub_subcategory: normalize(sub_subcategory),
        }
    }

    /// Exact-match filters on all three columns
    pub fn filters(&self) -> Vec<Filter> {
        vec![
            Filter::eq("category", self.category.as_str()),
            Filter::eq_or_null("subcategory", self.subcategory.as_deref()),
            Filter::eq_or_null("subcategory1", self.sub_subcategory.as_deref()),
        ]
    }

    pub fn to_create(&self) -> ProductCreate {
        ProductCreate {
            category: self.category.clone(),
            subcategory: self.subcategory.clone(),
            sub_subcategory: self.sub_subcategory.clone(),
        }
    }
}

impl fmt::Display for CategoryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.category)?;
        for level in [&self.subcategory, &self.sub_subcategory].into_iter().flatten() {
            write!(f, " / {level}")?;
        }
        Ok(())
    }
}

/// One variant row of the creation form
#[derive(Debug, Clone, Default)]
pub struct VariantDraft {
    pub title: Option<String>,
    pub price: Option<Decimal>,
    pub details: Option<String>,
    pub main_image: Option<ImageUpload>,
    pub additional_images: Vec<ImageUpload>,
}

/// One add-on row of the creation form
#[derive(Debug, Clone, Default)]
pub struct AddonDraft {
    pub title: Option<String>,
    pub price: Option<Decimal>,
    pub image: Option<ImageUpload>,
}

/// Add-on category with its add-ons
#[derive(Debug, Clone, Default)]
pub struct AddonGroupDraft {
    pub title: String,
    pub addons: Vec<AddonDraft>,
}

/// Whole creation form
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub path: CategoryPath,
    pub variants: Vec<VariantDraft>,
    pub addon_group: Option<AddonGroupDraft>,
}

/// Validation verdict for one entity
#[derive(Debug, Clone)]
pub enum Checked<T> {
    Ready(T),
    Skipped {
        title: Option<String>,
        missing: Vec<&'static str>,
    },
}

impl<T> Checked<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Checked::Ready(_))
    }
}

#[derive(Debug, Clone)]
pub struct ReadyVariant {
    pub title: String,
    pub price: Decimal,
    pub details: Option<String>,
    pub main_image: ImageUpload,
    pub additional_images: Vec<ImageUpload>,
}

#[derive(Debug, Clone)]
pub struct ReadyAddon {
    pub title: String,
    pub price: Decimal,
    pub image: ImageUpload,
}

#[derive(Debug, Clone)]
pub struct ValidatedAddonGroup {
    pub title: String,
    pub addons: Vec<Checked<ReadyAddon>>,
}

#[derive(Debug, Clone)]
pub struct ValidatedDraft {
    pub path: CategoryPath,
    pub variants: Vec<Checked<ReadyVariant>>,
    pub addon_group: Option<ValidatedAddonGroup>,
}

impl Checked<ReadyVariant> {
    pub fn title(&self) -> Option<String> {
        match self {
            Checked::Ready(v) => Some(v.title.clone()),
            Checked::Skipped { title, .. } => title.clone(),
        }
    }
}

impl Checked<ReadyAddon> {
    pub fn title(&self) -> Option<String> {
        match self {
            Checked::Ready(a) => Some(a.title.clone()),
            Checked::Skipped { title, .. } => title.clone(),
        }
    }
}

impl VariantDraft {
    fn check(self) -> Checked<ReadyVariant> {
        let title = normalize(self.title);
        match (title, self.price, self.main_image) {
            (Some(title), Some(price), Some(main_image)) => Checked::Ready(ReadyVariant {
                title,
                price,
                details: normalize(self.details),
                main_image,
                additional_images: self.additional_images,
            }),
            (title, price, main_image) => {
                let mut missing = Vec::new();
                if title.is_none() {
                    missing.push("title");
                }
                if price.is_none() {
                    missing.push("price");
                }
                if main_image.is_none() {
                    missing.push("main image");
                }
                Checked::Skipped { title, missing }
            }
        }
    }
}

impl AddonDraft {
    fn check(self) -> Checked<ReadyAddon> {
        let title = normalize(self.title);
        match (title, self.price, self.image) {
            (Some(title), Some(price), Some(image)) => {
                Checked::Ready(ReadyAddon { title, price, image })
            }
            (title, price, image) => {
                let mut missing = Vec::new();
                if image.is_none() {
                    missing.push("image");
                }
                if title.is_none() {
                    missing.push("title");
                }
                if price.is_none() {
                    missing.push("price");
                }
                Checked::Skipped { title, missing }
            }
        }
    }
}

impl ProductDraft {
    /// Validate the draft as a whole
    ///
    /// A blank category, a blank add-on category title or a negative price is
    /// a hard error; incomplete variants and add-ons are skipped, not rejected.
    pub fn validate(self) -> CatalogResult<ValidatedDraft> {
        if self.path.category.trim().is_empty() {
            return Err(CatalogError::Required("category"));
        }

        let negative = self
            .variants
            .iter()
            .filter_map(|v| v.price)
            .chain(
                self.addon_group
                    .iter()
                    .flat_map(|g| g.addons.iter().filter_map(|a| a.price)),
            )
            .any(|p| p.is_sign_negative());
        if negative {
            return Err(CatalogError::validation("price must not be negative"));
        }

        let addon_group = match self.addon_group {
            Some(group) => {
                let title = group.title.trim().to_string();
                if title.is_empty() {
                    return Err(CatalogError::Required("add-on category title"));
                }
                Some(ValidatedAddonGroup {
                    title,
                    addons: group.addons.into_iter().map(AddonDraft::check).collect(),
                })
            }
            None => None,
        };

        Ok(ValidatedDraft {
            path: self.path,
            variants: self.variants.into_iter().map(VariantDraft::check).collect(),
            addon_group,
        })
    }
}
