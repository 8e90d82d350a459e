//! Catalog submission API (the product creation form)
//!
//! `POST /api/catalog/submissions` takes a multipart body: a `payload` part
//! holding the form as JSON, plus image parts referenced from it by name.
//!
//! ```json
//! {
//!   "category": "Furniture",
//!   "subcategory": "Chairs",
//!   "sub_subcategory": "Office",
//!   "variants": [
//!     { "title": "Mesh Chair", "price": 99, "main_image": "v0_main",
//!       "additional_images": ["v0_side"] }
//!   ],
//!   "addon_group": {
//!     "title": "Cushions",
//!     "addons": [{ "title": "Linen", "price": 15, "image": "a0" }]
//!   }
//! }
//! ```

use axum::Router;
use axum::extract::{Multipart, State};
use axum::routing::post;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{ApiResponse, AppError, AppResult};
use validator::Validate;

use super::upload::MultipartForm;
use crate::backend::ImageUpload;
use crate::catalog::{
    AddonDraft, AddonGroupDraft, CategoryPath, ProductDraft, SubmissionReport, VariantDraft,
};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/catalog/submissions", post(submit))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmissionPayload {
    #[validate(length(max = 200))]
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub sub_subcategory: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100, message = "too many variants"))]
    pub variants: Vec<VariantPayload>,
    #[serde(default)]
    pub addon_group: Option<AddonGroupPayload>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VariantPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub details: Option<String>,
    /// Part name of the main image
    #[serde(default)]
    pub main_image: Option<String>,
    /// Part names of the additional images
    #[serde(default)]
    pub additional_images: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddonGroupPayload {
    pub title: String,
    #[serde(default)]
    pub addons: Vec<AddonPayload>,
}

#[derive(Debug, Deserialize)]
pub struct AddonPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    /// Part name of the image
    #[serde(default)]
    pub image: Option<String>,
}

impl SubmissionPayload {
    /// Resolve part references against the uploaded files
    pub fn into_draft(self, form: &MultipartForm) -> AppResult<ProductDraft> {
        let variants = self
            .variants
            .into_iter()
            .map(|v| {
                Ok(VariantDraft {
                    title: v.title,
                    price: v.price,
                    details: v.details,
                    main_image: resolve_part(form, v.main_image.as_deref())?,
                    additional_images: v
                        .additional_images
                        .iter()
                        .map(|part| resolve_part(form, Some(part)))
                        .collect::<AppResult<Vec<_>>>()?
                        .into_iter()
                        .flatten()
                        .collect(),
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        let addon_group = match self.addon_group {
            Some(group) => Some(AddonGroupDraft {
                title: group.title,
                addons: group
                    .addons
                    .into_iter()
                    .map(|a| {
                        Ok(AddonDraft {
                            title: a.title,
                            price: a.price,
                            image: resolve_part(form, a.image.as_deref())?,
                        })
                    })
                    .collect::<AppResult<Vec<_>>>()?,
            }),
            None => None,
        };

        Ok(ProductDraft {
            path: CategoryPath::new(self.category, self.subcategory, self.sub_subcategory),
            variants,
            addon_group,
        })
    }
}

/// A blank reference means no image; a dangling one is a client error.
/// Several entries may reference the same part.
fn resolve_part(form: &MultipartForm, part: Option<&str>) -> AppResult<Option<ImageUpload>> {
    match part.map(str::trim).filter(|p| !p.is_empty()) {
        None => Ok(None),
        Some(name) => form.file(name).map(Some).ok_or_else(|| {
            AppError::validation(format!("file part '{name}' not found")).with_detail("part", name)
        }),
    }
}

/// POST /api/catalog/submissions
pub async fn submit(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<SubmissionReport>> {
    let form = MultipartForm::read(&mut multipart).await?;
    let raw = form
        .text("payload")
        .ok_or_else(|| AppError::required("payload"))?;
    let payload: SubmissionPayload = serde_json::from_str(raw)
        .map_err(|e| AppError::validation(format!("Invalid payload: {e}")))?;
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let draft = payload.into_draft(&form)?;
    let report = state.submissions().submit(draft).await?;

    let message = if report.halted.is_some() {
        "Submission stopped after a failure"
    } else if report.errors().next().is_some() {
        "Submission completed with errors"
    } else {
        "Submission completed"
    };
    Ok(ApiResponse::success_with_message(message, report))
}
