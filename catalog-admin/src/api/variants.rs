//! Variant API (product data table and edit page)

use axum::Router;
use axum::extract::{Multipart, Path, State};
use axum::routing::{delete, get};
use shared::models::VariantListing;
use shared::{ApiResponse, AppResult};

use super::upload::MultipartForm;
use crate::services::VariantEdit;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/variants", get(list))
        .route("/api/variants/{id}", get(get_by_id).put(edit).delete(remove))
        .route("/api/variants/{id}/images/{key}", delete(remove_image))
}

/// GET /api/variants
pub async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<VariantListing>>> {
    Ok(ApiResponse::success(state.variants().list().await?))
}

/// GET /api/variants/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<VariantListing>> {
    Ok(ApiResponse::success(state.variants().get(id).await?))
}

/// PUT /api/variants/{id}
///
/// Multipart: `title`, `price`, `details` text fields; `main_image` and
/// any number of `additional_images` files.
pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<VariantListing>> {
    let mut form = MultipartForm::read(&mut multipart).await?;
    let edit = VariantEdit {
        title: form.text("title").map(str::to_string),
        price: form.decimal("price")?,
        details: form.text("details").map(str::to_string),
        main_image: form.take_file("main_image"),
        additional_images: form.take_files("additional_images"),
    };

    let listing = state.variants().edit(id, edit).await?;
    Ok(ApiResponse::success_with_message("Product updated successfully", listing))
}

/// DELETE /api/variants/{id}
pub async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<ApiResponse<()>> {
    state.variants().delete(id).await?;
    Ok(ApiResponse::ok())
}

/// DELETE /api/variants/{id}/images/{key}
pub async fn remove_image(
    State(state): State<AppState>,
    Path((id, key)): Path<(i64, String)>,
) -> AppResult<ApiResponse<VariantListing>> {
    let listing = state.variants().remove_additional_image(id, &key).await?;
    Ok(ApiResponse::success_with_message("Image removed", listing))
}
