//! Add-on variant API

use axum::Router;
use axum::extract::{Multipart, Path, State};
use axum::routing::get;
use shared::models::AddonVariantListing;
use shared::{ApiResponse, AppResult};

use super::upload::MultipartForm;
use crate::services::AddonVariantEdit;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/addon-variants", get(list))
        .route("/api/addon-variants/{id}", get(get_by_id).put(edit).delete(remove))
}

/// GET /api/addon-variants
pub async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<AddonVariantListing>>> {
    Ok(ApiResponse::success(state.addon_variants().list().await?))
}

/// GET /api/addon-variants/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<AddonVariantListing>> {
    Ok(ApiResponse::success(state.addon_variants().get(id).await?))
}

/// PUT /api/addon-variants/{id}
///
/// Multipart: `title` and `price` text fields, optional `image` file.
pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<AddonVariantListing>> {
    let mut form = MultipartForm::read(&mut multipart).await?;
    let edit = AddonVariantEdit {
        title: form.text("title").map(str::to_string),
        price: form.decimal("price")?,
        image: form.take_file("image"),
    };

    let listing = state.addon_variants().edit(id, edit).await?;
    Ok(ApiResponse::success_with_message("Add-on variant updated", listing))
}

/// DELETE /api/addon-variants/{id}
pub async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<ApiResponse<()>> {
    state.addon_variants().delete(id).await?;
    Ok(ApiResponse::ok())
}
