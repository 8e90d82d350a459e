//! Add-on category API

use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::Json;
use shared::models::{AddonCategory, AddonCategoryUpdate, AddonListing};
use shared::{ApiResponse, AppResult};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/addons", get(list))
        .route("/api/addons/{id}", put(rename).delete(delete))
}

/// GET /api/addons
pub async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<AddonListing>>> {
    Ok(ApiResponse::success(state.addons().list().await?))
}

/// PUT /api/addons/{id}
pub async fn rename(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AddonCategoryUpdate>,
) -> AppResult<ApiResponse<AddonCategory>> {
    let addon = state.addons().rename(id, payload).await?;
    Ok(ApiResponse::success_with_message("Add-on category updated", addon))
}

/// DELETE /api/addons/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<ApiResponse<()>> {
    state.addons().delete(id).await?;
    Ok(ApiResponse::ok())
}
