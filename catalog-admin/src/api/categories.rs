//! Category API

use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::Json;
use shared::models::{Category, CategoryCreate, CategoryOption};
use shared::{ApiResponse, AppResult};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/categories", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        // Must be registered before /{id}
        .route("/options", get(options))
        .route("/{id}", put(update).delete(delete))
}

/// GET /api/categories
pub async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<Category>>> {
    Ok(ApiResponse::success(state.categories().list().await?))
}

/// GET /api/categories/options
pub async fn options(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<CategoryOption>>> {
    Ok(ApiResponse::success(state.categories().options().await?))
}

/// POST /api/categories
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<ApiResponse<Category>> {
    let category = state.categories().create(payload).await?;
    Ok(ApiResponse::success_with_message("Category added successfully", category))
}

/// PUT /api/categories/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<ApiResponse<Category>> {
    let category = state.categories().update(id, payload).await?;
    Ok(ApiResponse::success_with_message("Category updated successfully", category))
}

/// DELETE /api/categories/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    state.categories().delete(id).await?;
    Ok(ApiResponse::ok())
}
