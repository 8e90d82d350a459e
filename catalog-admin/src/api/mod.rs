//! HTTP API

pub mod addon_variants;
pub mod addons;
pub mod categories;
pub mod health;
pub mod submissions;
pub mod upload;
pub mod variants;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .merge(categories::router())
        .merge(submissions::router())
        .merge(variants::router())
        .merge(addons::router())
        .merge(addon_variants::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(upload::MAX_REQUEST_SIZE)),
        )
        .with_state(state)
}
