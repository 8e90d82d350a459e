//! catalog-admin: administration service for the product catalog
//!
//! - `catalog`: the multi-table creation flow (resolve product, persist
//!   variants, persist add-ons) with per-entity compensation
//! - `services`: single-table CRUD behind the admin screens
//! - `api`: axum routes over both
//! - `backend`: the backend handle plus an in-memory implementation

pub mod api;
pub mod backend;
pub mod catalog;
pub mod config;
pub mod error;
pub mod logger;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{CatalogError, CatalogResult};
pub use state::AppState;
