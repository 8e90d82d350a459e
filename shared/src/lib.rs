//! Shared types for the catalog admin workspace
//!
//! Common types used by both the admin service and the backend client:
//! catalog models, the backend contract, error codes and response envelopes.

pub mod backend;
pub mod error;
pub mod models;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use backend::{BackendError, BackendResult, BlobStore, DataStore, Filter, FilterOp, Record};
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
