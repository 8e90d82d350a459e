//! Catalog Client - REST implementation of the backend contract
//!
//! Talks to a PostgREST-style table API (`/rest/v1/{table}`) and an object
//! storage API (`/storage/v1/object/{bucket}/{key}`) over HTTP.

pub mod config;
pub mod error;
pub mod rest;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use rest::RestBackend;
