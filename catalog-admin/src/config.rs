//! Service configuration

use std::str::FromStr;

use crate::catalog::{OnFailure, SubmissionPolicy};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Where catalog data lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Remote table and storage API
    Rest,
    /// Process memory (development and tests)
    Memory,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rest" => Ok(BackendKind::Rest),
            "memory" => Ok(BackendKind::Memory),
            other => Err(format!("unknown backend '{other}' (expected rest or memory)")),
        }
    }
}

/// Admin service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    /// HTTP port
    pub http_port: u16,
    pub backend: BackendKind,
    /// Backend base URL (table and storage APIs)
    pub backend_url: String,
    /// Backend API key
    pub backend_api_key: String,
    /// Bucket catalog images are stored in
    pub storage_bucket: String,
    /// Public base URL objects are served from; the bucket name is appended
    pub public_storage_url: String,
    /// Backend request timeout in seconds
    pub request_timeout_secs: u64,
    pub log_level: String,
    pub log_json: bool,
    /// Daily rolling log files go here when set
    pub log_dir: Option<String>,
    pub policy: SubmissionPolicy,
}

impl Config {
    fn var(name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.trim().is_empty())
    }

    fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, BoxError>
    where
        T::Err: std::fmt::Display,
    {
        match Self::var(name) {
            Some(raw) => raw
                .parse()
                .map_err(|e| format!("invalid {name} '{raw}': {e}").into()),
            None => Ok(default),
        }
    }

    /// Require a secret env var: must be set and non-empty outside development.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        match Self::var(name) {
            Some(v) => Ok(v),
            None if environment == "development" => Ok(String::new()),
            None => Err(format!("{name} must be set in {environment} environment").into()),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = Self::var("ENVIRONMENT").unwrap_or_else(|| "development".into());
        let default_backend = if environment == "development" {
            BackendKind::Memory
        } else {
            BackendKind::Rest
        };
        let backend = Self::parse_var("BACKEND", default_backend)?;

        let backend_url = match backend {
            BackendKind::Rest => Self::var("BACKEND_URL").ok_or("BACKEND_URL must be set")?,
            BackendKind::Memory => Self::var("BACKEND_URL").unwrap_or_default(),
        };
        let public_storage_url = Self::var("PUBLIC_STORAGE_URL").unwrap_or_else(|| {
            format!(
                "{}/storage/v1/object/public",
                backend_url.trim_end_matches('/')
            )
        });

        let defaults = SubmissionPolicy::default();
        let policy = SubmissionPolicy {
            variants: Self::parse_var::<OnFailure>("VARIANT_FAILURE_POLICY", defaults.variants)?,
            addons: Self::parse_var::<OnFailure>("ADDON_FAILURE_POLICY", defaults.addons)?,
            rollback_on_abort: Self::parse_var("ROLLBACK_ON_ABORT", defaults.rollback_on_abort)?,
        };

        Ok(Self {
            http_port: Self::parse_var("HTTP_PORT", 8080)?,
            backend,
            backend_api_key: Self::require_secret("BACKEND_API_KEY", &environment)?,
            backend_url,
            storage_bucket: Self::var("STORAGE_BUCKET").unwrap_or_else(|| "addon".into()),
            public_storage_url,
            request_timeout_secs: Self::parse_var("REQUEST_TIMEOUT_SECS", 30)?,
            log_level: Self::var("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_json: Self::parse_var("LOG_JSON", false)?,
            log_dir: Self::var("LOG_DIR"),
            policy,
            environment,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
