//! Backend contract
//!
//! The admin service never talks to a concrete database or object store.
//! Every read and write goes through the two traits defined here:
//!
//! - [`DataStore`]: table rows (`query` / `insert` / `update` / `delete`)
//! - [`BlobStore`]: image objects in a bucket (`upload` / `remove`)
//!
//! Rows travel as untyped JSON records; [`query_as`] and [`insert_as`]
//! decode them into the models in [`crate::models`].

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error::{AppError, ErrorCode};

/// A single table row as exchanged with the store
pub type Record = serde_json::Map<String, Value>;

/// Comparison operator of a row filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    Eq,
    Neq,
    Gt,
    Lt,
    /// `IS` comparison, used with `null` to match absent columns
    Is,
}

impl FilterOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Neq => "neq",
            FilterOp::Gt => "gt",
            FilterOp::Lt => "lt",
            FilterOp::Is => "is",
        }
    }
}

/// Row filter: `field op value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// `field = value`
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Eq, value)
    }

    /// `field IS NULL`
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::new(field, FilterOp::Is, Value::Null)
    }

    /// `field = value`, or `field IS NULL` when the value is absent
    pub fn eq_or_null(field: impl Into<String>, value: Option<&str>) -> Self {
        match value {
            Some(v) => Self::eq(field, v),
            None => Self::is_null(field),
        }
    }

    /// `id = id`
    pub fn id(id: i64) -> Self {
        Self::eq("id", id)
    }

    /// Evaluate this filter against a record
    ///
    /// Numbers compare numerically regardless of integer/float representation;
    /// a missing column compares as `null`.
    pub fn matches(&self, record: &Record) -> bool {
        let actual = record.get(&self.field).unwrap_or(&Value::Null);
        match self.op {
            FilterOp::Eq => values_equal(actual, &self.value),
            FilterOp::Neq => !values_equal(actual, &self.value),
            FilterOp::Gt => compare(actual, &self.value) == Some(std::cmp::Ordering::Greater),
            FilterOp::Lt => compare(actual, &self.value) == Some(std::cmp::Ordering::Less),
            FilterOp::Is => match &self.value {
                Value::Null => actual.is_null(),
                other => actual == other,
            },
        }
    }

    /// Render the filter value the way a query string carries it
    pub fn value_text(&self) -> String {
        match &self.value {
            Value::Null => "null".to_string(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn compare(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Backend error types
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// The addressed row or object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A uniqueness rule rejected the write (duplicate object key, duplicate id)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The backend answered but refused the operation
    #[error("Rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The backend could not be reached
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with something that is not the expected shape
    #[error("Decode error: {0}")]
    Decode(String),
}

impl BackendError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        BackendError::Rejected {
            status,
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Decode(err.to_string())
    }
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        match &err {
            BackendError::NotFound(_) => AppError::with_message(ErrorCode::NotFound, err.to_string()),
            BackendError::Conflict(_) => {
                AppError::with_message(ErrorCode::AlreadyExists, err.to_string())
            }
            BackendError::Rejected { status, .. } => {
                AppError::with_message(ErrorCode::CatalogWriteFailed, err.to_string())
                    .with_detail("status", *status)
            }
            BackendError::Transport(_) => {
                AppError::with_message(ErrorCode::NetworkError, err.to_string())
            }
            BackendError::Decode(_) => AppError::database(err.to_string()),
        }
    }
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Table storage contract
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Fetch every row of `table` matching all filters
    async fn query(&self, table: &str, filters: &[Filter]) -> BackendResult<Vec<Record>>;

    /// Insert one row and return it as stored (with its generated id)
    async fn insert(&self, table: &str, row: Record) -> BackendResult<Record>;

    /// Apply `patch` to every row matching all filters
    async fn update(&self, table: &str, filters: &[Filter], patch: Record) -> BackendResult<()>;

    /// Delete every row matching all filters
    async fn delete(&self, table: &str, filters: &[Filter]) -> BackendResult<()>;
}

/// Blob storage contract
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key` and return the storage key of the object
    ///
    /// Without `upsert` an existing key is a [`BackendError::Conflict`].
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> BackendResult<String>;

    /// Remove objects; missing keys are ignored
    async fn remove(&self, bucket: &str, keys: &[String]) -> BackendResult<()>;
}

/// Serialize a payload into a record
pub fn to_record<R: Serialize + ?Sized>(row: &R) -> BackendResult<Record> {
    match serde_json::to_value(row)? {
        Value::Object(map) => Ok(map),
        other => Err(BackendError::Decode(format!(
            "expected an object payload, got {other}"
        ))),
    }
}

/// Decode a record into a model
pub fn from_record<T: DeserializeOwned>(record: Record) -> BackendResult<T> {
    Ok(serde_json::from_value(Value::Object(record))?)
}

/// Integer `id` column of a record
pub fn record_id(record: &Record) -> Option<i64> {
    record.get("id").and_then(Value::as_i64)
}

/// Query and decode rows
pub async fn query_as<T: DeserializeOwned>(
    store: &dyn DataStore,
    table: &str,
    filters: &[Filter],
) -> BackendResult<Vec<T>> {
    store
        .query(table, filters)
        .await?
        .into_iter()
        .map(from_record)
        .collect()
}

/// Insert a payload and decode the stored row
pub async fn insert_as<T: DeserializeOwned, R: Serialize + ?Sized>(
    store: &dyn DataStore,
    table: &str,
    row: &R,
) -> BackendResult<T> {
    let stored = store.insert(table, to_record(row)?).await?;
    from_record(stored)
}

/// Update rows with a serialized patch
pub async fn update_with<R: Serialize + ?Sized>(
    store: &dyn DataStore,
    table: &str,
    filters: &[Filter],
    patch: &R,
) -> BackendResult<()> {
    store.update(table, filters, to_record(patch)?).await
}
