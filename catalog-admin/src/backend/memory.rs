//! In-memory backend
//!
//! Implements both store contracts over process memory. Used for local
//! development (`BACKEND=memory`) and as the base of every test double.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use shared::backend::record_id;
use shared::{BackendError, BackendResult, BlobStore, DataStore, Filter, Record};

#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[derive(Default)]
struct Tables {
    rows: HashMap<String, Vec<Record>>,
    next_ids: HashMap<String, i64>,
}

/// Tables and buckets kept in memory
#[derive(Default)]
pub struct MemoryBackend {
    tables: Mutex<Tables>,
    blobs: Mutex<HashMap<(String, String), StoredBlob>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert rows as-is (ids included), bypassing id generation
    pub fn seed(&self, table: &str, rows: impl IntoIterator<Item = Value>) {
        let mut tables = self.tables.lock();
        for row in rows {
            if let Value::Object(record) = row {
                let id = record_id(&record).unwrap_or(0);
                let next = tables.next_ids.entry(table.to_string()).or_insert(1);
                *next = (*next).max(id + 1);
                tables.rows.entry(table.to_string()).or_default().push(record);
            }
        }
    }

    /// Snapshot of a table
    pub fn rows(&self, table: &str) -> Vec<Record> {
        self.tables.lock().rows.get(table).cloned().unwrap_or_default()
    }

    /// Keys stored in a bucket, sorted
    pub fn blob_keys(&self, bucket: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .blobs
            .lock()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn blob(&self, bucket: &str, key: &str) -> Option<StoredBlob> {
        self.blobs
            .lock()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }
}

fn matches_all(record: &Record, filters: &[Filter]) -> bool {
    filters.iter().all(|f| f.matches(record))
}

#[async_trait]
impl DataStore for MemoryBackend {
    async fn query(&self, table: &str, filters: &[Filter]) -> BackendResult<Vec<Record>> {
        let tables = self.tables.lock();
        Ok(tables
            .rows
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|r| matches_all(r, filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(&self, table: &str, mut row: Record) -> BackendResult<Record> {
        let mut tables = self.tables.lock();
        let next = *tables.next_ids.get(table).unwrap_or(&1);

        let id = match record_id(&row) {
            Some(id) => {
                let taken = tables
                    .rows
                    .get(table)
                    .is_some_and(|rows| rows.iter().any(|r| record_id(r) == Some(id)));
                if taken {
                    return Err(BackendError::Conflict(format!(
                        "duplicate key value: {table}.id = {id}"
                    )));
                }
                id
            }
            None => next,
        };

        row.insert("id".to_string(), Value::from(id));
        tables.next_ids.insert(table.to_string(), next.max(id + 1));
        tables
            .rows
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: &str, filters: &[Filter], patch: Record) -> BackendResult<()> {
        let mut tables = self.tables.lock();
        if let Some(rows) = tables.rows.get_mut(table) {
            for row in rows.iter_mut().filter(|r| matches_all(r, filters)) {
                for (field, value) in &patch {
                    row.insert(field.clone(), value.clone());
                }
            }
        }
        Ok(())
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> BackendResult<()> {
        let mut tables = self.tables.lock();
        if let Some(rows) = tables.rows.get_mut(table) {
            rows.retain(|r| !matches_all(r, filters));
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for MemoryBackend {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> BackendResult<String> {
        let mut blobs = self.blobs.lock();
        let slot = (bucket.to_string(), key.to_string());
        if !upsert && blobs.contains_key(&slot) {
            return Err(BackendError::Conflict(format!(
                "The resource already exists: {bucket}/{key}"
            )));
        }
        blobs.insert(
            slot,
            StoredBlob {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(key.to_string())
    }

    async fn remove(&self, bucket: &str, keys: &[String]) -> BackendResult<()> {
        let mut blobs = self.blobs.lock();
        for key in keys {
            blobs.remove(&(bucket.to_string(), key.clone()));
        }
        Ok(())
    }
}
