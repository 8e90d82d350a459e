// catalog-admin/tests/common/mod.rs
// Test doubles shared by the integration tests
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use catalog_admin::backend::{Backend, ImageUpload, MemoryBackend};
use catalog_admin::catalog::{AddonDraft, CategoryPath, ProductDraft, VariantDraft};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde_json::Value;
use shared::{BackendError, BackendResult, BlobStore, DataStore, Filter, Record};

pub const BUCKET: &str = "addon";

/// Smallest byte string that sniffs as PNG
pub const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Query(String),
    Insert(String),
    Update(String),
    Delete(String),
    Upload(String),
    Remove(Vec<String>),
}

#[derive(Default)]
struct Faults {
    uploads: HashSet<String>,
    upload_prefixes: Vec<String>,
    /// (table, title) pairs; a `None` title fails every insert into the table
    inserts: Vec<(String, Option<String>)>,
    queries: HashSet<String>,
    deletes: HashSet<String>,
}

/// Memory backend that fails chosen operations and records every call
pub struct FaultyBackend {
    pub memory: Arc<MemoryBackend>,
    faults: Mutex<Faults>,
    calls: Mutex<Vec<Call>>,
}

impl FaultyBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            memory: Arc::new(MemoryBackend::new()),
            faults: Mutex::new(Faults::default()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn backend(self: &Arc<Self>) -> Backend {
        Backend::new(self.clone(), self.clone(), BUCKET)
    }

    pub fn fail_upload(&self, key: &str) {
        self.faults.lock().uploads.insert(key.to_string());
    }

    /// Fail every upload whose key starts with `prefix`
    pub fn fail_upload_prefix(&self, prefix: &str) {
        self.faults.lock().upload_prefixes.push(prefix.to_string());
    }

    pub fn fail_insert(&self, table: &str, title: Option<&str>) {
        self.faults
            .lock()
            .inserts
            .push((table.to_string(), title.map(str::to_string)));
    }

    pub fn fail_query(&self, table: &str) {
        self.faults.lock().queries.insert(table.to_string());
    }

    pub fn fail_delete(&self, table: &str) {
        self.faults.lock().deletes.insert(table.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn inserts(&self, table: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| **c == Call::Insert(table.to_string()))
            .count()
    }

    pub fn uploads(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                Call::Upload(key) => Some(key.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn rows(&self, table: &str) -> Vec<Record> {
        self.memory.rows(table)
    }

    pub fn blob_keys(&self) -> Vec<String> {
        self.memory.blob_keys(BUCKET)
    }

    pub fn seed(&self, table: &str, rows: impl IntoIterator<Item = Value>) {
        self.memory.seed(table, rows);
    }

    fn injected(op: &str, target: &str) -> BackendError {
        BackendError::rejected(500, format!("injected {op} failure on {target}"))
    }
}

#[async_trait]
impl DataStore for FaultyBackend {
    async fn query(&self, table: &str, filters: &[Filter]) -> BackendResult<Vec<Record>> {
        self.calls.lock().push(Call::Query(table.to_string()));
        if self.faults.lock().queries.contains(table) {
            return Err(BackendError::Transport(format!("injected query failure on {table}")));
        }
        self.memory.query(table, filters).await
    }

    async fn insert(&self, table: &str, row: Record) -> BackendResult<Record> {
        self.calls.lock().push(Call::Insert(table.to_string()));
        let title = row.get("title").and_then(Value::as_str).map(str::to_string);
        let fails = self
            .faults
            .lock()
            .inserts
            .iter()
            .any(|(t, wanted)| t == table && (wanted.is_none() || *wanted == title));
        if fails {
            return Err(Self::injected("insert", table));
        }
        self.memory.insert(table, row).await
    }

    async fn update(&self, table: &str, filters: &[Filter], patch: Record) -> BackendResult<()> {
        self.calls.lock().push(Call::Update(table.to_string()));
        self.memory.update(table, filters, patch).await
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> BackendResult<()> {
        self.calls.lock().push(Call::Delete(table.to_string()));
        if self.faults.lock().deletes.contains(table) {
            return Err(Self::injected("delete", table));
        }
        self.memory.delete(table, filters).await
    }
}

#[async_trait]
impl BlobStore for FaultyBackend {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> BackendResult<String> {
        self.calls.lock().push(Call::Upload(key.to_string()));
        let fails = {
            let faults = self.faults.lock();
            faults.uploads.contains(key)
                || faults.upload_prefixes.iter().any(|p| key.starts_with(p.as_str()))
        };
        if fails {
            return Err(Self::injected("upload", key));
        }
        self.memory.upload(bucket, key, bytes, content_type, upsert).await
    }

    async fn remove(&self, bucket: &str, keys: &[String]) -> BackendResult<()> {
        self.calls.lock().push(Call::Remove(keys.to_vec()));
        self.memory.remove(bucket, keys).await
    }
}

pub fn png(name: &str) -> ImageUpload {
    ImageUpload::new(name, "image/png", PNG.to_vec())
}

pub fn variant(title: &str, price: i64) -> VariantDraft {
    VariantDraft {
        title: Some(title.to_string()),
        price: Some(Decimal::new(price, 0)),
        details: None,
        main_image: Some(png(&format!("{title}.png"))),
        additional_images: Vec::new(),
    }
}

pub fn addon(title: &str, price: i64) -> AddonDraft {
    AddonDraft {
        title: Some(title.to_string()),
        price: Some(Decimal::new(price, 0)),
        image: Some(png(&format!("{title}.png"))),
    }
}

pub fn draft(variants: Vec<VariantDraft>) -> ProductDraft {
    ProductDraft {
        path: CategoryPath::new(
            "Furniture",
            Some("Chairs".to_string()),
            Some("Office".to_string()),
        ),
        variants,
        addon_group: None,
    }
}
