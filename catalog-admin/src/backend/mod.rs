//! Backend handle
//!
//! Bundles the table store, the blob store and the image bucket so services
//! and the catalog flow can share one cheap, cloneable value.

pub mod memory;

use std::fmt;
use std::sync::Arc;

use futures::future::join_all;
use shared::{BackendError, BackendResult, BlobStore, DataStore};

pub use memory::MemoryBackend;

/// An image received from a client, ready to upload
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Outcome of a set of independent uploads
#[derive(Debug, Clone, Default)]
pub struct UploadBatch {
    /// Stored keys, in input order
    pub keys: Vec<String>,
    /// Input indices that failed, with their errors
    pub failed: Vec<(usize, BackendError)>,
}

impl UploadBatch {
    pub fn failed_indices(&self) -> Vec<usize> {
        self.failed.iter().map(|(i, _)| *i).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Shared handle to the configured backend
#[derive(Clone)]
pub struct Backend {
    pub store: Arc<dyn DataStore>,
    pub blobs: Arc<dyn BlobStore>,
    /// Bucket every catalog image goes to
    pub bucket: String,
}

impl Backend {
    pub fn new(store: Arc<dyn DataStore>, blobs: Arc<dyn BlobStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            blobs,
            bucket: bucket.into(),
        }
    }

    /// Backend served entirely from memory
    pub fn memory(bucket: impl Into<String>) -> (Self, Arc<MemoryBackend>) {
        let memory = Arc::new(MemoryBackend::new());
        (Self::new(memory.clone(), memory.clone(), bucket), memory)
    }

    pub fn store(&self) -> &dyn DataStore {
        self.store.as_ref()
    }

    /// Upload one image under `key`
    pub async fn upload(&self, key: &str, image: &ImageUpload, upsert: bool) -> BackendResult<String> {
        self.blobs
            .upload(&self.bucket, key, image.bytes.clone(), &image.content_type, upsert)
            .await
    }

    /// Upload every `(key, image)` pair concurrently and aggregate the results
    pub async fn upload_all(&self, items: &[(String, &ImageUpload)], upsert: bool) -> UploadBatch {
        let results = join_all(
            items
                .iter()
                .map(|(key, image)| self.upload(key, image, upsert)),
        )
        .await;

        let mut batch = UploadBatch::default();
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(key) => batch.keys.push(key),
                Err(e) => {
                    tracing::warn!(key = %items[index].0, error = %e, "Image upload failed");
                    batch.failed.push((index, e));
                }
            }
        }
        batch
    }

    /// Remove images from the catalog bucket
    pub async fn remove_images(&self, keys: &[String]) -> BackendResult<()> {
        self.blobs.remove(&self.bucket, keys).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_all_aggregates() {
        let (backend, memory) = Backend::memory("addon");
        let image = ImageUpload::new("a.png", "image/png", vec![1]);

        // Second key collides with the first, without upsert
        let items = vec![
            ("Oak-0-2".to_string(), &image),
            ("Oak-0-2".to_string(), &image),
            ("Oak-2-2".to_string(), &image),
        ];
        let batch = backend.upload_all(&items, false).await;

        assert_eq!(batch.keys.len(), 2);
        assert_eq!(batch.failed_indices().len(), 1);
        assert_eq!(memory.blob_keys("addon").len(), 2);
    }

    #[test]
    fn test_image_upload_debug_hides_bytes() {
        let image = ImageUpload::new("a.png", "image/png", vec![0; 1024]);
        let text = format!("{image:?}");
        assert!(text.contains("size: 1024"));
    }
}
