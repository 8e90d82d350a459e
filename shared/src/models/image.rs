//! Image location helpers
//!
//! Rows store bare storage keys; clients get public URLs built from the
//! configured public storage base and bucket.

use serde::{Deserialize, Serialize};

/// Public location of a storage bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageLocator {
    pub public_base: String,
    pub bucket: String,
}

impl ImageLocator {
    pub fn new(public_base: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            public_base: public_base.into(),
            bucket: bucket.into(),
        }
    }

    /// `{public_base}/{bucket}/{key}`, or `None` for an empty key
    pub fn url(&self, key: &str) -> Option<String> {
        if key.trim().is_empty() {
            return None;
        }
        Some(format!(
            "{}/{}/{}",
            self.public_base.trim_end_matches('/'),
            self.bucket.trim_matches('/'),
            key
        ))
    }

    pub fn urls(&self, keys: &[String]) -> Vec<String> {
        keys.iter().filter_map(|k| self.url(k)).collect()
    }
}
