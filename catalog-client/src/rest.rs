//! REST backend over HTTP

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use shared::{BackendResult, BlobStore, DataStore, Filter, Record};

use crate::{ClientConfig, ClientError, ClientResult};

const REST_PREFIX: [&str; 2] = ["rest", "v1"];
const STORAGE_PREFIX: [&str; 3] = ["storage", "v1", "object"];

/// Backend client for the table and object storage APIs
#[derive(Debug, Clone)]
pub struct RestBackend {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl RestBackend {
    /// Create a new backend client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::Config(format!("invalid base URL {}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "base URL cannot carry a path: {}",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    /// Build `{base}/{segments...}` with every segment percent-encoded
    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ClientError::Config("base URL cannot carry a path".into()))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    fn table_url(&self, table: &str) -> ClientResult<Url> {
        let mut segments = REST_PREFIX.to_vec();
        segments.push(table);
        self.endpoint(&segments)
    }

    fn object_url(&self, bucket: &str, key: Option<&str>) -> ClientResult<Url> {
        let mut segments = STORAGE_PREFIX.to_vec();
        segments.push(bucket);
        if let Some(key) = key {
            segments.push(key);
        }
        self.endpoint(&segments)
    }

    /// Attach the API key headers
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Render filters as `field=op.value` query pairs
    fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
        filters
            .iter()
            .map(|f| (f.field.clone(), format!("{}.{}", f.op.as_str(), f.value_text())))
            .collect()
    }

    /// Map non-success statuses to client errors
    async fn check(response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(text)),
            StatusCode::CONFLICT => Err(ClientError::Conflict(text)),
            _ => Err(ClientError::Rejected {
                status: status.as_u16(),
                body: text,
            }),
        }
    }

    async fn fetch_rows(&self, table: &str, filters: &[Filter]) -> ClientResult<Vec<Record>> {
        let mut params = vec![("select".to_string(), "*".to_string())];
        params.extend(Self::filter_params(filters));

        let response = self
            .request(Method::GET, self.table_url(table)?)
            .query(&params)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn insert_row(&self, table: &str, row: Record) -> ClientResult<Record> {
        let response = self
            .request(Method::POST, self.table_url(table)?)
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        let rows: Vec<Record> = Self::check(response).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| ClientError::InvalidResponse(format!("insert into {table} returned no row")))
    }

    async fn write_rows(
        &self,
        method: Method,
        table: &str,
        filters: &[Filter],
        patch: Option<Record>,
    ) -> ClientResult<()> {
        if filters.is_empty() {
            // Unfiltered writes would touch the whole table
            return Err(ClientError::Config(format!(
                "refusing {method} on {table} without filters"
            )));
        }

        let mut request = self
            .request(method, self.table_url(table)?)
            .query(&Self::filter_params(filters));
        if let Some(patch) = patch {
            request = request.json(&patch);
        }
        Self::check(request.send().await?).await?;
        Ok(())
    }

    async fn upload_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> ClientResult<String> {
        #[derive(Deserialize)]
        struct UploadResponse {
            #[serde(rename = "Key")]
            key: Option<String>,
        }

        let response = self
            .request(Method::POST, self.object_url(bucket, Some(key))?)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", if upsert { "true" } else { "false" })
            .body(bytes)
            .send()
            .await?;
        let body: UploadResponse = Self::check(response).await?.json().await?;

        // The store answers with "{bucket}/{key}"; callers keep the key only
        let stored = body
            .key
            .map(|k| {
                k.strip_prefix(&format!("{bucket}/"))
                    .map(str::to_string)
                    .unwrap_or(k)
            })
            .unwrap_or_else(|| key.to_string());
        Ok(stored)
    }

    async fn remove_objects(&self, bucket: &str, keys: &[String]) -> ClientResult<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let response = self
            .request(Method::DELETE, self.object_url(bucket, None)?)
            .json(&serde_json::json!({ "prefixes": keys }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl DataStore for RestBackend {
    async fn query(&self, table: &str, filters: &[Filter]) -> BackendResult<Vec<Record>> {
        tracing::debug!(table, filters = filters.len(), "Backend query");
        Ok(self.fetch_rows(table, filters).await?)
    }

    async fn insert(&self, table: &str, row: Record) -> BackendResult<Record> {
        tracing::debug!(table, "Backend insert");
        Ok(self.insert_row(table, row).await?)
    }

    async fn update(&self, table: &str, filters: &[Filter], patch: Record) -> BackendResult<()> {
        tracing::debug!(table, filters = filters.len(), "Backend update");
        Ok(self.write_rows(Method::PATCH, table, filters, Some(patch)).await?)
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> BackendResult<()> {
        tracing::debug!(table, filters = filters.len(), "Backend delete");
        Ok(self.write_rows(Method::DELETE, table, filters, None).await?)
    }
}

#[async_trait]
impl BlobStore for RestBackend {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> BackendResult<String> {
        tracing::debug!(bucket, key, size = bytes.len(), upsert, "Storage upload");
        Ok(self.upload_object(bucket, key, bytes, content_type, upsert).await?)
    }

    async fn remove(&self, bucket: &str, keys: &[String]) -> BackendResult<()> {
        tracing::debug!(bucket, count = keys.len(), "Storage remove");
        Ok(self.remove_objects(bucket, keys).await?)
    }
}
