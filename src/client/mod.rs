//! HTTP client for the metadata API.
//!
//! Every request runs under a timeout and is retried on transient failures.
//! Table metadata, data-source lists and recent-table lists go through a
//! [`QueryCache`], so concurrent identical queries share one request and
//! repeated queries inside the staleness window are answered locally.
//!
//! # Example
//!
//! ```ignore
//! use lakeview::client::MetadataClient;
//!
//! let client = MetadataClient::new("http://127.0.0.1:5000")?;
//! let table = client.table_metadata("s3://analytics-bucket/transactions/", None, None).await?;
//! let sources = client.data_sources(Some(1)).await?;
//! ```

mod cache;
mod error;
mod retry;

pub use cache::QueryCache;
pub use error::{ClientError, ClientResult};
pub use retry::{retry_transient, RetryPolicy};

use std::time::Duration;

use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::{DeleteResponse, DetectResponse};
use crate::config::ClientSettings;
use crate::model::{
    DataSource, NewDataSource, RecentTable, SampleRow, TableFormat, TableMetadata, TablePartition,
    TableProperties, TableSchema, TableSummary, TableVersion,
};

const DATASOURCES_PREFIX: &str = "datasources:";
const RECENT_PREFIX: &str = "recent-tables:";

/// Connection details shared by every request, cheap to clone into a
/// cached fetch.
#[derive(Debug, Clone)]
struct Transport {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl Transport {
    async fn request<T, B>(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        let operation = format!("{} {}", method, endpoint);

        let (url, method) = (&url, &method);
        retry_transient(self.retry, &operation, move || async move {
            let mut request = self.http.request(method.clone(), url).query(query);
            if let Some(body) = body {
                request = request.json(body);
            }

            let exchange = async move {
                let response = check_status(request.send().await?).await?;
                let bytes = response.bytes().await?;
                serde_json::from_slice::<T>(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
            };

            tokio::time::timeout(self.timeout, exchange)
                .await
                .map_err(|_| ClientError::Timeout(self.timeout))?
        })
        .await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        self.request::<T, ()>(Method::GET, endpoint, query, None)
            .await
    }
}

/// Turn a non-2xx response into [`ClientError::Status`] carrying the
/// server's `{"error": ...}` message when there is one.
async fn check_status(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|body| body.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or_else(|| {
            if text.is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                text
            }
        });

    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

fn table_params(path: &str, format: Option<TableFormat>) -> Vec<(&'static str, String)> {
    let mut params = vec![("path", path.to_string())];
    if let Some(format) = format {
        params.push(("format", format.as_str().to_string()));
    }
    params
}

fn user_params(user_id: Option<i64>) -> Vec<(&'static str, String)> {
    user_id
        .map(|id| vec![("userId", id.to_string())])
        .unwrap_or_default()
}

fn metadata_key(path: &str, format: Option<TableFormat>, user_id: Option<i64>) -> String {
    let format = format.as_ref().map_or("auto", TableFormat::as_str);
    match user_id {
        Some(id) => format!("metadata:{}:user:{}:{}", format, id, path),
        None => format!("metadata:{}:anon:{}", format, path),
    }
}

fn user_key(prefix: &str, user_id: Option<i64>) -> String {
    match user_id {
        Some(id) => format!("{}user:{}", prefix, id),
        None => format!("{}all", prefix),
    }
}

/// Cached client of the metadata API.
#[derive(Debug)]
pub struct MetadataClient {
    transport: Transport,
    tables: QueryCache<TableMetadata>,
    sources: QueryCache<Vec<DataSource>>,
    recent: QueryCache<Vec<RecentTable>>,
}

impl MetadataClient {
    /// Client with default timeout, retry and staleness settings.
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let mut settings = ClientSettings::default();
        settings.base_url = base_url.into();
        Self::from_settings(&settings)
    }

    pub fn from_settings(settings: &ClientSettings) -> ClientResult<Self> {
        let base_url = settings
            .resolved_base_url()
            .map_err(|e| ClientError::Config(e.to_string()))?;
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;
        let stale_time = settings.stale_time();

        Ok(Self {
            transport: Transport {
                http,
                base_url,
                timeout: settings.timeout(),
                retry: RetryPolicy {
                    retries: settings.retries,
                    base_delay: Duration::from_millis(settings.retry_base_ms),
                    max_delay: Duration::from_millis(settings.retry_max_ms),
                },
            },
            tables: QueryCache::new(stale_time),
            sources: QueryCache::new(stale_time),
            recent: QueryCache::new(stale_time),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.transport.base_url
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.transport.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.transport.retry = retry;
        self
    }

    /// Replace the caches with empty ones using `stale_time`.
    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.tables = QueryCache::new(stale_time);
        self.sources = QueryCache::new(stale_time);
        self.recent = QueryCache::new(stale_time);
        self
    }

    // =========================================================================
    // Table metadata
    // =========================================================================

    /// Complete metadata of the table at `path` (cached per user).
    ///
    /// With a `user_id` the server records the table as recently viewed, so
    /// that user's cached recent-table list is dropped. Anonymous and
    /// user-scoped views are cached under separate keys: a fresh anonymous
    /// result never hides a view the server has to record.
    pub async fn table_metadata(
        &self,
        path: &str,
        format: Option<TableFormat>,
        user_id: Option<i64>,
    ) -> ClientResult<TableMetadata> {
        let key = metadata_key(path, format, user_id);

        let mut params = table_params(path, format);
        params.extend(user_params(user_id));
        let transport = self.transport.clone();

        let table = self
            .tables
            .get_or_fetch(&key, move || async move {
                let query: Vec<(&str, String)> = params;
                transport.get("/api/metadata", &query).await
            })
            .await?;

        if user_id.is_some() {
            self.recent.invalidate_prefix(RECENT_PREFIX).await;
        }
        Ok(table)
    }

    pub async fn schema(
        &self,
        path: &str,
        format: Option<TableFormat>,
    ) -> ClientResult<TableSchema> {
        self.transport
            .get("/api/schema", &table_params(path, format))
            .await
    }

    pub async fn partitions(
        &self,
        path: &str,
        format: Option<TableFormat>,
    ) -> ClientResult<Vec<TablePartition>> {
        self.transport
            .get("/api/partitions", &table_params(path, format))
            .await
    }

    pub async fn versions(
        &self,
        path: &str,
        format: Option<TableFormat>,
    ) -> ClientResult<Vec<TableVersion>> {
        self.transport
            .get("/api/versions", &table_params(path, format))
            .await
    }

    pub async fn properties(
        &self,
        path: &str,
        format: Option<TableFormat>,
    ) -> ClientResult<TableProperties> {
        self.transport
            .get("/api/properties", &table_params(path, format))
            .await
    }

    pub async fn sample_data(
        &self,
        path: &str,
        format: Option<TableFormat>,
    ) -> ClientResult<Vec<SampleRow>> {
        self.transport
            .get("/api/sample-data", &table_params(path, format))
            .await
    }

    /// Ask the server which format it resolves for `path`.
    pub async fn detect(
        &self,
        path: &str,
        format: Option<TableFormat>,
    ) -> ClientResult<DetectResponse> {
        self.transport
            .get("/api/detect", &table_params(path, format))
            .await
    }

    /// Tables the server can describe, optionally of one format.
    pub async fn tables(&self, format: Option<TableFormat>) -> ClientResult<Vec<TableSummary>> {
        let query: Vec<(&str, String)> = format
            .map(|f| vec![("format", f.as_str().to_string())])
            .unwrap_or_default();
        self.transport.get("/api/tables", &query).await
    }

    // =========================================================================
    // Bookmarks and history
    // =========================================================================

    /// Saved data sources (cached).
    pub async fn data_sources(&self, user_id: Option<i64>) -> ClientResult<Vec<DataSource>> {
        let transport = self.transport.clone();
        self.sources
            .get_or_fetch(&user_key(DATASOURCES_PREFIX, user_id), move || async move {
                transport.get("/api/datasources", &user_params(user_id)).await
            })
            .await
    }

    pub async fn create_data_source(&self, source: &NewDataSource) -> ClientResult<DataSource> {
        let created = self
            .transport
            .request(Method::POST, "/api/datasources", &[], Some(source))
            .await?;
        self.sources.invalidate_prefix(DATASOURCES_PREFIX).await;
        Ok(created)
    }

    /// Returns false when the server has no data source with `id`.
    pub async fn delete_data_source(&self, id: i64) -> ClientResult<bool> {
        let endpoint = format!("/api/datasources/{}", id);
        let result = self
            .transport
            .request::<DeleteResponse, ()>(Method::DELETE, &endpoint, &[], None)
            .await;
        self.sources.invalidate_prefix(DATASOURCES_PREFIX).await;

        match result {
            Ok(response) => Ok(response.success),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Recently viewed tables, newest first (cached).
    pub async fn recent_tables(&self, user_id: Option<i64>) -> ClientResult<Vec<RecentTable>> {
        let transport = self.transport.clone();
        self.recent
            .get_or_fetch(&user_key(RECENT_PREFIX, user_id), move || async move {
                transport.get("/api/recent-tables", &user_params(user_id)).await
            })
            .await
    }

    /// Server liveness and version.
    pub async fn health(&self) -> ClientResult<serde_json::Value> {
        self.transport.get("/api/health", &[]).await
    }

    /// Drop every cached response.
    pub async fn clear_cache(&self) {
        self.tables.invalidate_prefix("").await;
        self.sources.invalidate_prefix("").await;
        self.recent.invalidate_prefix("").await;
    }
}
