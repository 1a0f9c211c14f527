//! # HTTP Transport
//!
//! The transport capability the engine depends on, plus its reqwest-backed
//! implementation.
//!
//! ## Request Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CatalogTransport Request Flow                        │
//! │                                                                         │
//! │  path segments + query pairs                                           │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  ┌────────────┐   url::Url (segments are percent-encoded)              │
//! │  │ Build URL  │                                                         │
//! │  └─────┬──────┘                                                         │
//! │        ▼                                                                │
//! │  ┌────────────┐  2xx   ┌────────────┐                                  │
//! │  │   Send     │ ─────► │ JSON body  │ ──► Ok(Value)                    │
//! │  └─────┬──────┘        └────────────┘                                  │
//! │        │ failure                                                        │
//! │        ▼                                                                │
//! │  404 ──► NotFound         other status ──► HttpStatus { status, body } │
//! │  timeout ──► Timeout      no response ──► ConnectionFailed             │
//! │                                                                         │
//! │  RETRY POLICY                                                          │
//! │  ────────────                                                          │
//! │  GET    retried while is_retryable(), up to max_retries, with          │
//! │         exponential backoff (200ms, 400ms, ... capped)                 │
//! │  POST / PATCH / DELETE  never retried                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::ApiSettings;
use crate::error::{CatalogError, CatalogResult};

// =============================================================================
// Transport Capability
// =============================================================================

/// JSON-in / JSON-out access to the remote catalog API.
///
/// Paths are given as unencoded segments below the base URL, e.g.
/// `["products", "category", "mens-shoes"]`.
#[async_trait]
pub trait CatalogTransport: Send + Sync {
    async fn get(&self, path: &[&str], query: &[(String, String)]) -> CatalogResult<Value>;

    async fn post(&self, path: &[&str], body: Value) -> CatalogResult<Value>;

    async fn patch(&self, path: &[&str], body: Value) -> CatalogResult<Value>;

    async fn delete(&self, path: &[&str]) -> CatalogResult<Value>;
}

// =============================================================================
// HTTP Transport
// =============================================================================

/// reqwest-backed transport.
///
/// ## Usage
/// ```rust,ignore
/// let transport = HttpTransport::new(&config.api)?;
/// let page = transport
///     .get(&["products"], &[("limit".into(), "10".into())])
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    settings: ApiSettings,
}

impl HttpTransport {
    /// Creates a transport for the configured API.
    pub fn new(settings: &ApiSettings) -> CatalogResult<Self> {
        let base_url = Url::parse(&settings.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(CatalogError::InvalidUrl(settings.base_url.clone()));
        }

        let client = Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| CatalogError::InvalidConfig(format!("HTTP client: {}", e)))?;

        Ok(HttpTransport {
            client,
            base_url,
            settings: settings.clone(),
        })
    }

    /// Joins `path` onto the base URL and appends `query`.
    pub fn url(&self, path: &[&str], query: &[(String, String)]) -> CatalogResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| CatalogError::InvalidUrl(self.base_url.to_string()))?;
            segments.pop_if_empty();
            segments.extend(path);
        }

        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }

        Ok(url)
    }

    /// Sends one request and maps the response.
    async fn send(request: RequestBuilder) -> CatalogResult<Value> {
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Maps status codes to errors and decodes the JSON body.
    async fn handle_response(response: reqwest::Response) -> CatalogResult<Value> {
        let status = response.status();
        let url = response.url().to_string();
        let text = response.text().await?;

        if !status.is_success() {
            return match status {
                StatusCode::NOT_FOUND => Err(CatalogError::NotFound(url)),
                _ => Err(CatalogError::HttpStatus {
                    status: status.as_u16(),
                    body: text,
                }),
            };
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(Into::into)
    }

    /// Creates the retry backoff for idempotent reads.
    fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.settings.initial_backoff(),
            max_interval: self.settings.max_backoff(),
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

#[async_trait]
impl CatalogTransport for HttpTransport {
    async fn get(&self, path: &[&str], query: &[(String, String)]) -> CatalogResult<Value> {
        let url = self.url(path, query)?;
        let mut backoff = self.create_backoff();
        let mut attempt = 0u32;

        loop {
            debug!(%url, attempt, "GET");
            match Self::send(self.client.get(url.clone())).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.settings.max_retries => {
                    attempt += 1;
                    let Some(delay) = backoff.next_backoff() else {
                        return Err(e);
                    };
                    warn!(%url, attempt, ?delay, error = %e, "GET failed, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn post(&self, path: &[&str], body: Value) -> CatalogResult<Value> {
        let url = self.url(path, &[])?;
        debug!(%url, "POST");
        Self::send(self.client.post(url).json(&body)).await
    }

    async fn patch(&self, path: &[&str], body: Value) -> CatalogResult<Value> {
        let url = self.url(path, &[])?;
        debug!(%url, "PATCH");
        Self::send(self.client.patch(url).json(&body)).await
    }

    async fn delete(&self, path: &[&str]) -> CatalogResult<Value> {
        let url = self.url(path, &[])?;
        debug!(%url, "DELETE");
        Self::send(self.client.delete(url)).await
    }
}
