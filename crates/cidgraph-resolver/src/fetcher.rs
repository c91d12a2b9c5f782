//! The transport seam: fetching raw bytes for a content reference.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use cidgraph_types::ContentRef;

/// Default per-request timeout for gateway reads.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport-level fetch failures, classified for retry decisions.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP 429 — the gateway asked us to slow down.
    #[error("rate limited by gateway")]
    RateLimited,

    /// Any other non-2xx status. Not retried.
    #[error("gateway returned HTTP {0}")]
    Status(u16),

    /// Timeout, connection failure, or any other network-level error.
    #[error("network error: {0}")]
    Network(String),
}

/// Byte-fetcher keyed by content reference.
///
/// Implementations must be safe to share across tasks. The resolver layers
/// caching and retry on top; implementations report each failure as-is.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, reference: &ContentRef) -> Result<Vec<u8>, FetchError>;
}

#[async_trait]
impl<F: ContentFetcher> ContentFetcher for std::sync::Arc<F> {
    async fn fetch(&self, reference: &ContentRef) -> Result<Vec<u8>, FetchError> {
        (**self).fetch(reference).await
    }
}

/// HTTP gateway fetcher: `GET {base}/{reference}`.
///
/// Each request carries its own timeout that cancels only that call; there is
/// no overall operation deadline.
pub struct HttpGateway {
    client: reqwest::Client,
    base: String,
}

impl HttpGateway {
    /// Create a gateway fetcher with the default 30 s per-request timeout.
    pub fn new(base: impl Into<String>) -> Result<Self, FetchError> {
        Self::with_timeout(base, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base: base.into().trim_end_matches('/').to_string(),
        })
    }

    /// The gateway base URL this fetcher reads from.
    pub fn base(&self) -> &str {
        &self.base
    }
}

#[async_trait]
impl ContentFetcher for HttpGateway {
    async fn fetch(&self, reference: &ContentRef) -> Result<Vec<u8>, FetchError> {
        let url = format!("{}/{}", self.base, reference);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(FetchError::RateLimited);
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
