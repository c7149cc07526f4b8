//! Cached access to upstream HTTP APIs
//!
//! `FetchGateway` is the single way the rest of the crate talks to the network.
//! It answers from the [`CacheStore`] whenever it can and only falls through to
//! the [`Transport`] on a miss, persisting the decoded payload before returning.

use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

use crate::cache::{canonical_key, CacheStore, Params, StoreWriteError};

/// Errors from the transport or from decoding its response
#[derive(Debug, Error)]
pub enum NetworkError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Response body is not valid JSON
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Errors that can occur when fetching through the gateway
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// The payload was fetched and kept in memory but could not be persisted
    #[error(transparent)]
    StoreWrite(#[from] StoreWriteError),
}

/// Performs a single HTTP GET and returns the response body
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn get(
        &self,
        url: &str,
        query: &[(String, String)],
        headers: &[(String, String)],
    ) -> Result<String, NetworkError>;
}

/// `Transport` backed by a reqwest client
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for HttpTransport {
    async fn get(
        &self,
        url: &str,
        query: &[(String, String)],
        headers: &[(String, String)],
    ) -> Result<String, NetworkError> {
        let mut request = self.client.get(url).query(query);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

/// Deduplicates upstream requests through a durable cache
#[derive(Debug)]
pub struct FetchGateway<T = HttpTransport> {
    store: CacheStore,
    transport: T,
}

impl FetchGateway<HttpTransport> {
    /// Create a gateway that performs real HTTP requests
    pub fn new(store: CacheStore) -> Self {
        Self::with_transport(store, HttpTransport::new())
    }
}

impl<T: Transport> FetchGateway<T> {
    pub fn with_transport(store: CacheStore, transport: T) -> Self {
        Self { store, transport }
    }

    /// Returns the payload for `endpoint` with `params`
    ///
    /// # Behavior
    /// - On a cache hit the stored payload is returned as is, with no network I/O
    /// - On a miss the endpoint is queried, the body decoded as JSON, stored, and
    ///   written to disk before it is returned
    /// - Transport and decode failures are returned without caching anything
    pub async fn fetch(
        &mut self,
        endpoint: &str,
        params: &Params,
        headers: &[(String, String)],
    ) -> Result<Value, FetchError> {
        let key = canonical_key(endpoint, params);

        if let Some(hit) = self.store.get(&key) {
            tracing::debug!(%key, "cache hit");
            return Ok(hit.clone());
        }

        tracing::debug!(%key, "cache miss, querying upstream");
        let body = self.transport.get(endpoint, params.pairs(), headers).await?;
        let payload: Value = serde_json::from_str(&body).map_err(NetworkError::from)?;

        self.store.put(key, payload.clone())?;
        Ok(payload)
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}
