//! Transport seam between the access layer and the network.
//!
//! The client only needs status, the `Retry-After` header and the raw body,
//! so tests can stand in for the network with an in-process stub.

use super::error::FetchError;
use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

/// Raw response handed back by a transport
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    /// Raw `Retry-After` header value, if present
    pub retry_after: Option<String>,
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Convenience constructor for a JSON body
    pub fn json(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            retry_after: None,
            body: body.into(),
        }
    }

    /// A 429 response with an optional `Retry-After` value
    pub fn too_many_requests(retry_after: Option<&str>) -> Self {
        Self {
            status: StatusCode::TOO_MANY_REQUESTS,
            retry_after: retry_after.map(str::to_string),
            body: Vec::new(),
        }
    }
}

/// Performs a single GET against the external API
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<TransportResponse, FetchError>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a new HTTP transport
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        debug!(url = %url, status = %status, bytes = body.len(), "Response received");

        Ok(TransportResponse {
            status,
            retry_after,
            body,
        })
    }
}
