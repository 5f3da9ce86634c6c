//! Scripted transport for exercising the client without a network.

use super::error::FetchError;
use super::transport::{Transport, TransportResponse};
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;
use std::collections::VecDeque;
use tokio::time::Instant;

/// Transport that replays scripted responses and records every dispatch.
///
/// Scripted responses are consumed in order; once exhausted, the fallback
/// response is returned for every further call.
pub struct MockTransport {
    script: Mutex<VecDeque<Result<TransportResponse, FetchError>>>,
    fallback: TransportResponse,
    dispatches: Mutex<Vec<(String, Instant)>>,
}

impl MockTransport {
    /// Mock answering `200 {"data":[]}` once the script runs out
    pub fn new() -> Self {
        Self::with_fallback(TransportResponse::json(StatusCode::OK, r#"{"data":[]}"#))
    }

    /// Mock answering `fallback` once the script runs out
    pub fn with_fallback(fallback: TransportResponse) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            dispatches: Mutex::new(Vec::new()),
        }
    }

    /// Queue a response
    pub fn respond(self, response: TransportResponse) -> Self {
        self.script.lock().push_back(Ok(response));
        self
    }

    /// Queue a transport failure
    pub fn fail(self, error: FetchError) -> Self {
        self.script.lock().push_back(Err(error));
        self
    }

    /// Number of dispatched requests
    pub fn call_count(&self) -> usize {
        self.dispatches.lock().len()
    }

    /// URLs in dispatch order
    pub fn requested_urls(&self) -> Vec<String> {
        self.dispatches.lock().iter().map(|(url, _)| url.clone()).collect()
    }

    /// Dispatch instants in dispatch order
    pub fn dispatch_times(&self) -> Vec<Instant> {
        self.dispatches.lock().iter().map(|(_, at)| *at).collect()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, FetchError> {
        self.dispatches.lock().push((url.to_string(), Instant::now()));

        match self.script.lock().pop_front() {
            Some(scripted) => scripted,
            None => Ok(self.fallback.clone()),
        }
    }
}
