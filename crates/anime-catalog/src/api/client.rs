//! Jikan API client with caching, rate limiting and 429 retry logic.
//!
//! Every outbound call goes through [`JikanClient::request`]: cache lookup,
//! rate gate, dispatch, bounded retry on 429, then cache store. Build one
//! client at start-up and share it by reference.

use super::error::{CatalogError, FetchError, Result};
use super::rate_limiter::RateLimiter;
use super::transport::{HttpTransport, Transport};
use super::types::JikanError;
use crate::cache::ResponseCache;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::JikanConfig;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Jikan API v4 base URL
pub const DEFAULT_BASE_URL: &str = "https://api.jikan.moe/v4";

/// Minimum spacing between two outbound requests
pub const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(500);

/// Age after which a cached response is no longer served
pub const CACHE_FRESHNESS: Duration = Duration::from_secs(5 * 60);

/// Retries allowed after a 429 before giving up
pub const MAX_RETRIES: u32 = 3;

/// Backoff applied when a 429 has no usable `Retry-After` header
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(2);

/// Timeout applied to each HTTP request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Tunables for a [`JikanClient`]
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub min_interval: Duration,
    pub freshness: Duration,
    pub cache_enabled: bool,
    pub max_retries: u32,
    pub default_retry_after: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            min_interval: MIN_REQUEST_INTERVAL,
            freshness: CACHE_FRESHNESS,
            cache_enabled: true,
            max_retries: MAX_RETRIES,
            default_retry_after: DEFAULT_RETRY_AFTER,
            request_timeout: REQUEST_TIMEOUT,
            user_agent: concat!("anime-catalog/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl From<&JikanConfig> for ClientSettings {
    fn from(config: &JikanConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            min_interval: Duration::from_millis(config.rate_limit.min_interval_ms),
            freshness: Duration::from_secs(config.cache.freshness_seconds),
            cache_enabled: config.cache.enabled,
            max_retries: config.max_retries,
            default_retry_after: Duration::from_secs(config.default_retry_after_secs),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Interpret a `Retry-After` header value in whole seconds.
///
/// Absent, malformed and zero values all yield `default`.
pub fn parse_retry_after(value: Option<&str>, default: Duration) -> Duration {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|&secs| secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(default)
}

/// Jikan API v4 client
pub struct JikanClient<T: Transport = HttpTransport> {
    /// Network transport
    transport: T,
    /// Base URL for Jikan API
    base_url: String,
    /// Rate gate shared by every endpoint
    rate_limiter: RateLimiter,
    /// Decoded responses keyed by URL
    cache: ResponseCache,
    /// Retries allowed after a 429
    max_retries: u32,
    /// Backoff when the server gives no usable hint
    default_retry_after: Duration,
}

impl JikanClient<HttpTransport> {
    /// Create a new client backed by reqwest
    pub fn new(settings: ClientSettings) -> std::result::Result<Self, FetchError> {
        let transport = HttpTransport::new(settings.request_timeout, &settings.user_agent)?;
        Ok(Self::with_transport(transport, settings))
    }
}

impl<T: Transport> JikanClient<T> {
    /// Create a client over an arbitrary transport
    pub fn with_transport(transport: T, settings: ClientSettings) -> Self {
        debug!(
            base_url = %settings.base_url,
            min_interval_ms = settings.min_interval.as_millis() as u64,
            freshness_secs = settings.freshness.as_secs(),
            max_retries = settings.max_retries,
            "Creating Jikan client"
        );

        Self {
            transport,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            rate_limiter: RateLimiter::new(settings.min_interval),
            cache: ResponseCache::new(settings.freshness, settings.cache_enabled),
            max_retries: settings.max_retries,
            default_retry_after: settings.default_retry_after,
        }
    }

    /// Fetch a fully-formed URL and return its decoded JSON body
    pub async fn request(&self, url: &str) -> std::result::Result<Value, FetchError> {
        if let Some(body) = self.cache.get(url) {
            debug!(url = %url, "Using cached data");
            return Ok(body);
        }

        let max_attempts = self.max_retries + 1;
        let mut attempt = 0;

        loop {
            attempt += 1;
            self.rate_limiter.acquire().await;

            debug!(url = %url, attempt = attempt, "Making API request");

            let response = self.transport.get(url).await.map_err(|e| {
                warn!(url = %url, error = %e, "Request error");
                e
            })?;

            if response.status == StatusCode::TOO_MANY_REQUESTS {
                if attempt >= max_attempts {
                    warn!(url = %url, attempts = attempt, "Rate limit retries exhausted");
                    return Err(FetchError::RateLimitExhausted {
                        url: url.to_string(),
                        attempts: attempt,
                    });
                }

                let delay =
                    parse_retry_after(response.retry_after.as_deref(), self.default_retry_after);
                warn!(
                    url = %url,
                    attempt = attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Rate limited by server, waiting"
                );
                sleep(delay).await;
                continue;
            }

            if !response.status.is_success() {
                let message = serde_json::from_slice::<JikanError>(&response.body)
                    .map(|e| e.message)
                    .unwrap_or_default();
                warn!(
                    url = %url,
                    status = %response.status,
                    error = %message,
                    "Request failed"
                );
                return Err(FetchError::Http {
                    url: url.to_string(),
                    status: response.status,
                });
            }

            let body: Value = serde_json::from_slice(&response.body).map_err(|e| {
                warn!(url = %url, error = %e, "Failed to parse response");
                FetchError::from(e)
            })?;

            self.cache.set(url, &body);
            debug!(url = %url, "Request successful");
            return Ok(body);
        }
    }

    /// Fetch a URL and decode it into a typed response
    pub async fn request_json<D: DeserializeOwned>(
        &self,
        url: &str,
    ) -> std::result::Result<D, FetchError> {
        let body = self.request(url).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Build the full URL for an API path and query parameters
    pub fn endpoint_url(&self, path: &str, params: &[(&str, String)]) -> Result<String> {
        let raw = format!("{}{}", self.base_url, path);
        let url = if params.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, params)
        }
        .map_err(|e| CatalogError::InvalidUrl(format!("{}: {}", raw, e)))?;

        Ok(url.into())
    }

    /// Base URL requests are built against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Response cache
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Rate gate
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockTransport;
    use crate::api::transport::TransportResponse;
    use serde_json::json;
    use tokio::time::Instant;

    const URL: &str = "https://api.example/v4/anime?page=1";

    fn settings() -> ClientSettings {
        ClientSettings {
            base_url: "https://api.example/v4".to_string(),
            ..ClientSettings::default()
        }
    }

    fn ok(body: &str) -> TransportResponse {
        TransportResponse::json(StatusCode::OK, body)
    }

    #[test]
    fn test_client_creation() {
        let client = JikanClient::new(ClientSettings::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = JikanConfig::default();
        config.rate_limit.min_interval_ms = 1000;
        config.cache.enabled = false;

        let settings = ClientSettings::from(&config);
        assert_eq!(settings.min_interval, Duration::from_secs(1));
        assert_eq!(settings.freshness, CACHE_FRESHNESS);
        assert_eq!(settings.max_retries, MAX_RETRIES);
        assert_eq!(settings.default_retry_after, DEFAULT_RETRY_AFTER);
        assert!(!settings.cache_enabled);
    }

    #[test]
    fn test_parse_retry_after() {
        let default = DEFAULT_RETRY_AFTER;
        assert_eq!(parse_retry_after(Some("1"), default), Duration::from_secs(1));
        assert_eq!(parse_retry_after(Some(" 7 "), default), Duration::from_secs(7));
        assert_eq!(parse_retry_after(None, default), default);
        assert_eq!(parse_retry_after(Some("soon"), default), default);
        assert_eq!(parse_retry_after(Some("0"), default), default);
        assert_eq!(
            parse_retry_after(Some("Wed, 21 Oct 2015 07:28:00 GMT"), default),
            default
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_request_served_from_cache() {
        let client = JikanClient::with_transport(
            MockTransport::new().respond(ok(r#"{"data":[{"mal_id":1}]}"#)),
            settings(),
        );

        let first = client.request(URL).await.unwrap();
        let second = client.request(URL).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first, json!({ "data": [{ "mal_id": 1 }] }));
        assert_eq!(client.transport().call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_hit_does_not_touch_rate_state() {
        let client = JikanClient::with_transport(MockTransport::new(), settings());

        client.request(URL).await.unwrap();
        let last = client.rate_limiter().last_request();

        tokio::time::advance(Duration::from_secs(10)).await;
        client.request(URL).await.unwrap();

        assert_eq!(client.rate_limiter().last_request(), last);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_cache_triggers_new_request() {
        let client = JikanClient::with_transport(
            MockTransport::new()
                .respond(ok(r#"{"page":"old"}"#))
                .respond(ok(r#"{"page":"new"}"#)),
            settings(),
        );

        client.request(URL).await.unwrap();
        tokio::time::advance(CACHE_FRESHNESS).await;
        let body = client.request(URL).await.unwrap();

        assert_eq!(body, json!({ "page": "new" }));
        assert_eq!(client.transport().call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_cache_always_dispatches() {
        let client = JikanClient::with_transport(
            MockTransport::new(),
            ClientSettings {
                cache_enabled: false,
                ..settings()
            },
        );

        client.request(URL).await.unwrap();
        client.request(URL).await.unwrap();

        assert_eq!(client.transport().call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_to_back_requests_are_spaced() {
        let client = JikanClient::with_transport(MockTransport::new(), settings());

        client.request("https://api.example/v4/anime?page=1").await.unwrap();
        client.request("https://api.example/v4/anime?page=2").await.unwrap();

        let times = client.transport().dispatch_times();
        assert_eq!(times.len(), 2);
        assert!(times[1] - times[0] >= MIN_REQUEST_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_requests_are_spaced() {
        let client = JikanClient::with_transport(MockTransport::new(), settings());

        let (a, b, c) = tokio::join!(
            client.request("https://api.example/v4/anime/1/full"),
            client.request("https://api.example/v4/anime/2/full"),
            client.request("https://api.example/v4/anime/3/full"),
        );
        assert!(a.is_ok() && b.is_ok() && c.is_ok());

        let mut times = client.transport().dispatch_times();
        times.sort();
        for pair in times.windows(2) {
            assert!(pair[1] - pair[0] >= MIN_REQUEST_INTERVAL);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_rate_limit_then_success() {
        let client = JikanClient::with_transport(
            MockTransport::new()
                .respond(TransportResponse::too_many_requests(Some("1")))
                .respond(TransportResponse::too_many_requests(Some("1")))
                .respond(ok(r#"{"data":{"mal_id":5}}"#)),
            settings(),
        );

        let start = Instant::now();
        let body = client.request(URL).await.unwrap();

        assert_eq!(body, json!({ "data": { "mal_id": 5 } }));
        assert_eq!(client.transport().call_count(), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_retry_after_uses_default() {
        let client = JikanClient::with_transport(
            MockTransport::new()
                .respond(TransportResponse::too_many_requests(None))
                .respond(ok("{}")),
            settings(),
        );

        let start = Instant::now();
        client.request(URL).await.unwrap();

        assert_eq!(start.elapsed(), DEFAULT_RETRY_AFTER);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_exhausted_after_max_attempts() {
        let client = JikanClient::with_transport(
            MockTransport::with_fallback(TransportResponse::too_many_requests(Some("1"))),
            settings(),
        );

        let err = client.request(URL).await.unwrap_err();

        assert!(matches!(
            err,
            FetchError::RateLimitExhausted { attempts, .. } if attempts == MAX_RETRIES + 1
        ));
        assert_eq!(client.transport().call_count(), (MAX_RETRIES + 1) as usize);
        assert!(!client.cache().exists(URL));
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_retries_zero_means_single_attempt() {
        let client = JikanClient::with_transport(
            MockTransport::with_fallback(TransportResponse::too_many_requests(Some("1"))),
            ClientSettings {
                max_retries: 0,
                ..settings()
            },
        );

        let start = Instant::now();
        let err = client.request(URL).await.unwrap_err();

        assert!(matches!(err, FetchError::RateLimitExhausted { attempts: 1, .. }));
        assert_eq!(client.transport().call_count(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_error_is_not_retried() {
        let client = JikanClient::with_transport(
            MockTransport::with_fallback(TransportResponse::json(
                StatusCode::INTERNAL_SERVER_ERROR,
                r#"{"status":500,"type":"InternalException","message":"boom"}"#,
            )),
            settings(),
        );

        let err = client.request(URL).await.unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(client.transport().call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_json_is_decode_error() {
        let client = JikanClient::with_transport(
            MockTransport::new().respond(ok("<html>not json</html>")),
            settings(),
        );

        let err = client.request(URL).await.unwrap_err();

        assert!(matches!(err, FetchError::Decode(_)));
        assert!(!client.cache().exists(URL));
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_error_propagates_without_retry() {
        let client = JikanClient::with_transport(
            MockTransport::new().fail(FetchError::Network("connection reset".to_string())),
            settings(),
        );

        let err = client.request(URL).await.unwrap_err();

        assert!(matches!(err, FetchError::Network(_)));
        assert_eq!(client.transport().call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_json_shape_mismatch_is_decode_error() {
        #[derive(Debug, serde::Deserialize)]
        struct Expected {
            #[allow(dead_code)]
            data: Vec<u32>,
        }

        let client = JikanClient::with_transport(
            MockTransport::new().respond(ok(r#"{"data":"nope"}"#)),
            settings(),
        );

        let err = client.request_json::<Expected>(URL).await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn test_endpoint_url() {
        let client = JikanClient::with_transport(
            MockTransport::new(),
            ClientSettings {
                base_url: "https://api.example/v4/".to_string(),
                ..ClientSettings::default()
            },
        );

        assert_eq!(
            client.endpoint_url("/genres/anime", &[]).unwrap(),
            "https://api.example/v4/genres/anime"
        );
        assert_eq!(
            client
                .endpoint_url("/anime", &[("page", "2".to_string()), ("q", "one piece".to_string())])
                .unwrap(),
            "https://api.example/v4/anime?page=2&q=one+piece"
        );
    }
}
