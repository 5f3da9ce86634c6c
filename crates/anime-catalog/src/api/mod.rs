//! Jikan API v4 access layer.
//!
//! This module provides a cached, rate-limited, retry-enabled client for
//! interacting with the Jikan API (MyAnimeList unofficial API), plus the
//! catalog operations built on it.

pub mod client;
pub mod endpoints;
pub mod error;
pub mod rate_limiter;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{parse_retry_after, ClientSettings, JikanClient};
pub use error::{CatalogError, FetchError};
pub use rate_limiter::RateLimiter;
pub use transport::{HttpTransport, Transport, TransportResponse};
pub use types::*;
