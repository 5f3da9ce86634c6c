//! Error types for the Jikan access layer.

use reqwest::StatusCode;
use thiserror::Error;

/// Message shown to users for any failed catalog request.
pub const USER_FACING_MESSAGE: &str =
    "An error occurred while loading anime data, possibly due to API rate limits. Please try again later.";

/// Failure of a single logical request through the access layer
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Maximum retry attempts reached for rate-limited request ({attempts} attempts): {url}")]
    RateLimitExhausted { url: String, attempts: u32 },

    #[error("HTTP Error: {status} for {url}")]
    Http { url: String, status: StatusCode },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    /// Status code carried by an HTTP failure
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The generic message the presentation layer shows for every failure kind
    pub fn user_message(&self) -> &'static str {
        USER_FACING_MESSAGE
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            FetchError::Network("Failed to connect to API".to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// Errors raised by catalog operations built on top of the access layer
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("No anime found matching your filters. Please try with different criteria.")]
    NoMatches,

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

impl CatalogError {
    /// Message suitable for showing to a user
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::Fetch(err) => err.user_message().to_string(),
            other => other.to_string(),
        }
    }
}

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;
