//! Shared library for the anime catalog workspace.
//!
//! This crate provides common functionality used by the catalog binary:
//! - Configuration management
//! - Logging infrastructure

pub mod config;
pub mod logging;

// Re-export commonly used types
pub use config::{CacheConfig, Config, JikanConfig, RateLimitConfig};
pub use logging::LogConfig;

/// Common result type using anyhow::Error
pub type Result<T> = anyhow::Result<T>;
