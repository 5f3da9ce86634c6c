//! In-process cache for decoded API responses.
//!
//! Entries are keyed by the fully-qualified request URL and are only served
//! while younger than the freshness window. Stale entries are ignored, not
//! evicted; `clear` is the only removal.

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// A stored response body and when it was stored
#[derive(Debug, Clone)]
struct CacheEntry {
    body: Value,
    stored_at: Instant,
}

/// Cache for API responses
#[derive(Debug)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    /// Maximum age at which an entry may still be served
    freshness: Duration,
    /// Whether caching is enabled
    enabled: bool,
}

impl ResponseCache {
    /// Create a new response cache
    pub fn new(freshness: Duration, enabled: bool) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            freshness,
            enabled,
        }
    }

    /// Get a cached body if it exists and is still fresh
    pub fn get(&self, url: &str) -> Option<Value> {
        if !self.enabled {
            return None;
        }

        let entries = self.entries.lock();
        match entries.get(url) {
            Some(entry) if self.is_fresh(entry) => {
                debug!(url = url, "Cache hit");
                Some(entry.body.clone())
            }
            Some(_) => {
                debug!(url = url, "Cache entry stale");
                None
            }
            None => {
                debug!(url = url, "Cache miss");
                None
            }
        }
    }

    /// Store a body in the cache, stamped with the current time
    pub fn set(&self, url: &str, body: &Value) {
        if !self.enabled {
            return;
        }

        self.entries.lock().insert(
            url.to_string(),
            CacheEntry {
                body: body.clone(),
                stored_at: Instant::now(),
            },
        );
        debug!(url = url, "Cache stored");
    }

    /// Check if a fresh cache entry exists
    pub fn exists(&self, url: &str) -> bool {
        if !self.enabled {
            return false;
        }
        self.entries
            .lock()
            .get(url)
            .is_some_and(|entry| self.is_fresh(entry))
    }

    /// Clear all entries
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        let removed = entries.len();
        entries.clear();
        info!(removed = removed, "Cache cleared");
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        CacheStats {
            total_entries: entries.len(),
            fresh_entries: entries.values().filter(|e| self.is_fresh(e)).count(),
        }
    }

    /// Freshness window
    pub fn freshness(&self) -> Duration {
        self.freshness
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        entry.stored_at.elapsed() < self.freshness
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries held, stale ones included
    pub total_entries: usize,
    /// Entries that would currently be served
    pub fresh_entries: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const URL: &str = "https://api.example/v4/anime?page=1";

    fn cache() -> ResponseCache {
        ResponseCache::new(Duration::from_secs(300), true)
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_enabled() {
        let cache = cache();
        let body = json!({ "data": [{ "mal_id": 1 }] });

        cache.set(URL, &body);

        assert_eq!(cache.get(URL), Some(body));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_disabled() {
        let cache = ResponseCache::new(Duration::from_secs(300), false);

        // Store should succeed but do nothing
        cache.set(URL, &json!({ "data": [] }));

        assert_eq!(cache.get(URL), None);
        assert!(!cache.exists(URL));
        assert_eq!(cache.stats().total_entries, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_miss() {
        let cache = cache();
        assert_eq!(cache.get("https://api.example/v4/anime?page=2"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_key_includes_query() {
        let cache = cache();
        cache.set(URL, &json!(1));

        assert!(cache.exists(URL));
        assert!(!cache.exists("https://api.example/v4/anime?page=10"));
        assert!(!cache.exists("https://api.example/v4/anime"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_entry_not_served() {
        let cache = cache();
        cache.set(URL, &json!({ "data": [] }));

        tokio::time::advance(Duration::from_secs(299)).await;
        assert!(cache.exists(URL));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!cache.exists(URL));
        assert_eq!(cache.get(URL), None);

        // Stale entries stay in the map until cleared
        let stats = cache.stats();
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.fresh_entries, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_refreshes_timestamp() {
        let cache = cache();
        cache.set(URL, &json!("old"));

        tokio::time::advance(Duration::from_secs(301)).await;
        cache.set(URL, &json!("new"));

        assert_eq!(cache.get(URL), Some(json!("new")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear() {
        let cache = cache();
        cache.set(URL, &json!(1));
        cache.set("https://api.example/v4/genres/anime", &json!(2));
        assert_eq!(cache.stats().total_entries, 2);

        cache.clear();

        assert_eq!(
            cache.stats(),
            CacheStats {
                total_entries: 0,
                fresh_entries: 0
            }
        );
    }
}
