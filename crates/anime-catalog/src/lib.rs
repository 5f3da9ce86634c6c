//! Anime catalog library backed by the Jikan API.
//!
//! All calls to the external API pass through a single [`JikanClient`],
//! which caches responses, spaces requests out and retries on rate-limit
//! responses. Catalog operations, search parameters and the genre filter
//! are built on top of it.

pub mod api;
pub mod cache;
pub mod genre_filter;
pub mod search;

pub use api::{CatalogError, ClientSettings, FetchError, JikanClient};
pub use cache::{CacheStats, ResponseCache};
pub use genre_filter::{GenreFilter, GenreState};
pub use search::{AdvancedSearchParams, ContentFilter, ListingQuery};
