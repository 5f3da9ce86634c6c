//! Catalog operations on top of the access layer.
//!
//! Each operation builds a fully-qualified URL and goes through
//! [`JikanClient::request_json`], so caching and rate limiting apply to all
//! of them alike.

use super::client::JikanClient;
use super::error::{CatalogError, Result};
use super::transport::Transport;
use super::types::*;
use crate::search::{AdvancedSearchParams, ContentFilter, ListingQuery, QueryParams, HIGHLIGHT_LIMIT};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

impl<T: Transport> JikanClient<T> {
    async fn get<D: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<D> {
        let url = self.endpoint_url(path, params)?;
        Ok(self.request_json(&url).await?)
    }

    /// Fetch all anime genres
    pub async fn fetch_genres(&self) -> Result<GenreResponse> {
        info!("Fetching anime genres");
        self.get("/genres/anime", &[]).await
    }

    /// Fetch producers/studios
    pub async fn fetch_producers(&self) -> Result<ProducerResponse> {
        info!("Fetching anime producers");
        self.get("/producers", &[]).await
    }

    /// Fetch a catalog listing page
    pub async fn fetch_animes(
        &self,
        query: &ListingQuery,
        filter: ContentFilter,
    ) -> Result<AnimeListResponse> {
        info!(
            page = query.page,
            allow_nsfw = filter.allows_nsfw(),
            "Fetching anime listing"
        );
        self.get("/anime", &query.to_params(filter)).await
    }

    /// Fetch the best-scored anime
    pub async fn fetch_trending(&self, filter: ContentFilter) -> Result<AnimeListResponse> {
        let mut params: QueryParams = vec![
            ("limit", HIGHLIGHT_LIMIT.to_string()),
            ("order_by", "score".to_string()),
            ("sort", "desc".to_string()),
        ];
        filter.apply(&mut params);

        info!(allow_nsfw = filter.allows_nsfw(), "Fetching trending anime");
        self.get("/anime", &params).await
    }

    /// Fetch the most anticipated upcoming anime
    pub async fn fetch_upcoming(&self, filter: ContentFilter) -> Result<AnimeListResponse> {
        let mut params: QueryParams = vec![
            ("limit", HIGHLIGHT_LIMIT.to_string()),
            ("status", "upcoming".to_string()),
            ("order_by", "popularity".to_string()),
        ];
        filter.apply(&mut params);

        info!(allow_nsfw = filter.allows_nsfw(), "Fetching upcoming anime");
        self.get("/anime", &params).await
    }

    /// Fetch full anime details by MAL ID
    pub async fn fetch_anime_details(&self, mal_id: u32) -> Result<AnimeDetailsResponse> {
        debug!(mal_id = mal_id, "Fetching anime details");
        self.get(&format!("/anime/{}/full", mal_id), &[]).await
    }

    /// Fetch the characters of an anime
    pub async fn fetch_anime_characters(&self, mal_id: u32) -> Result<CharactersResponse> {
        debug!(mal_id = mal_id, "Fetching anime characters");
        self.get(&format!("/anime/{}/characters", mal_id), &[]).await
    }

    /// Fetch the staff of an anime
    pub async fn fetch_anime_staff(&self, mal_id: u32) -> Result<StaffResponse> {
        debug!(mal_id = mal_id, "Fetching anime staff");
        self.get(&format!("/anime/{}/staff", mal_id), &[]).await
    }

    /// Run an advanced search
    pub async fn fetch_advanced_search(
        &self,
        search: &AdvancedSearchParams,
        filter: ContentFilter,
    ) -> Result<AnimeListResponse> {
        let params = search.to_params(filter)?;
        info!(page = search.page, "Running advanced search");
        self.get("/anime", &params).await
    }

    /// Fetch the MAL ID of a random anime
    pub async fn fetch_random_anime(&self, filter: ContentFilter) -> Result<u32> {
        let mut params = QueryParams::new();
        filter.apply(&mut params);

        let response: RandomAnimeResponse = self.get("/random/anime", &params).await?;
        debug!(mal_id = response.data.mal_id, "Random anime selected");
        Ok(response.data.mal_id)
    }

    /// Pick a random anime among the first page of an advanced search
    pub async fn fetch_random_anime_with_filters(
        &self,
        search: &AdvancedSearchParams,
        filter: ContentFilter,
    ) -> Result<u32> {
        let mut rng = StdRng::from_entropy();
        self.fetch_random_anime_with_filters_using(search, filter, &mut rng)
            .await
    }

    /// [`fetch_random_anime_with_filters`](Self::fetch_random_anime_with_filters)
    /// with a caller-supplied random source
    pub async fn fetch_random_anime_with_filters_using<R: Rng + Send>(
        &self,
        search: &AdvancedSearchParams,
        filter: ContentFilter,
        rng: &mut R,
    ) -> Result<u32> {
        // Vary the ordering so repeated draws do not always see the same page
        let order_by = if rng.gen_bool(0.5) {
            search.order_by.clone()
        } else {
            "score".to_string()
        };
        let first_page = AdvancedSearchParams {
            page: 1,
            order_by,
            ..search.clone()
        };

        let response = self.fetch_advanced_search(&first_page, filter).await?;
        if response.data.is_empty() {
            return Err(CatalogError::NoMatches);
        }

        let picked = &response.data[rng.gen_range(0..response.data.len())];
        debug!(
            mal_id = picked.mal_id,
            candidates = response.data.len(),
            "Random anime selected from filtered results"
        );
        Ok(picked.mal_id)
    }
}
