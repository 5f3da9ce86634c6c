//! Query parameters for catalog listings and advanced search.

use crate::api::error::{CatalogError, Result};
use chrono::NaiveDate;

/// Page size of catalog listings and search results
pub const PAGE_LIMIT: u32 = 24;

/// Page size of the trending and upcoming highlights
pub const HIGHLIGHT_LIMIT: u32 = 20;

/// Default listing order
pub const DEFAULT_ORDER_BY: &str = "popularity";

/// Default sort direction for advanced search
pub const DEFAULT_SORT: &str = "desc";

/// Ordered query parameters, encoded by the client when building URLs
pub type QueryParams = Vec<(&'static str, String)>;

/// User content preferences.
///
/// NSFW entries are only shown when the user asked for them and is
/// authorized to see them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentFilter {
    pub show_nsfw: bool,
    pub nsfw_authorized: bool,
}

impl ContentFilter {
    pub fn new(show_nsfw: bool, nsfw_authorized: bool) -> Self {
        Self {
            show_nsfw,
            nsfw_authorized,
        }
    }

    /// Whether NSFW content may be requested
    pub fn allows_nsfw(&self) -> bool {
        self.show_nsfw && self.nsfw_authorized
    }

    /// Append `sfw=true` unless NSFW content is allowed
    pub fn apply(&self, params: &mut QueryParams) {
        if !self.allows_nsfw() {
            params.push(("sfw", "true".to_string()));
        }
    }
}

/// Catalog listing filters
#[derive(Debug, Clone, PartialEq)]
pub struct ListingQuery {
    pub page: u32,
    pub include_genres: Vec<u32>,
    pub exclude_genres: Vec<u32>,
    pub query: String,
    pub order_by: String,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            page: 1,
            include_genres: Vec::new(),
            exclude_genres: Vec::new(),
            query: String::new(),
            order_by: DEFAULT_ORDER_BY.to_string(),
        }
    }
}

impl ListingQuery {
    /// Query parameters for `/anime`
    pub fn to_params(&self, filter: ContentFilter) -> QueryParams {
        let mut params: QueryParams = vec![
            ("page", self.page.to_string()),
            ("limit", PAGE_LIMIT.to_string()),
            ("order_by", self.order_by.clone()),
        ];
        filter.apply(&mut params);
        push_common(
            &mut params,
            &self.include_genres,
            &self.exclude_genres,
            &self.query,
        );
        params
    }
}

/// Advanced search filters
#[derive(Debug, Clone, PartialEq)]
pub struct AdvancedSearchParams {
    pub page: u32,
    pub include_genres: Vec<u32>,
    pub exclude_genres: Vec<u32>,
    pub query: String,
    pub order_by: String,
    pub sort: String,
    /// `airing`, `complete` or `upcoming`
    pub status: Option<String>,
    /// `tv`, `movie`, `ova`, `special`, `ona` or `music`
    pub anime_type: Option<String>,
    /// `winter`, `spring`, `summer` or `fall`
    pub season: Option<String>,
    pub year: Option<u32>,
    pub min_score: Option<f64>,
    pub producers: Vec<u32>,
    /// `YYYY-MM-DD`
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`
    pub end_date: Option<String>,
}

impl Default for AdvancedSearchParams {
    fn default() -> Self {
        Self {
            page: 1,
            include_genres: Vec::new(),
            exclude_genres: Vec::new(),
            query: String::new(),
            order_by: DEFAULT_ORDER_BY.to_string(),
            sort: DEFAULT_SORT.to_string(),
            status: None,
            anime_type: None,
            season: None,
            year: None,
            min_score: None,
            producers: Vec::new(),
            start_date: None,
            end_date: None,
        }
    }
}

impl AdvancedSearchParams {
    /// Query parameters for `/anime`.
    ///
    /// Out-of-range years and scores are dropped. An explicit start date takes
    /// precedence over `year`; malformed dates are rejected.
    pub fn to_params(&self, filter: ContentFilter) -> Result<QueryParams> {
        let mut params: QueryParams = vec![
            ("page", self.page.to_string()),
            ("limit", PAGE_LIMIT.to_string()),
            ("order_by", self.order_by.clone()),
            ("sort", self.sort.clone()),
        ];
        filter.apply(&mut params);
        push_common(
            &mut params,
            &self.include_genres,
            &self.exclude_genres,
            &self.query,
        );

        if let Some(status) = non_empty(&self.status) {
            params.push(("status", status.to_string()));
        }
        if let Some(anime_type) = non_empty(&self.anime_type) {
            params.push(("type", anime_type.to_string()));
        }
        if let Some(season) = non_empty(&self.season) {
            params.push(("season", season.to_lowercase()));
        }

        let start_date = self.start_date.as_deref().map(normalize_date).transpose()?;
        let end_date = self.end_date.as_deref().map(normalize_date).transpose()?;

        match (start_date, self.year) {
            (Some(date), _) => params.push(("start_date", date)),
            (None, Some(year)) if year > 1900 => params.push(("start_date", year.to_string())),
            _ => {}
        }

        if let Some(score) = self.min_score.filter(|s| (1.0..=10.0).contains(s)) {
            params.push(("min_score", score.to_string()));
        }
        if !self.producers.is_empty() {
            params.push(("producers", join_ids(&self.producers)));
        }
        if let Some(date) = end_date {
            params.push(("end_date", date));
        }

        Ok(params)
    }
}

fn push_common(params: &mut QueryParams, include: &[u32], exclude: &[u32], query: &str) {
    if !include.is_empty() {
        params.push(("genres", join_ids(include)));
    }
    if !exclude.is_empty() {
        params.push(("genres_exclude", join_ids(exclude)));
    }
    let query = query.trim();
    if !query.is_empty() {
        params.push(("q", query.to_string()));
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Join ids as `1,2,3`
pub fn join_ids(ids: &[u32]) -> String {
    ids.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Validate a `YYYY-MM-DD` date and return it in canonical form
pub fn normalize_date(value: &str) -> Result<String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map(|date| date.format("%Y-%m-%d").to_string())
        .map_err(|_| CatalogError::InvalidDate(value.to_string()))
}
