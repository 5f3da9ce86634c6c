//! Tri-state genre filter.
//!
//! Each genre is neutral, included or excluded. Toggling cycles
//! neutral -> include -> exclude -> neutral. When NSFW content is not allowed,
//! NSFW genres are hidden and forced into the exclusions.

use crate::api::types::Genre;
use crate::search::{AdvancedSearchParams, ListingQuery};

/// Genres treated as NSFW: Ecchi, Hentai, Harem, Gender Bender, Erotica, Reverse Harem
pub const NSFW_GENRE_IDS: [u32; 6] = [9, 12, 35, 44, 49, 65];

/// Whether a genre id is in the NSFW set
pub fn is_nsfw_genre(id: u32) -> bool {
    NSFW_GENRE_IDS.contains(&id)
}

/// Selection state of one genre
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenreState {
    #[default]
    Neutral,
    Include,
    Exclude,
}

/// Included and excluded genres, kept in selection order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreFilter {
    included: Vec<u32>,
    excluded: Vec<u32>,
}

impl GenreFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance a genre to its next state and return it
    pub fn toggle(&mut self, id: u32) -> GenreState {
        match self.state(id) {
            GenreState::Neutral => {
                self.included.push(id);
                GenreState::Include
            }
            GenreState::Include => {
                self.included.retain(|&g| g != id);
                self.excluded.push(id);
                GenreState::Exclude
            }
            GenreState::Exclude => {
                self.excluded.retain(|&g| g != id);
                GenreState::Neutral
            }
        }
    }

    /// Current state of a genre
    pub fn state(&self, id: u32) -> GenreState {
        if self.included.contains(&id) {
            GenreState::Include
        } else if self.excluded.contains(&id) {
            GenreState::Exclude
        } else {
            GenreState::Neutral
        }
    }

    /// Put a genre directly into the given state
    pub fn set_state(&mut self, id: u32, state: GenreState) {
        self.included.retain(|&g| g != id);
        self.excluded.retain(|&g| g != id);
        match state {
            GenreState::Include => self.included.push(id),
            GenreState::Exclude => self.excluded.push(id),
            GenreState::Neutral => {}
        }
    }

    pub fn included(&self) -> &[u32] {
        &self.included
    }

    pub fn excluded(&self) -> &[u32] {
        &self.excluded
    }

    /// Reset every genre to neutral
    pub fn clear(&mut self) {
        self.included.clear();
        self.excluded.clear();
    }

    /// Number of non-neutral genres
    pub fn active_count(&self) -> usize {
        self.included.len() + self.excluded.len()
    }

    /// Bring the selection in line with the NSFW policy.
    ///
    /// Disallowed: NSFW genres leave the inclusions and join the exclusions.
    /// Allowed: NSFW genres leave the exclusions.
    pub fn apply_content_policy(&mut self, allow_nsfw: bool) {
        if allow_nsfw {
            self.excluded.retain(|&g| !is_nsfw_genre(g));
        } else {
            self.included.retain(|&g| !is_nsfw_genre(g));
            for id in NSFW_GENRE_IDS {
                if !self.excluded.contains(&id) {
                    self.excluded.push(id);
                }
            }
        }
    }

    /// Exclusions to send, with NSFW genres added when they are not allowed
    pub fn effective_excluded(&self, allow_nsfw: bool) -> Vec<u32> {
        let mut excluded = self.excluded.clone();
        if !allow_nsfw {
            for id in NSFW_GENRE_IDS {
                if !excluded.contains(&id) {
                    excluded.push(id);
                }
            }
        }
        excluded
    }

    /// Copy the selection into a listing query
    pub fn to_listing_query(&self, mut query: ListingQuery, allow_nsfw: bool) -> ListingQuery {
        query.include_genres = self.included.clone();
        query.exclude_genres = self.effective_excluded(allow_nsfw);
        query
    }

    /// Copy the selection into advanced search parameters
    pub fn to_search_params(
        &self,
        mut params: AdvancedSearchParams,
        allow_nsfw: bool,
    ) -> AdvancedSearchParams {
        params.include_genres = self.included.clone();
        params.exclude_genres = self.effective_excluded(allow_nsfw);
        params
    }
}

/// Genres to offer for selection: sorted by name, NSFW hidden unless allowed
pub fn visible_genres(genres: &[Genre], allow_nsfw: bool) -> Vec<Genre> {
    let mut visible: Vec<Genre> = genres
        .iter()
        .filter(|g| allow_nsfw || !is_nsfw_genre(g.mal_id))
        .cloned()
        .collect();
    visible.sort_by_key(|g| g.name.to_lowercase());
    visible
}
