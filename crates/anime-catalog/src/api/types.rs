//! Jikan API v4 response types.
//!
//! These types represent the JSON responses from the Jikan API. Most fields
//! are optional because list and detail endpoints return different subsets.

use serde::{Deserialize, Serialize};

/// Generic pagination wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

/// Simple data wrapper (without pagination)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: Vec<T>,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub last_visible_page: u32,
    pub has_next_page: bool,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub items: Option<PaginationItems>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationItems {
    pub count: u32,
    pub total: u32,
    pub per_page: u32,
}

/// Anime listing page
pub type AnimeListResponse = PaginatedResponse<Anime>;

/// Genre list
pub type GenreResponse = DataResponse<Genre>;

/// Producer list
pub type ProducerResponse = DataResponse<Producer>;

/// Characters of one anime
pub type CharactersResponse = DataResponse<Character>;

/// Staff of one anime
pub type StaffResponse = DataResponse<StaffMember>;

/// Single anime response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimeDetailsResponse {
    pub data: Anime,
}

/// `/random/anime` wraps a single anime like the details endpoint
pub type RandomAnimeResponse = AnimeDetailsResponse;

/// Anime entry, as returned by listing and `/full` detail endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anime {
    pub mal_id: u32,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub images: Images,

    // Titles
    pub title: String,
    #[serde(default)]
    pub title_english: Option<String>,
    #[serde(default)]
    pub title_japanese: Option<String>,

    // Type and status
    #[serde(rename = "type", default)]
    pub anime_type: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub episodes: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub aired: Option<Aired>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,

    // Scores and rankings
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub scored_by: Option<u32>,
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub popularity: Option<u32>,
    #[serde(default)]
    pub members: Option<u32>,
    #[serde(default)]
    pub favorites: Option<u32>,

    // Synopsis
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub background: Option<String>,

    // Season
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub year: Option<u32>,

    #[serde(default)]
    pub trailer: Option<Trailer>,

    // Producers, studios
    #[serde(default)]
    pub producers: Vec<MalEntity>,
    #[serde(default)]
    pub studios: Vec<MalEntity>,

    // Genres and themes
    #[serde(default)]
    pub genres: Vec<MalEntity>,
    #[serde(default)]
    pub themes: Vec<MalEntity>,

    // Only present on `/full`
    #[serde(default)]
    pub relations: Vec<Relation>,
    #[serde(default)]
    pub streaming: Vec<ExternalLink>,
}

impl Anime {
    /// English title when available, otherwise the default title
    pub fn display_title(&self) -> &str {
        self.title_english
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.title)
    }

    /// Genre names in API order
    pub fn genre_names(&self) -> Vec<&str> {
        self.genres.iter().map(|g| g.name.as_str()).collect()
    }
}

/// Image URLs in jpg and optional webp flavours
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Images {
    #[serde(default)]
    pub jpg: ImageSet,
    #[serde(default)]
    pub webp: Option<ImageSet>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageSet {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub small_image_url: Option<String>,
    #[serde(default)]
    pub large_image_url: Option<String>,
}

/// Aired dates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aired {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub string: Option<String>,
}

/// Trailer links
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trailer {
    #[serde(default)]
    pub youtube_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Related entries grouped by relation kind (sequel, prequel, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    pub relation: String,
    #[serde(default)]
    pub entry: Vec<MalEntity>,
}

/// Streaming or external link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalLink {
    pub name: String,
    pub url: String,
}

/// MAL entity (genre, studio, producer, relation entry, etc.)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MalEntity {
    #[serde(default)]
    pub mal_id: u32,
    #[serde(rename = "type", default)]
    pub entity_type: String,
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// Genre item from `/genres/anime`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genre {
    pub mal_id: u32,
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub count: u32,
}

/// Producer/Studio item (titles instead of a single name)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Producer {
    pub mal_id: u32,
    #[serde(default)]
    pub titles: Vec<ProducerTitle>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub count: u32,
}

impl Producer {
    /// The `Default` title, else the first title, else an empty string
    pub fn name(&self) -> &str {
        self.titles
            .iter()
            .find(|t| t.title_type == "Default")
            .or_else(|| self.titles.first())
            .map(|t| t.title.as_str())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProducerTitle {
    #[serde(rename = "type")]
    pub title_type: String,
    pub title: String,
}

/// Character appearing in an anime, with voice actors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub character: Person,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub voice_actors: Vec<VoiceActor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceActor {
    pub person: Person,
    #[serde(default)]
    pub language: String,
}

/// Staff member and their positions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffMember {
    pub person: Person,
    #[serde(default)]
    pub positions: Vec<String>,
}

/// Character or person reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub mal_id: u32,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub images: Images,
    pub name: String,
}

/// Error response from Jikan API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JikanError {
    pub status: u16,
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_decodes_sparse_entries() {
        let json = r#"{
            "pagination": { "last_visible_page": 10, "has_next_page": true },
            "data": [
                { "mal_id": 1, "title": "Cowboy Bebop", "score": 8.75,
                  "genres": [{ "mal_id": 1, "type": "anime", "name": "Action", "url": "u" }] },
                { "mal_id": 2, "title": "Untitled", "title_english": "" }
            ]
        }"#;

        let page: AnimeListResponse = serde_json::from_str(json).unwrap();
        assert!(page.pagination.has_next_page);
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[0].genre_names(), vec!["Action"]);
        assert_eq!(page.data[1].display_title(), "Untitled");
        assert!(page.data[1].episodes.is_none());
    }

    #[test]
    fn test_producer_name_prefers_default_title() {
        let producer: Producer = serde_json::from_str(
            r#"{ "mal_id": 4, "titles": [
                { "type": "Japanese", "title": "ボンズ" },
                { "type": "Default", "title": "Bones" }
            ] }"#,
        )
        .unwrap();
        assert_eq!(producer.name(), "Bones");

        let untitled: Producer = serde_json::from_str(r#"{ "mal_id": 5 }"#).unwrap();
        assert_eq!(untitled.name(), "");
    }

    #[test]
    fn test_characters_decode() {
        let json = r#"{ "data": [{
            "character": { "mal_id": 1, "url": "u", "images": { "jpg": { "image_url": "i" } }, "name": "Spike" },
            "role": "Main",
            "voice_actors": [{ "person": { "mal_id": 9, "name": "Yamadera, Kouichi" }, "language": "Japanese" }]
        }] }"#;

        let characters: CharactersResponse = serde_json::from_str(json).unwrap();
        assert_eq!(characters.data[0].character.name, "Spike");
        assert_eq!(characters.data[0].voice_actors[0].language, "Japanese");
    }

    #[test]
    fn test_jikan_error_decodes_partial() {
        let err: JikanError = serde_json::from_str(r#"{ "message": "Resource does not exist" }"#).unwrap();
        assert_eq!(err.message, "Resource does not exist");
        assert_eq!(err.status, 0);
    }
}
