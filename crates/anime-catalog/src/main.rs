//! Anime catalog CLI application.

use anime_catalog::api::types::{Anime, AnimeListResponse};
use anime_catalog::api::CatalogError;
use anime_catalog::genre_filter::visible_genres;
use anime_catalog::{
    AdvancedSearchParams, ClientSettings, ContentFilter, GenreFilter, GenreState, JikanClient,
    ListingQuery,
};
use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use shared::{Config, LogConfig};
use std::path::PathBuf;
use tracing::{debug, error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Show NSFW entries (only honoured together with --nsfw-authorized)
    #[arg(long, global = true)]
    nsfw: bool,

    /// The user is authorized to see NSFW entries
    #[arg(long, global = true)]
    nsfw_authorized: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Browse the catalog
    List {
        #[command(flatten)]
        genres: GenreArgs,

        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Title search
        #[arg(short, long, default_value = "")]
        query: String,

        /// Sort field (popularity, score, title, start_date, favorites, ...)
        #[arg(long, default_value = "popularity")]
        order_by: String,
    },
    /// Best-scored anime
    Trending,
    /// Most anticipated upcoming anime
    Upcoming,
    /// Advanced search
    Search(SearchArgs),
    /// Full details of one anime
    Details { id: u32 },
    /// Characters and voice actors of one anime
    Characters { id: u32 },
    /// Staff of one anime
    Staff { id: u32 },
    /// List genres available for filtering
    Genres,
    /// List producers and studios
    Producers,
    /// Pick a random anime
    Random {
        /// Draw from advanced search results instead of the whole catalog
        #[arg(long)]
        filtered: bool,

        #[command(flatten)]
        search: SearchArgs,
    },
}

#[derive(ClapArgs, Debug)]
struct GenreArgs {
    /// Genre ids to include (comma separated)
    #[arg(long = "genre", value_delimiter = ',')]
    include: Vec<u32>,

    /// Genre ids to exclude (comma separated)
    #[arg(long = "exclude-genre", value_delimiter = ',')]
    exclude: Vec<u32>,
}

impl GenreArgs {
    fn to_filter(&self, allow_nsfw: bool) -> GenreFilter {
        let mut filter = GenreFilter::new();
        for &id in &self.include {
            filter.set_state(id, GenreState::Include);
        }
        for &id in &self.exclude {
            filter.set_state(id, GenreState::Exclude);
        }
        filter.apply_content_policy(allow_nsfw);
        filter
    }
}

#[derive(ClapArgs, Debug)]
struct SearchArgs {
    #[command(flatten)]
    genres: GenreArgs,

    /// Page number
    #[arg(long, default_value_t = 1)]
    page: u32,

    /// Title search
    #[arg(short, long, default_value = "")]
    query: String,

    /// Sort field
    #[arg(long, default_value = "popularity")]
    order_by: String,

    /// Sort direction
    #[arg(long, default_value = "desc", value_parser = ["asc", "desc"])]
    sort: String,

    /// Airing status
    #[arg(long, value_parser = ["airing", "complete", "upcoming"])]
    status: Option<String>,

    /// Media type
    #[arg(long = "type", value_parser = ["tv", "movie", "ova", "special", "ona", "music"])]
    anime_type: Option<String>,

    /// Season
    #[arg(long)]
    season: Option<String>,

    /// Year the anime started airing
    #[arg(long)]
    year: Option<u32>,

    /// Minimum score (1-10)
    #[arg(long)]
    min_score: Option<f64>,

    /// Producer ids (comma separated)
    #[arg(long = "producer", value_delimiter = ',')]
    producers: Vec<u32>,

    /// Earliest start date (YYYY-MM-DD)
    #[arg(long)]
    start_date: Option<String>,

    /// Latest end date (YYYY-MM-DD)
    #[arg(long)]
    end_date: Option<String>,
}

impl SearchArgs {
    fn to_params(&self, allow_nsfw: bool) -> AdvancedSearchParams {
        let params = AdvancedSearchParams {
            page: self.page,
            query: self.query.clone(),
            order_by: self.order_by.clone(),
            sort: self.sort.clone(),
            status: self.status.clone(),
            anime_type: self.anime_type.clone(),
            season: self.season.clone(),
            year: self.year,
            min_score: self.min_score,
            producers: self.producers.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            ..AdvancedSearchParams::default()
        };
        self.genres
            .to_filter(allow_nsfw)
            .to_search_params(params, allow_nsfw)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Initialize logging
    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        shared::logging::parse_level(&config.logging.default_level)
    };

    shared::logging::init(LogConfig {
        log_dir: config.log_dir().to_string_lossy().to_string(),
        component: "anime-catalog".to_string(),
        default_level: log_level,
        console: config.logging.console,
        file: config.logging.file,
        json_format: config.logging.json_format,
    })?;

    info!(config_file = %args.config.display(), "Loaded configuration");

    // One client for the whole process: shared cache and rate budget
    let client = JikanClient::new(ClientSettings::from(&config.jikan))
        .context("Failed to create Jikan client")?;

    let filter = ContentFilter::new(args.nsfw, args.nsfw_authorized);

    if let Err(e) = run(&client, args.command, filter).await {
        error!(error = %e, "Catalog request failed");
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }

    let stats = client.cache().stats();
    debug!(
        cached_responses = stats.total_entries,
        fresh_responses = stats.fresh_entries,
        "Cache statistics"
    );

    Ok(())
}

async fn run(
    client: &JikanClient,
    command: Command,
    filter: ContentFilter,
) -> Result<(), CatalogError> {
    let allow_nsfw = filter.allows_nsfw();

    match command {
        Command::List {
            genres,
            page,
            query,
            order_by,
        } => {
            let listing = genres.to_filter(allow_nsfw).to_listing_query(
                ListingQuery {
                    page,
                    query,
                    order_by,
                    ..ListingQuery::default()
                },
                allow_nsfw,
            );
            print_anime_list(&client.fetch_animes(&listing, filter).await?);
        }
        Command::Trending => print_anime_list(&client.fetch_trending(filter).await?),
        Command::Upcoming => print_anime_list(&client.fetch_upcoming(filter).await?),
        Command::Search(search) => {
            let params = search.to_params(allow_nsfw);
            print_anime_list(&client.fetch_advanced_search(&params, filter).await?);
        }
        Command::Details { id } => print_details(&client.fetch_anime_details(id).await?.data),
        Command::Characters { id } => {
            for entry in client.fetch_anime_characters(id).await?.data {
                let voices: Vec<String> = entry
                    .voice_actors
                    .iter()
                    .map(|va| format!("{} ({})", va.person.name, va.language))
                    .collect();
                println!(
                    "{:<30} {:<10} {}",
                    entry.character.name,
                    entry.role,
                    voices.join(", ")
                );
            }
        }
        Command::Staff { id } => {
            for member in client.fetch_anime_staff(id).await?.data {
                println!("{:<30} {}", member.person.name, member.positions.join(", "));
            }
        }
        Command::Genres => {
            let genres = client.fetch_genres().await?;
            for genre in visible_genres(&genres.data, allow_nsfw) {
                println!("{:>4}  {:<25} {}", genre.mal_id, genre.name, genre.count);
            }
        }
        Command::Producers => {
            for producer in client.fetch_producers().await?.data {
                println!("{:>5}  {}", producer.mal_id, producer.name());
            }
        }
        Command::Random { filtered, search } => {
            let id = if filtered {
                let params = search.to_params(allow_nsfw);
                client.fetch_random_anime_with_filters(&params, filter).await?
            } else {
                client.fetch_random_anime(filter).await?
            };
            print_details(&client.fetch_anime_details(id).await?.data);
        }
    }

    Ok(())
}

fn format_score(score: Option<f64>) -> String {
    score.map_or_else(|| "N/A".to_string(), |s| format!("{:.2}", s))
}

fn print_anime_list(page: &AnimeListResponse) {
    if page.data.is_empty() {
        println!("No anime found.");
        return;
    }

    for anime in &page.data {
        println!(
            "{:>6}  {:<50}  {:>5}  {}",
            anime.mal_id,
            anime.display_title(),
            format_score(anime.score),
            anime.anime_type.as_deref().unwrap_or("-")
        );
    }

    if page.pagination.has_next_page {
        println!(
            "-- more results available (last page: {})",
            page.pagination.last_visible_page
        );
    }
}

fn print_details(anime: &Anime) {
    println!("{} [{}]", anime.display_title(), anime.mal_id);
    if let Some(japanese) = &anime.title_japanese {
        println!("  Japanese: {}", japanese);
    }
    println!(
        "  Type: {}  Episodes: {}  Status: {}",
        anime.anime_type.as_deref().unwrap_or("-"),
        anime
            .episodes
            .map_or_else(|| "?".to_string(), |e| e.to_string()),
        anime.status.as_deref().unwrap_or("-")
    );
    println!(
        "  Score: {}  Rank: {}  Popularity: {}",
        format_score(anime.score),
        anime.rank.map_or_else(|| "-".to_string(), |r| r.to_string()),
        anime
            .popularity
            .map_or_else(|| "-".to_string(), |p| p.to_string())
    );
    if let Some(aired) = anime.aired.as_ref().and_then(|a| a.string.as_deref()) {
        println!("  Aired: {}", aired);
    }
    if !anime.genres.is_empty() {
        println!("  Genres: {}", anime.genre_names().join(", "));
    }
    if !anime.studios.is_empty() {
        let studios: Vec<&str> = anime.studios.iter().map(|s| s.name.as_str()).collect();
        println!("  Studios: {}", studios.join(", "));
    }
    if let Some(synopsis) = &anime.synopsis {
        println!();
        println!("{}", synopsis);
    }
}
