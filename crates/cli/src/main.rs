mod metrics;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tvshelf_core::{
    load_config_or_default, validate_config, CatalogStore, Config, LazyDisclosure, LoadOutcome,
    SearchOutcome, Show, ShowType, TvmazeClient,
};

#[derive(Parser, Debug)]
#[command(name = "tvshelf", version, about = "Browse the TVmaze show catalog")]
struct Cli {
    /// Configuration file; built-in defaults are used when it does not exist
    #[arg(long, env = "TVSHELF_CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Print Prometheus metrics to stderr after the command
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the genres present in the loaded catalog
    Genres {
        /// Index pages to load (defaults to the configured pages)
        #[arg(long, value_delimiter = ',')]
        pages: Option<Vec<u32>>,
    },
    /// Show the catalog grouped by genre, filtered
    Browse {
        /// Only include shows in this genre (repeatable)
        #[arg(long = "genre")]
        genres: Vec<String>,
        /// Minimum average rating
        #[arg(long, default_value_t = 0.0)]
        min_rating: f64,
        /// Show type: all, movie or tv
        #[arg(long = "type", default_value = "all")]
        kind: ShowType,
        /// Index pages to load (defaults to the configured pages)
        #[arg(long, value_delimiter = ',')]
        pages: Option<Vec<u32>>,
        /// Extra reveals per genre row beyond the initial window
        #[arg(long, default_value_t = 0)]
        expand: usize,
    },
    /// Search shows by name
    Search { query: String },
    /// Show details and banner for one show
    Show { id: u64 },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,tvshelf_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let registry = if cli.metrics {
        Some(metrics::registry()?)
    } else {
        None
    };

    info!("Loading configuration from {:?}", cli.config);
    let config = load_config_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    validate_config(&config).context("Configuration validation failed")?;

    let client = TvmazeClient::new(config.api.clone()).context("Failed to create TVmaze client")?;
    info!("Using TVmaze API at {}", client.base_url());

    let store = CatalogStore::new(client).with_default_pages(config.catalog.pages.clone());

    let result = execute(cli.command, &store, &config, cli.json).await;

    if let Some(registry) = registry {
        eprint!("{}", metrics::encode(&registry)?);
    }

    result
}

async fn execute(
    command: Command,
    store: &CatalogStore<TvmazeClient>,
    config: &Config,
    json: bool,
) -> Result<()> {
    match command {
        Command::Genres { pages } => {
            load(store, pages.as_deref()).await?;
            let genres = store.available_genres();
            if json {
                println!("{}", serde_json::to_string_pretty(&genres)?);
            } else {
                for genre in genres {
                    println!("{}", genre);
                }
            }
        }
        Command::Browse {
            genres,
            min_rating,
            kind,
            pages,
            expand,
        } => {
            load(store, pages.as_deref()).await?;
            store.set_selected_genres(genres);
            store.set_min_rating(min_rating);
            store.set_selected_type(kind);
            browse(store, config, expand, json).await?;
        }
        Command::Search { query } => match store.search_shows(&query).await {
            SearchOutcome::Completed { .. } | SearchOutcome::Cleared => {
                let results = store.search_results();
                if json {
                    println!("{}", serde_json::to_string_pretty(&plain(&results))?);
                } else if results.is_empty() {
                    println!("No shows match \"{}\"", query.trim());
                } else {
                    for show in &results {
                        println!("{}", render::show_line(show));
                    }
                }
            }
            SearchOutcome::Failed | SearchOutcome::Skipped => bail!(store_error(store)),
        },
        Command::Show { id } => {
            let Some(show) = store.get_show_by_id(id).await else {
                bail!(store_error(store));
            };
            let images = store.get_show_banner(id).await;
            if images.is_none() {
                // The details are still worth printing without artwork.
                error!("{}", store_error(store));
            }
            let banner = store.show_banner();

            if json {
                let value = serde_json::json!({
                    "show": show.as_ref(),
                    "banner": banner,
                    "images": images.unwrap_or_default(),
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                print!("{}", render::show_details(&show, banner.as_ref()));
            }
        }
    }

    Ok(())
}

async fn load(store: &CatalogStore<TvmazeClient>, pages: Option<&[u32]>) -> Result<()> {
    let outcome = match pages {
        Some(pages) => store.load_shows_catalog(pages).await,
        None => store.load_default_catalog().await,
    };
    match outcome {
        LoadOutcome::Loaded { shows } => {
            info!("Loaded {} shows", shows);
            Ok(())
        }
        LoadOutcome::Failed | LoadOutcome::Skipped => bail!(store_error(store)),
    }
}

async fn browse(
    store: &CatalogStore<TvmazeClient>,
    config: &Config,
    expand: usize,
    json: bool,
) -> Result<()> {
    let filtered = store.filtered_shows();
    if json {
        println!("{}", serde_json::to_string_pretty(&plain(&filtered))?);
        return Ok(());
    }

    if store.has_active_filters() {
        println!("{} shows match the current filters", filtered.len());
    }

    // Rows follow the unfiltered genre sections; each row is narrowed to the
    // filtered set and gets its own disclosure window.
    let keep: std::collections::HashSet<u64> = filtered.iter().map(|s| s.id).collect();
    for section in store.shows_by_genre() {
        let shows: Vec<Arc<Show>> = section
            .shows
            .into_iter()
            .filter(|s| keep.contains(&s.id))
            .collect();
        if shows.is_empty() {
            continue;
        }

        let row = LazyDisclosure::new(shows, config.disclosure.clone());
        for _ in 0..expand {
            if !row.load_more().await {
                break;
            }
        }
        print!("{}", render::genre_row(&section.genre, &row));
    }

    Ok(())
}

fn plain(shows: &[Arc<Show>]) -> Vec<&Show> {
    shows.iter().map(Arc::as_ref).collect()
}

fn store_error<R: tvshelf_core::ShowRepository>(store: &CatalogStore<R>) -> String {
    store
        .error()
        .unwrap_or_else(|| "Another operation is already in progress".to_string())
}
