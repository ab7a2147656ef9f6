mod picker;

use anyhow::{bail, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::fs::{self, OpenOptions};
use tracing_subscriber::{prelude::*, EnvFilter};

use phoenix_core::{
    config, AppConfig, ArtworkCache, FetchMode, FetchOutcome, GameLibrary, GameRecord, IgdbClient,
    MetadataFetcher, Platform, Status,
};

use picker::StdinPicker;

/// Catalog locally-installed games and reconcile their metadata with IGDB.
#[derive(Parser)]
#[command(name = "phoenix", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the collection.
    List {
        /// Include hidden games.
        #[arg(long)]
        hidden: bool,
    },
    /// Add a game to the collection, fetching metadata unless told not to.
    Add {
        /// Unique name of the game.
        name: String,
        /// Shell command used to launch the game.
        #[arg(long, default_value = "")]
        launcher: String,
        /// Platform the game runs on.
        #[arg(long)]
        platform: Option<Platform>,
        /// Current play status.
        #[arg(long)]
        status: Option<Status>,
        /// Skip the metadata fetch after adding.
        #[arg(long)]
        no_fetch: bool,
    },
    /// Re-run the metadata pipeline for a game.
    Fetch {
        /// Name of the game to fetch metadata for.
        name: String,
        /// Pick the matching catalog entry interactively instead of
        /// auto-picking the earliest-registered one.
        #[arg(long)]
        choose: bool,
        /// Insert a new record when the name is not in the collection.
        #[arg(long)]
        upsert: bool,
    },
    /// Stamp a game as played just now.
    Played {
        /// Name of the game.
        name: String,
    },
    /// Hide a game from listings without deleting it.
    Hide {
        /// Name of the game.
        name: String,
        /// Un-hide instead.
        #[arg(long)]
        undo: bool,
    },
    /// Mark a game as a favorite.
    Favorite {
        /// Name of the game.
        name: String,
        /// Un-favorite instead.
        #[arg(long)]
        undo: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    let cli = Cli::parse();

    let library = GameLibrary::open(&config.library_path)?;
    tracing::debug!("library loaded from {}", config.library_path.display());

    match cli.command {
        Command::List { hidden } => {
            let games = if hidden { library.all() } else { library.visible() };
            if games.is_empty() {
                println!("No games in the library yet.");
                return Ok(());
            }
            for game in games {
                let star = if game.is_favorite { "*" } else { " " };
                let hidden_tag = if game.is_hidden { " (hidden)" } else { "" };
                println!(
                    "{star} {:<30} {:<10} {:<12} last played: {}{hidden_tag}",
                    game.name, game.platform, game.status, game.recency
                );
            }
        }
        Command::Add {
            name,
            launcher,
            platform,
            status,
            no_fetch,
        } => {
            let mut record = GameRecord::new(&name);
            record.launcher = launcher;
            if let Some(platform) = platform {
                record.platform = platform;
            }
            if let Some(status) = status {
                record.status = status;
            }
            library.add(record)?;
            println!("Added {name}.");

            if !no_fetch {
                let outcome = fetcher(&config)?
                    .fetch_auto(&library, &name, FetchMode::UpdateOnly)
                    .await?;
                report(&name, outcome);
            }
        }
        Command::Fetch {
            name,
            choose,
            upsert,
        } => {
            let mode = if upsert {
                FetchMode::Upsert
            } else {
                FetchMode::UpdateOnly
            };
            let fetcher = fetcher(&config)?;
            let outcome = if choose {
                fetcher
                    .fetch_with_choice(&library, &name, mode, &StdinPicker)
                    .await?
            } else {
                fetcher.fetch_auto(&library, &name, mode).await?
            };
            report(&name, outcome);
        }
        Command::Played { name } => {
            library.record_played(&name, Utc::now())?;
            println!("Recorded a play of {name}.");
        }
        Command::Hide { name, undo } => {
            library.set_hidden(&name, !undo)?;
            println!("{} {name}.", if undo { "Unhid" } else { "Hid" });
        }
        Command::Favorite { name, undo } => {
            library.set_favorite(&name, !undo)?;
            println!(
                "{} {name}.",
                if undo {
                    "Removed favorite"
                } else {
                    "Favorited"
                }
            );
        }
    }

    Ok(())
}

fn fetcher(config: &AppConfig) -> Result<MetadataFetcher> {
    if !config.igdb.is_complete() {
        bail!(
            "IGDB credentials missing; set igdb.client_id and igdb.access_token in {}",
            AppConfig::config_path().display()
        );
    }
    let client = IgdbClient::new(config.igdb.clone())?;
    Ok(MetadataFetcher::new(
        client,
        ArtworkCache::new(&config.cache_dir),
    ))
}

fn report(name: &str, outcome: FetchOutcome) {
    match outcome {
        FetchOutcome::Merged { header_image } => {
            if header_image {
                println!("Updated {name} (header image cached).");
            } else {
                println!("Updated {name}.");
            }
        }
        FetchOutcome::NoMatches => println!("No catalog matches for {name}."),
        FetchOutcome::Aborted => println!("Fetch aborted; {name} unchanged."),
    }
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("phoenix.log");

    let env_filter = EnvFilter::from_default_env();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .compact()
        .with_writer(move || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    Ok(())
}
