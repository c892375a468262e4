//! nekome CLI application.
//!
//! Drives the search-and-add workflow from the command line: search the
//! remote catalogue, add series to the tracked library, list the library and
//! manage the analytics consent choice.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nekome::controller::SearchController;
use nekome::executor::MainLoop;
use nekome::results::{ResultsListener, ResultsView};
use nekome::strings::{self, MessageId};
use shared::consent::{ConsentStore, PRIVACY_POLICY_URL};
use shared::models::{SeriesModel, SeriesType};
use shared::{Config, Database, Library, SeriesStore};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;
use tracing::info;
use tracker_api::TrackerClient;

#[derive(Parser, Debug)]
#[command(name = "nekome")]
#[command(about = "Track anime and manga series", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search the catalogue for series
    Search {
        /// Free-text search query
        text: String,

        /// Kind of series to search for (anime or manga)
        #[arg(long, default_value = "anime")]
        kind: String,
    },

    /// Add a series to the tracked library
    Add {
        /// Remote id of the series
        id: i64,

        /// Kind of series (anime or manga)
        #[arg(long, default_value = "anime")]
        kind: String,

        /// Title to record if the service does not amend it
        #[arg(long)]
        title: Option<String>,
    },

    /// List the tracked library
    Library,

    /// Manage the analytics consent choice
    Consent {
        #[command(subcommand)]
        action: ConsentAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConsentAction {
    /// Opt in to analytics
    Enable,
    /// Opt out of analytics
    Disable,
    /// Show the current choice
    Status,
}

/// Row-interaction listener for the terminal: selections are only logged
struct CliListener;

impl ResultsListener for CliListener {
    fn on_series_selected(&self, series: &SeriesModel) {
        info!(id = series.id, title = %series.title, "Series selected");
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
        tracing::Level::INFO
    };

    shared::logging::init(shared::LogConfig {
        log_dir: config.log_dir().to_string_lossy().to_string(),
        component: "nekome".to_string(),
        default_level: log_level,
        console: true,
        file: true,
        json_format: false,
    })?;

    info!(config_file = %args.config.display(), "nekome starting");

    // Initialize data directory and database
    std::fs::create_dir_all(config.data_dir()).context("Failed to create data directory")?;
    let db_path = config.database_path();
    info!(db_path = %db_path.display(), "Opening database");

    match args.command {
        Command::Search { text, kind } => run_search(&config, text, &kind).await,
        Command::Add { id, kind, title } => run_add(&config, id, &kind, title).await,
        Command::Library => run_library(&config),
        Command::Consent { action } => run_consent(&config, action),
    }
}

fn open_library(config: &Config) -> Result<(Arc<TrackerClient>, Arc<Library>)> {
    let client = Arc::new(
        TrackerClient::new(
            config.service.base_url.clone(),
            config.service.rate_limit.requests_per_second,
            config.service.rate_limit.requests_per_minute,
        )
        .context("Failed to create service client")?,
    );

    let database = Database::open(config.database_path()).context("Failed to open database")?;
    let library = Arc::new(Library::new(SeriesStore::new(database), client.clone()));
    Ok((client, library))
}

fn parse_kind(kind: &str) -> Result<SeriesType> {
    kind.parse()
        .with_context(|| format!("Unknown series kind '{}', expected anime or manga", kind))
}

async fn run_search(config: &Config, text: String, kind: &str) -> Result<()> {
    let series_type = parse_kind(kind)?;
    let (client, library) = open_library(config)?;

    let mut main_loop = MainLoop::new();
    let mut controller = SearchController::new(
        client,
        Arc::clone(&library),
        Handle::current(),
        main_loop.dispatcher(),
    );

    let results: Arc<Mutex<Option<Vec<SeriesModel>>>> = Arc::new(Mutex::new(None));
    let _results_sub = {
        let results = Arc::clone(&results);
        controller.observe_results(move |items| {
            *results.lock().unwrap() = Some(items.clone());
        })
    };

    let error: Arc<Mutex<Option<MessageId>>> = Arc::new(Mutex::new(None));
    let error_sink = {
        let error = Arc::clone(&error);
        move |id: MessageId| {
            *error.lock().unwrap() = Some(id);
        }
    };

    controller.params().set_text(&text);
    controller.search_for_series(series_type, error_sink);

    if !controller.params().is_searching() {
        // Input was rejected before dispatch
        println!("Nothing to search for");
        return Ok(());
    }

    main_loop.run_one().await;

    if let Some(items) = results.lock().unwrap().take() {
        let mut view = ResultsView::new(CliListener);
        view.set_all_series(library.snapshot()?);
        for row in view.set_items(items) {
            let marker = if row.already_added { " [tracked]" } else { "" };
            let length = row
                .series
                .total_length
                .map(|n| n.to_string())
                .unwrap_or_else(|| "?".to_string());
            println!(
                "{:>8}  {} ({}, {} entries){}",
                row.series.id, row.series.title, row.series.series_type, length, marker
            );
        }
    }

    if let Some(id) = *error.lock().unwrap() {
        println!("{}", strings::resolve(id));
    }

    Ok(())
}

async fn run_add(config: &Config, id: i64, kind: &str, title: Option<String>) -> Result<()> {
    let series_type = parse_kind(kind)?;
    let (client, library) = open_library(config)?;

    let mut main_loop = MainLoop::new();
    let mut controller = SearchController::new(
        client,
        Arc::clone(&library),
        Handle::current(),
        main_loop.dispatcher(),
    );

    let series = SeriesModel::new(
        id,
        series_type,
        title.unwrap_or_else(|| format!("series-{}", id)),
    );

    let added: Arc<Mutex<Option<bool>>> = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&added);
    controller.add_new_series(series, move |ok| {
        *sink.lock().unwrap() = Some(ok);
    });

    main_loop.run_one().await;

    let outcome = added.lock().unwrap().take();
    match outcome {
        Some(true) => {
            println!("Added series {} to the library", id);
            Ok(())
        }
        _ => {
            println!("{}", strings::resolve(strings::MSG_ADD_FAILED));
            anyhow::bail!("add failed for series {}", id)
        }
    }
}

fn run_library(config: &Config) -> Result<()> {
    let (_client, library) = open_library(config)?;

    let snapshot = library.snapshot()?;
    if snapshot.is_empty() {
        println!("The library is empty");
        return Ok(());
    }

    for series in &snapshot {
        println!(
            "{:>8}  {}  [{} / {}]",
            series.id,
            series.title,
            series.progress,
            series
                .total_length
                .map(|n| n.to_string())
                .unwrap_or_else(|| "?".to_string())
        );
    }
    info!(count = snapshot.len(), "Listed library");
    Ok(())
}

fn run_consent(config: &Config, action: ConsentAction) -> Result<()> {
    let database = Database::open(config.database_path()).context("Failed to open database")?;
    let consent = ConsentStore::new(database);

    match action {
        ConsentAction::Enable => {
            consent.save_analytics_choice(true)?;
            println!("{}", strings::resolve(strings::MSG_ANALYTICS_ENABLED));
        }
        ConsentAction::Disable => {
            consent.save_analytics_choice(false)?;
            println!("{}", strings::resolve(strings::MSG_ANALYTICS_DISABLED));
        }
        ConsentAction::Status => match consent.analytics_enabled()? {
            Some(true) => println!("{}", strings::resolve(strings::MSG_ANALYTICS_ENABLED)),
            Some(false) => println!("{}", strings::resolve(strings::MSG_ANALYTICS_DISABLED)),
            None => println!(
                "No choice recorded yet; privacy policy: {}",
                PRIVACY_POLICY_URL
            ),
        },
    }

    Ok(())
}
