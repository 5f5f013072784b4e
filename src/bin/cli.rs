//! Harvester CLI
//!
//! Local execution entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use harvester::{
    config,
    error::{AppError, Result},
    models::{Config, Cursor, StorageBackend},
    pipeline,
    storage::{self, PostStore},
    utils::{TokioPause, http::HttpListingClient},
};

/// Harvester - forum text post archiver
#[derive(Parser, Debug)]
#[command(
    name = "harvester",
    version,
    about = "Archives text posts from a forum listing into a document store"
)]

struct Cli {
    /// Directory holding config.toml
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Path to config file (default: {storage_dir}/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch listing pages and store their text posts
    Run {
        /// Number of pages to fetch
        #[arg(long)]
        pages: Option<u32>,

        /// Seconds to pause after each page
        #[arg(long)]
        interval: Option<u64>,

        /// Storage backend (mongo or local)
        #[arg(long)]
        backend: Option<StorageBackend>,
    },

    /// Delete every stored post and recreate the unique index
    Reset {
        /// Confirm the destructive reset
        #[arg(long)]
        yes: bool,

        /// Storage backend (mongo or local)
        #[arg(long)]
        backend: Option<StorageBackend>,
    },

    /// Validate configuration
    Validate,

    /// Show effective configuration
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_remote() => {
            log::error!("Error fetching posts: {}. Closing application.", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            log::error!("{}. Closing application.", e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> Result<()> {
    let config_path = cli
        .config
        .unwrap_or_else(|| cli.storage_dir.join("config.toml"));
    let mut config = config::load_config(&config_path);

    log::info!("Loaded configuration from {}", config_path.display());

    match cli.command {
        Command::Run {
            pages,
            interval,
            backend,
        } => {
            if let Some(pages) = pages {
                config.run.pages = pages;
            }
            if let Some(interval) = interval {
                config.run.interval_secs = interval;
            }
            if let Some(backend) = backend {
                config.storage.backend = backend;
            }
            config.validate()?;

            let client = HttpListingClient::new(&config.listing)?;
            let store = storage::open(&config.storage).await?;

            let result =
                pipeline::run_harvest(&config, store.as_ref(), &client, &TokioPause).await;
            close_store(store.as_ref(), result).await?;
        }

        Command::Reset { yes, backend } => {
            if let Some(backend) = backend {
                config.storage.backend = backend;
            }
            if !yes {
                return Err(AppError::config(
                    "reset deletes every stored post; pass --yes to confirm",
                ));
            }
            config.validate()?;

            let store = storage::open(&config.storage).await?;
            let result = pipeline::run_reset(store.as_ref()).await;
            close_store(store.as_ref(), result).await?;
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
        }

        Command::Info => print_info(&config),
    }

    log::info!("Done!");

    Ok(())
}

/// Close `store`, keeping `result` as the outcome. A close failure is only logged.
async fn close_store<T>(store: &dyn PostStore, result: Result<T>) -> Result<T> {
    if let Err(e) = store.close().await {
        log::warn!("Closing {} failed: {}", store.describe(), e);
    }
    result
}

fn print_info(config: &Config) {
    log::info!("Listing: {}", config.listing.base_url);
    log::info!("User-Agent: {}", config.listing.user_agent);
    log::info!(
        "Pages: {} x {} items, {}s apart",
        config.run.pages,
        config.listing.page_size,
        config.run.interval_secs
    );
    log::info!(
        "Retry: {} attempts, {}s backoff",
        config.retry.max_attempts,
        config.retry.backoff_secs
    );
    match config.storage.backend {
        StorageBackend::Mongo => log::info!("Storage: {:?}", config.storage.mongo),
        StorageBackend::Local => log::info!("Storage: {}", config.storage.local.path.display()),
    }

    let first = harvester::services::page_url(&config.listing, &Cursor::start());
    match first {
        Ok(url) => log::info!("First page: {}", url),
        Err(e) => log::warn!("First page URL unavailable: {}", e),
    }
}
