//! NIST harvester CLI
//!
//! Local execution entry point.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use harvester::{
    error::Result,
    fetch,
    models::{Config, FetchStrategy, Topic},
    pipeline,
    storage::{DocumentStorage, LocalStorage},
};

/// nist-harvester - NIST news and publications harvester
#[derive(Parser, Debug)]
#[command(
    name = "nist-harvester",
    version,
    about = "Harvests NIST news and publication records"
)]
struct Cli {
    /// Path to storage directory containing config and output files
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Config file (default: {storage_dir}/config.toml)
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
    /// Harvest documents and store them
    Harvest {
        /// Output directory (default: {storage_dir})
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Stop after this many documents
        #[arg(long)]
        max: Option<usize>,

        /// Stop at the newest document of the previous harvest
        #[arg(long)]
        incremental: bool,

        /// Stop at the document stored in this JSON file
        #[arg(long, conflicts_with = "incremental")]
        last_document: Option<PathBuf>,

        /// Override the fetch strategy
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,

        /// Override the configured topics (repeatable)
        #[arg(long = "topic")]
        topics: Vec<String>,
    },

    /// Validate configuration
    Validate,

    /// Show stored harvest info
    Info,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    Http,
    Browser,
}

impl From<StrategyArg> for FetchStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Http => FetchStrategy::Http,
            StrategyArg::Browser => FetchStrategy::Browser,
        }
    }
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
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.storage_dir.join("config.toml"));

    match cli.command {
        Command::Harvest {
            output,
            max,
            incremental,
            last_document,
            strategy,
            topics,
        } => {
            let mut config = Config::load_or_default(&config_path)?;
            log::info!("Loaded configuration from {}", config_path.display());

            if max.is_some() {
                config.harvest.max_document_count = max;
            }
            if let Some(strategy) = strategy {
                config.crawler.strategy = strategy.into();
            }
            if !topics.is_empty() {
                config.source.topics = topics.into_iter().map(Topic::from).collect();
            }

            let storage = LocalStorage::new(output.unwrap_or_else(|| cli.storage_dir.clone()));
            let boundary = match last_document {
                Some(path) => Some(LocalStorage::read_document(&path).await?),
                None if incremental => storage.load_boundary().await?,
                None => None,
            };

            let fetcher = fetch::create_fetcher(&config.crawler).await?;
            pipeline::run_harvest(config, &storage, fetcher, boundary).await?;

            log::info!("Harvest complete!");
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            let config = Config::load(&config_path)?;
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!(
                "✓ Config OK ({}, {} topics)",
                config.source.start_url,
                config.source.topics.len()
            );
        }

        Command::Info => {
            let storage = LocalStorage::new(&cli.storage_dir);
            log::info!("Storage directory: {}", storage.root_dir().display());

            match storage.load_snapshot().await? {
                Some(snapshot) => {
                    log::info!("Last harvest: {}", snapshot.harvested_at);
                    log::info!("Documents: {}", snapshot.count);
                    if let Some(newest) = snapshot.documents.first() {
                        log::info!("Boundary: {} ({})", newest.title(), newest.web_link());
                    }
                }
                None => log::info!("No harvest found yet."),
            }
        }
    }

    Ok(())
}
