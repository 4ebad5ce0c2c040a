//! Robly main entry point
//!
//! This is the command-line interface for the Robly depth-1 crawler.

use anyhow::Context;
use clap::Parser;
use robly::config::{load_config_with_hash, Config};
use robly::crawler::{run_crawl, validate_seed};
use robly::CrawlOutcome;
use robly::storage::open_storage;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Robly: crawl a page and the pages it links to
///
/// Robly fetches a seed page, extracts its metadata and links, follows every
/// eligible link one hop deep, and stores the resulting page records.
#[derive(Parser, Debug)]
#[command(name = "robly")]
#[command(version)]
#[command(about = "A depth-1 page-record crawler", long_about = None)]
struct Cli {
    /// Absolute http(s) URL to start from
    #[arg(value_name = "SEED_URL", required_unless_present = "stats")]
    seed: Option<String>,

    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and seed, show what would be used, and exit
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            (Config::default(), None)
        }
    };

    if cli.stats {
        return handle_stats(&config);
    }

    let seed = cli.seed.as_deref().unwrap_or_default();
    validate_seed(seed)?;

    if cli.dry_run {
        handle_dry_run(&config, seed);
        return Ok(());
    }

    handle_crawl(&config, config_hash, seed).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("robly=info,warn"),
            1 => EnvFilter::new("robly=debug,info"),
            2 => EnvFilter::new("robly=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective settings
fn handle_dry_run(config: &Config, seed: &str) {
    println!("=== Robly Dry Run ===\n");

    println!("Seed: {}", seed);

    println!("\nCrawler Configuration:");
    println!("  Follow delay: {}ms", config.crawler.follow_delay_ms);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Connect timeout: {}s", config.crawler.connect_timeout_secs);

    println!("\nRequest Headers ({}):", config.headers.len());
    for (name, value) in &config.headers {
        println!("  {}: {}", name, value);
    }

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let storage = open_storage(Path::new(&config.output.database_path))
        .with_context(|| format!("failed to open {}", config.output.database_path))?;

    println!("Database: {}\n", config.output.database_path);
    println!("Runs: {}", storage.count_runs()?);
    println!("Page records: {}", storage.count_pages()?);
    println!("Not indexable: {}", storage.count_non_indexable()?);

    if let Some(run) = storage.latest_run()? {
        println!("\nLatest run #{} ({})", run.id, run.saved_at);
        println!("  Seed: {}", run.seed_url.as_deref().unwrap_or("-"));
        println!("  Records: {}", run.record_count);
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: Option<String>, seed: &str) -> anyhow::Result<()> {
    let mut storage = open_storage(Path::new(&config.output.database_path))
        .with_context(|| format!("failed to open {}", config.output.database_path))?
        .with_seed(seed);
    if let Some(hash) = config_hash {
        storage = storage.with_config_hash(hash);
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current fetch");
            on_interrupt.cancel();
        }
    });

    match run_crawl(config, seed, &mut storage, cancel).await {
        Ok(outcome) => {
            let summary = crawl_summary(seed, &outcome);
            if outcome.report.cancelled || outcome.report.seed_failed {
                tracing::warn!("{}", summary);
            } else {
                tracing::info!("{}", summary);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// One-line description of how a run ended
///
/// An interrupted seed fetch also marks the seed as failed, so cancellation
/// is checked first.
fn crawl_summary(seed: &str, outcome: &CrawlOutcome) -> String {
    if outcome.report.cancelled {
        format!(
            "Crawl of {} cancelled: {} records stored",
            seed,
            outcome.records.len()
        )
    } else if outcome.report.seed_failed {
        format!("Seed {} could not be crawled; empty run stored", seed)
    } else {
        format!("Crawl completed: {} records stored", outcome.records.len())
    }
}
