//! Frontier-Harvest main entry point
//!
//! This is the command-line interface for the Frontier-Harvest page harvester.

use anyhow::Context;
use clap::Parser;
use frontier_harvest::config::{load_config_with_hash, Config};
use frontier_harvest::crawler::run_harvest;
use frontier_harvest::listing::ListingSource;
use frontier_harvest::output::{load_statistics, print_statistics};
use frontier_harvest::storage::{open_store, SharedStore};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Frontier-Harvest: a resumable page harvester
///
/// Seeds URLs from a bulk listing into a SQLite frontier and fetches every
/// pending page once, with a bounded number of concurrent requests. Failed
/// pages stay pending and are retried by the next run.
#[derive(Parser, Debug)]
#[command(name = "frontier-harvest")]
#[command(version)]
#[command(about = "A resumable page harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Read candidate URLs from this local file instead of the configured snapshot
    #[arg(long, value_name = "FILE", conflicts_with = "skip_seed")]
    listing: Option<PathBuf>,

    /// Override the number of concurrent fetches
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..=100))]
    workers: Option<u16>,

    /// Skip the listing and seeding; only fetch what is already pending
    #[arg(long)]
    skip_seed: bool,

    /// Show the resolved configuration without touching the store
    #[arg(long, conflicts_with_all = ["stats", "mark_stale"])]
    dry_run: bool,

    /// Show statistics from the store and exit
    #[arg(long, conflicts_with_all = ["dry_run", "mark_stale"])]
    stats: bool,

    /// Flag fetched URLs for re-fetch on the next run and exit
    #[arg(long, value_name = "URL", num_args = 1.., conflicts_with_all = ["dry_run", "stats"])]
    mark_stale: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(workers) = cli.workers {
        config.fetch.worker_count = usize::from(workers);
    }

    if cli.dry_run {
        handle_dry_run(&config, &cli);
        return Ok(());
    }

    if cli.stats || !cli.mark_stale.is_empty() {
        let store_path = config.pipeline().store_path;
        let store = open_store(&store_path)
            .with_context(|| format!("failed to initialize store at {}", store_path.display()))?;

        if cli.stats {
            handle_stats(&store)?;
        } else {
            handle_mark_stale(&store, &cli.mark_stale);
        }
        return Ok(());
    }

    handle_run(&config, &cli).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("frontier_harvest=info,warn"),
            1 => EnvFilter::new("frontier_harvest=debug,info"),
            2 => EnvFilter::new("frontier_harvest=trace,debug"),
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

/// Handles the --dry-run mode: prints what a run would use
fn handle_dry_run(config: &Config, cli: &Cli) {
    let pipeline = config.pipeline();

    println!("=== Frontier-Harvest Dry Run ===\n");

    println!("Store:");
    println!("  Path: {}", pipeline.store_path.display());

    println!("\nFetch:");
    println!("  Workers: {}", pipeline.worker_count);
    println!("  Timeout: {}s", pipeline.fetch_timeout.as_secs());
    println!("  User agent: {}", config.user_agent.header_value());

    println!("\nListing:");
    if cli.skip_seed {
        println!("  Skipped (fetch only)");
    } else if let Some(path) = &cli.listing {
        println!("  Local file: {}", path.display());
    } else {
        println!("  Source: {}", config.listing.source_url);
        println!("  Cache: {}", config.listing.cache_path);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the store
fn handle_stats(store: &SharedStore) -> anyhow::Result<()> {
    let stats = load_statistics(store).context("failed to read statistics")?;
    print_statistics(&stats);
    Ok(())
}

/// Handles the --mark-stale mode
fn handle_mark_stale(store: &SharedStore, urls: &[String]) {
    for url in urls {
        match store.mark_stale(url) {
            Ok(true) => println!("✓ Marked stale: {}", url),
            Ok(false) => println!("- Not fetched yet or unknown: {}", url),
            Err(e) => tracing::error!("Failed to mark {} stale: {}", url, e),
        }
    }
}

/// Handles the main harvest: listing, seeding, fetching
async fn handle_run(config: &Config, cli: &Cli) -> anyhow::Result<()> {
    let source = if cli.skip_seed {
        ListingSource::Skip
    } else if let Some(path) = &cli.listing {
        ListingSource::File(path.clone())
    } else {
        ListingSource::Configured
    };

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        tracing::warn!("Interrupt received, stopping; press Ctrl-C again to quit immediately");
        signal_token.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::error!("Second interrupt, exiting without waiting for in-flight fetches");
            std::process::exit(130);
        }
    });

    let summary = run_harvest(config, source, cancel)
        .await
        .context("harvest failed")?;

    tracing::info!(
        "Done: {} new URLs seeded, {}/{} pages fetched{}",
        summary.seed.inserted,
        summary.fetch.succeeded,
        summary.fetch.total,
        if summary.seed.cancelled || summary.fetch.cancelled {
            " (interrupted, rerun to resume)"
        } else {
            ""
        }
    );

    Ok(())
}
