//! Crawler module for seeding and fetching pages
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching with a per-call timeout
//! - Content digests
//! - Seeding candidate URLs into the frontier
//! - Bounded-concurrency fetch coordination

mod coordinator;
mod digest;
mod fetcher;
mod seeder;

pub use coordinator::{FetchCoordinator, FetchReport};
pub use digest::{sha256_hex, ContentHasher, Sha256Hasher};
pub use fetcher::{build_http_client, FetchError, HttpFetcher, PageFetcher};
pub use seeder::{SeedReport, Seeder};

use crate::config::{Config, PipelineConfig};
use crate::listing::{acquire_listing, load_listing, ListingSource};
use crate::storage::{open_store, SharedStore, StorageResult};
use tokio_util::sync::CancellationToken;

/// Outcome of a full harvest pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarvestSummary {
    pub seed: SeedReport,
    pub fetch: FetchReport,
}

/// Seeds `candidates` and then fetches everything pending
///
/// Seeding runs on a blocking thread, strictly before the fetch phase. The
/// returned error is only ever a failure to read the work set; per-URL
/// failures are reported in the summary.
///
/// # Arguments
///
/// * `store` - The shared frontier store
/// * `fetcher` - Fetch capability used for every page
/// * `candidates` - URLs from the listing, duplicates allowed
/// * `config` - Worker count and fetch timeout
/// * `cancel` - Stops seeding between candidates and the dispatch of new
///   fetches when cancelled
pub async fn harvest<F: PageFetcher>(
    store: SharedStore,
    fetcher: F,
    candidates: Vec<String>,
    config: &PipelineConfig,
    cancel: CancellationToken,
) -> StorageResult<HarvestSummary> {
    let seeder = Seeder::new(store.clone()).with_cancellation(cancel.clone());
    let seed = tokio::task::spawn_blocking(move || seeder.seed(&candidates))
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Seeding task did not finish: {}", e);
            SeedReport::default()
        });

    let coordinator = FetchCoordinator::new(store, fetcher, config).with_cancellation(cancel);
    let fetch = coordinator.run().await?;

    Ok(HarvestSummary { seed, fetch })
}

/// Runs one complete harvest from configuration
///
/// Opens (or creates) the store, obtains the listing, seeds it and fetches
/// every pending or stale page. A listing that cannot be obtained is logged
/// and the run continues with what the store already holds. Cancelling
/// `cancel` interrupts the listing download, seeding and fetch dispatch.
///
/// # Returns
///
/// * `Ok(HarvestSummary)` - All dispatched work finished
/// * `Err(HarvestError)` - The store or HTTP client could not be set up, or
///   the work set could not be read
///
/// # Example
///
/// ```no_run
/// use frontier_harvest::config::load_config;
/// use frontier_harvest::crawler::run_harvest;
/// use frontier_harvest::listing::ListingSource;
/// use std::path::Path;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let summary = run_harvest(&config, ListingSource::Configured, CancellationToken::new()).await?;
/// println!("{} pages fetched", summary.fetch.succeeded);
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(
    config: &Config,
    source: ListingSource,
    cancel: CancellationToken,
) -> crate::Result<HarvestSummary> {
    let pipeline = config.pipeline();
    let store = open_store(&pipeline.store_path)?;
    let client = build_http_client(&config.user_agent)?;

    let listing = match source {
        ListingSource::Skip => Ok(Vec::new()),
        ListingSource::File(path) => load_listing(&path, &cancel).await,
        ListingSource::Configured => acquire_listing(&client, &config.listing, &cancel).await,
    };

    let candidates = listing.unwrap_or_else(|e| {
        tracing::warn!("Could not obtain listing, fetching existing frontier only: {}", e);
        Vec::new()
    });

    let summary = harvest(store, HttpFetcher::new(client), candidates, &pipeline, cancel).await?;
    Ok(summary)
}
