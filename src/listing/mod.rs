//! Listing module for obtaining candidate URLs
//!
//! A listing is a (usually gzip-compressed) text snapshot with one
//! `<key>|<url>` entry per line. This module downloads it once, caches it on
//! disk, and extracts the URLs.

mod download;
mod extract;

pub use download::{download_listing, DownloadOutcome};
pub use extract::{extract_urls, parse_line, read_listing};

use crate::config::ListingConfig;
use reqwest::Client;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors that can occur while acquiring a listing
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("Failed to download {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Listing task failed: {0}")]
    Task(String),

    #[error("Listing acquisition cancelled")]
    Cancelled,
}

/// Where the candidate URLs of a run come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingSource {
    /// Download the configured snapshot unless it is cached
    Configured,
    /// Read a local listing file
    File(PathBuf),
    /// Seed nothing; only fetch what is already pending
    Skip,
}

/// Downloads the configured snapshot if it is not cached, then reads it
pub async fn acquire_listing(
    client: &Client,
    config: &ListingConfig,
    cancel: &CancellationToken,
) -> Result<Vec<String>, ListingError> {
    let cache_path = PathBuf::from(&config.cache_path);
    download_listing(client, &config.source_url, &cache_path, cancel).await?;
    load_listing(&cache_path, cancel).await
}

/// Reads a local listing file on a blocking thread
///
/// On cancellation the caller stops waiting; the blocking read is left to
/// finish on its own and its result is dropped.
pub async fn load_listing(
    path: &Path,
    cancel: &CancellationToken,
) -> Result<Vec<String>, ListingError> {
    let path = path.to_path_buf();
    let read = tokio::task::spawn_blocking(move || read_listing(&path));

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ListingError::Cancelled),
        joined = read => joined.map_err(|e| ListingError::Task(e.to_string()))?,
    }
}
