//! Snapshot download with a local cache
//!
//! The body is streamed to `<dest>.part` and renamed into place once
//! complete, so an interrupted download is never mistaken for a cached one.

use crate::listing::ListingError;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

/// What [`download_listing`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The destination already existed; nothing was requested
    Cached,
    /// The snapshot was fetched and written
    Downloaded { bytes: u64 },
}

/// Downloads `url` to `dest` unless `dest` already exists
///
/// Cancelling `cancel` aborts the transfer and removes the partial file.
pub async fn download_listing(
    client: &Client,
    url: &str,
    dest: &Path,
    cancel: &CancellationToken,
) -> Result<DownloadOutcome, ListingError> {
    if tokio::fs::try_exists(dest).await? {
        tracing::info!("Listing already cached: {}", dest.display());
        return Ok(DownloadOutcome::Cached);
    }

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    tracing::info!("Downloading listing: {}", url);

    let partial = partial_path(dest);
    let bytes = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::info!("Listing download cancelled: {}", url);
            if let Err(e) = tokio::fs::remove_file(&partial).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Could not remove {}: {}", partial.display(), e);
                }
            }
            return Err(ListingError::Cancelled);
        }
        written = transfer(client, url, &partial) => written?,
    };

    tokio::fs::rename(&partial, dest).await?;
    tracing::info!("Downloaded {} bytes to {}", bytes, dest.display());

    Ok(DownloadOutcome::Downloaded { bytes })
}

/// Streams the response body of `url` into `partial`
async fn transfer(client: &Client, url: &str, partial: &Path) -> Result<u64, ListingError> {
    let download_err = |source| ListingError::Download {
        url: url.to_string(),
        source,
    };

    let mut response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(download_err)?;

    let mut file = tokio::fs::File::create(partial).await?;
    let mut bytes = 0u64;

    while let Some(chunk) = response.chunk().await.map_err(download_err)? {
        file.write_all(&chunk).await?;
        bytes += chunk.len() as u64;
    }

    file.flush().await?;
    file.sync_all().await?;

    Ok(bytes)
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
