//! Statistics generation from the frontier database
//!
//! This module provides functionality for extracting and displaying
//! frontier statistics from the storage layer.

use crate::state::PageStatus;
use crate::storage::{SharedStore, StorageResult};

/// Frontier statistics summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontierStatistics {
    /// Total number of known URLs
    pub total_pages: u64,

    /// URLs still waiting for their first successful fetch
    pub pending_pages: u64,

    /// URLs with committed content
    pub fetched_pages: u64,

    /// Fetched URLs flagged for re-fetch
    pub stale_pages: u64,
}

impl FrontierStatistics {
    /// Share of known URLs that have content, in percent
    pub fn fetched_percentage(&self) -> f64 {
        if self.total_pages > 0 {
            (self.fetched_pages as f64 / self.total_pages as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Loads statistics from storage
pub fn load_statistics(store: &SharedStore) -> StorageResult<FrontierStatistics> {
    Ok(FrontierStatistics {
        total_pages: store.count_total_pages()?,
        pending_pages: store.count_pages_by_state(PageStatus::Pending)?,
        fetched_pages: store.count_pages_by_state(PageStatus::Fetched)?,
        stale_pages: store.count_stale_pages()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &FrontierStatistics) {
    println!("=== Frontier Statistics ===\n");

    println!("Overview:");
    println!("  Known URLs: {}", stats.total_pages);
    println!("  Pending: {}", stats.pending_pages);
    println!("  Fetched: {}", stats.fetched_pages);
    println!("  Marked stale: {}", stats.stale_pages);
    println!();

    println!(
        "Fetched: {:.1}% ({} / {} URLs)",
        stats.fetched_percentage(),
        stats.fetched_pages,
        stats.total_pages
    );
}
