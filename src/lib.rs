//! Frontier-Harvest: a resumable page harvester
//!
//! This crate keeps a durable frontier of URLs taken from a bulk listing,
//! fetches every pending page exactly once under a bounded worker pool, and
//! commits each result to a SQLite store so interrupted runs resume cleanly.

pub mod config;
pub mod crawler;
pub mod listing;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Frontier-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Listing error: {0}")]
    Listing(#[from] listing::ListingError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Frontier-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, PipelineConfig};
pub use crawler::{FetchCoordinator, Seeder};
pub use state::PageState;
pub use storage::{SharedStore, SqliteStorage};
