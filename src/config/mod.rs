//! Configuration module for Frontier-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; omitted keys fall back to built-in defaults.
//!
//! # Example
//!
//! ```no_run
//! use frontier_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Workers: {}", config.fetch.worker_count);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, FetchConfig, ListingConfig, PipelineConfig, StoreConfig, UserAgentConfig,
    DEFAULT_TIMEOUT_SECS, DEFAULT_WORKER_COUNT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
