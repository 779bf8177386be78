use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_STORE_PATH: &str = "data/wiki_pages.db";
pub const DEFAULT_WORKER_COUNT: usize = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SOURCE_URL: &str =
    "https://dumps.wikimedia.org/other/shorturls/shorturls-20250728.gz";
pub const DEFAULT_CACHE_PATH: &str = "data/dumps/shorturls-20250728.gz";

/// Main configuration structure for Frontier-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub listing: ListingConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// Frontier store location
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite database file
    #[serde(default = "default_store_path")]
    pub path: String,
}

/// Fetch pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Maximum number of fetches in flight
    #[serde(rename = "worker-count", default = "default_worker_count")]
    pub worker_count: usize,

    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Where the URL listing comes from
#[derive(Debug, Clone, Deserialize)]
pub struct ListingConfig {
    /// Remote snapshot to download when the cache file is missing
    #[serde(rename = "source-url", default = "default_source_url")]
    pub source_url: String,

    /// Local copy of the snapshot
    #[serde(rename = "cache-path", default = "default_cache_path")]
    pub cache_path: String,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the harvester
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

/// The options the seeder and coordinator are built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub store_path: PathBuf,
    pub worker_count: usize,
    pub fetch_timeout: Duration,
}

impl Config {
    /// Resolves the pipeline options from this configuration
    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            store_path: PathBuf::from(&self.store.path),
            worker_count: self.fetch.worker_count,
            fetch_timeout: Duration::from_secs(self.fetch.timeout_secs),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Config::default().pipeline()
    }
}

impl UserAgentConfig {
    /// Formats the user agent header: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!("{}/{} (+{})", self.crawler_name, self.crawler_version, contact),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            source_url: default_source_url(),
            cache_path: default_cache_path(),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: None,
        }
    }
}

fn default_store_path() -> String {
    DEFAULT_STORE_PATH.to_string()
}

fn default_worker_count() -> usize {
    DEFAULT_WORKER_COUNT
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_source_url() -> String {
    DEFAULT_SOURCE_URL.to_string()
}

fn default_cache_path() -> String {
    DEFAULT_CACHE_PATH.to_string()
}

fn default_crawler_name() -> String {
    "frontier-harvest".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
