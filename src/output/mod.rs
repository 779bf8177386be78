//! Output module for progress reporting and statistics

mod progress;
mod stats;

pub use progress::{log_progress, Progress};
pub use stats::{load_statistics, print_statistics, FrontierStatistics};
