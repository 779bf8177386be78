//! Progress lines emitted by the seeding and fetch phases

use std::fmt;

/// One progress tick: `[<completed>/<total>] <label>: <count>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub label: &'static str,
    pub completed: usize,
    pub total: usize,
    pub count: usize,
}

impl Progress {
    pub fn new(label: &'static str, completed: usize, total: usize, count: usize) -> Self {
        Self {
            label,
            completed,
            total,
            count,
        }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}/{}] {}: {}",
            self.completed, self.total, self.label, self.count
        )
    }
}

/// Default progress sink: one info-level log line per tick
pub fn log_progress(progress: &Progress) {
    tracing::info!("{}", progress);
}
