//! wait-time measurement for lock acquisitions
//!
//! provides a lock-free histogram and helpers that time blocking calls

pub mod histogram;
pub mod timer;

pub use histogram::Histogram;
pub use timer::{timed, TimerGuard};

use std::fmt;
use std::time::Duration;

/// wait statistics taken from a [`Histogram`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaitSummary {
    pub count: u64,
    pub min: Duration,
    pub max: Duration,
    pub mean: Duration,
    pub p50: Duration,
    pub p99: Duration,
}

impl fmt::Display for WaitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "count={} min={}μs mean={}μs p50={}μs p99={}μs max={}μs",
            self.count,
            self.min.as_micros(),
            self.mean.as_micros(),
            self.p50.as_micros(),
            self.p99.as_micros(),
            self.max.as_micros()
        )
    }
}
