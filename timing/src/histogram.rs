//! lock-free histogram of wait times.
//!
//! log2 buckets: bucket `i` holds samples in `[2^i, 2^(i+1))` nanoseconds,
//! bucket 0 also holds zero. any number of threads may record concurrently.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::WaitSummary;

/// covers 0ns up to ~584 years, far beyond any realistic wait
const NUM_BUCKETS: usize = 64;

/// histogram of how long threads blocked.
pub struct Histogram {
    buckets: [AtomicU64; NUM_BUCKETS],
    count: AtomicU64,
    sum_ns: AtomicU64,
    min_ns: AtomicU64,
    max_ns: AtomicU64,
}

impl Histogram {
    pub fn new() -> Self {
        Self {
            buckets: std::array::from_fn(|_| AtomicU64::new(0)),
            count: AtomicU64::new(0),
            sum_ns: AtomicU64::new(0),
            min_ns: AtomicU64::new(u64::MAX),
            max_ns: AtomicU64::new(0),
        }
    }

    /// record one wait.
    #[inline]
    pub fn record(&self, wait: Duration) {
        self.record_ns(u64::try_from(wait.as_nanos()).unwrap_or(u64::MAX));
    }

    /// record one wait given in nanoseconds.
    #[inline]
    pub fn record_ns(&self, ns: u64) {
        self.buckets[Self::bucket_of(ns)].fetch_add(1, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.sum_ns.fetch_add(ns, Ordering::Relaxed);
        self.min_ns.fetch_min(ns, Ordering::Relaxed);
        self.max_ns.fetch_max(ns, Ordering::Relaxed);
    }

    #[inline]
    fn bucket_of(ns: u64) -> usize {
        if ns == 0 {
            0
        } else {
            63 - ns.leading_zeros() as usize
        }
    }

    // largest value a bucket can hold
    #[inline]
    fn bucket_ceiling(bucket: usize) -> u64 {
        if bucket >= 63 {
            u64::MAX
        } else {
            (1u64 << (bucket + 1)) - 1
        }
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn min(&self) -> Duration {
        match self.min_ns.load(Ordering::Relaxed) {
            u64::MAX => Duration::ZERO,
            ns => Duration::from_nanos(ns),
        }
    }

    pub fn max(&self) -> Duration {
        Duration::from_nanos(self.max_ns.load(Ordering::Relaxed))
    }

    pub fn mean(&self) -> Duration {
        match self.count() {
            0 => Duration::ZERO,
            count => Duration::from_nanos(self.sum_ns.load(Ordering::Relaxed) / count),
        }
    }

    /// upper bound of the bucket holding the `p`-th percentile, clamped to [`max`](Self::max).
    ///
    /// `p` is in percent, `0.0..=100.0`.
    pub fn percentile(&self, p: f64) -> Duration {
        let count = self.count();
        if count == 0 {
            return Duration::ZERO;
        }

        let target = ((count as f64 * p.clamp(0.0, 100.0) / 100.0).ceil() as u64).max(1);
        let mut cumulative = 0u64;
        for (i, bucket) in self.buckets.iter().enumerate() {
            cumulative += bucket.load(Ordering::Relaxed);
            if cumulative >= target {
                let ceiling = Self::bucket_ceiling(i).min(self.max_ns.load(Ordering::Relaxed));
                return Duration::from_nanos(ceiling);
            }
        }

        self.max()
    }

    /// count, extremes, mean and common percentiles in one value.
    pub fn summary(&self) -> WaitSummary {
        WaitSummary {
            count: self.count(),
            min: self.min(),
            max: self.max(),
            mean: self.mean(),
            p50: self.percentile(50.0),
            p99: self.percentile(99.0),
        }
    }

    /// forget every sample.
    pub fn clear(&self) {
        for bucket in &self.buckets {
            bucket.store(0, Ordering::Relaxed);
        }
        self.count.store(0, Ordering::Relaxed);
        self.sum_ns.store(0, Ordering::Relaxed);
        self.min_ns.store(u64::MAX, Ordering::Relaxed);
        self.max_ns.store(0, Ordering::Relaxed);
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Histogram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Histogram")
            .field("summary", &self.summary())
            .finish()
    }
}
