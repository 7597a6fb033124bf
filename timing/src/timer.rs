//! measuring how long a call blocked.

use std::time::Instant;

use crate::Histogram;

/// run `acquire`, record how long it took, and return its result.
///
/// meant for blocking acquisitions: the returned guard is handed back to the
/// caller, so the critical section that follows is not part of the sample.
///
/// ```
/// use shex_timing::{timed, Histogram};
/// use std::sync::Mutex;
///
/// let waits = Histogram::new();
/// let mutex = Mutex::new(0);
///
/// let mut guard = timed(&waits, || mutex.lock().unwrap());
/// *guard += 1;
/// assert_eq!(waits.count(), 1);
/// ```
#[inline]
pub fn timed<F, R>(histogram: &Histogram, acquire: F) -> R
where
    F: FnOnce() -> R,
{
    let start = Instant::now();
    let result = acquire();
    histogram.record(start.elapsed());
    result
}

/// records the time from construction to drop.
pub struct TimerGuard<'a> {
    start: Instant,
    histogram: &'a Histogram,
}

impl<'a> TimerGuard<'a> {
    #[inline]
    pub fn new(histogram: &'a Histogram) -> Self {
        Self {
            start: Instant::now(),
            histogram,
        }
    }
}

impl Drop for TimerGuard<'_> {
    #[inline]
    fn drop(&mut self) {
        self.histogram.record(self.start.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_timed_returns_result() {
        let hist = Histogram::new();
        let value = timed(&hist, || 41 + 1);
        assert_eq!(value, 42);
        assert_eq!(hist.count(), 1);
    }

    #[test]
    fn test_timed_measures_blocking() {
        let hist = Histogram::new();
        timed(&hist, || thread::sleep(Duration::from_millis(5)));
        assert!(hist.max() >= Duration::from_millis(5));
    }

    #[test]
    fn test_timer_guard() {
        let hist = Histogram::new();
        {
            let _timer = TimerGuard::new(&hist);
            thread::sleep(Duration::from_millis(2));
        }
        assert_eq!(hist.count(), 1);
        assert!(hist.min() >= Duration::from_millis(2));
    }
}
