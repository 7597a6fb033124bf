//! reader and writer threads contending on one shared counter.
//!
//! readers check that the counter never goes backwards, writers increment it
//! with a read-modify-write that would lose updates without exclusion. the run
//! terminates and the final value equals the number of increments.

use std::thread;
use std::time::{Duration, Instant};

use shex_sync::SharedExclusive;
use shex_timing::{timed, Histogram, WaitSummary};

use crate::config::StressConfig;
use crate::error::{DemoError, Result};

/// outcome of [`run_stress`].
#[derive(Debug, Clone)]
pub struct StressReport {
    /// counter value after every thread joined.
    pub counter: u64,
    /// increments performed by writers.
    pub expected: u64,
    /// times a reader saw a smaller value than it saw before.
    pub regressions: u64,
    /// time readers blocked acquiring the lock.
    pub read_waits: WaitSummary,
    /// time writers blocked acquiring the lock.
    pub write_waits: WaitSummary,
    pub elapsed: Duration,
}

impl StressReport {
    pub fn is_consistent(&self) -> bool {
        self.counter == self.expected && self.regressions == 0
    }
}

/// spawn every reader and writer, join them and report.
pub fn run_stress(config: &StressConfig) -> Result<StressReport> {
    config.validate()?;

    let counter = SharedExclusive::new(0u64);
    let read_waits = Histogram::new();
    let write_waits = Histogram::new();
    let start = Instant::now();

    log::info!(
        "stress: {} reader(s) x {}, {} writer(s) x {}",
        config.readers,
        config.reader_cycles,
        config.writers,
        config.writer_cycles
    );

    let regressions = thread::scope(|s| -> Result<u64> {
        let mut writers = Vec::with_capacity(config.writers);
        for w in 0..config.writers {
            let name = format!("writer-{}", w);
            let handle = thread::Builder::new().name(name.clone()).spawn_scoped(s, || {
                for _ in 0..config.writer_cycles {
                    let mut value = timed(&write_waits, || counter.write());
                    let before = *value;
                    thread::yield_now();
                    *value = before + 1;
                }
            })?;
            writers.push((name, handle));
        }

        let mut readers = Vec::with_capacity(config.readers);
        for r in 0..config.readers {
            let name = format!("reader-{}", r);
            let handle = thread::Builder::new().name(name.clone()).spawn_scoped(s, || {
                let mut last = 0u64;
                let mut regressions = 0u64;
                for _ in 0..config.reader_cycles {
                    let value = *timed(&read_waits, || counter.read());
                    if value < last {
                        regressions += 1;
                    }
                    last = value;
                }
                regressions
            })?;
            readers.push((name, handle));
        }

        for (name, handle) in writers {
            handle.join().map_err(|_| DemoError::WorkerPanicked(name))?;
        }

        let mut regressions = 0u64;
        for (name, handle) in readers {
            regressions += handle.join().map_err(|_| DemoError::WorkerPanicked(name))?;
        }
        Ok(regressions)
    })?;

    let counter = counter.into_inner();
    let report = StressReport {
        counter,
        expected: config.expected_counter(),
        regressions,
        read_waits: read_waits.summary(),
        write_waits: write_waits.summary(),
        elapsed: start.elapsed(),
    };

    if !report.is_consistent() {
        log::error!(
            "stress: counter={} expected={} regressions={}",
            report.counter,
            report.expected,
            report.regressions
        );
    }

    Ok(report)
}
