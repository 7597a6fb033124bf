//! one writer filling a people database while one reader looks a record up.
//!
//! every lookup either finds the complete record or reports that the id does
//! not exist yet. anything else means a reader saw a half-written insertion.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use shex_store::{PeopleDb, Person, RecordId, StoreError};
use shex_timing::{timed, Histogram, TimerGuard, WaitSummary};

use crate::config::PeopleConfig;
use crate::error::{DemoError, Result};

/// outcome of [`run_people`].
#[derive(Debug, Clone)]
pub struct PeopleReport {
    /// persons the writer added.
    pub inserted: usize,
    /// lookups that returned the expected record.
    pub found: usize,
    /// lookups that ran before the record existed.
    pub not_found: usize,
    /// lookups that returned anything else, plus inserted ids that read back
    /// wrong once both threads finished.
    pub corrupted: usize,
    /// size of the database after both threads finished.
    pub final_len: usize,
    /// time spent per insertion, lock wait included.
    pub insert_latency: WaitSummary,
    /// time spent per lookup, lock wait included.
    pub lookup_latency: WaitSummary,
    pub elapsed: Duration,
}

impl PeopleReport {
    /// every lookup accounted for, none corrupted, and every insertion kept.
    pub fn is_consistent(&self) -> bool {
        self.corrupted == 0 && self.found + self.not_found > 0 && self.final_len == self.inserted
    }
}

#[derive(Debug, Default)]
struct LookupTally {
    found: usize,
    not_found: usize,
    corrupted: usize,
}

/// run the writer and the reader against one database and join both.
pub fn run_people(config: &PeopleConfig) -> Result<PeopleReport> {
    config.validate()?;

    let db = Arc::new(PeopleDb::new().with_contention_yield(config.yield_in_critical));
    let insert_latency = Arc::new(Histogram::new());
    let lookup_latency = Arc::new(Histogram::new());
    let start = Instant::now();

    log::info!(
        "people: {} write(s), {} lookup(s) of id {}",
        config.writes,
        config.lookups,
        config.lookup_id
    );

    let writer = {
        let db = Arc::clone(&db);
        let latency = Arc::clone(&insert_latency);
        let writes = config.writes;
        let name = config.name.clone();
        thread::Builder::new()
            .name("writer".into())
            .spawn(move || {
                for i in 0..writes {
                    let _timer = TimerGuard::new(&latency);
                    db.add_person(Person::new(name.clone(), i.to_string()));
                }
                writes
            })?
    };

    let reader = {
        let db = Arc::clone(&db);
        let latency = Arc::clone(&lookup_latency);
        let lookups = config.lookups;
        let id = RecordId(config.lookup_id);
        let expected = Person::new(config.name.clone(), config.lookup_id.to_string());
        thread::Builder::new()
            .name("reader".into())
            .spawn(move || {
                let mut tally = LookupTally::default();
                for _ in 0..lookups {
                    match timed(&latency, || db.person_by_id(id)) {
                        Ok(person) if person == expected => tally.found += 1,
                        Err(StoreError::InvalidId(_)) => tally.not_found += 1,
                        other => {
                            log::error!("lookup of {} returned {:?}", id, other);
                            tally.corrupted += 1;
                        }
                    }
                }
                tally
            })?
    };

    let inserted = writer
        .join()
        .map_err(|_| DemoError::WorkerPanicked("writer".into()))?;
    let tally = reader
        .join()
        .map_err(|_| DemoError::WorkerPanicked("reader".into()))?;
    let elapsed = start.elapsed();

    let mismatched = verify_inserted(&db, inserted, &config.name)?;

    let report = PeopleReport {
        inserted,
        found: tally.found,
        not_found: tally.not_found,
        corrupted: tally.corrupted + mismatched,
        final_len: db.len(),
        insert_latency: insert_latency.summary(),
        lookup_latency: lookup_latency.summary(),
        elapsed,
    };

    log::debug!("people: {:?}", report);
    Ok(report)
}

// every insertion must be visible once the writer is done; returns how many
// ids read back a different person
fn verify_inserted(db: &PeopleDb, inserted: usize, name: &str) -> Result<usize> {
    let mut mismatched = 0;
    for i in 0..inserted {
        let person = db.person_by_id(RecordId(i))?;
        if person.ssn != i.to_string() || person.name != name {
            log::error!("id {} reads back as {:?}", i, person);
            mismatched += 1;
        }
    }
    Ok(mismatched)
}
