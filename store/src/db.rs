use core::fmt;
use std::collections::HashMap;
use std::thread;

use shex_sync::{LockStatus, SharedExclusive};

use crate::error::{Result, StoreError};

/// a person; looked up by database id or by SSN.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Person {
    pub name: String,
    pub ssn: String,
}

impl Person {
    pub fn new(name: impl Into<String>, ssn: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ssn: ssn.into(),
        }
    }
}

/// sequential database id, assigned on insertion starting at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub usize);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Default)]
struct Tables {
    /// id -> SSN
    ssns: Vec<String>,
    /// SSN -> person
    people: HashMap<String, Person>,
}

impl Tables {
    fn insert(&mut self, person: Person) -> RecordId {
        self.ssns.push(person.ssn.clone());
        self.people.insert(person.ssn.clone(), person);
        RecordId(self.ssns.len() - 1)
    }

    fn by_ssn(&self, ssn: &str) -> Result<Person> {
        self.people
            .get(ssn)
            .cloned()
            .ok_or_else(|| StoreError::UnknownSsn(ssn.to_owned()))
    }

    fn by_id(&self, id: RecordId) -> Result<Person> {
        let ssn = self.ssns.get(id.0).ok_or(StoreError::InvalidId(id))?;
        self.by_ssn(ssn)
    }
}

/// a database of [`Person`]s, safe to share between threads.
///
/// every insertion holds the write lock, every lookup the read lock. lookup by
/// id resolves the SSN and the record under a single read lock; taking the read
/// lock twice could deadlock behind a writer that arrived in between.
#[derive(Debug, Default)]
pub struct PeopleDb {
    tables: SharedExclusive<Tables>,
    contention_yield: bool,
}

impl PeopleDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// yield the thread inside every critical section.
    ///
    /// widens the window in which other threads contend for the lock; used by
    /// the demo and the tests to make interleavings likely.
    pub fn with_contention_yield(mut self, enabled: bool) -> Self {
        self.contention_yield = enabled;
        self
    }

    /// add a person and return its database id.
    ///
    /// adding an SSN that is already present assigns a new id and replaces the
    /// record stored for that SSN; both ids then resolve to the new record.
    pub fn add_person(&self, person: Person) -> RecordId {
        let mut tables = self.tables.write();
        self.maybe_yield();

        let id = tables.insert(person);
        log::trace!("added record {}", id);
        id
    }

    /// look a person up by SSN.
    pub fn person_by_ssn(&self, ssn: &str) -> Result<Person> {
        let tables = self.tables.read();
        self.maybe_yield();

        tables.by_ssn(ssn)
    }

    /// look a person up by database id.
    pub fn person_by_id(&self, id: RecordId) -> Result<Person> {
        let tables = self.tables.read();
        self.maybe_yield();

        tables.by_id(id)
    }

    /// number of ids handed out.
    pub fn len(&self) -> usize {
        self.tables.read().ssns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// state of the lock protecting the tables.
    pub fn lock_status(&self) -> LockStatus {
        self.tables.status()
    }

    #[inline]
    fn maybe_yield(&self) {
        if self.contention_yield {
            thread::yield_now();
        }
    }
}
