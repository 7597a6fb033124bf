//! in-memory people database shared between threads.
//!
//! records are reachable by sequential [`RecordId`] and by SSN. insertions run
//! under the write side of a [`shex_sync::SharedExclusive`], lookups under the
//! read side, so a lookup never observes a half-inserted record.
//!
//! # example
//!
//! ```
//! use shex_store::{PeopleDb, Person, RecordId, StoreError};
//!
//! let db = PeopleDb::new();
//! let id = db.add_person(Person::new("bob", "0"));
//! assert_eq!(id, RecordId(0));
//!
//! assert_eq!(db.person_by_id(id).unwrap().name, "bob");
//! assert_eq!(db.person_by_ssn("0").unwrap().ssn, "0");
//! assert_eq!(db.person_by_id(RecordId(1)), Err(StoreError::InvalidId(RecordId(1))));
//! ```

mod db;
pub mod error;

pub use db::{PeopleDb, Person, RecordId};
pub use error::{Result, StoreError};
