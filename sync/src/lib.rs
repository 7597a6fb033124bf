//! blocking shared/exclusive synchronization.
//!
//! this crate provides a reader-writer lock built for scenarios where:
//! - reads are frequent and may run in parallel
//! - writes are rare but must not be starved by a stream of readers
//! - threads block on a condition variable instead of spinning
//!
//! # available primitives
//!
//! - [`SharedExclusiveLock`]: the lock itself, guarding no data
//! - [`ReadGuard`] / [`WriteGuard`]: scope-bound acquisition of the lock
//! - [`SharedExclusive`]: a value protected by the lock, reached through
//!   [`ReadRef`] / [`WriteRef`]
//! - [`LockStatus`]: diagnostic snapshot of the lock state
//!
//! # writer priority
//!
//! once a writer asks for the lock no new reader is admitted. the readers that
//! were already inside finish, the writer runs, and the blocked readers resume.
//!
//! # example
//!
//! ```
//! use shex_sync::{LockStatus, SharedExclusive};
//!
//! let names = SharedExclusive::new(Vec::<String>::new());
//!
//! // write (exclusive, blocks readers and other writers)
//! names.write().push("bob".into());
//!
//! // read (shared with any number of readers)
//! let view = names.read();
//! assert_eq!(view[0], "bob");
//! assert_eq!(names.status(), LockStatus::Shared(1));
//! ```

mod cell;
mod guard;
mod lock;
mod state;

pub use cell::{ReadRef, SharedExclusive, WriteRef};
pub use guard::{ReadGuard, WriteGuard};
pub use lock::SharedExclusiveLock;
pub use state::LockStatus;
