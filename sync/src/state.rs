//! lock state and its derived status.
//!
//! the lock stores exactly two fields. every status a caller can observe is
//! derived from that pair, so the table below is exhaustive:
//!
//! | readers | writer_pending | status            |
//! |---------|----------------|-------------------|
//! | 0       | false          | `Free`            |
//! | n > 0   | false          | `Shared(n)`       |
//! | 0       | true           | `Exclusive`       |
//! | n > 0   | true           | `Draining(n)`     |

use core::fmt;

/// internal state, only ever touched under the lock's mutex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct LockState {
    /// readers currently admitted.
    pub(crate) readers: usize,
    /// a writer claimed the slot; it may still be draining readers.
    pub(crate) writer_pending: bool,
}

impl LockState {
    pub(crate) const FREE: Self = Self {
        readers: 0,
        writer_pending: false,
    };

    #[inline]
    pub(crate) fn is_free(&self) -> bool {
        self.readers == 0 && !self.writer_pending
    }

    #[inline]
    pub(crate) fn status(&self) -> LockStatus {
        match (self.readers, self.writer_pending) {
            (0, false) => LockStatus::Free,
            (n, false) => LockStatus::Shared(n),
            (0, true) => LockStatus::Exclusive,
            (n, true) => LockStatus::Draining(n),
        }
    }
}

/// snapshot of a [`SharedExclusiveLock`](crate::SharedExclusiveLock).
///
/// the snapshot is consistent at the moment it was taken and may be stale by
/// the time the caller looks at it. use it for diagnostics and tests, never to
/// decide whether to acquire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockStatus {
    /// nobody holds or waits for the lock; the next request of either kind succeeds.
    Free,
    /// held by this many readers, no writer waiting.
    Shared(usize),
    /// held by one writer.
    Exclusive,
    /// a writer claimed the lock and waits for this many readers to leave.
    /// no new readers are admitted.
    Draining(usize),
}

impl LockStatus {
    /// `true` for [`LockStatus::Free`].
    #[inline]
    pub fn is_free(&self) -> bool {
        matches!(self, LockStatus::Free)
    }

    /// number of admitted readers.
    #[inline]
    pub fn readers(&self) -> usize {
        match *self {
            LockStatus::Shared(n) | LockStatus::Draining(n) => n,
            LockStatus::Free | LockStatus::Exclusive => 0,
        }
    }

    /// `true` while a writer holds or has claimed the lock.
    #[inline]
    pub fn writer_pending(&self) -> bool {
        matches!(self, LockStatus::Exclusive | LockStatus::Draining(_))
    }
}

impl fmt::Display for LockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockStatus::Free => write!(f, "free"),
            LockStatus::Shared(n) => write!(f, "shared by {} reader(s)", n),
            LockStatus::Exclusive => write!(f, "exclusive"),
            LockStatus::Draining(n) => write!(f, "draining {} reader(s) for a writer", n),
        }
    }
}
