//! data protected by a [`SharedExclusiveLock`].
//!
//! [`SharedExclusive<T>`] places the value next to the lock, so the only way to
//! reach it is through a guard: [`ReadRef`] hands out `&T`, [`WriteRef`] hands
//! out `&mut T`. the lock itself still knows nothing about `T`.

use core::fmt;
use std::cell::UnsafeCell;
use std::ops::{Deref, DerefMut};

use crate::guard::{ReadGuard, WriteGuard};
use crate::lock::SharedExclusiveLock;
use crate::state::LockStatus;

/// a value behind a writer-priority reader-writer lock.
///
/// # example
///
/// ```
/// use shex_sync::SharedExclusive;
/// use std::sync::Arc;
/// use std::thread;
///
/// let counter = Arc::new(SharedExclusive::new(0u64));
///
/// let writer = {
///     let counter = Arc::clone(&counter);
///     thread::spawn(move || {
///         for _ in 0..10 {
///             *counter.write() += 1;
///         }
///     })
/// };
///
/// let seen = *counter.read();
/// assert!(seen <= 10);
///
/// writer.join().unwrap();
/// assert_eq!(*counter.read(), 10);
/// ```
pub struct SharedExclusive<T: ?Sized> {
    lock: SharedExclusiveLock,
    value: UnsafeCell<T>,
}

// safety: readers on several threads see `&T` at once, so `T: Sync`; a writer
// may mutate from any thread, so `T: Send`. the lock serialises the two.
unsafe impl<T: ?Sized + Send + Sync> Sync for SharedExclusive<T> {}

impl<T> SharedExclusive<T> {
    /// wrap `value` behind a free lock.
    #[inline]
    pub fn new(value: T) -> Self {
        Self {
            lock: SharedExclusiveLock::new(),
            value: UnsafeCell::new(value),
        }
    }

    /// consume the wrapper and return the value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}

impl<T: ?Sized> SharedExclusive<T> {
    /// shared access, blocking while a writer is pending.
    #[inline]
    pub fn read(&self) -> ReadRef<'_, T> {
        ReadRef {
            _guard: self.lock.read(),
            cell: self,
        }
    }

    /// exclusive access, blocking until every reader and writer has left.
    #[inline]
    pub fn write(&self) -> WriteRef<'_, T> {
        WriteRef {
            _guard: self.lock.write(),
            cell: self,
        }
    }

    /// shared access if no writer is pending.
    pub fn try_read(&self) -> Option<ReadRef<'_, T>> {
        self.lock.try_read().map(|guard| ReadRef {
            _guard: guard,
            cell: self,
        })
    }

    /// exclusive access if the lock is free.
    pub fn try_write(&self) -> Option<WriteRef<'_, T>> {
        self.lock.try_write().map(|guard| WriteRef {
            _guard: guard,
            cell: self,
        })
    }

    /// mutable access without locking; `&mut self` proves nobody else holds a guard.
    #[inline]
    pub fn get_mut(&mut self) -> &mut T {
        self.value.get_mut()
    }

    /// snapshot of the lock state.
    #[inline]
    pub fn status(&self) -> LockStatus {
        self.lock.status()
    }
}

impl<T: Default> Default for SharedExclusive<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> From<T> for SharedExclusive<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for SharedExclusive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.try_read() {
            Some(value) => f
                .debug_struct("SharedExclusive")
                .field("value", &&*value)
                .finish(),
            None => f
                .debug_struct("SharedExclusive")
                .field("value", &"<locked>")
                .finish(),
        }
    }
}

/// shared access to the value of a [`SharedExclusive`]; releases on drop.
#[must_use = "if unused the read lock is released immediately"]
pub struct ReadRef<'a, T: ?Sized> {
    _guard: ReadGuard<'a>,
    cell: &'a SharedExclusive<T>,
}

impl<T: ?Sized> Deref for ReadRef<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // safety: the read guard keeps writers out for as long as `self` lives
        unsafe { &*self.cell.value.get() }
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for ReadRef<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

/// exclusive access to the value of a [`SharedExclusive`]; releases on drop.
#[must_use = "if unused the write lock is released immediately"]
pub struct WriteRef<'a, T: ?Sized> {
    _guard: WriteGuard<'a>,
    cell: &'a SharedExclusive<T>,
}

impl<T: ?Sized> Deref for WriteRef<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // safety: the write guard excludes every other reader and writer
        unsafe { &*self.cell.value.get() }
    }
}

impl<T: ?Sized> DerefMut for WriteRef<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        // safety: as above, and `&mut self` rules out a second borrow through this guard
        unsafe { &mut *self.cell.value.get() }
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for WriteRef<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

/// ```compile_fail
/// use shex_sync::SharedExclusive;
/// use std::rc::Rc;
///
/// fn check_sync<T: Sync>(_: &T) {}
///
/// check_sync(&SharedExclusive::new(Rc::new(0)));
/// ```
///
/// ```compile_fail
/// use shex_sync::SharedExclusive;
/// use std::cell::Cell;
///
/// fn check_sync<T: Sync>(_: &T) {}
///
/// check_sync(&SharedExclusive::new(Cell::new(0)));
/// ```
///
/// ```rust
/// use shex_sync::SharedExclusive;
///
/// fn check_sync<T: Sync>(_: &T) {}
///
/// check_sync(&SharedExclusive::new(vec![0u8]));
/// ```
///
/// the lock inside the cell is never handed out, so a write ref cannot be
/// released behind its back:
///
/// ```compile_fail
/// use shex_sync::SharedExclusive;
///
/// let cell = SharedExclusive::new(vec![1u32]);
/// let _w = cell.write();
/// cell.raw().release_write();
/// let _r = cell.read();
/// ```
#[allow(dead_code)]
fn test_compile_shared_exclusive() {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_read_write() {
        let cell = SharedExclusive::new(vec![1, 2, 3]);

        cell.write().push(4);
        assert_eq!(*cell.read(), vec![1, 2, 3, 4]);
        assert!(cell.status().is_free());
    }

    #[test]
    fn test_guards_report_status() {
        let cell = SharedExclusive::new(0u32);

        let a = cell.read();
        let b = cell.read();
        assert_eq!(cell.status(), LockStatus::Shared(2));
        assert!(cell.try_write().is_none());
        drop((a, b));

        let mut w = cell.write();
        *w = 5;
        assert_eq!(cell.status(), LockStatus::Exclusive);
        assert!(cell.try_read().is_none());
        drop(w);

        assert_eq!(*cell.try_read().unwrap(), 5);
    }

    #[test]
    fn test_get_mut_and_into_inner() {
        let mut cell = SharedExclusive::new(String::from("a"));
        cell.get_mut().push('b');
        assert_eq!(cell.into_inner(), "ab");
    }

    #[test]
    fn test_default_and_from() {
        let cell: SharedExclusive<u64> = SharedExclusive::default();
        assert_eq!(*cell.read(), 0);

        let cell = SharedExclusive::from(9u8);
        assert_eq!(*cell.read(), 9);
    }

    #[test]
    fn test_unsized() {
        let cell: Box<SharedExclusive<[u32]>> = Box::new(SharedExclusive::new([1, 2, 3]));
        cell.write()[0] = 10;
        assert_eq!(cell.read().iter().sum::<u32>(), 15);
    }

    #[test]
    fn test_debug() {
        let cell = SharedExclusive::new(42u64);
        let debug = format!("{:?}", cell);
        assert!(debug.contains("SharedExclusive"));
        assert!(debug.contains("42"));

        let _w = cell.write();
        assert!(format!("{:?}", cell).contains("<locked>"));
    }

    #[test]
    fn test_write_ref_keeps_readers_out() {
        let cell = Arc::new(SharedExclusive::new(vec![1u32, 2, 3]));
        let (tx, rx) = std::sync::mpsc::channel();

        let mut w = cell.write();
        let reader = {
            let cell = Arc::clone(&cell);
            thread::spawn(move || {
                let r = cell.read();
                tx.send(r.clone()).unwrap();
            })
        };

        thread::sleep(std::time::Duration::from_millis(30));
        assert!(rx.try_recv().is_err(), "reader admitted while a write ref is alive");
        assert_eq!(cell.status(), LockStatus::Exclusive);

        w.clear();
        w.push(7);
        drop(w);

        reader.join().unwrap();
        assert_eq!(rx.recv().unwrap(), vec![7]);
        assert!(cell.status().is_free());
    }

    // 10 readers x 1000 cycles against 2 writers x 100 increments
    #[test]
    fn test_stress_counter() {
        const READERS: usize = 10;
        const READ_CYCLES: usize = 1_000;
        const WRITERS: usize = 2;
        const WRITE_CYCLES: u64 = 100;

        let counter = Arc::new(SharedExclusive::new(0u64));

        let readers: Vec<_> = (0..READERS)
            .map(|_| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    let mut last = 0u64;
                    for _ in 0..READ_CYCLES {
                        let value = *counter.read();
                        assert!(value >= last, "counter went backwards");
                        last = value;
                    }
                })
            })
            .collect();

        let writers: Vec<_> = (0..WRITERS)
            .map(|_| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    for _ in 0..WRITE_CYCLES {
                        let mut value = counter.write();
                        let before = *value;
                        thread::yield_now();
                        *value = before + 1;
                    }
                })
            })
            .collect();

        for h in writers {
            h.join().unwrap();
        }
        for h in readers {
            h.join().unwrap();
        }

        assert_eq!(*counter.read(), WRITERS as u64 * WRITE_CYCLES);
        assert!(counter.status().is_free());
    }
}
