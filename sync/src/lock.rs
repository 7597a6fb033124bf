//! shared/exclusive lock with writer priority.
//!
//! many readers or one writer. a writer acquires in two phases:
//!
//! 1. wait until no other writer is pending, then claim the pending flag.
//!    from this point every new reader blocks.
//! 2. wait until the readers admitted before the claim have left.
//!
//! the pool of readers can only shrink once a writer has claimed the slot, so
//! a steady stream of readers cannot starve writers. there is no ordering among
//! writers: whichever waiter observes the flag cleared first wins the claim.
//!
//! # characteristics
//!
//! - **blocking**: waiters park on a condition variable, no spinning
//! - **no poisoning**: a panic inside a critical section releases through the guard
//! - **no reentrancy**: a reader that asks for a write lock deadlocks
//! - **no timeouts**: acquisition waits unboundedly

use parking_lot::{Condvar, Mutex};

use crate::guard::{ReadGuard, WriteGuard};
use crate::state::{LockState, LockStatus};

/// a reader-writer lock that blocks new readers once a writer is waiting.
///
/// the lock guards no data of its own; it only gates access. wrap every
/// mutation in [`write`](Self::write) and every lookup in [`read`](Self::read).
/// [`SharedExclusive`](crate::SharedExclusive) bundles the lock with the data
/// it protects.
///
/// the lock is neither `Clone` nor `Copy`. share it by reference or through an
/// `Arc`; guards borrow it, so it cannot move or drop while any guard lives.
///
/// # example
///
/// ```
/// use shex_sync::{LockStatus, SharedExclusiveLock};
///
/// let lock = SharedExclusiveLock::new();
///
/// {
///     let _a = lock.read();
///     let _b = lock.read();
///     assert_eq!(lock.status(), LockStatus::Shared(2));
/// }
///
/// {
///     let _w = lock.write();
///     assert_eq!(lock.status(), LockStatus::Exclusive);
/// }
///
/// assert!(lock.is_free());
/// ```
pub struct SharedExclusiveLock {
    state: Mutex<LockState>,
    /// signalled when a writer releases.
    readers_cv: Condvar,
    /// signalled when a writer releases or the last reader leaves a draining lock.
    writers_cv: Condvar,
}

impl SharedExclusiveLock {
    /// create a free lock.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LockState::FREE),
            readers_cv: Condvar::new(),
            writers_cv: Condvar::new(),
        }
    }

    /// acquire a read lock, released when the guard drops.
    ///
    /// blocks while a writer holds or has claimed the lock.
    #[inline]
    pub fn read(&self) -> ReadGuard<'_> {
        ReadGuard::new(self)
    }

    /// acquire the write lock, released when the guard drops.
    ///
    /// blocks while another writer is pending, then while admitted readers drain.
    #[inline]
    pub fn write(&self) -> WriteGuard<'_> {
        WriteGuard::new(self)
    }

    /// acquire a read lock only if no writer is pending.
    pub fn try_read(&self) -> Option<ReadGuard<'_>> {
        if self.try_acquire_read() {
            Some(ReadGuard::admitted(self))
        } else {
            None
        }
    }

    /// acquire the write lock only if the lock is free.
    pub fn try_write(&self) -> Option<WriteGuard<'_>> {
        if self.try_acquire_write() {
            Some(WriteGuard::admitted(self))
        } else {
            None
        }
    }

    /// raw read acquisition.
    ///
    /// every call must be paired with exactly one [`release_read`](Self::release_read).
    /// prefer [`read`](Self::read).
    pub fn acquire_read(&self) {
        let mut state = self.state.lock();
        if state.writer_pending {
            log::trace!("reader blocked: {}", state.status());
        }
        while state.writer_pending {
            self.readers_cv.wait(&mut state);
        }
        state.readers += 1;
    }

    /// raw read release.
    ///
    /// a release with no admitted reader is ignored and leaves the state untouched.
    pub fn release_read(&self) {
        let mut state = self.state.lock();
        if state.readers == 0 {
            log::warn!("release_read without a matching acquire_read, ignored");
            return;
        }

        state.readers -= 1;
        if state.readers == 0 && state.writer_pending {
            self.writers_cv.notify_all();
        }
    }

    /// raw write acquisition.
    ///
    /// every call must be paired with exactly one [`release_write`](Self::release_write).
    /// prefer [`write`](Self::write).
    pub fn acquire_write(&self) {
        let mut state = self.state.lock();
        if state.writer_pending {
            log::trace!("writer blocked on writer: {}", state.status());
        }
        while state.writer_pending {
            self.writers_cv.wait(&mut state);
        }

        // claim: new readers block from here on
        state.writer_pending = true;

        if state.readers > 0 {
            log::trace!("writer draining {} reader(s)", state.readers);
        }
        while state.readers > 0 {
            self.writers_cv.wait(&mut state);
        }
    }

    /// raw write release.
    pub fn release_write(&self) {
        let mut state = self.state.lock();
        if !state.writer_pending {
            log::warn!("release_write without a matching acquire_write");
        }

        state.writer_pending = false;
        self.readers_cv.notify_all();
        self.writers_cv.notify_all();
    }

    /// non-blocking [`acquire_read`](Self::acquire_read). returns `true` on admission.
    pub fn try_acquire_read(&self) -> bool {
        let mut state = self.state.lock();
        if state.writer_pending {
            return false;
        }
        state.readers += 1;
        true
    }

    /// non-blocking [`acquire_write`](Self::acquire_write). returns `true` on admission.
    pub fn try_acquire_write(&self) -> bool {
        let mut state = self.state.lock();
        if !state.is_free() {
            return false;
        }
        state.writer_pending = true;
        true
    }

    /// snapshot of the current state.
    pub fn status(&self) -> LockStatus {
        self.state.lock().status()
    }

    /// `true` when nobody holds or has claimed the lock.
    pub fn is_free(&self) -> bool {
        self.state.lock().is_free()
    }
}

impl Default for SharedExclusiveLock {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SharedExclusiveLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedExclusiveLock")
            .field("status", &self.status())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::{Duration, Instant};

    const SETTLE: Duration = Duration::from_millis(50);

    // spin until the lock reports `expected`, fail after a generous deadline
    fn wait_for_status(lock: &SharedExclusiveLock, expected: LockStatus) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while lock.status() != expected {
            assert!(
                Instant::now() < deadline,
                "lock never reached {:?}, last seen {:?}",
                expected,
                lock.status()
            );
            thread::yield_now();
        }
    }

    #[test]
    fn test_new_is_free() {
        let lock = SharedExclusiveLock::new();
        assert_eq!(lock.status(), LockStatus::Free);
        assert!(lock.is_free());

        let lock = SharedExclusiveLock::default();
        assert!(lock.is_free());
    }

    #[test]
    fn test_raw_read_cycle() {
        let lock = SharedExclusiveLock::new();

        lock.acquire_read();
        lock.acquire_read();
        assert_eq!(lock.status(), LockStatus::Shared(2));

        lock.release_read();
        assert_eq!(lock.status(), LockStatus::Shared(1));
        lock.release_read();
        assert_eq!(lock.status(), LockStatus::Free);
    }

    #[test]
    fn test_raw_write_cycle() {
        let lock = SharedExclusiveLock::new();

        lock.acquire_write();
        assert_eq!(lock.status(), LockStatus::Exclusive);
        assert!(!lock.try_acquire_read());
        assert!(!lock.try_acquire_write());

        lock.release_write();
        assert_eq!(lock.status(), LockStatus::Free);
    }

    #[test]
    fn test_try_variants() {
        let lock = SharedExclusiveLock::new();

        let r = lock.try_read().expect("free lock must admit a reader");
        assert!(lock.try_write().is_none());
        let r2 = lock.try_read().expect("readers must not block readers");
        assert_eq!(lock.status(), LockStatus::Shared(2));
        drop((r, r2));

        let w = lock.try_write().expect("free lock must admit a writer");
        assert!(lock.try_read().is_none());
        assert!(lock.try_write().is_none());
        drop(w);

        assert!(lock.is_free());
    }

    #[test]
    fn test_unmatched_release_read_is_ignored() {
        let lock = SharedExclusiveLock::new();

        lock.release_read();
        assert_eq!(lock.status(), LockStatus::Free);

        // one real reader, two releases
        lock.acquire_read();
        lock.release_read();
        lock.release_read();
        assert_eq!(lock.status(), LockStatus::Free);

        // state behaves as if the spurious calls never happened
        let w = lock.try_write().expect("lock must still be free");
        drop(w);
        let r = lock.read();
        assert_eq!(lock.status(), LockStatus::Shared(1));
        drop(r);
        assert!(lock.is_free());
    }

    #[test]
    fn test_readers_do_not_block_each_other() {
        const READERS: usize = 8;
        let lock = SharedExclusiveLock::new();
        // every reader must be inside at the same time to get past the barrier
        let barrier = Barrier::new(READERS);

        thread::scope(|s| {
            for _ in 0..READERS {
                s.spawn(|| {
                    let _guard = lock.read();
                    barrier.wait();
                });
            }
        });

        assert_eq!(lock.status(), LockStatus::Free);
    }

    #[test]
    fn test_writer_blocks_writer() {
        let lock = SharedExclusiveLock::new();
        let second_inside = AtomicBool::new(false);

        let first = lock.write();
        thread::scope(|s| {
            let handle = s.spawn(|| {
                let _guard = lock.write();
                second_inside.store(true, Ordering::SeqCst);
            });

            thread::sleep(SETTLE);
            assert!(!second_inside.load(Ordering::SeqCst));
            assert_eq!(lock.status(), LockStatus::Exclusive);

            drop(first);
            handle.join().unwrap();
        });

        assert!(second_inside.load(Ordering::SeqCst));
        assert!(lock.is_free());
    }

    #[test]
    fn test_writer_priority_over_new_readers() {
        let lock = SharedExclusiveLock::new();
        let events = parking_lot::Mutex::new(Vec::new());

        // r1 and r2
        lock.acquire_read();
        lock.acquire_read();

        thread::scope(|s| {
            let writer = s.spawn(|| {
                let _guard = lock.write();
                events.lock().push("writer in");
                thread::sleep(Duration::from_millis(20));
                events.lock().push("writer out");
            });

            wait_for_status(&lock, LockStatus::Draining(2));

            // r3 arrives after the writer claimed the slot
            let reader = s.spawn(|| {
                let _guard = lock.read();
                events.lock().push("reader in");
            });

            thread::sleep(SETTLE);
            assert!(events.lock().is_empty());
            assert_eq!(lock.status(), LockStatus::Draining(2));

            lock.release_read();
            assert_eq!(lock.status(), LockStatus::Draining(1));
            thread::sleep(SETTLE);
            assert!(events.lock().is_empty());

            lock.release_read();
            writer.join().unwrap();
            reader.join().unwrap();
        });

        assert_eq!(
            *events.lock(),
            vec!["writer in", "writer out", "reader in"]
        );
        assert!(lock.is_free());
    }

    #[test]
    fn test_writer_waits_for_drain() {
        const READERS: usize = 3;
        let lock = SharedExclusiveLock::new();
        let admitted = AtomicBool::new(false);

        for _ in 0..READERS {
            lock.acquire_read();
        }

        thread::scope(|s| {
            let writer = s.spawn(|| {
                lock.acquire_write();
                admitted.store(true, Ordering::SeqCst);
                lock.release_write();
            });

            wait_for_status(&lock, LockStatus::Draining(READERS));

            for remaining in (1..READERS).rev() {
                lock.release_read();
                assert_eq!(lock.status(), LockStatus::Draining(remaining));
                thread::sleep(SETTLE);
                assert!(!admitted.load(Ordering::SeqCst), "writer returned early");
            }

            lock.release_read();
            writer.join().unwrap();
        });

        assert!(admitted.load(Ordering::SeqCst));
        assert!(lock.is_free());
    }

    #[test]
    fn test_mutual_exclusion() {
        const READERS: usize = 6;
        const WRITERS: usize = 3;
        const READ_CYCLES: usize = 2_000;
        const WRITE_CYCLES: usize = 300;

        let lock = Arc::new(SharedExclusiveLock::new());
        let readers_inside = Arc::new(AtomicUsize::new(0));
        let writers_inside = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();

        for _ in 0..READERS {
            let lock = Arc::clone(&lock);
            let readers_inside = Arc::clone(&readers_inside);
            let writers_inside = Arc::clone(&writers_inside);
            handles.push(thread::spawn(move || {
                for _ in 0..READ_CYCLES {
                    let _guard = lock.read();
                    readers_inside.fetch_add(1, Ordering::SeqCst);
                    assert_eq!(writers_inside.load(Ordering::SeqCst), 0);
                    readers_inside.fetch_sub(1, Ordering::SeqCst);
                }
            }));
        }

        for _ in 0..WRITERS {
            let lock = Arc::clone(&lock);
            let readers_inside = Arc::clone(&readers_inside);
            let writers_inside = Arc::clone(&writers_inside);
            handles.push(thread::spawn(move || {
                for _ in 0..WRITE_CYCLES {
                    let _guard = lock.write();
                    assert_eq!(writers_inside.fetch_add(1, Ordering::SeqCst), 0);
                    assert_eq!(readers_inside.load(Ordering::SeqCst), 0);
                    thread::yield_now();
                    writers_inside.fetch_sub(1, Ordering::SeqCst);
                }
            }));
        }

        for h in handles {
            h.join().unwrap();
        }

        assert!(lock.is_free());
    }

    #[test]
    fn test_write_guard_released_on_panic() {
        let lock = SharedExclusiveLock::new();

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = lock.write();
            panic!("critical section failed");
        }));

        assert!(result.is_err());
        assert!(lock.is_free());
        drop(lock.write());
    }

    #[test]
    fn test_read_guard_released_on_panic() {
        let lock = SharedExclusiveLock::new();

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = lock.read();
            panic!("lookup failed");
        }));

        assert!(result.is_err());
        assert!(lock.is_free());
        assert!(lock.try_write().is_some());
    }

    #[test]
    fn test_debug() {
        let lock = SharedExclusiveLock::new();
        let _guard = lock.read();
        let debug = format!("{:?}", lock);
        assert!(debug.contains("SharedExclusiveLock"));
        assert!(debug.contains("Shared(1)"));
    }
}
