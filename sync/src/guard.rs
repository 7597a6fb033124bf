//! scope-bound acquisition.
//!
//! a guard acquires when it is built and releases exactly once when it drops,
//! whether the scope ends normally, through `?`, or by unwinding.

use crate::lock::SharedExclusiveLock;

/// shared admission to a [`SharedExclusiveLock`], released on drop.
///
/// created by [`SharedExclusiveLock::read`], [`SharedExclusiveLock::try_read`]
/// or [`ReadGuard::new`].
#[must_use = "if unused the read lock is released immediately"]
#[derive(Debug)]
pub struct ReadGuard<'lock> {
    lock: &'lock SharedExclusiveLock,
}

impl<'lock> ReadGuard<'lock> {
    /// acquire a read lock on `lock`, blocking while a writer is pending.
    #[inline]
    pub fn new(lock: &'lock SharedExclusiveLock) -> Self {
        lock.acquire_read();
        Self { lock }
    }

    // wraps an admission the caller already obtained
    #[inline]
    pub(crate) fn admitted(lock: &'lock SharedExclusiveLock) -> Self {
        Self { lock }
    }

    /// the lock this guard holds.
    #[inline]
    pub fn lock(&self) -> &'lock SharedExclusiveLock {
        self.lock
    }
}

impl Drop for ReadGuard<'_> {
    #[inline]
    fn drop(&mut self) {
        self.lock.release_read();
    }
}

/// exclusive admission to a [`SharedExclusiveLock`], released on drop.
///
/// created by [`SharedExclusiveLock::write`], [`SharedExclusiveLock::try_write`]
/// or [`WriteGuard::new`].
#[must_use = "if unused the write lock is released immediately"]
#[derive(Debug)]
pub struct WriteGuard<'lock> {
    lock: &'lock SharedExclusiveLock,
}

impl<'lock> WriteGuard<'lock> {
    /// acquire the write lock on `lock`, blocking until it is exclusive.
    #[inline]
    pub fn new(lock: &'lock SharedExclusiveLock) -> Self {
        lock.acquire_write();
        Self { lock }
    }

    #[inline]
    pub(crate) fn admitted(lock: &'lock SharedExclusiveLock) -> Self {
        Self { lock }
    }

    /// the lock this guard holds.
    #[inline]
    pub fn lock(&self) -> &'lock SharedExclusiveLock {
        self.lock
    }
}

impl Drop for WriteGuard<'_> {
    #[inline]
    fn drop(&mut self) {
        self.lock.release_write();
    }
}

/// ```compile_fail
/// use shex_sync::SharedExclusiveLock;
///
/// fn check_clone<T: Clone>(_: &T) {}
///
/// let lock = SharedExclusiveLock::new();
/// let guard = lock.read();
/// check_clone(&guard);
/// ```
///
/// ```compile_fail
/// use shex_sync::SharedExclusiveLock;
///
/// let lock = SharedExclusiveLock::new();
/// let guard = lock.write();
/// drop(lock);
/// drop(guard);
/// ```
///
/// ```compile_fail
/// use shex_sync::SharedExclusiveLock;
///
/// fn check_clone<T: Clone>(_: &T) {}
///
/// check_clone(&SharedExclusiveLock::new());
/// ```
#[allow(dead_code)]
fn test_compile_guards() {}
