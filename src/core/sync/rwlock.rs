/*!
 * Reader/Writer Lock
 *
 * Many concurrent readers or one writer, never both. At any instant the lock
 * is Free, Shared(n) with n >= 1 readers, or Exclusive with one writer.
 *
 * # Transitions
 *
 * - Free -> Shared(1) on `lock_read`, Shared(n) -> Shared(n+1) on `lock_read`
 * - Shared(n) -> Shared(n-1) on `unlock_read`, Shared(1) -> Free on the last
 * - Free -> Exclusive on `lock_write`, Exclusive -> Free on `unlock_write`
 * - `lock_write` in Shared/Exclusive and `lock_read` in Exclusive block
 *
 * Whether a pending writer holds back new readers is the backend's policy.
 */

use super::backend::DefaultShared;
use super::traits::RawShared;
use std::fmt;
use std::marker::PhantomData;

/// Reader/writer lock over a native backend
///
/// Upgrading a read acquisition to a write acquisition without releasing it
/// first deadlocks or worse; it is not supported.
pub struct ReadWriteLock<R: RawShared = DefaultShared> {
    raw: R,
}

impl ReadWriteLock {
    /// Create a lock on the build's default backend
    pub fn new() -> Self {
        Self::with_backend()
    }
}

impl<R: RawShared> ReadWriteLock<R> {
    /// Create a lock on an explicit backend
    pub fn with_backend() -> Self {
        Self { raw: R::new() }
    }

    /// Lock for writing; no other readers or writers possible
    #[inline]
    pub fn lock_write(&self) {
        self.raw.lock_exclusive();
    }

    /// Unlock after `lock_write`
    ///
    /// # Safety
    ///
    /// The calling thread must hold the write lock.
    #[inline]
    pub unsafe fn unlock_write(&self) {
        self.raw.unlock_exclusive();
    }

    /// Lock for reading; other readers possible, no writers
    #[inline]
    pub fn lock_read(&self) {
        self.raw.lock_shared();
    }

    /// Unlock after `lock_read`
    ///
    /// # Safety
    ///
    /// The calling thread must hold one read acquisition.
    #[inline]
    pub unsafe fn unlock_read(&self) {
        self.raw.unlock_shared();
    }

    /// Shared acquisition released on drop
    #[inline]
    pub fn read(&self) -> ReadGuard<'_, R> {
        self.lock_read();
        ReadGuard {
            lock: self,
            _not_send: PhantomData,
        }
    }

    /// Exclusive acquisition released on drop
    #[inline]
    pub fn write(&self) -> WriteGuard<'_, R> {
        self.lock_write();
        WriteGuard {
            lock: self,
            _not_send: PhantomData,
        }
    }

    /// Name of the native backend
    pub fn backend_name(&self) -> &'static str {
        self.raw.name()
    }
}

impl Default for ReadWriteLock {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RawShared> fmt::Debug for ReadWriteLock<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadWriteLock")
            .field("backend", &self.raw.name())
            .finish()
    }
}

/// Scoped shared acquisition
#[must_use = "the read lock is released as soon as the guard is dropped"]
pub struct ReadGuard<'a, R: RawShared = DefaultShared> {
    lock: &'a ReadWriteLock<R>,
    _not_send: PhantomData<*const ()>,
}

unsafe impl<R: RawShared> Sync for ReadGuard<'_, R> {}

impl<R: RawShared> Drop for ReadGuard<'_, R> {
    #[inline]
    fn drop(&mut self) {
        unsafe { self.lock.unlock_read() };
    }
}

/// Scoped exclusive acquisition
#[must_use = "the write lock is released as soon as the guard is dropped"]
pub struct WriteGuard<'a, R: RawShared = DefaultShared> {
    lock: &'a ReadWriteLock<R>,
    _not_send: PhantomData<*const ()>,
}

unsafe impl<R: RawShared> Sync for WriteGuard<'_, R> {}

impl<R: RawShared> Drop for WriteGuard<'_, R> {
    #[inline]
    fn drop(&mut self) {
        unsafe { self.lock.unlock_write() };
    }
}
