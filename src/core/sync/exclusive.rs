/*!
 * Exclusive Lock
 *
 * Mutual exclusion with at most one holder. Carries no payload: it guards
 * state the caller keeps elsewhere.
 */

use super::backend::DefaultExclusive;
use super::traits::RawExclusive;
use std::fmt;
use std::marker::PhantomData;

/// Exclusive lock over a native backend
///
/// # Contract
///
/// - `lock` blocks without timeout until the caller is the sole holder
/// - each `unlock` must match one `lock` by the same thread
/// - wake order among waiters is whatever the backend does
/// - recursive locking is not supported, even on reentrant backends
///
/// The type is neither `Clone` nor `Copy`. Share it by reference or `Arc`.
///
/// # Examples
///
/// ```
/// use harness_sync::ExclusiveLock;
///
/// let lock = ExclusiveLock::new();
/// {
///     let _guard = lock.guard();
///     // critical section
/// }
/// ```
pub struct ExclusiveLock<R: RawExclusive = DefaultExclusive> {
    raw: R,
}

impl ExclusiveLock {
    /// Create a lock on the build's default backend
    pub fn new() -> Self {
        Self::with_backend()
    }
}

impl<R: RawExclusive> ExclusiveLock<R> {
    /// Create a lock on an explicit backend
    pub fn with_backend() -> Self {
        Self { raw: R::new() }
    }

    /// Block until the calling thread holds the lock
    #[inline]
    pub fn lock(&self) {
        self.raw.lock();
    }

    /// Release the lock
    ///
    /// # Safety
    ///
    /// The calling thread must hold the lock through a matching `lock`.
    #[inline]
    pub unsafe fn unlock(&self) {
        self.raw.unlock();
    }

    /// Acquire and release on drop
    #[inline]
    pub fn guard(&self) -> ExclusiveGuard<'_, R> {
        self.lock();
        ExclusiveGuard {
            lock: self,
            _not_send: PhantomData,
        }
    }

    /// Name of the native backend
    pub fn backend_name(&self) -> &'static str {
        self.raw.name()
    }
}

impl Default for ExclusiveLock {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RawExclusive> fmt::Debug for ExclusiveLock<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExclusiveLock")
            .field("backend", &self.raw.name())
            .finish()
    }
}

/// Scoped exclusive acquisition
///
/// Not `Send`: the thread that locked must be the one that unlocks.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct ExclusiveGuard<'a, R: RawExclusive = DefaultExclusive> {
    lock: &'a ExclusiveLock<R>,
    _not_send: PhantomData<*const ()>,
}

// SAFETY: a shared guard exposes nothing but the lock reference
unsafe impl<R: RawExclusive> Sync for ExclusiveGuard<'_, R> {}

impl<R: RawExclusive> Drop for ExclusiveGuard<'_, R> {
    #[inline]
    fn drop(&mut self) {
        // SAFETY: the guard exists only while this thread holds the lock
        unsafe { self.lock.unlock() };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sync::backend::{CriticalSection, ParkingMutex};
    use std::cell::UnsafeCell;
    use std::sync::Arc;
    use std::thread;

    struct Counter(UnsafeCell<u64>);
    unsafe impl Sync for Counter {}

    fn hammer<R: RawExclusive + 'static>(threads: usize, per_thread: u64) -> u64 {
        let lock = Arc::new(ExclusiveLock::<R>::with_backend());
        let counter = Arc::new(Counter(UnsafeCell::new(0)));

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let lock = lock.clone();
                let counter = counter.clone();
                thread::spawn(move || {
                    for _ in 0..per_thread {
                        lock.lock();
                        unsafe {
                            *counter.0.get() += 1;
                            lock.unlock();
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let _guard = lock.guard();
        unsafe { *counter.0.get() }
    }

    #[test]
    fn test_uncontended_round_trip() {
        let lock = ExclusiveLock::new();
        lock.lock();
        unsafe { lock.unlock() };
        lock.lock();
        unsafe { lock.unlock() };
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let lock = ExclusiveLock::new();
        drop(lock.guard());
        drop(lock.guard());
    }

    #[test]
    fn test_default_backend_no_lost_updates() {
        assert_eq!(hammer::<DefaultExclusive>(8, 2_000), 16_000);
    }

    #[test]
    fn test_critical_section_no_lost_updates() {
        assert_eq!(hammer::<CriticalSection>(8, 2_000), 16_000);
    }

    #[test]
    fn test_parking_no_lost_updates() {
        assert_eq!(hammer::<ParkingMutex>(8, 2_000), 16_000);
    }

    #[test]
    fn test_debug_shows_backend() {
        let lock = ExclusiveLock::<ParkingMutex>::with_backend();
        assert_eq!(format!("{:?}", lock), "ExclusiveLock { backend: \"parking_lot\" }");
    }
}
