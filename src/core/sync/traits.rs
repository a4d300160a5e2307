/*!
 * Raw Lock Traits
 *
 * The common interface every native backend implements. `ExclusiveLock` and
 * `ReadWriteLock` are generic over these traits, so the backend is fixed at
 * compile time and dispatch is monomorphized away.
 *
 * # Caller Contract
 *
 * None of these operations report errors. Releasing a lock that the calling
 * thread does not hold is undefined behavior, which is why every release
 * method is `unsafe`.
 */

/// Native primitive offering exclusive acquisition only
///
/// Implementations may be reentrant for the owning thread (critical sections
/// are), but callers must not depend on it.
pub trait RawExclusive: Send + Sync {
    /// Create and initialize the native handle
    fn new() -> Self
    where
        Self: Sized;

    /// Block until the calling thread is the sole holder
    fn lock(&self);

    /// Release a lock acquired by `lock`
    ///
    /// # Safety
    ///
    /// The calling thread must currently hold the lock through a matching
    /// `lock` call.
    unsafe fn unlock(&self);

    /// Backend name for diagnostics
    fn name(&self) -> &'static str;
}

/// Native primitive offering shared and exclusive acquisition
pub trait RawShared: Send + Sync {
    /// Create and initialize the native handle
    fn new() -> Self
    where
        Self: Sized;

    /// Block until there are no readers and no writer, then take exclusive access
    fn lock_exclusive(&self);

    /// Release exclusive access
    ///
    /// # Safety
    ///
    /// The calling thread must hold exclusive access via `lock_exclusive`.
    unsafe fn unlock_exclusive(&self);

    /// Block while a writer holds the lock, then take shared access
    fn lock_shared(&self);

    /// Release one shared acquisition
    ///
    /// # Safety
    ///
    /// The calling thread must hold shared access via `lock_shared`.
    unsafe fn unlock_shared(&self);

    /// Backend name for diagnostics
    fn name(&self) -> &'static str;
}
