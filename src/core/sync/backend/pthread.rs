/*!
 * POSIX Backend
 *
 * Thin wrappers over `pthread_mutex_t` and `pthread_rwlock_t`.
 *
 * # Address Stability
 *
 * A pthread object must not move once initialized, so each handle lives in
 * its own heap allocation owned by the wrapper. Moving the wrapper moves the
 * `Box`, never the native object.
 *
 * # Return Codes
 *
 * Lock and unlock results are only checked with `debug_assert_eq!`. On the
 * supported targets these calls cannot fail for correct callers, and misuse
 * is undefined behavior by contract.
 */

use crate::core::sync::traits::{RawExclusive, RawShared};
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;

/// Non-recursive POSIX mutex
pub struct PthreadMutex {
    inner: Box<UnsafeCell<libc::pthread_mutex_t>>,
}

// SAFETY: pthread mutexes are designed to be shared between threads; the
// handle itself is never accessed except through pthread calls.
unsafe impl Send for PthreadMutex {}
unsafe impl Sync for PthreadMutex {}

impl RawExclusive for PthreadMutex {
    fn new() -> Self {
        let inner = Box::new(UnsafeCell::new(libc::PTHREAD_MUTEX_INITIALIZER));

        // PTHREAD_MUTEX_DEFAULT leaves relocking unspecified; NORMAL pins it
        // to a deadlock on every platform.
        unsafe {
            let mut attr = MaybeUninit::<libc::pthread_mutexattr_t>::uninit();
            let r = libc::pthread_mutexattr_init(attr.as_mut_ptr());
            debug_assert_eq!(r, 0);
            let r = libc::pthread_mutexattr_settype(attr.as_mut_ptr(), libc::PTHREAD_MUTEX_NORMAL);
            debug_assert_eq!(r, 0);
            let r = libc::pthread_mutex_init(inner.get(), attr.as_ptr());
            debug_assert_eq!(r, 0);
            let r = libc::pthread_mutexattr_destroy(attr.as_mut_ptr());
            debug_assert_eq!(r, 0);
        }

        Self { inner }
    }

    #[inline]
    fn lock(&self) {
        let r = unsafe { libc::pthread_mutex_lock(self.inner.get()) };
        debug_assert_eq!(r, 0);
    }

    #[inline]
    unsafe fn unlock(&self) {
        let r = libc::pthread_mutex_unlock(self.inner.get());
        debug_assert_eq!(r, 0);
    }

    fn name(&self) -> &'static str {
        "pthread"
    }
}

impl Drop for PthreadMutex {
    fn drop(&mut self) {
        // Destroying a held mutex is the caller's bug; macOS reports EBUSY.
        let r = unsafe { libc::pthread_mutex_destroy(self.inner.get()) };
        debug_assert!(r == 0 || r == libc::EBUSY);
    }
}

/// POSIX reader/writer lock
///
/// Reader or writer preference is whatever the platform's rwlock does.
pub struct PthreadRwLock {
    inner: Box<UnsafeCell<libc::pthread_rwlock_t>>,
}

// SAFETY: see PthreadMutex
unsafe impl Send for PthreadRwLock {}
unsafe impl Sync for PthreadRwLock {}

impl RawShared for PthreadRwLock {
    fn new() -> Self {
        Self {
            inner: Box::new(UnsafeCell::new(libc::PTHREAD_RWLOCK_INITIALIZER)),
        }
    }

    #[inline]
    fn lock_exclusive(&self) {
        let r = unsafe { libc::pthread_rwlock_wrlock(self.inner.get()) };
        debug_assert_eq!(r, 0);
    }

    #[inline]
    unsafe fn unlock_exclusive(&self) {
        let r = libc::pthread_rwlock_unlock(self.inner.get());
        debug_assert_eq!(r, 0);
    }

    #[inline]
    fn lock_shared(&self) {
        let r = unsafe { libc::pthread_rwlock_rdlock(self.inner.get()) };
        debug_assert_eq!(r, 0);
    }

    #[inline]
    unsafe fn unlock_shared(&self) {
        let r = libc::pthread_rwlock_unlock(self.inner.get());
        debug_assert_eq!(r, 0);
    }

    fn name(&self) -> &'static str {
        "pthread"
    }
}

impl Drop for PthreadRwLock {
    fn drop(&mut self) {
        let r = unsafe { libc::pthread_rwlock_destroy(self.inner.get()) };
        debug_assert!(r == 0 || r == libc::EBUSY);
    }
}
