/*!
 * Critical-Section Backend
 *
 * An exclusive lock that the owning thread may enter again without
 * deadlocking.
 *
 * On Windows this wraps the kernel32 `CRITICAL_SECTION` object directly. The
 * object must not move after `InitializeCriticalSection`, so it is boxed the
 * same way the pthread handles are. Other targets get the same reentrant
 * semantics from `lock_api::RawReentrantMutex` over a parking_lot mutex, so
 * the backend stays available for tests and the stress harness everywhere.
 *
 * Reentrancy here is a property of the native object, not of the public lock
 * contract. `ExclusiveLock` callers must still pair every `lock` with exactly
 * one `unlock` and must not rely on recursive entry.
 */

use crate::core::sync::traits::RawExclusive;

#[cfg(windows)]
mod imp {
    use std::cell::UnsafeCell;
    use windows_sys::Win32::System::Threading::{
        DeleteCriticalSection, EnterCriticalSection, InitializeCriticalSection,
        LeaveCriticalSection, CRITICAL_SECTION,
    };

    pub struct Section {
        inner: Box<UnsafeCell<CRITICAL_SECTION>>,
    }

    // SAFETY: critical sections are shared between threads by design; the
    // object is only touched through the kernel32 calls below.
    unsafe impl Send for Section {}
    unsafe impl Sync for Section {}

    impl Section {
        pub fn new() -> Self {
            // SAFETY: an all-zero CRITICAL_SECTION is valid storage for
            // InitializeCriticalSection, which fully overwrites it.
            let inner = Box::new(UnsafeCell::new(unsafe { std::mem::zeroed() }));
            unsafe { InitializeCriticalSection(inner.get()) };
            Self { inner }
        }

        #[inline]
        pub fn enter(&self) {
            unsafe { EnterCriticalSection(self.inner.get()) };
        }

        #[inline]
        pub unsafe fn leave(&self) {
            LeaveCriticalSection(self.inner.get());
        }
    }

    impl Drop for Section {
        fn drop(&mut self) {
            unsafe { DeleteCriticalSection(self.inner.get()) };
        }
    }
}

#[cfg(not(windows))]
mod imp {
    use lock_api::RawReentrantMutex;
    use parking_lot::{RawMutex, RawThreadId};

    pub struct Section {
        inner: RawReentrantMutex<RawMutex, RawThreadId>,
    }

    impl Section {
        pub fn new() -> Self {
            Self {
                inner: RawReentrantMutex::INIT,
            }
        }

        #[inline]
        pub fn enter(&self) {
            self.inner.lock();
        }

        #[inline]
        pub unsafe fn leave(&self) {
            self.inner.unlock();
        }
    }
}

/// Reentrant critical section
pub struct CriticalSection {
    section: imp::Section,
}

impl RawExclusive for CriticalSection {
    fn new() -> Self {
        Self {
            section: imp::Section::new(),
        }
    }

    #[inline]
    fn lock(&self) {
        self.section.enter();
    }

    #[inline]
    unsafe fn unlock(&self) {
        self.section.leave();
    }

    fn name(&self) -> &'static str {
        "critical_section"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_owner_may_reenter() {
        // Native behavior only; ExclusiveLock does not promise this
        let cs = CriticalSection::new();
        cs.lock();
        cs.lock();
        unsafe {
            cs.unlock();
            cs.unlock();
        }

        // Fully released: another thread can enter
        let cs = Arc::new(cs);
        let cs_clone = cs.clone();
        thread::spawn(move || {
            cs_clone.lock();
            unsafe { cs_clone.unlock() };
        })
        .join()
        .unwrap();
    }

    #[test]
    fn test_other_thread_waits_for_owner() {
        let cs = Arc::new(CriticalSection::new());
        let released = Arc::new(AtomicBool::new(false));
        cs.lock();

        let cs_clone = cs.clone();
        let released_clone = released.clone();
        let contender = thread::spawn(move || {
            cs_clone.lock();
            let saw_release = released_clone.load(Ordering::SeqCst);
            unsafe { cs_clone.unlock() };
            saw_release
        });

        thread::sleep(Duration::from_millis(50));
        released.store(true, Ordering::SeqCst);
        unsafe { cs.unlock() };

        assert!(contender.join().unwrap(), "entered while owned elsewhere");
    }

    #[test]
    fn test_section_survives_move() {
        let cs = CriticalSection::new();
        cs.lock();
        unsafe { cs.unlock() };

        let moved = Box::new(cs);
        moved.lock();
        unsafe { moved.unlock() };
        assert_eq!(moved.name(), "critical_section");
    }

    #[cfg(all(windows, not(feature = "parking-lot")))]
    #[test]
    fn test_windows_default_is_native_section() {
        use crate::core::sync::backend::DefaultExclusive;

        let lock = DefaultExclusive::new();
        assert_eq!(lock.name(), "critical_section");
        lock.lock();
        unsafe { lock.unlock() };
    }
}
