/*!
 * parking_lot Backend
 *
 * Portable backend built on parking_lot's raw locks. Used where no native
 * POSIX primitive exists, and everywhere when the `parking-lot` feature is on.
 */

use crate::core::sync::traits::{RawExclusive, RawShared};
use lock_api::{RawMutex as _, RawRwLock as _};

/// Word-sized, non-recursive mutex
pub struct ParkingMutex {
    raw: parking_lot::RawMutex,
}

impl RawExclusive for ParkingMutex {
    fn new() -> Self {
        Self {
            raw: parking_lot::RawMutex::INIT,
        }
    }

    #[inline]
    fn lock(&self) {
        self.raw.lock();
    }

    #[inline]
    unsafe fn unlock(&self) {
        self.raw.unlock();
    }

    fn name(&self) -> &'static str {
        "parking_lot"
    }
}

/// Task-fair reader/writer lock
pub struct ParkingRwLock {
    raw: parking_lot::RawRwLock,
}

impl RawShared for ParkingRwLock {
    fn new() -> Self {
        Self {
            raw: parking_lot::RawRwLock::INIT,
        }
    }

    #[inline]
    fn lock_exclusive(&self) {
        self.raw.lock_exclusive();
    }

    #[inline]
    unsafe fn unlock_exclusive(&self) {
        self.raw.unlock_exclusive();
    }

    #[inline]
    fn lock_shared(&self) {
        self.raw.lock_shared();
    }

    #[inline]
    unsafe fn unlock_shared(&self) {
        self.raw.unlock_shared();
    }

    fn name(&self) -> &'static str {
        "parking_lot"
    }
}
