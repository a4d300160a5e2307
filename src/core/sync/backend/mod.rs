/*!
 * Native Lock Backends
 *
 * One module per native locking model. The `Default*` aliases pick the
 * platform's native primitive at compile time:
 *
 * | target        | exclusive         | shared          |
 * |---------------|-------------------|-----------------|
 * | windows       | `CriticalSection` | `ParkingRwLock` |
 * | unix          | `PthreadMutex`    | `PthreadRwLock` |
 * | other         | `ParkingMutex`    | `ParkingRwLock` |
 *
 * The `parking-lot` feature overrides every row with the parking_lot pair.
 */

mod critical_section;
mod parking;
#[cfg(unix)]
mod pthread;

pub use critical_section::CriticalSection;
pub use parking::{ParkingMutex, ParkingRwLock};
#[cfg(unix)]
pub use pthread::{PthreadMutex, PthreadRwLock};

/// Exclusive backend selected for this build
#[cfg(all(windows, not(feature = "parking-lot")))]
pub type DefaultExclusive = CriticalSection;
/// Exclusive backend selected for this build
#[cfg(all(unix, not(feature = "parking-lot")))]
pub type DefaultExclusive = PthreadMutex;
/// Exclusive backend selected for this build
#[cfg(any(feature = "parking-lot", not(any(unix, windows))))]
pub type DefaultExclusive = ParkingMutex;

/// Reader/writer backend selected for this build
#[cfg(all(unix, not(feature = "parking-lot")))]
pub type DefaultShared = PthreadRwLock;
/// Reader/writer backend selected for this build
#[cfg(any(feature = "parking-lot", not(unix)))]
pub type DefaultShared = ParkingRwLock;
