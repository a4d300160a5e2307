/*!
 * Synchronization Primitives
 *
 * Two independent lock types behind one portable API:
 * - `ExclusiveLock` for mutual exclusion
 * - `ReadWriteLock` for shared/exclusive access
 *
 * # Architecture
 *
 * Each lock is generic over a raw backend trait (`RawExclusive` or
 * `RawShared`). The default type parameter resolves at compile time to the
 * platform's native primitive, so callers write `ExclusiveLock::new()` and get
 * a critical section on Windows and a pthread mutex on unix with the same
 * observable behavior.
 *
 * # Performance
 *
 * - No state beyond the native handle
 * - Static dispatch, no validation on the hot path
 * - No logging on lock or unlock
 */

pub mod backend;
mod config;
mod exclusive;
mod rwlock;
mod traits;

pub use backend::{DefaultExclusive, DefaultShared};
pub use config::{BackendType, ParseBackendError};
pub use exclusive::{ExclusiveGuard, ExclusiveLock};
pub use rwlock::{ReadGuard, ReadWriteLock, WriteGuard};
pub use traits::{RawExclusive, RawShared};
