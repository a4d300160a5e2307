/*!
 * Harness Sync Library
 * Portable exclusive and reader/writer locks over native primitives,
 * plus a stress harness that verifies them
 */

pub mod core;
pub mod monitoring;
pub mod stress;

// Re-exports
pub use crate::core::errors::{StressError, StressResult};
pub use crate::core::sync::{
    BackendType, ExclusiveGuard, ExclusiveLock, RawExclusive, RawShared, ReadGuard, ReadWriteLock,
    WriteGuard,
};
pub use monitoring::init_tracing;
pub use stress::{run_all, StressConfig, StressSummary};
