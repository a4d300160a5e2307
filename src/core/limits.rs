/*!
 * Stress Limits and Defaults
 *
 * Defaults for the lock stress harness, grouped by scenario.
 *
 * ## Conventions
 * - Values that trade run time for coverage are marked with [PERF]
 * - Environment overrides live in `stress::config`
 */

use std::time::Duration;

// =============================================================================
// EXCLUSIVE LOCK SCENARIOS
// =============================================================================

/// Worker threads hammering one ExclusiveLock
pub const DEFAULT_STRESS_THREADS: usize = 8;

/// Lock/unlock cycles per thread
/// [PERF] 10k keeps a debug build under a second per backend
pub const DEFAULT_STRESS_ITERATIONS: usize = 10_000;

// =============================================================================
// READER/WRITER SCENARIOS
// =============================================================================

/// Reader threads contending with the single writer
pub const DEFAULT_STRESS_READERS: usize = 8;

/// How long the writer sits on the write lock in the exclusion scenario
pub const DEFAULT_WRITER_HOLD: Duration = Duration::from_millis(100);

/// Deadline for all readers to be inside the read section together
/// Generous so loaded CI machines do not report false serialization
pub const DEFAULT_RENDEZVOUS_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on any thread count accepted from configuration
/// [SECURITY] Stops a typo in an env var from spawning thousands of threads
pub const MAX_STRESS_THREADS: usize = 256;
