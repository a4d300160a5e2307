/*!
 * Lock Stress Harness
 *
 * Runs the mutual-exclusion scenarios against every configured backend.
 * Backend selection here is a runtime `BackendType`; each arm monomorphizes
 * the generic scenario for that backend's raw lock type.
 */

mod config;
mod report;
mod scenarios;

pub use config::{
    StressConfig, ENV_BACKEND, ENV_HOLD_MS, ENV_ITERATIONS, ENV_READERS, ENV_REPORT_JSON,
    ENV_THREADS, ENV_TIMEOUT_MS,
};
pub use report::{ScenarioReport, StressSummary};
pub use scenarios::{concurrent_readers, counter, reader_writer, write_exclusion, Scenario};

use crate::core::errors::{StressError, StressResult};
use crate::core::sync::backend::{CriticalSection, ParkingMutex, ParkingRwLock};
#[cfg(unix)]
use crate::core::sync::backend::{PthreadMutex, PthreadRwLock};
use crate::core::sync::BackendType;
use tracing::{debug, info, warn};

/// Run one scenario on one backend
pub fn run_scenario(
    scenario: Scenario,
    backend: BackendType,
    config: &StressConfig,
) -> StressResult<ScenarioReport> {
    if scenario.is_shared() && !backend.supports_shared() {
        return Err(StressError::UnsupportedBackend {
            backend: backend.to_string(),
            scenario: scenario.name().to_string(),
        });
    }

    match (scenario, backend) {
        (Scenario::Counter, BackendType::CriticalSection) => counter::<CriticalSection>(config),
        #[cfg(unix)]
        (Scenario::Counter, BackendType::Pthread) => counter::<PthreadMutex>(config),
        (Scenario::Counter, BackendType::ParkingLot) => counter::<ParkingMutex>(config),
        #[cfg(unix)]
        (_, BackendType::Pthread) => scenario.run_shared::<PthreadRwLock>(config),
        (_, BackendType::ParkingLot) => scenario.run_shared::<ParkingRwLock>(config),
        (_, BackendType::CriticalSection) => unreachable!("rejected above"),
    }
}

/// Run every applicable scenario on every configured backend
///
/// Scenarios that need shared acquisition are skipped for exclusive-only
/// backends rather than reported as failures.
pub fn run_all(config: &StressConfig) -> StressResult<StressSummary> {
    config.validate()?;

    info!(
        backends = ?config.backends,
        threads = config.threads,
        readers = config.readers,
        iterations = config.iterations,
        "Starting lock stress run"
    );

    let mut summary = StressSummary::default();
    for &backend in &config.backends {
        for scenario in Scenario::ALL {
            if scenario.is_shared() && !backend.supports_shared() {
                debug!(%backend, scenario = scenario.name(), "skipping shared scenario");
                continue;
            }
            summary.record(run_scenario(scenario, backend, config));
        }
    }

    if summary.is_success() {
        info!(passed = summary.reports.len(), "Lock stress run passed");
    } else {
        warn!(
            passed = summary.reports.len(),
            failed = summary.failures.len(),
            "Lock stress run found violations"
        );
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_scenario_rejects_critical_section() {
        let err = run_scenario(
            Scenario::ReaderWriter,
            BackendType::CriticalSection,
            &StressConfig::quick(),
        )
        .unwrap_err();
        assert!(matches!(err, StressError::UnsupportedBackend { .. }));
    }

    #[test]
    fn test_run_all_skips_unsupported() {
        let config = StressConfig::quick().with_backend(BackendType::CriticalSection);
        let summary = run_all(&config).unwrap();
        assert!(summary.is_success());
        assert_eq!(summary.reports.len(), 1);
        assert_eq!(summary.reports[0].scenario, "counter");
    }

    #[test]
    fn test_run_all_rejects_invalid_config() {
        let config = StressConfig {
            iterations: 0,
            ..StressConfig::quick()
        };
        assert!(run_all(&config).is_err());
    }
}
