/*!
 * lockstress - Lock Stress Runner
 *
 * Runs every stress scenario against every selected backend and exits
 * non-zero if any mutual-exclusion property was violated.
 *
 * Configuration comes from SYNC_STRESS_* environment variables; see
 * `StressConfig::from_env`.
 */

use harness_sync::{init_tracing, run_all, BackendType, StressConfig};
use miette::{miette, IntoDiagnostic, Result};
use tracing::{error, info};

fn main() -> Result<()> {
    init_tracing();

    info!("lockstress starting...");
    info!(
        exclusive = %BackendType::default_exclusive(),
        shared = %BackendType::default_shared(),
        "Default backends for this build"
    );

    let config = StressConfig::from_env()?;
    let summary = run_all(&config)?;

    if config.json {
        println!("{}", summary.to_json().into_diagnostic()?);
    } else {
        for report in &summary.reports {
            info!(
                scenario = %report.scenario,
                backend = %report.backend,
                threads = report.threads,
                iterations = report.iterations,
                elapsed_ms = report.elapsed_ms,
                max_concurrent_readers = report.max_concurrent_readers,
                "passed"
            );
        }
        for failure in &summary.failures {
            error!(error = %failure, "failed");
        }
    }

    if let Some(first) = summary.failures.first() {
        return Err(miette!(
            "{} scenario(s) failed, first: {}",
            summary.failures.len(),
            first
        ));
    }

    info!("lockstress finished: all scenarios passed");
    Ok(())
}
