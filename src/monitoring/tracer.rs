/*!
 * Structured Tracing
 * Subscriber setup and scenario spans for the stress harness
 */

use std::time::{Duration, Instant};
use tracing::{debug, info, span, Level};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - SYNC_TRACE_JSON: Enable JSON output (default: false)
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("SYNC_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .init();
        info!("Structured tracing initialized with JSON output");
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .init();
        info!("Structured tracing initialized");
    }
}

/// Span covering one scenario run against one backend
pub struct ScenarioSpan {
    span: tracing::Span,
    start: Instant,
}

impl ScenarioSpan {
    pub fn new(scenario: &'static str, backend: &'static str) -> Self {
        let span = span!(
            Level::INFO,
            "scenario",
            scenario = scenario,
            backend = backend,
            duration_ms = tracing::field::Empty,
            result = tracing::field::Empty,
            error = tracing::field::Empty,
        );

        let _entered = span.enter();
        debug!(scenario, backend, "scenario started");
        drop(_entered);

        Self {
            span,
            start: Instant::now(),
        }
    }

    /// The underlying span, for entering from worker threads
    pub fn span(&self) -> &tracing::Span {
        &self.span
    }

    /// Time since the span was opened
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Record the scenario outcome and close out timing
    pub fn finish(self, error: Option<&str>) -> Duration {
        let elapsed = self.start.elapsed();
        self.span.record("duration_ms", elapsed.as_millis() as u64);
        match error {
            None => {
                self.span.record("result", "success");
            }
            Some(e) => {
                self.span.record("result", "error");
                self.span.record("error", e);
            }
        }
        elapsed
    }
}

/// Helper to open a scenario span
#[inline]
pub fn span_scenario(scenario: &'static str, backend: &'static str) -> ScenarioSpan {
    ScenarioSpan::new(scenario, backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_span_timing() {
        let span = span_scenario("counter", "parking_lot");
        std::thread::sleep(Duration::from_millis(5));
        let elapsed = span.finish(None);
        assert!(elapsed >= Duration::from_millis(5));
    }
}
