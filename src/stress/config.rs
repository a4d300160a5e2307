/*!
 * Stress Configuration
 *
 * Defaults from `core::limits`, overridable through `SYNC_STRESS_*`
 * environment variables.
 */

use crate::core::errors::{StressError, StressResult};
use crate::core::limits::{
    DEFAULT_RENDEZVOUS_TIMEOUT, DEFAULT_STRESS_ITERATIONS, DEFAULT_STRESS_READERS,
    DEFAULT_STRESS_THREADS, DEFAULT_WRITER_HOLD, MAX_STRESS_THREADS,
};
use crate::core::sync::BackendType;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const ENV_THREADS: &str = "SYNC_STRESS_THREADS";
pub const ENV_READERS: &str = "SYNC_STRESS_READERS";
pub const ENV_ITERATIONS: &str = "SYNC_STRESS_ITERATIONS";
pub const ENV_HOLD_MS: &str = "SYNC_STRESS_HOLD_MS";
pub const ENV_TIMEOUT_MS: &str = "SYNC_STRESS_TIMEOUT_MS";
pub const ENV_BACKEND: &str = "SYNC_STRESS_BACKEND";
pub const ENV_REPORT_JSON: &str = "SYNC_STRESS_REPORT_JSON";

/// Stress harness configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StressConfig {
    /// Threads in the exclusive-lock counter scenario
    pub threads: usize,
    /// Reader threads in the reader/writer scenarios
    pub readers: usize,
    /// Lock/unlock cycles per thread
    pub iterations: usize,
    /// How long the writer holds the lock in the exclusion scenario
    pub writer_hold: Duration,
    /// Deadline for readers to meet inside the read section
    pub rendezvous_timeout: Duration,
    /// Backends to exercise
    pub backends: Vec<BackendType>,
    /// Emit the summary as JSON
    pub json: bool,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            threads: DEFAULT_STRESS_THREADS,
            readers: DEFAULT_STRESS_READERS,
            iterations: DEFAULT_STRESS_ITERATIONS,
            writer_hold: DEFAULT_WRITER_HOLD,
            rendezvous_timeout: DEFAULT_RENDEZVOUS_TIMEOUT,
            backends: BackendType::available().to_vec(),
            json: false,
        }
    }
}

impl StressConfig {
    /// Small configuration for unit and CI runs
    pub fn quick() -> Self {
        Self {
            threads: 4,
            readers: 4,
            iterations: 1_000,
            writer_hold: Duration::from_millis(20),
            ..Default::default()
        }
    }

    /// Restrict to a single backend
    pub fn with_backend(mut self, backend: BackendType) -> Self {
        self.backends = vec![backend];
        self
    }

    /// Load from the process environment
    pub fn from_env() -> StressResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (environment, test fixtures)
    pub fn from_lookup<F>(lookup: F) -> StressResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup(ENV_THREADS) {
            config.threads = parse_count(ENV_THREADS, &v)?;
        }
        if let Some(v) = lookup(ENV_READERS) {
            config.readers = parse_count(ENV_READERS, &v)?;
        }
        if let Some(v) = lookup(ENV_ITERATIONS) {
            config.iterations = parse_count(ENV_ITERATIONS, &v)?;
        }
        if let Some(v) = lookup(ENV_HOLD_MS) {
            config.writer_hold = parse_millis(ENV_HOLD_MS, &v)?;
        }
        if let Some(v) = lookup(ENV_TIMEOUT_MS) {
            config.rendezvous_timeout = parse_millis(ENV_TIMEOUT_MS, &v)?;
        }
        if let Some(v) = lookup(ENV_BACKEND) {
            config.backends = parse_backends(&v)?;
        }
        if let Some(v) = lookup(ENV_REPORT_JSON) {
            config.json = parse_flag(ENV_REPORT_JSON, &v)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot run
    pub fn validate(&self) -> StressResult<()> {
        check_threads("threads", self.threads)?;
        check_threads("readers", self.readers)?;
        if self.iterations == 0 {
            return Err(invalid("iterations", "must be at least 1"));
        }
        if self.backends.is_empty() {
            return Err(invalid("backends", "no backend selected"));
        }
        Ok(())
    }
}

fn invalid(key: &str, reason: impl Into<String>) -> StressError {
    StressError::InvalidConfig {
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn check_threads(key: &str, count: usize) -> StressResult<()> {
    if count == 0 {
        return Err(invalid(key, "must be at least 1"));
    }
    if count > MAX_STRESS_THREADS {
        return Err(invalid(key, format!("must not exceed {}", MAX_STRESS_THREADS)));
    }
    Ok(())
}

fn parse_count(key: &str, value: &str) -> StressResult<usize> {
    value
        .trim()
        .parse()
        .map_err(|e| invalid(key, format!("'{}' is not a count: {}", value, e)))
}

fn parse_millis(key: &str, value: &str) -> StressResult<Duration> {
    value
        .trim()
        .parse()
        .map(Duration::from_millis)
        .map_err(|e| invalid(key, format!("'{}' is not milliseconds: {}", value, e)))
}

fn parse_flag(key: &str, value: &str) -> StressResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        _ => Err(invalid(key, format!("'{}' is not a boolean", value))),
    }
}

fn parse_backends(value: &str) -> StressResult<Vec<BackendType>> {
    if value.trim().eq_ignore_ascii_case("all") {
        return Ok(BackendType::available().to_vec());
    }

    let mut backends = Vec::new();
    for name in value.split(',').filter(|s| !s.trim().is_empty()) {
        let backend: BackendType = name.parse()?;
        if !backends.contains(&backend) {
            backends.push(backend);
        }
    }
    Ok(backends)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_overrides() {
        let config = StressConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, StressConfig::default());
        assert_eq!(config.readers, 8);
        assert_eq!(config.iterations, 10_000);
    }

    #[test]
    fn test_overrides() {
        let config = StressConfig::from_lookup(lookup(&[
            (ENV_THREADS, "3"),
            (ENV_HOLD_MS, "250"),
            (ENV_BACKEND, "parking_lot, critical_section"),
            (ENV_REPORT_JSON, "true"),
        ]))
        .unwrap();

        assert_eq!(config.threads, 3);
        assert_eq!(config.writer_hold, Duration::from_millis(250));
        assert_eq!(
            config.backends,
            vec![BackendType::ParkingLot, BackendType::CriticalSection]
        );
        assert!(config.json);
    }

    #[test]
    fn test_bad_count() {
        let err = StressConfig::from_lookup(lookup(&[(ENV_ITERATIONS, "lots")])).unwrap_err();
        assert!(matches!(err, StressError::InvalidConfig { ref key, .. } if key == ENV_ITERATIONS));
    }

    #[test]
    fn test_zero_readers_rejected() {
        let err = StressConfig::from_lookup(lookup(&[(ENV_READERS, "0")])).unwrap_err();
        assert!(matches!(err, StressError::InvalidConfig { ref key, .. } if key == "readers"));
    }

    #[test]
    fn test_thread_cap() {
        let config = StressConfig {
            threads: MAX_STRESS_THREADS + 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_backend() {
        let err = StressConfig::from_lookup(lookup(&[(ENV_BACKEND, "spinlock")])).unwrap_err();
        assert_eq!(err, StressError::UnknownBackend("spinlock".into()));
    }

    #[test]
    fn test_all_backends() {
        let config = StressConfig::from_lookup(lookup(&[(ENV_BACKEND, "ALL")])).unwrap();
        assert_eq!(config.backends, BackendType::available().to_vec());
    }
}
