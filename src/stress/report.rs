/*!
 * Stress Reports
 * Serializable results for one scenario run and for a whole sweep
 */

use crate::core::errors::StressError;
use serde::{Deserialize, Serialize};

/// Outcome of one scenario against one backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub scenario: String,
    pub backend: String,
    pub threads: usize,
    pub iterations: usize,
    pub elapsed_ms: u64,
    /// Highest reader count seen inside the read section (0 for exclusive scenarios)
    pub max_concurrent_readers: usize,
    pub violations: u64,
}

/// Results of `run_all`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StressSummary {
    pub reports: Vec<ScenarioReport>,
    pub failures: Vec<StressError>,
}

impl StressSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn record(&mut self, outcome: Result<ScenarioReport, StressError>) {
        match outcome {
            Ok(report) => self.reports.push(report),
            Err(err) => self.failures.push(err),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
