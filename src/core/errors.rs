/*!
 * Error Types
 * Stress harness errors with thiserror, miette, and serde support
 *
 * The lock primitives themselves have no error path; everything here comes
 * from configuring or verifying them.
 */

use crate::core::sync::ParseBackendError;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for stress operations
pub type StressResult<T> = Result<T, StressError>;

/// Stress harness errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum StressError {
    #[error("Invalid configuration for {key}: {reason}")]
    #[diagnostic(
        code(stress::invalid_config),
        help("Check the SYNC_STRESS_* environment variables.")
    )]
    InvalidConfig { key: String, reason: String },

    #[error("Unknown lock backend: {0}")]
    #[diagnostic(
        code(stress::unknown_backend),
        help("Use critical_section, pthread, parking_lot, or all.")
    )]
    UnknownBackend(String),

    #[error("Backend {backend} does not support {scenario}")]
    #[diagnostic(
        code(stress::unsupported_backend),
        help("Critical sections are exclusive only; pick a reader/writer backend.")
    )]
    UnsupportedBackend { backend: String, scenario: String },

    #[error("Lost updates on {backend}: expected {expected}, observed {observed}")]
    #[diagnostic(
        code(stress::lost_updates),
        help("Two threads were inside the exclusive section at once.")
    )]
    LostUpdates {
        backend: String,
        expected: u64,
        observed: u64,
    },

    #[error("Reader/writer overlap on {backend}: {violations} violations")]
    #[diagnostic(
        code(stress::reader_writer_overlap),
        help("A reader observed an active writer, or a writer observed active readers.")
    )]
    ReaderWriterOverlap { backend: String, violations: u64 },

    #[error("Readers serialized on {backend}: only {reached} of {expected} inside together")]
    #[diagnostic(
        code(stress::readers_serialized),
        help("Shared acquisition did not admit concurrent readers before the deadline.")
    )]
    ReadersSerialized {
        backend: String,
        reached: usize,
        expected: usize,
    },

    #[error("Writer did not exclude reader on {backend}")]
    #[diagnostic(
        code(stress::writer_not_exclusive),
        help("lock_read returned before the writer called unlock_write.")
    )]
    WriterNotExclusive { backend: String },

    #[error("Worker thread panicked: {0}")]
    #[diagnostic(
        code(stress::worker_panicked),
        help("A scenario thread panicked. Run with RUST_LOG=debug for details.")
    )]
    WorkerPanicked(String),
}

impl From<ParseBackendError> for StressError {
    fn from(err: ParseBackendError) -> Self {
        StressError::UnknownBackend(err.0)
    }
}

impl StressError {
    /// Whether the error reports a broken locking invariant rather than bad input
    pub fn is_violation(&self) -> bool {
        matches!(
            self,
            StressError::LostUpdates { .. }
                | StressError::ReaderWriterOverlap { .. }
                | StressError::ReadersSerialized { .. }
                | StressError::WriterNotExclusive { .. }
        )
    }
}
