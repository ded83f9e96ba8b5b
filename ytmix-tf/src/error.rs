//! Error types for ytmix-tf
//!
//! Two families:
//! - [`FinderError`]: run-level errors. `SourceUnavailable` aborts a run, as
//!   does `Cancelled` before any window was processed;
//!   `ExportFailure` is reported after the tracklist is already computed.
//! - [`RecognitionFailure`]: per-window faults. Never leaves the
//!   identification pipeline; each one becomes an absent identification.

use std::time::Duration;
use thiserror::Error;

/// Run-level error type
#[derive(Debug, Error)]
pub enum FinderError {
    /// Locator could not be resolved, downloaded or decoded (fatal to the run)
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// Persisting the final result failed
    #[error("Export failed: {0}")]
    ExportFailure(String),

    /// Configuration rejected during resolution or validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Run was cancelled while fetching or before the first window finished
    #[error("Cancelled before any window was processed")]
    Cancelled,
}

/// Result type for run-level operations
pub type FinderResult<T> = Result<T, FinderError>;

/// A single window's recognition attempt failed
#[derive(Debug, Error)]
pub enum RecognitionFailure {
    /// Recognition call did not finish in time
    #[error("Recognition timed out after {0:?}")]
    Timeout(Duration),

    /// Provider process or service reported an error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider answered with something that is not a usable payload
    #[error("Malformed payload: {0}")]
    Payload(String),

    /// Local I/O while preparing the window for the provider
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for RecognitionFailure {
    fn from(e: std::io::Error) -> Self {
        RecognitionFailure::Io(e.to_string())
    }
}
