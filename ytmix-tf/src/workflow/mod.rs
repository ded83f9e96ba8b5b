//! Track-finding workflow
//!
//! Sequential run pipeline:
//! 1. Fetch and decode the source ([`crate::types::AudioSource`])
//! 2. Slice it into candidate windows ([`sampler`])
//! 3. Recognize each window, one call at a time ([`pipeline`])
//! 4. Collapse the raw timeline into track segments ([`deduplicator`])
//!
//! [`finder::TrackFinder`] drives the whole run and reports progress through
//! [`FinderEvent`]s.

pub mod deduplicator;
pub mod finder;
pub mod pipeline;
pub mod sampler;

pub use deduplicator::{deduplicate, AbsencePolicy};
pub use finder::TrackFinder;
pub use pipeline::IdentificationPipeline;
pub use sampler::{Sampler, SamplingParams};

use serde::{Deserialize, Serialize};

/// Run progress events, delivered in order as they happen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FinderEvent {
    /// Source resolution/download started
    SourceFetching {
        /// Locator as given by the user
        locator: String,
    },

    /// Source decoded and ready for sampling
    SourceReady {
        /// Title reported by the source
        title: String,
        /// Duration reported by the source (milliseconds)
        duration_ms: u64,
    },

    /// Windows computed for the decoded source
    WindowsPlanned {
        /// Number of windows that will be submitted
        total: usize,
    },

    /// Recognition of a window started
    WindowStarted {
        /// Window index (0-based)
        index: usize,
        total: usize,
        start_ms: u64,
    },

    /// Window recognized
    WindowIdentified {
        index: usize,
        start_ms: u64,
        title: String,
        artist: String,
    },

    /// Provider had no match for the window
    WindowUnidentified { index: usize, start_ms: u64 },

    /// Recognition call failed; recorded as unidentified
    WindowFailed {
        index: usize,
        start_ms: u64,
        /// Failure description
        message: String,
    },

    /// Run stopped early; collected windows are still used
    Cancelled {
        /// Windows processed before cancellation
        processed: usize,
        total: usize,
    },

    /// Run finished and deduplicated
    RunCompleted {
        /// Number of track segments found
        segments: usize,
    },
}
