//! Core Types and Trait Definitions for ytmix-tf
//!
//! Data model of one run plus the three collaborator seams:
//! - [`AudioSource`]: locator → decoded [`AudioAsset`]
//! - [`Recognizer`]: [`Window`] → identification (or none)
//! - [`ResultExporter`]: [`RunResult`] → persisted record
//!
//! Real implementations live in `sources`, `recognizers` and `export`;
//! tests substitute deterministic fakes.

use crate::audio::{AudioAsset, AudioClip};
use crate::error::{FinderResult, RecognitionFailure};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

// ============================================================================
// Data Model
// ============================================================================

/// Candidate excerpt handed to the recognizer
///
/// Only constructed by the sampler, which guarantees the clip is at least
/// the configured minimum window length.
#[derive(Debug, Clone)]
pub struct Window {
    /// Offset of the clip within the source
    pub start_ms: u64,
    /// Transient copy of the source audio for `[start_ms, start_ms + len)`
    pub clip: AudioClip,
}

/// Best-guess track identity returned by the recognition provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identification {
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Provider-side link for the track (may be empty)
    pub external_ref: String,
    /// Stable provider identity used for deduplication (may be empty)
    pub provider_key: String,
    /// Unmodified provider payload
    pub raw: serde_json::Value,
}

impl Identification {
    /// Two identifications are the same song iff their provider keys are
    /// equal and non-empty.
    pub fn same_song(&self, other: &Identification) -> bool {
        !self.provider_key.is_empty() && self.provider_key == other.provider_key
    }
}

/// Raw, un-deduplicated recognition result for one window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecognitionEvent {
    pub start_ms: u64,
    /// `None` when the window was not recognized or recognition failed
    pub identification: Option<Identification>,
}

/// One contiguous "song is playing" run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackSegment {
    pub start_ms: u64,
    pub identification: Identification,
}

/// Result of a window's recognition attempt, as seen by the pipeline
///
/// Built from the provider adapter's `Result`; faults are values here, so the
/// pipeline only has to pattern-match.
#[derive(Debug)]
pub enum RecognitionOutcome {
    Identified(Identification),
    Unrecognized,
    Failed(RecognitionFailure),
}

impl From<Result<Option<Identification>, RecognitionFailure>> for RecognitionOutcome {
    fn from(result: Result<Option<Identification>, RecognitionFailure>) -> Self {
        match result {
            Ok(Some(identification)) => RecognitionOutcome::Identified(identification),
            Ok(None) => RecognitionOutcome::Unrecognized,
            Err(failure) => RecognitionOutcome::Failed(failure),
        }
    }
}

/// Descriptive metadata reported by the source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceMetadata {
    pub title: String,
    pub duration_ms: u64,
}

/// Durable output of one run
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    /// Locator the run was started with
    pub source: String,
    pub metadata: SourceMetadata,
    /// Set when the result is finalized
    pub processed_at: DateTime<Local>,
    /// Windows submitted for recognition
    pub windows_processed: usize,
    /// Windows that came back with an identification
    pub windows_identified: usize,
    /// `false` when the run was cancelled before every window was processed
    pub complete: bool,
    pub segments: Vec<TrackSegment>,
}

impl RunResult {
    /// Seal a run's output, stamping `processed_at` with the current time
    pub fn finalize(
        source: impl Into<String>,
        metadata: SourceMetadata,
        events: &[RecognitionEvent],
        complete: bool,
        segments: Vec<TrackSegment>,
    ) -> Self {
        Self {
            source: source.into(),
            metadata,
            processed_at: Local::now(),
            windows_processed: events.len(),
            windows_identified: events
                .iter()
                .filter(|e| e.identification.is_some())
                .count(),
            complete,
            segments,
        }
    }

    pub fn total_songs(&self) -> usize {
        self.segments.len()
    }
}

// ============================================================================
// Collaborator Seams
// ============================================================================

/// Decoded source plus the scratch space backing it
///
/// Dropping this releases everything the fetch created on disk.
#[derive(Debug)]
pub struct FetchedSource {
    pub asset: AudioAsset,
    pub metadata: SourceMetadata,
    scratch: Option<TempDir>,
}

impl FetchedSource {
    pub fn new(asset: AudioAsset, metadata: SourceMetadata) -> Self {
        Self {
            asset,
            metadata,
            scratch: None,
        }
    }

    /// Tie a scratch directory's lifetime to this source
    pub fn with_scratch(mut self, scratch: TempDir) -> Self {
        self.scratch = Some(scratch);
        self
    }
}

/// Resolves a locator (URL or path) into decoded audio
///
/// Any failure is `FinderError::SourceUnavailable`, which is fatal to the run.
#[async_trait::async_trait]
pub trait AudioSource: Send + Sync {
    /// Source name for logging
    fn name(&self) -> &'static str;

    async fn fetch(&self, locator: &str) -> FinderResult<FetchedSource>;
}

/// Recognition provider adapter
///
/// Implementations map every provider fault to a [`RecognitionFailure`]
/// (timeouts included) and must not panic; the pipeline turns failures into
/// absent identifications and carries on.
#[async_trait::async_trait]
pub trait Recognizer: Send + Sync {
    /// Recognizer name for logging
    fn name(&self) -> &'static str;

    async fn recognize(&self, window: &Window)
        -> Result<Option<Identification>, RecognitionFailure>;
}

/// Persists a finished run and reports where it went
pub trait ResultExporter: Send + Sync {
    fn export(&self, result: &RunResult) -> FinderResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(key: &str) -> Identification {
        Identification {
            title: "Song".to_string(),
            artist: "Artist".to_string(),
            album: "Album".to_string(),
            external_ref: String::new(),
            provider_key: key.to_string(),
            raw: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_same_song_requires_non_empty_key() {
        assert!(ident("123").same_song(&ident("123")));
        assert!(!ident("123").same_song(&ident("456")));
        assert!(!ident("").same_song(&ident("")));
    }

    #[test]
    fn test_outcome_from_result() {
        let identified: RecognitionOutcome = Ok(Some(ident("1"))).into();
        assert!(matches!(identified, RecognitionOutcome::Identified(_)));

        let unrecognized: RecognitionOutcome = Ok(None).into();
        assert!(matches!(unrecognized, RecognitionOutcome::Unrecognized));

        let failed: RecognitionOutcome =
            Err(RecognitionFailure::Provider("boom".to_string())).into();
        assert!(matches!(failed, RecognitionOutcome::Failed(_)));
    }

    #[test]
    fn test_scratch_lives_as_long_as_source() {
        let scratch = tempfile::tempdir().unwrap();
        let dir = scratch.path().to_path_buf();
        let fetched = FetchedSource::new(
            AudioAsset::from_samples(vec![0; 16_000], 16_000),
            SourceMetadata {
                title: "Mix".to_string(),
                duration_ms: 1_000,
            },
        )
        .with_scratch(scratch);

        assert!(dir.is_dir());
        drop(fetched);
        assert!(!dir.exists());
    }

    #[test]
    fn test_finalize_counts_windows() {
        let events = vec![
            RecognitionEvent {
                start_ms: 0,
                identification: Some(ident("a")),
            },
            RecognitionEvent {
                start_ms: 30_000,
                identification: None,
            },
        ];
        let metadata = SourceMetadata {
            title: "Mix".to_string(),
            duration_ms: 60_000,
        };

        let result = RunResult::finalize("mix.mp3", metadata, &events, true, Vec::new());
        assert_eq!(result.windows_processed, 2);
        assert_eq!(result.windows_identified, 1);
        assert_eq!(result.total_songs(), 0);
        assert!(result.complete);
    }
}
