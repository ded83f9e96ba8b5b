//! ytmix-tf - Mix Tracklist Finder
//!
//! Identifies the songs played in a long audio/video mix: the source is
//! fetched and decoded once, sliced into short windows at a fixed stride,
//! each window is fingerprinted by an external recognition service, and the
//! raw timeline is collapsed into a timestamped tracklist.
//!
//! **Module layout:**
//! - [`sources`]: locator → decoded audio (local file, direct HTTP, yt-dlp)
//! - [`audio`]: decoding, resampling and clip extraction
//! - [`workflow`]: sampling, sequential identification, deduplication
//! - [`recognizers`]: recognition provider adapters (songrec)
//! - [`export`]: JSON result files
//! - [`tracklist`]: terminal output
//! - [`config`]: CLI/ENV/TOML/default resolution

pub mod audio;
pub mod config;
pub mod error;
pub mod export;
pub mod recognizers;
pub mod sources;
pub mod tracklist;
pub mod types;
pub mod workflow;

pub use config::{ConfigOverrides, FinderConfig};
pub use error::{FinderError, FinderResult, RecognitionFailure};
pub use types::{
    AudioSource, FetchedSource, Identification, RecognitionEvent, RecognitionOutcome,
    Recognizer, ResultExporter, RunResult, SourceMetadata, TrackSegment, Window,
};
pub use workflow::finder::RunSettings;
pub use workflow::{FinderEvent, TrackFinder};
