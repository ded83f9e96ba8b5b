//! JSON result export
//!
//! Writes one pretty-printed JSON document per run to
//! `<output_dir>/song_results_YYYYMMDD_HHMMSS.json`, stamped with the run's
//! `processed_at` time.

use crate::error::{FinderError, FinderResult};
use crate::types::{ResultExporter, RunResult, TrackSegment};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use ytmix_common::human_time::format_timestamp_ms;

/// Persisted form of a run
#[derive(Debug, Serialize)]
struct ExportRecord<'a> {
    source: &'a str,
    source_title: &'a str,
    source_duration_ms: u64,
    /// RFC 3339 local time
    processed_at: String,
    complete: bool,
    windows_processed: usize,
    windows_identified: usize,
    total_songs: usize,
    songs: Vec<ExportedSong<'a>>,
}

#[derive(Debug, Serialize)]
struct ExportedSong<'a> {
    timestamp: u64,
    timestamp_formatted: String,
    title: &'a str,
    artist: &'a str,
    album: &'a str,
    external_ref: &'a str,
    provider_key: &'a str,
    raw: &'a serde_json::Value,
}

impl<'a> From<&'a TrackSegment> for ExportedSong<'a> {
    fn from(segment: &'a TrackSegment) -> Self {
        let id = &segment.identification;
        Self {
            timestamp: segment.start_ms,
            timestamp_formatted: format_timestamp_ms(segment.start_ms),
            title: &id.title,
            artist: &id.artist,
            album: &id.album,
            external_ref: &id.external_ref,
            provider_key: &id.provider_key,
            raw: &id.raw,
        }
    }
}

impl<'a> From<&'a RunResult> for ExportRecord<'a> {
    fn from(result: &'a RunResult) -> Self {
        Self {
            source: &result.source,
            source_title: &result.metadata.title,
            source_duration_ms: result.metadata.duration_ms,
            processed_at: result.processed_at.to_rfc3339(),
            complete: result.complete,
            windows_processed: result.windows_processed,
            windows_identified: result.windows_identified,
            total_songs: result.total_songs(),
            songs: result.segments.iter().map(ExportedSong::from).collect(),
        }
    }
}

/// Writes run results as JSON files into a directory
pub struct JsonExporter {
    output_dir: PathBuf,
}

impl JsonExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Target file for a given run
    pub fn file_path(&self, result: &RunResult) -> PathBuf {
        self.output_dir.join(format!(
            "song_results_{}.json",
            result.processed_at.format("%Y%m%d_%H%M%S")
        ))
    }
}

impl ResultExporter for JsonExporter {
    /// Returns the written file's path
    fn export(&self, result: &RunResult) -> FinderResult<String> {
        let path = self.file_path(result);
        let json = serde_json::to_string_pretty(&ExportRecord::from(result))
            .map_err(|e| FinderError::ExportFailure(format!("Serialization failed: {}", e)))?;

        std::fs::create_dir_all(&self.output_dir).map_err(|e| {
            FinderError::ExportFailure(format!(
                "Could not create {}: {}",
                self.output_dir.display(),
                e
            ))
        })?;
        std::fs::write(&path, json).map_err(|e| {
            FinderError::ExportFailure(format!("Could not write {}: {}", path.display(), e))
        })?;

        info!(path = %path.display(), songs = result.total_songs(), "Exported results");
        Ok(path.display().to_string())
    }
}
