//! SongRec recognizer adapter
//!
//! Submits windows to the Shazam service through the `songrec` CLI
//! (`songrec audio-file-to-recognized-song <file>`), which prints the raw
//! Shazam JSON response on stdout.
//!
//! The payload shape is not stable: every field is read defensively and
//! defaulted when missing or of the wrong type. A payload without a `track`
//! object means "no match".
//!
//! # Requirements
//! - `songrec` on PATH (or configured as an absolute path)
//! - Network connectivity to the Shazam service

use crate::error::RecognitionFailure;
use crate::types::{Identification, Recognizer, Window};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::debug;

/// Default recognizer executable
pub const DEFAULT_SONGREC_BINARY: &str = "songrec";

/// Default per-window timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const UNKNOWN_TITLE: &str = "Unknown";
const UNKNOWN_ARTIST: &str = "Unknown Artist";
const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Recognizer backed by the `songrec` command-line client
///
/// Owns a scratch directory for window WAV files; it is removed when the
/// recognizer is dropped at the end of the run.
pub struct SongRecRecognizer {
    binary: String,
    timeout: Duration,
    scratch: TempDir,
}

impl SongRecRecognizer {
    /// Create recognizer with its own scratch directory
    pub fn new(binary: impl Into<String>, timeout: Duration) -> std::io::Result<Self> {
        let scratch = tempfile::Builder::new().prefix("ytmix-windows-").tempdir()?;
        Ok(Self {
            binary: binary.into(),
            timeout,
            scratch,
        })
    }

    fn clip_path(&self, window: &Window) -> PathBuf {
        self.scratch
            .path()
            .join(format!("window_{:010}.wav", window.start_ms))
    }

    async fn run_songrec(&self, clip_path: &Path) -> Result<Value, RecognitionFailure> {
        let child = Command::new(&self.binary)
            .arg("audio-file-to-recognized-song")
            .arg(clip_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                RecognitionFailure::Provider(format!("failed to start {}: {}", self.binary, e))
            })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| RecognitionFailure::Timeout(self.timeout))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RecognitionFailure::Provider(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                stderr.trim()
            )));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| RecognitionFailure::Payload(e.to_string()))
    }
}

#[async_trait]
impl Recognizer for SongRecRecognizer {
    fn name(&self) -> &'static str {
        "songrec"
    }

    async fn recognize(
        &self,
        window: &Window,
    ) -> Result<Option<Identification>, RecognitionFailure> {
        let clip_path = self.clip_path(window);
        window
            .clip
            .write_wav(&clip_path)
            .map_err(|e| RecognitionFailure::Io(e.to_string()))?;

        debug!(
            start_ms = window.start_ms,
            path = %clip_path.display(),
            "Submitting window to songrec"
        );

        let payload = self.run_songrec(&clip_path).await;

        if let Err(e) = tokio::fs::remove_file(&clip_path).await {
            debug!(path = %clip_path.display(), error = %e, "Could not remove window clip");
        }

        Ok(identification_from_payload(&payload?))
    }
}

/// Extract an [`Identification`] from a Shazam-style payload
///
/// Returns `None` when the payload carries no `track` object.
pub fn identification_from_payload(payload: &Value) -> Option<Identification> {
    let track = payload.get("track").filter(|t| t.is_object())?;

    let album = track
        .pointer("/sections/0/metadata/0/text")
        .and_then(non_empty_str)
        .unwrap_or(UNKNOWN_ALBUM);

    Some(Identification {
        title: string_field(track, "title").unwrap_or(UNKNOWN_TITLE).to_string(),
        artist: string_field(track, "subtitle")
            .unwrap_or(UNKNOWN_ARTIST)
            .to_string(),
        album: album.to_string(),
        external_ref: string_field(track, "url").unwrap_or_default().to_string(),
        provider_key: key_field(track),
        raw: payload.clone(),
    })
}

fn string_field<'a>(object: &'a Value, name: &str) -> Option<&'a str> {
    object.get(name).and_then(non_empty_str)
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty())
}

/// Track key as a string; Shazam has served it both quoted and numeric
fn key_field(track: &Value) -> String {
    match track.get("key") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}
