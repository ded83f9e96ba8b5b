//! yt-dlp backed source
//!
//! Two subprocess calls per fetch:
//! 1. `--dump-single-json --no-playlist` for title and duration
//! 2. `-x --audio-format <fmt>` to download and extract the audio track
//!
//! The download lands in a scratch directory owned by the returned
//! [`FetchedSource`].

use super::decode_in_background;
use crate::error::{FinderError, FinderResult};
use crate::types::{AudioSource, FetchedSource, SourceMetadata};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// yt-dlp invocation settings
#[derive(Debug, Clone, PartialEq)]
pub struct YtDlpSettings {
    /// Executable name or path
    pub binary: String,
    /// Extracted audio format (`-x --audio-format`)
    pub audio_format: String,
    /// Extracted audio quality (`--audio-quality`)
    pub audio_quality: String,
}

impl Default for YtDlpSettings {
    fn default() -> Self {
        Self {
            binary: "yt-dlp".to_string(),
            audio_format: "mp3".to_string(),
            audio_quality: "192K".to_string(),
        }
    }
}

/// Subset of yt-dlp's info JSON
#[derive(Debug, Default, Deserialize)]
struct VideoInfo {
    #[serde(default)]
    title: Option<String>,
    /// Seconds; yt-dlp reports fractional values for some extractors
    #[serde(default)]
    duration: Option<f64>,
}

impl VideoInfo {
    fn into_metadata(self, fallback_duration_ms: u64) -> SourceMetadata {
        let duration_ms = self
            .duration
            .filter(|d| d.is_finite() && *d > 0.0)
            .map(|d| (d * 1000.0).round() as u64)
            .unwrap_or(fallback_duration_ms);
        SourceMetadata {
            title: self
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            duration_ms,
        }
    }
}

/// Fetches audio for any locator yt-dlp understands
pub struct YtDlpSource {
    settings: YtDlpSettings,
    sample_rate: u32,
}

impl YtDlpSource {
    pub fn new(settings: YtDlpSettings, sample_rate: u32) -> Self {
        Self {
            settings,
            sample_rate,
        }
    }

    async fn run(&self, args: &[&str], what: &str) -> FinderResult<Vec<u8>> {
        let output = Command::new(&self.settings.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                FinderError::SourceUnavailable(format!(
                    "Failed to run {}: {}",
                    self.settings.binary, e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FinderError::SourceUnavailable(format!(
                "{} failed ({}): {}",
                what,
                output.status,
                stderr.trim()
            )));
        }
        Ok(output.stdout)
    }

    async fn fetch_info(&self, locator: &str) -> FinderResult<VideoInfo> {
        let stdout = self
            .run(
                &["--dump-single-json", "--no-playlist", "--", locator],
                "Metadata lookup",
            )
            .await?;

        match serde_json::from_slice::<VideoInfo>(&stdout) {
            Ok(info) => Ok(info),
            Err(e) => {
                warn!(locator = locator, error = %e, "Unreadable metadata, using defaults");
                Ok(VideoInfo::default())
            }
        }
    }

    async fn download(&self, locator: &str, dir: &Path) -> FinderResult<std::path::PathBuf> {
        let stem = Uuid::new_v4().to_string();
        let template = dir.join(format!("{}.%(ext)s", stem));
        let template = template.to_string_lossy();

        self.run(
            &[
                "-f",
                "bestaudio/best",
                "-x",
                "--audio-format",
                self.settings.audio_format.as_str(),
                "--audio-quality",
                self.settings.audio_quality.as_str(),
                "--no-playlist",
                "-o",
                template.as_ref(),
                "--",
                locator,
            ],
            "Download",
        )
        .await?;

        let expected = dir.join(format!("{}.{}", stem, self.settings.audio_format));
        if !expected.is_file() {
            return Err(FinderError::SourceUnavailable(format!(
                "Downloaded file not found at {}",
                expected.display()
            )));
        }
        Ok(expected)
    }
}

#[async_trait]
impl AudioSource for YtDlpSource {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn fetch(&self, locator: &str) -> FinderResult<FetchedSource> {
        let info = self.fetch_info(locator).await?;
        debug!(locator = locator, title = ?info.title, duration = ?info.duration, "Fetched metadata");

        let scratch = tempfile::Builder::new()
            .prefix("ytmix-source-")
            .tempdir()
            .map_err(|e| {
                FinderError::SourceUnavailable(format!("Could not create scratch directory: {}", e))
            })?;

        info!(locator = locator, "Downloading audio");
        let path = self.download(locator, scratch.path()).await?;

        let asset = decode_in_background(path, self.sample_rate).await?;
        let metadata = info.into_metadata(asset.duration_ms());

        Ok(FetchedSource::new(asset, metadata).with_scratch(scratch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_parsing() {
        let info: VideoInfo = serde_json::from_str(
            r#"{"id": "abc", "title": "Boiler Room Set", "duration": 3601.5, "formats": []}"#,
        )
        .unwrap();
        let metadata = info.into_metadata(0);
        assert_eq!(metadata.title, "Boiler Room Set");
        assert_eq!(metadata.duration_ms, 3_601_500);
    }

    #[test]
    fn test_info_defaults() {
        let info: VideoInfo = serde_json::from_str(r#"{"title": "  ", "duration": null}"#).unwrap();
        let metadata = info.into_metadata(42_000);
        assert_eq!(metadata.title, "Unknown");
        assert_eq!(metadata.duration_ms, 42_000);
    }

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let settings = YtDlpSettings {
            binary: "/nonexistent/yt-dlp".to_string(),
            ..YtDlpSettings::default()
        };
        let result = YtDlpSource::new(settings, 16_000)
            .fetch("https://www.youtube.com/watch?v=xyz")
            .await;
        match result {
            Err(FinderError::SourceUnavailable(msg)) => assert!(msg.contains("Failed to run")),
            other => panic!("expected SourceUnavailable, got {:?}", other.map(|_| ())),
        }
    }
}
