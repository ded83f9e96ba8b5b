//! Local audio file source

use super::decode_in_background;
use crate::error::{FinderError, FinderResult};
use crate::types::{AudioSource, FetchedSource, SourceMetadata};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

/// Decodes a file already on disk; title is the file stem
pub struct LocalFileSource {
    sample_rate: u32,
}

impl LocalFileSource {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }
}

#[async_trait]
impl AudioSource for LocalFileSource {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn fetch(&self, locator: &str) -> FinderResult<FetchedSource> {
        let path = PathBuf::from(locator);
        if !path.is_file() {
            return Err(FinderError::SourceUnavailable(format!(
                "Not a file: {}",
                path.display()
            )));
        }

        let asset = decode_in_background(path.clone(), self.sample_rate).await?;
        let title = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| locator.to_string());

        info!(path = %path.display(), duration_ms = asset.duration_ms(), "Decoded local file");

        let metadata = SourceMetadata {
            title,
            duration_ms: asset.duration_ms(),
        };
        Ok(FetchedSource::new(asset, metadata))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_tone(path: &std::path::Path, seconds: u32) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..16_000 * seconds {
            let t = i as f32 / 16_000.0;
            let sample = (t * 440.0 * std::f32::consts::TAU).sin() * 8_000.0;
            writer.write_sample(sample as i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[tokio::test]
    async fn test_fetch_local_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("friday_set.wav");
        write_tone(&path, 2);

        let fetched = LocalFileSource::new(16_000)
            .fetch(path.to_str().unwrap())
            .await
            .unwrap();

        assert_eq!(fetched.metadata.title, "friday_set");
        assert_eq!(fetched.metadata.duration_ms, 2_000);
        assert_eq!(fetched.asset.sample_rate(), 16_000);
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let result = LocalFileSource::new(16_000)
            .fetch("/nonexistent/mix.wav")
            .await;
        assert!(matches!(result, Err(FinderError::SourceUnavailable(_))));
    }

    #[tokio::test]
    async fn test_garbage_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.wav");
        std::fs::write(&path, b"definitely not audio").unwrap();

        let result = LocalFileSource::new(16_000)
            .fetch(path.to_str().unwrap())
            .await;
        assert!(matches!(result, Err(FinderError::SourceUnavailable(_))));
    }
}
