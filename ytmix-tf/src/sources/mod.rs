//! Audio sources
//!
//! [`SourceRouter`] picks a concrete source per locator:
//! - existing local path → [`LocalFileSource`]
//! - `http(s)` URL ending in a known audio extension → [`HttpSource`]
//! - anything else → [`YtDlpSource`] (YouTube and every other site yt-dlp
//!   understands)
//!
//! All sources decode through [`crate::audio::decode_audio_file`] on the
//! blocking pool and report every fault as `FinderError::SourceUnavailable`.

pub mod http;
pub mod local;
pub mod ytdlp;

pub use http::HttpSource;
pub use local::LocalFileSource;
pub use ytdlp::{YtDlpSettings, YtDlpSource};

use crate::audio::{decode_audio_file, AudioAsset};
use crate::error::{FinderError, FinderResult};
use crate::types::{AudioSource, FetchedSource};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File extensions fetched directly over HTTP instead of through yt-dlp
const DIRECT_AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "m4a", "aac", "wav", "flac", "ogg", "opus", "webm",
];

/// True for `http(s)` URLs whose path ends in a known audio extension
pub fn is_direct_audio_url(locator: &str) -> bool {
    let lower = locator.trim().to_ascii_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return false;
    }
    let path = lower
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let last_segment = path.rsplit('/').next().unwrap_or_default();
    match last_segment.rsplit_once('.') {
        Some((_, ext)) => DIRECT_AUDIO_EXTENSIONS.contains(&ext),
        None => false,
    }
}

/// Decode `path` off the async runtime
pub(crate) async fn decode_in_background(
    path: PathBuf,
    sample_rate: u32,
) -> FinderResult<AudioAsset> {
    debug!(path = %path.display(), sample_rate = sample_rate, "Decoding source audio");
    let display = path.display().to_string();
    tokio::task::spawn_blocking(move || decode_audio_file(&path, sample_rate))
        .await
        .map_err(|e| FinderError::SourceUnavailable(format!("Decode task failed: {}", e)))?
        .map_err(|e| FinderError::SourceUnavailable(format!("Failed to decode {}: {:#}", display, e)))
}

/// Dispatches each locator to the matching concrete source
pub struct SourceRouter {
    local: LocalFileSource,
    http: HttpSource,
    ytdlp: YtDlpSource,
}

impl SourceRouter {
    pub fn new(local: LocalFileSource, http: HttpSource, ytdlp: YtDlpSource) -> Self {
        Self { local, http, ytdlp }
    }

    fn route(&self, locator: &str) -> &dyn AudioSource {
        if Path::new(locator).exists() {
            &self.local
        } else if is_direct_audio_url(locator) {
            &self.http
        } else {
            &self.ytdlp
        }
    }
}

#[async_trait]
impl AudioSource for SourceRouter {
    fn name(&self) -> &'static str {
        "router"
    }

    async fn fetch(&self, locator: &str) -> FinderResult<FetchedSource> {
        let locator = locator.trim();
        if locator.is_empty() {
            return Err(FinderError::SourceUnavailable(
                "Empty source locator".to_string(),
            ));
        }

        let source = self.route(locator);
        debug!(locator = locator, source = source.name(), "Routing source");
        source.fetch(locator).await
    }
}
