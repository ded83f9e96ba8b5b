//! Deterministic stand-ins for the network-facing collaborators

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use ytmix_tf::audio::AudioAsset;
use ytmix_tf::{
    AudioSource, FetchedSource, FinderError, FinderResult, Identification, RecognitionFailure,
    Recognizer, SourceMetadata, Window,
};

pub fn ident(key: &str) -> Identification {
    Identification {
        title: format!("Song {}", key),
        artist: format!("Artist {}", key),
        album: "Unknown Album".to_string(),
        external_ref: String::new(),
        provider_key: key.to_string(),
        raw: serde_json::json!({ "track": { "key": key } }),
    }
}

/// Source that hands out a prepared asset, or fails
pub struct FakeSource {
    asset: Mutex<Option<AudioAsset>>,
    title: String,
    latency: Duration,
    pub fetches: AtomicUsize,
}

impl FakeSource {
    pub fn new(asset: AudioAsset, title: &str) -> Self {
        Self {
            asset: Mutex::new(Some(asset)),
            title: title.to_string(),
            latency: Duration::ZERO,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            asset: Mutex::new(None),
            title: String::new(),
            latency: Duration::ZERO,
            fetches: AtomicUsize::new(0),
        }
    }

    /// Simulate a slow download
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[async_trait]
impl AudioSource for FakeSource {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn fetch(&self, locator: &str) -> FinderResult<FetchedSource> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let asset = self.asset.lock().unwrap().take().ok_or_else(|| {
            FinderError::SourceUnavailable(format!("video unavailable: {}", locator))
        })?;
        let metadata = SourceMetadata {
            title: self.title.clone(),
            duration_ms: asset.duration_ms(),
        };
        Ok(FetchedSource::new(asset, metadata))
    }
}

/// One scripted answer per window, in call order
pub enum Scripted {
    Song(&'static str),
    NoMatch,
    Fail,
}

/// Recognizer that replays a script; extra calls get `NoMatch`
pub struct ScriptedRecognizer {
    script: Vec<Scripted>,
    pub calls: AtomicUsize,
    pub seen_starts: Mutex<Vec<u64>>,
    cancel_on_call: Option<(usize, CancellationToken)>,
}

impl ScriptedRecognizer {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
            seen_starts: Mutex::new(Vec::new()),
            cancel_on_call: None,
        }
    }

    /// Fire `token` during the `call`-th recognition (1-based)
    pub fn cancelling_on(mut self, call: usize, token: CancellationToken) -> Self {
        self.cancel_on_call = Some((call, token));
        self
    }
}

#[async_trait]
impl Recognizer for ScriptedRecognizer {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn recognize(
        &self,
        window: &Window,
    ) -> Result<Option<Identification>, RecognitionFailure> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_starts.lock().unwrap().push(window.start_ms);

        if let Some((on_call, token)) = &self.cancel_on_call {
            if *on_call == call + 1 {
                token.cancel();
            }
        }

        match self.script.get(call) {
            Some(Scripted::Song(key)) => Ok(Some(ident(key))),
            Some(Scripted::Fail) => Err(RecognitionFailure::Provider("HTTP 429".to_string())),
            Some(Scripted::NoMatch) | None => Ok(None),
        }
    }
}
