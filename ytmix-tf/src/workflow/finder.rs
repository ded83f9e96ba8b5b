//! Run orchestrator
//!
//! Owns the collaborators for one run and sequences the stages:
//! fetch → sample → identify → deduplicate → finalize.
//!
//! Only source failures and cancellation before any window was processed
//! abort a run. The fetched source (and any scratch
//! directory behind it) lives exactly as long as `run` and is released on
//! every exit path.

use super::{deduplicate, AbsencePolicy, FinderEvent, IdentificationPipeline, Sampler, SamplingParams};
use crate::error::{FinderError, FinderResult};
use crate::types::{AudioSource, Recognizer, RunResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Per-run tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSettings {
    pub sampling: SamplingParams,
    pub inter_call_delay: Duration,
    pub absence_policy: AbsencePolicy,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            sampling: SamplingParams::default(),
            inter_call_delay: Duration::from_millis(1_000),
            absence_policy: AbsencePolicy::Bridge,
        }
    }
}

/// Identifies the tracklist of one source per `run` call
pub struct TrackFinder {
    source: Arc<dyn AudioSource>,
    recognizer: Arc<dyn Recognizer>,
    settings: RunSettings,
    cancel: CancellationToken,
    event_tx: Option<mpsc::Sender<FinderEvent>>,
}

impl TrackFinder {
    pub fn new(
        source: Arc<dyn AudioSource>,
        recognizer: Arc<dyn Recognizer>,
        settings: RunSettings,
    ) -> Self {
        Self {
            source,
            recognizer,
            settings,
            cancel: CancellationToken::new(),
            event_tx: None,
        }
    }

    /// Create finder with event channel for progress reporting
    pub fn with_events(mut self, event_tx: mpsc::Sender<FinderEvent>) -> Self {
        self.event_tx = Some(event_tx);
        self
    }

    /// Share a cancellation token (e.g. wired to Ctrl-C)
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run the whole workflow for `locator`
    ///
    /// # Errors
    /// * `FinderError::SourceUnavailable` if the source cannot be fetched or
    ///   decoded (nothing is sampled in that case)
    /// * `FinderError::InvalidConfig` if the sampling parameters are invalid
    /// * `FinderError::Cancelled` if the token fires while the source is
    ///   being fetched or before the first window was processed
    pub async fn run(&self, locator: &str) -> FinderResult<RunResult> {
        self.settings.sampling.validate()?;
        if self.cancel.is_cancelled() {
            return Err(FinderError::Cancelled);
        }

        info!(locator = locator, source = self.source.name(), "Fetching source");
        self.emit_event(FinderEvent::SourceFetching {
            locator: locator.to_string(),
        })
        .await;

        let fetched = tokio::select! {
            biased;

            _ = self.cancel.cancelled() => {
                warn!(locator = locator, "Cancelled while fetching source");
                return Err(FinderError::Cancelled);
            }
            fetched = self.source.fetch(locator) => fetched?,
        };

        info!(
            title = %fetched.metadata.title,
            duration_ms = fetched.metadata.duration_ms,
            decoded_ms = fetched.asset.duration_ms(),
            "Source ready"
        );
        self.emit_event(FinderEvent::SourceReady {
            title: fetched.metadata.title.clone(),
            duration_ms: fetched.metadata.duration_ms,
        })
        .await;

        let sampler = Sampler::new(&fetched.asset, self.settings.sampling)?;
        let total = sampler.len();
        info!(windows = total, "Sampled candidate windows");
        self.emit_event(FinderEvent::WindowsPlanned { total }).await;

        let mut pipeline =
            IdentificationPipeline::new(self.recognizer.as_ref(), self.settings.inter_call_delay)
                .with_cancellation(self.cancel.clone());
        if let Some(tx) = &self.event_tx {
            pipeline = pipeline.with_events(tx.clone());
        }

        let events = pipeline.run(sampler).await;
        let complete = events.len() == total;
        if events.is_empty() && !complete {
            return Err(FinderError::Cancelled);
        }

        let segments = deduplicate(&events, self.settings.absence_policy);
        info!(
            windows = events.len(),
            segments = segments.len(),
            complete = complete,
            "Identification finished"
        );
        self.emit_event(FinderEvent::RunCompleted {
            segments: segments.len(),
        })
        .await;

        let result = RunResult::finalize(
            locator,
            fetched.metadata.clone(),
            &events,
            complete,
            segments,
        );

        drop(fetched);
        Ok(result)
    }

    async fn emit_event(&self, event: FinderEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event).await;
        }
    }
}
