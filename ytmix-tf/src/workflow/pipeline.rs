//! Identification pipeline
//!
//! Drives windows through the recognizer strictly one at a time, in input
//! order, and collects the raw recognition timeline.
//!
//! # Error Handling
//! - Per-window isolation: a failed or timed-out recognition is logged and
//!   recorded as an unidentified window; the run continues
//! - Pacing: after every attempt (success or failure) the pipeline waits the
//!   inter-call delay before touching the next window
//!
//! # Cancellation
//! The cancellation token is checked between windows and raced against both
//! suspension points (the recognition call and the delay). Events collected
//! before cancellation are returned unchanged.

use super::FinderEvent;
use crate::types::{Identification, RecognitionEvent, RecognitionOutcome, Recognizer, Window};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Sequential recognizer driver
pub struct IdentificationPipeline<'r> {
    recognizer: &'r dyn Recognizer,
    inter_call_delay: Duration,
    cancel: CancellationToken,
    event_tx: Option<mpsc::Sender<FinderEvent>>,
}

impl<'r> IdentificationPipeline<'r> {
    /// Create pipeline around a recognizer
    pub fn new(recognizer: &'r dyn Recognizer, inter_call_delay: Duration) -> Self {
        Self {
            recognizer,
            inter_call_delay,
            cancel: CancellationToken::new(),
            event_tx: None,
        }
    }

    /// Report per-window progress on `event_tx`
    pub fn with_events(mut self, event_tx: mpsc::Sender<FinderEvent>) -> Self {
        self.event_tx = Some(event_tx);
        self
    }

    /// Stop at the next window boundary once `cancel` fires
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Recognize every window and return one event per processed window
    ///
    /// Never fails: recognition faults become absent identifications. The
    /// result is shorter than the input only if the run was cancelled.
    pub async fn run<I>(&self, windows: I) -> Vec<RecognitionEvent>
    where
        I: IntoIterator<Item = Window>,
        I::IntoIter: ExactSizeIterator,
    {
        let windows = windows.into_iter();
        let total = windows.len();
        let mut events = Vec::with_capacity(total);

        info!(
            total = total,
            recognizer = self.recognizer.name(),
            delay_ms = self.inter_call_delay.as_millis() as u64,
            "Identifying windows"
        );

        for (index, window) in windows.enumerate() {
            if self.cancel.is_cancelled() {
                break;
            }

            self.emit_event(FinderEvent::WindowStarted {
                index,
                total,
                start_ms: window.start_ms,
            })
            .await;

            let outcome: RecognitionOutcome = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                result = self.recognizer.recognize(&window) => result.into(),
            };

            let identification = self.record_outcome(index, window.start_ms, outcome).await;
            events.push(RecognitionEvent {
                start_ms: window.start_ms,
                identification,
            });

            if !self.inter_call_delay.is_zero() {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => break,
                    _ = tokio::time::sleep(self.inter_call_delay) => {}
                }
            }
        }

        if events.len() < total {
            warn!(
                processed = events.len(),
                total = total,
                "Identification cancelled before all windows were processed"
            );
            self.emit_event(FinderEvent::Cancelled {
                processed: events.len(),
                total,
            })
            .await;
        }

        events
    }

    /// Log and report one outcome; returns the identification to record
    async fn record_outcome(
        &self,
        index: usize,
        start_ms: u64,
        outcome: RecognitionOutcome,
    ) -> Option<Identification> {
        match outcome {
            RecognitionOutcome::Identified(identification) => {
                info!(
                    index = index,
                    start_ms = start_ms,
                    title = %identification.title,
                    artist = %identification.artist,
                    "Window identified"
                );
                self.emit_event(FinderEvent::WindowIdentified {
                    index,
                    start_ms,
                    title: identification.title.clone(),
                    artist: identification.artist.clone(),
                })
                .await;
                Some(identification)
            }
            RecognitionOutcome::Unrecognized => {
                debug!(index = index, start_ms = start_ms, "Window not identified");
                self.emit_event(FinderEvent::WindowUnidentified { index, start_ms })
                    .await;
                None
            }
            RecognitionOutcome::Failed(failure) => {
                warn!(
                    index = index,
                    start_ms = start_ms,
                    error = %failure,
                    "Recognition failed, recording window as unidentified"
                );
                self.emit_event(FinderEvent::WindowFailed {
                    index,
                    start_ms,
                    message: failure.to_string(),
                })
                .await;
                None
            }
        }
    }

    async fn emit_event(&self, event: FinderEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event).await;
        }
    }
}
