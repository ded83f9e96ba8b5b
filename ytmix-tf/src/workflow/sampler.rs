//! Window sampler
//!
//! Slices a decoded asset into fixed-length candidate windows at a fixed
//! stride. Offsets are `0, stride, 2*stride, ...` while `offset < duration`;
//! each window spans `[offset, min(offset + window, duration))` and is only
//! emitted when that span is at least `min_window` long. In practice only
//! the trailing window can be dropped.
//!
//! The sampler is lazy: each [`Window`] copies its clip out of the asset
//! when it is pulled, so at most one clip is alive per pipeline step.

use crate::audio::AudioAsset;
use crate::error::{FinderError, FinderResult};
use crate::types::Window;
use serde::Serialize;

/// Sampling parameters (all in milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SamplingParams {
    /// Distance between consecutive window starts
    pub stride_ms: u64,
    /// Nominal window length
    pub window_ms: u64,
    /// Shortest window worth submitting
    pub min_window_ms: u64,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            stride_ms: 30_000,
            window_ms: 15_000,
            min_window_ms: 10_000,
        }
    }
}

impl SamplingParams {
    /// Reject zero-valued parameters
    pub fn validate(&self) -> FinderResult<()> {
        for (name, value) in [
            ("stride_ms", self.stride_ms),
            ("window_ms", self.window_ms),
            ("min_window_ms", self.min_window_ms),
        ] {
            if value == 0 {
                return Err(FinderError::InvalidConfig(format!(
                    "{} must be greater than zero",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Span `[start, end)` of the window at `offset`, if the clip cut from
    /// `asset` for it is long enough
    ///
    /// Length is measured on the frames `extract` would copy, so rates that
    /// are not a multiple of 1 kHz cannot round a clip below the minimum.
    fn span_at(&self, asset: &AudioAsset, offset: u64, duration_ms: u64) -> Option<(u64, u64)> {
        if offset >= duration_ms {
            return None;
        }
        let end = offset.saturating_add(self.window_ms).min(duration_ms);
        (asset.extract_duration_ms(offset, end) >= self.min_window_ms).then_some((offset, end))
    }
}

/// Lazy iterator of [`Window`]s over an [`AudioAsset`]
#[derive(Debug)]
pub struct Sampler<'a> {
    asset: &'a AudioAsset,
    params: SamplingParams,
    duration_ms: u64,
    next_offset: u64,
}

impl<'a> Sampler<'a> {
    /// Create a sampler; fails only on invalid parameters
    pub fn new(asset: &'a AudioAsset, params: SamplingParams) -> FinderResult<Self> {
        params.validate()?;
        Ok(Self {
            asset,
            params,
            duration_ms: asset.duration_ms(),
            next_offset: 0,
        })
    }

    /// Spans that remain to be emitted, without copying any audio
    pub fn remaining_spans(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        let params = self.params;
        let asset = self.asset;
        let duration_ms = self.duration_ms;
        (self.next_offset..duration_ms)
            .step_by(params.stride_ms as usize)
            .filter_map(move |offset| params.span_at(asset, offset, duration_ms))
    }
}

impl Iterator for Sampler<'_> {
    type Item = Window;

    fn next(&mut self) -> Option<Window> {
        while self.next_offset < self.duration_ms {
            let offset = self.next_offset;
            self.next_offset = offset.saturating_add(self.params.stride_ms);

            if let Some((start, end)) = self.params.span_at(self.asset, offset, self.duration_ms) {
                return Some(Window {
                    start_ms: start,
                    clip: self.asset.extract(start, end),
                });
            }
            tracing::debug!(
                offset_ms = offset,
                min_window_ms = self.params.min_window_ms,
                "Skipping short trailing window"
            );
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining_spans().count();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Sampler<'_> {}
