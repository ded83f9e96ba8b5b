//! Decoded audio held in memory
//!
//! An [`AudioAsset`] is the whole decoded source (mono, 16-bit PCM at the
//! analysis sample rate). Windows copy their sub-range out of it into an
//! [`AudioClip`], which is what the recognizer receives.

pub mod decoder;

pub use decoder::decode_audio_file;

use std::path::Path;

/// Whole decoded source, read-only for the rest of the run
#[derive(Debug, Clone)]
pub struct AudioAsset {
    /// Mono PCM samples
    samples: Vec<i16>,
    /// Sample rate in Hz
    sample_rate: u32,
}

impl AudioAsset {
    /// Wrap already-decoded mono samples
    pub fn from_samples(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate: sample_rate.max(1),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frames(&self) -> usize {
        self.samples.len()
    }

    /// Total duration in milliseconds (truncated)
    pub fn duration_ms(&self) -> u64 {
        frames_to_ms(self.samples.len() as u64, self.sample_rate)
    }

    /// Copy `[start_ms, end_ms)` into a new transient clip
    ///
    /// Bounds are clamped to the asset; an inverted or out-of-range span
    /// yields an empty clip.
    pub fn extract(&self, start_ms: u64, end_ms: u64) -> AudioClip {
        let (start, end) = self.frame_range(start_ms, end_ms);
        AudioClip {
            samples: self.samples[start..end].to_vec(),
            sample_rate: self.sample_rate,
        }
    }

    /// Duration of the clip `extract(start_ms, end_ms)` would return,
    /// without copying any samples
    pub fn extract_duration_ms(&self, start_ms: u64, end_ms: u64) -> u64 {
        let (start, end) = self.frame_range(start_ms, end_ms);
        frames_to_ms((end - start) as u64, self.sample_rate)
    }

    /// Frame bounds for a millisecond span, clamped to the asset
    fn frame_range(&self, start_ms: u64, end_ms: u64) -> (usize, usize) {
        let len = self.samples.len();
        let start = (ms_to_frames(start_ms, self.sample_rate) as usize).min(len);
        let end = (ms_to_frames(end_ms, self.sample_rate) as usize).clamp(start, len);
        (start, end)
    }
}

/// Short excerpt copied out of an [`AudioAsset`]
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

impl AudioClip {
    pub fn duration_ms(&self) -> u64 {
        frames_to_ms(self.samples.len() as u64, self.sample_rate)
    }

    /// Write the clip as a mono 16-bit WAV file
    pub fn write_wav(&self, path: &Path) -> Result<(), hound::Error> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = hound::WavWriter::create(path, spec)?;
        for &sample in &self.samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()
    }
}

#[inline]
fn frames_to_ms(frames: u64, sample_rate: u32) -> u64 {
    frames * 1000 / sample_rate as u64
}

#[inline]
fn ms_to_frames(ms: u64, sample_rate: u32) -> u64 {
    ms.saturating_mul(sample_rate as u64) / 1000
}
