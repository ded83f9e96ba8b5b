//! Audio fixtures: in-memory assets and generated WAV files

use std::path::{Path, PathBuf};
use ytmix_tf::audio::AudioAsset;

/// Configuration for a generated tone file
#[derive(Debug, Clone)]
pub struct ToneConfig {
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub frequency: f32,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            duration_seconds: 65.0,
            sample_rate: 16_000,
            channels: 1,
            frequency: 440.0,
        }
    }
}

/// Write a 16-bit PCM sine tone to `path`
pub fn generate_test_wav(path: &Path, config: &ToneConfig) -> anyhow::Result<PathBuf> {
    let spec = hound::WavSpec {
        channels: config.channels,
        sample_rate: config.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    let total_frames = (config.duration_seconds * config.sample_rate as f64) as usize;

    for i in 0..total_frames {
        let t = i as f32 / config.sample_rate as f32;
        let sample = (0.3 * (std::f32::consts::TAU * config.frequency * t).sin()
            * i16::MAX as f32) as i16;
        for _ in 0..config.channels {
            writer.write_sample(sample)?;
        }
    }

    writer.finalize()?;
    Ok(path.to_path_buf())
}

/// Silent asset at 1 kHz (one frame per millisecond)
pub fn silent_asset(duration_ms: u64) -> AudioAsset {
    AudioAsset::from_samples(vec![0; duration_ms as usize], 1_000)
}
