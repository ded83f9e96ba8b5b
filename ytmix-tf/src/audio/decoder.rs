//! Audio Decoding
//!
//! **Purpose:** Decode a downloaded source into an [`AudioAsset`]: mono,
//! resampled to the analysis rate, stored as 16-bit PCM.
//!
//! Uses symphonia for format-agnostic decoding (MP3, FLAC, AAC, WAV, OGG, ...)
//! and rubato for resampling. Resampling runs as packets are decoded, so the
//! full-rate signal of a long mix is never held in memory.

use super::AudioAsset;
use anyhow::{Context, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use std::path::Path;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::conv::FromSample;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;

/// Input frames per resampler call
const RESAMPLE_CHUNK: usize = 8192;

/// Decode audio file into a mono [`AudioAsset`] at `target_sample_rate`
///
/// **Algorithm:**
/// 1. Open file and probe format using symphonia
/// 2. Find default audio track and create its decoder
/// 3. Decode packets, averaging channels to mono
/// 4. Feed mono samples through the resampler (skipped when rates match)
/// 5. Quantize to i16
///
/// Packets that fail to decode are skipped with a warning; damaged frames
/// are common in transcoded downloads and only cost a few milliseconds.
///
/// # Errors
/// * File I/O errors
/// * Unsupported format or codec
/// * Resampler construction/processing failure
pub fn decode_audio_file(file_path: &Path, target_sample_rate: u32) -> Result<AudioAsset> {
    tracing::debug!(path = %file_path.display(), "Decoding audio file");

    let file = std::fs::File::open(file_path)
        .with_context(|| format!("Failed to open audio file: {}", file_path.display()))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = file_path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .with_context(|| format!("Failed to probe audio file: {}", file_path.display()))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .context("No audio track found in file")?;

    let track_id = track.id;
    let source_rate = track
        .codec_params
        .sample_rate
        .context("Sample rate unknown")?;

    tracing::debug!(
        path = %file_path.display(),
        source_rate = source_rate,
        target_rate = target_sample_rate,
        "Audio file info"
    );

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .with_context(|| format!("Failed to create decoder for: {}", file_path.display()))?;

    let mut resampler = MonoResampler::new(source_rate, target_sample_rate)?;
    let mut output: Vec<i16> = Vec::new();
    let mut mono: Vec<f32> = Vec::new();
    let mut skipped_packets = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                return Err(anyhow::anyhow!("Error reading packet: {}", e));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(msg)) => {
                skipped_packets += 1;
                tracing::debug!(reason = msg, "Skipping undecodable packet");
                continue;
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to decode packet in: {}", file_path.display()));
            }
        };

        mono.clear();
        mix_to_mono(&decoded, &mut mono);
        resampler.push(&mono, &mut output)?;
    }

    resampler.finish(&mut output)?;

    if skipped_packets > 0 {
        tracing::warn!(
            path = %file_path.display(),
            skipped_packets = skipped_packets,
            "Some packets could not be decoded"
        );
    }

    let asset = AudioAsset::from_samples(output, target_sample_rate);

    tracing::debug!(
        path = %file_path.display(),
        frames = asset.frames(),
        duration_ms = asset.duration_ms(),
        "Audio decoding complete"
    );

    Ok(asset)
}

/// Average all channels of a decoded buffer into `out`
fn mix_to_mono(decoded: &AudioBufferRef, out: &mut Vec<f32>) {
    match decoded {
        AudioBufferRef::F32(buf) => average_channels(buf, out),
        AudioBufferRef::F64(buf) => average_channels(buf, out),
        AudioBufferRef::U8(buf) => average_channels(buf, out),
        AudioBufferRef::U16(buf) => average_channels(buf, out),
        AudioBufferRef::U24(buf) => average_channels(buf, out),
        AudioBufferRef::U32(buf) => average_channels(buf, out),
        AudioBufferRef::S8(buf) => average_channels(buf, out),
        AudioBufferRef::S16(buf) => average_channels(buf, out),
        AudioBufferRef::S24(buf) => average_channels(buf, out),
        AudioBufferRef::S32(buf) => average_channels(buf, out),
    }
}

fn average_channels<S>(buf: &AudioBuffer<S>, out: &mut Vec<f32>)
where
    S: Sample,
    f32: FromSample<S>,
{
    let num_channels = buf.spec().channels.count();
    if num_channels == 0 {
        return;
    }

    out.reserve(buf.frames());
    for frame_idx in 0..buf.frames() {
        let mut sum = 0.0f32;
        for ch in 0..num_channels {
            sum += f32::from_sample(buf.chan(ch)[frame_idx]);
        }
        out.push(sum / num_channels as f32);
    }
}

#[inline]
fn quantize(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Chunked mono resampler; passthrough when rates already match
struct MonoResampler {
    inner: Option<SincFixedIn<f32>>,
    pending: Vec<f32>,
    ratio: f64,
    frames_in: u64,
    frames_out: u64,
}

impl MonoResampler {
    fn new(source_rate: u32, target_rate: u32) -> Result<Self> {
        if source_rate == target_rate {
            return Ok(Self {
                inner: None,
                pending: Vec::new(),
                ratio: 1.0,
                frames_in: 0,
                frames_out: 0,
            });
        }

        let params = SincInterpolationParameters {
            sinc_len: 128,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 128,
            window: WindowFunction::BlackmanHarris2,
        };

        let ratio = target_rate as f64 / source_rate as f64;
        let resampler = SincFixedIn::<f32>::new(
            ratio,
            1.1,
            params,
            RESAMPLE_CHUNK,
            1,
        )
        .context("Failed to create rubato resampler")?;

        Ok(Self {
            inner: Some(resampler),
            pending: Vec::with_capacity(RESAMPLE_CHUNK * 2),
            ratio,
            frames_in: 0,
            frames_out: 0,
        })
    }

    fn push(&mut self, input: &[f32], out: &mut Vec<i16>) -> Result<()> {
        let Some(resampler) = self.inner.as_mut() else {
            out.extend(input.iter().map(|&s| quantize(s)));
            return Ok(());
        };

        self.frames_in += input.len() as u64;
        self.pending.extend_from_slice(input);
        while self.pending.len() >= RESAMPLE_CHUNK {
            let block = vec![self.pending.drain(..RESAMPLE_CHUNK).collect::<Vec<f32>>()];
            let resampled = resampler
                .process(&block, None)
                .context("Rubato resampling failed")?;
            self.frames_out += resampled[0].len() as u64;
            out.extend(resampled[0].iter().map(|&s| quantize(s)));
        }
        Ok(())
    }

    fn finish(mut self, out: &mut Vec<i16>) -> Result<()> {
        let Some(resampler) = self.inner.as_mut() else {
            return Ok(());
        };
        if self.pending.is_empty() {
            return Ok(());
        }

        // The partial call zero-pads to a full chunk; keep only the frames
        // that correspond to real input.
        let expected = (self.frames_in as f64 * self.ratio).round() as u64;
        let remaining = expected.saturating_sub(self.frames_out) as usize;

        let block = vec![std::mem::take(&mut self.pending)];
        let resampled = resampler
            .process_partial(Some(block.as_slice()), None)
            .context("Rubato resampling failed")?;
        out.extend(resampled[0].iter().take(remaining).map(|&s| quantize(s)));
        Ok(())
    }
}
