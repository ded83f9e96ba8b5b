//! Run configuration resolution
//!
//! Merges the four configuration tiers into one validated [`FinderConfig`]:
//! 1. Command-line arguments
//! 2. Environment variables (both arrive through [`ConfigOverrides`])
//! 3. TOML configuration file ([`TomlConfig`])
//! 4. Built-in defaults

use crate::error::{FinderError, FinderResult};
use crate::recognizers::songrec::{DEFAULT_SONGREC_BINARY, DEFAULT_TIMEOUT};
use crate::sources::YtDlpSettings;
use crate::workflow::finder::RunSettings;
use crate::workflow::{AbsencePolicy, SamplingParams};
use std::fmt::Debug;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};
use ytmix_common::config::TomlConfig;

/// Rate the source is resampled to before windowing
pub const DEFAULT_ANALYSIS_SAMPLE_RATE: u32 = 16_000;
pub const DEFAULT_INTER_CALL_DELAY_MS: u64 = 1_000;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 300;

/// Values supplied on the command line or through environment variables
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub output_dir: Option<PathBuf>,
    pub stride_ms: Option<u64>,
    pub window_ms: Option<u64>,
    pub min_window_ms: Option<u64>,
    pub inter_call_delay_ms: Option<u64>,
    pub songrec_binary: Option<String>,
    pub recognizer_timeout_secs: Option<u64>,
    pub ytdlp_binary: Option<String>,
    pub absence_policy: Option<String>,
}

/// Fully resolved settings for one invocation
#[derive(Debug, Clone, PartialEq)]
pub struct FinderConfig {
    pub sampling: SamplingParams,
    pub analysis_sample_rate: u32,
    pub inter_call_delay: Duration,
    pub songrec_binary: String,
    pub recognizer_timeout: Duration,
    pub ytdlp: YtDlpSettings,
    /// Connect, header and per-chunk stall limit for direct downloads
    pub http_timeout: Duration,
    pub absence_policy: AbsencePolicy,
    pub output_dir: PathBuf,
}

/// First present value wins; logs which tier supplied it
fn pick<T: Debug>(name: &str, cli: Option<T>, toml: Option<T>, default: T) -> T {
    if let Some(value) = cli {
        debug!(setting = name, value = ?value, "Using command-line/environment value");
        value
    } else if let Some(value) = toml {
        debug!(setting = name, value = ?value, "Using config file value");
        value
    } else {
        default
    }
}

impl FinderConfig {
    /// Merge overrides over the TOML file over defaults, then validate
    ///
    /// # Errors
    /// `FinderError::InvalidConfig` for zero durations/rates, empty binary
    /// names or an unknown absence policy.
    pub fn resolve(overrides: ConfigOverrides, toml: &TomlConfig) -> FinderResult<Self> {
        let defaults = SamplingParams::default();
        let sampling = SamplingParams {
            stride_ms: pick(
                "stride_ms",
                overrides.stride_ms,
                toml.sampling.stride_ms,
                defaults.stride_ms,
            ),
            window_ms: pick(
                "window_ms",
                overrides.window_ms,
                toml.sampling.window_ms,
                defaults.window_ms,
            ),
            min_window_ms: pick(
                "min_window_ms",
                overrides.min_window_ms,
                toml.sampling.min_window_ms,
                defaults.min_window_ms,
            ),
        };
        sampling.validate()?;
        if sampling.min_window_ms > sampling.window_ms {
            warn!(
                min_window_ms = sampling.min_window_ms,
                window_ms = sampling.window_ms,
                "min_window_ms exceeds window_ms; no window will ever be long enough"
            );
        }

        let analysis_sample_rate = pick(
            "analysis_sample_rate",
            None,
            toml.sampling.analysis_sample_rate,
            DEFAULT_ANALYSIS_SAMPLE_RATE,
        );
        if analysis_sample_rate == 0 {
            return Err(FinderError::InvalidConfig(
                "analysis_sample_rate must be greater than zero".to_string(),
            ));
        }

        let inter_call_delay = Duration::from_millis(pick(
            "inter_call_delay_ms",
            overrides.inter_call_delay_ms,
            toml.recognizer.inter_call_delay_ms,
            DEFAULT_INTER_CALL_DELAY_MS,
        ));

        let songrec_binary = non_empty(
            "recognizer binary",
            pick(
                "recognizer.binary",
                overrides.songrec_binary,
                toml.recognizer.binary.clone(),
                DEFAULT_SONGREC_BINARY.to_string(),
            ),
        )?;

        let recognizer_timeout_secs = pick(
            "recognizer.timeout_secs",
            overrides.recognizer_timeout_secs,
            toml.recognizer.timeout_secs,
            DEFAULT_TIMEOUT.as_secs(),
        );
        if recognizer_timeout_secs == 0 {
            return Err(FinderError::InvalidConfig(
                "recognizer timeout must be greater than zero".to_string(),
            ));
        }

        let ytdlp_defaults = YtDlpSettings::default();
        let ytdlp = YtDlpSettings {
            binary: non_empty(
                "yt-dlp binary",
                pick(
                    "source.ytdlp_binary",
                    overrides.ytdlp_binary,
                    toml.source.ytdlp_binary.clone(),
                    ytdlp_defaults.binary,
                ),
            )?,
            audio_format: non_empty(
                "audio format",
                pick(
                    "source.audio_format",
                    None,
                    toml.source.audio_format.clone(),
                    ytdlp_defaults.audio_format,
                ),
            )?,
            audio_quality: non_empty(
                "audio quality",
                pick(
                    "source.audio_quality",
                    None,
                    toml.source.audio_quality.clone(),
                    ytdlp_defaults.audio_quality,
                ),
            )?,
        };

        let http_timeout_secs = pick(
            "source.http_timeout_secs",
            None,
            toml.source.http_timeout_secs,
            DEFAULT_HTTP_TIMEOUT_SECS,
        );
        if http_timeout_secs == 0 {
            return Err(FinderError::InvalidConfig(
                "http timeout must be greater than zero".to_string(),
            ));
        }

        let absence_policy = match pick(
            "dedup.absence_policy",
            overrides.absence_policy,
            toml.dedup.absence_policy.clone(),
            AbsencePolicy::default().to_string(),
        )
        .parse::<AbsencePolicy>()
        {
            Ok(policy) => policy,
            Err(e) => return Err(FinderError::InvalidConfig(e)),
        };

        let output_dir = pick(
            "output_dir",
            overrides.output_dir,
            toml.output_dir.clone(),
            PathBuf::from("."),
        );

        Ok(Self {
            sampling,
            analysis_sample_rate,
            inter_call_delay,
            songrec_binary,
            recognizer_timeout: Duration::from_secs(recognizer_timeout_secs),
            ytdlp,
            http_timeout: Duration::from_secs(http_timeout_secs),
            absence_policy,
            output_dir,
        })
    }

    /// Settings consumed by [`crate::workflow::TrackFinder`]
    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            sampling: self.sampling,
            inter_call_delay: self.inter_call_delay,
            absence_policy: self.absence_policy,
        }
    }
}

fn non_empty(name: &str, value: String) -> FinderResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FinderError::InvalidConfig(format!(
            "{} must not be empty",
            name
        )));
    }
    Ok(trimmed.to_string())
}
