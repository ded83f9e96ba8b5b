//! Bootstrap configuration loading
//!
//! Settings sources priority (highest first):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)
//!
//! This module only covers tier 3: locating, reading and parsing the TOML
//! file. Tiers 1 and 2 are merged on top by each tool. A missing default
//! config file is not an error; the tool starts with built-in defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Directory name under the platform config dir
const CONFIG_DIR_NAME: &str = "ytmix";

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional. Absent values fall through to the next
/// configuration tier.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Directory where run results are written
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Window sampling parameters
    #[serde(default)]
    pub sampling: SamplingSection,

    /// Recognition service adapter settings
    #[serde(default)]
    pub recognizer: RecognizerSection,

    /// Source download settings
    #[serde(default)]
    pub source: SourceSection,

    /// Tracklist collapsing settings
    #[serde(default)]
    pub dedup: DedupSection,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// `[sampling]` table
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SamplingSection {
    pub stride_ms: Option<u64>,
    pub window_ms: Option<u64>,
    pub min_window_ms: Option<u64>,
    /// Sample rate the decoded source is resampled to before windowing
    pub analysis_sample_rate: Option<u32>,
}

/// `[recognizer]` table
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RecognizerSection {
    /// Recognizer executable (name on PATH or absolute path)
    pub binary: Option<String>,
    /// Per-window recognition timeout
    pub timeout_secs: Option<u64>,
    /// Pause after every recognition attempt
    pub inter_call_delay_ms: Option<u64>,
}

/// `[source]` table
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SourceSection {
    /// Downloader executable used for page URLs
    pub ytdlp_binary: Option<String>,
    /// Audio container requested from the downloader (e.g. "mp3")
    pub audio_format: Option<String>,
    /// Audio quality requested from the downloader (e.g. "192K")
    pub audio_quality: Option<String>,
    /// Direct HTTP downloads fail after this long without progress
    pub http_timeout_secs: Option<u64>,
}

/// `[dedup]` table
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DedupSection {
    /// "bridge" or "split"
    pub absence_policy: Option<String>,
}

/// Default config file path for a tool: `<config_dir>/ytmix/<module>.toml`
///
/// Returns `None` when the platform has no config directory.
pub fn default_config_path(module: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(format!("{}.toml", module)))
}

/// Read and parse a TOML config file
///
/// # Errors
/// * `Error::Config` if the file cannot be read or is not valid TOML
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Locate and load the bootstrap config for a tool
///
/// * `explicit` - path given on the command line or via environment. It must
///   exist; a missing explicit file is a configuration error.
/// * `module` - tool name used to build the default path
///
/// When no explicit path is given and the default file does not exist, the
/// built-in defaults are returned with a warning.
pub fn resolve_toml_config(explicit: Option<&Path>, module: &str) -> Result<TomlConfig> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        if path.is_dir() {
            return Err(Error::InvalidInput(format!(
                "Config path is a directory: {}",
                path.display()
            )));
        }
        info!("Loading config from {}", path.display());
        return load_toml_config(path);
    }

    match default_config_path(module) {
        Some(path) if path.exists() => {
            info!("Loading config from {}", path.display());
            load_toml_config(&path)
        }
        Some(path) => {
            debug!("No config file at {}", path.display());
            warn!("No config file found, using built-in defaults");
            Ok(TomlConfig::default())
        }
        None => {
            warn!("Could not determine config directory, using built-in defaults");
            Ok(TomlConfig::default())
        }
    }
}
