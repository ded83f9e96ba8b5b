//! Integration tests for TOML bootstrap configuration
//!
//! **Test Coverage:**
//! - Full config file with every section
//! - Partial files fall back per field
//! - Explicit path must exist
//! - Default path lookup under the platform config directory
//! - Malformed files are configuration errors

use serial_test::serial;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use ytmix_common::config::{load_toml_config, resolve_toml_config};
use ytmix_common::Error;

fn write_config(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write config");
    path
}

#[test]
fn test_full_config_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "full.toml",
        r#"
output_dir = "/var/lib/ytmix"

[logging]
level = "debug"
file = "/tmp/ytmix.log"

[sampling]
stride_ms = 20000
window_ms = 12000
min_window_ms = 8000
analysis_sample_rate = 22050

[recognizer]
binary = "/usr/local/bin/songrec"
timeout_secs = 45
inter_call_delay_ms = 1500

[source]
ytdlp_binary = "yt-dlp"
audio_format = "m4a"
audio_quality = "128K"
http_timeout_secs = 60

[dedup]
absence_policy = "split"
"#,
    );

    let config = load_toml_config(&path).unwrap();

    assert_eq!(config.output_dir, Some(PathBuf::from("/var/lib/ytmix")));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.file, Some(PathBuf::from("/tmp/ytmix.log")));
    assert_eq!(config.sampling.stride_ms, Some(20_000));
    assert_eq!(config.sampling.window_ms, Some(12_000));
    assert_eq!(config.sampling.min_window_ms, Some(8_000));
    assert_eq!(config.sampling.analysis_sample_rate, Some(22_050));
    assert_eq!(config.recognizer.binary.as_deref(), Some("/usr/local/bin/songrec"));
    assert_eq!(config.recognizer.timeout_secs, Some(45));
    assert_eq!(config.recognizer.inter_call_delay_ms, Some(1_500));
    assert_eq!(config.source.audio_format.as_deref(), Some("m4a"));
    assert_eq!(config.source.audio_quality.as_deref(), Some("128K"));
    assert_eq!(config.source.http_timeout_secs, Some(60));
    assert_eq!(config.dedup.absence_policy.as_deref(), Some("split"));
}

#[test]
fn test_partial_config_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "partial.toml", "[sampling]\nstride_ms = 45000\n");

    let config = load_toml_config(&path).unwrap();

    assert_eq!(config.sampling.stride_ms, Some(45_000));
    assert!(config.sampling.window_ms.is_none());
    assert_eq!(config.logging.level, "info");
    assert!(config.recognizer.binary.is_none());
}

#[test]
fn test_malformed_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "broken.toml", "[sampling\nstride_ms = ");

    match load_toml_config(&path) {
        Err(Error::Config(msg)) => assert!(msg.contains("Parse")),
        other => panic!("expected config error, got {:?}", other),
    }
}

#[test]
fn test_wrong_type_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "typed.toml", "[sampling]\nstride_ms = \"thirty\"\n");
    assert!(matches!(load_toml_config(&path), Err(Error::Config(_))));
}

#[test]
fn test_missing_explicit_file_is_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");

    match resolve_toml_config(Some(&missing), "ytmix-tf") {
        Err(Error::Config(msg)) => assert!(msg.starts_with("Config file not found")),
        other => panic!("expected config error, got {:?}", other),
    }
}

#[test]
#[serial]
fn test_default_path_under_config_home() {
    let dir = TempDir::new().unwrap();
    let previous = std::env::var_os("XDG_CONFIG_HOME");
    std::env::set_var("XDG_CONFIG_HOME", dir.path());

    // No file yet: built-in defaults
    let config = resolve_toml_config(None, "ytmix-tf").unwrap();
    assert!(config.sampling.stride_ms.is_none());

    fs::create_dir_all(dir.path().join("ytmix")).unwrap();
    fs::write(
        dir.path().join("ytmix").join("ytmix-tf.toml"),
        "[recognizer]\ninter_call_delay_ms = 2000\n",
    )
    .unwrap();
    let config = resolve_toml_config(None, "ytmix-tf").unwrap();

    match previous {
        Some(value) => std::env::set_var("XDG_CONFIG_HOME", value),
        None => std::env::remove_var("XDG_CONFIG_HOME"),
    }

    if cfg!(target_os = "linux") {
        assert_eq!(config.recognizer.inter_call_delay_ms, Some(2_000));
    }
}

#[test]
fn test_directory_as_explicit_path_is_invalid_input() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        resolve_toml_config(Some(dir.path()), "ytmix-tf"),
        Err(Error::InvalidInput(_))
    ));
}
