//! ytmix-tf - Mix Tracklist Finder CLI
//!
//! Usage: `ytmix-tf [LOCATOR] [flags]`. Without a locator the URL is read
//! from stdin. Progress is printed per window as it happens; the tracklist
//! is printed at the end and exported to JSON unless `--no-export` is given.
//!
//! Exit status is non-zero when the source cannot be fetched, the
//! configuration is invalid, or Ctrl-C arrives before any window was
//! processed (130). A later Ctrl-C stops identification early and still
//! prints and exports what was found.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ytmix_common::config::{resolve_toml_config, LoggingConfig};
use ytmix_tf::export::JsonExporter;
use ytmix_tf::recognizers::SongRecRecognizer;
use ytmix_tf::sources::{HttpSource, LocalFileSource, SourceRouter, YtDlpSource};
use ytmix_tf::tracklist::{progress_text, render_tracklist};
use ytmix_tf::{ConfigOverrides, FinderConfig, FinderError, ResultExporter, TrackFinder};

/// Module name used for the default config file (`ytmix/ytmix-tf.toml`)
const MODULE_NAME: &str = "ytmix-tf";

/// Conventional status for termination by SIGINT
const EXIT_INTERRUPTED: u8 = 130;

/// Command-line arguments for ytmix-tf
#[derive(Parser, Debug)]
#[command(name = "ytmix-tf")]
#[command(about = "Identify the tracklist of a long audio/video mix")]
#[command(version)]
struct Args {
    /// Source URL (YouTube or any yt-dlp site, direct audio URL) or local file
    locator: Option<String>,

    /// Config file (default: <config dir>/ytmix/ytmix-tf.toml)
    #[arg(short, long, env = "YTMIX_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for the exported JSON results
    #[arg(short, long, env = "YTMIX_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Distance between window starts (ms)
    #[arg(long, env = "YTMIX_STRIDE_MS")]
    stride_ms: Option<u64>,

    /// Window length (ms)
    #[arg(long, env = "YTMIX_WINDOW_MS")]
    window_ms: Option<u64>,

    /// Shortest window still submitted for recognition (ms)
    #[arg(long, env = "YTMIX_MIN_WINDOW_MS")]
    min_window_ms: Option<u64>,

    /// Pause after every recognition call (ms)
    #[arg(long, env = "YTMIX_DELAY_MS")]
    delay_ms: Option<u64>,

    /// songrec executable
    #[arg(long, env = "YTMIX_SONGREC_BIN")]
    songrec_bin: Option<String>,

    /// Per-window recognition timeout (seconds)
    #[arg(long, env = "YTMIX_RECOGNIZER_TIMEOUT_SECS")]
    recognizer_timeout_secs: Option<u64>,

    /// yt-dlp executable
    #[arg(long, env = "YTMIX_YTDLP_BIN")]
    ytdlp_bin: Option<String>,

    /// What an unidentified window does to deduplication: bridge or split
    #[arg(long, env = "YTMIX_ABSENCE_POLICY")]
    absence_policy: Option<String>,

    /// Print the tracklist only; do not write a JSON file
    #[arg(long)]
    no_export: bool,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            output_dir: self.output_dir.clone(),
            stride_ms: self.stride_ms,
            window_ms: self.window_ms,
            min_window_ms: self.min_window_ms,
            inter_call_delay_ms: self.delay_ms,
            songrec_binary: self.songrec_bin.clone(),
            recognizer_timeout_secs: self.recognizer_timeout_secs,
            ytdlp_binary: self.ytdlp_bin.clone(),
            absence_policy: self.absence_policy.clone(),
        }
    }
}

/// Logs go to stderr (or the configured file) so stdout stays the tracklist
fn init_logging(logging: &LoggingConfig, verbose: bool) -> Result<()> {
    let default_directive = if verbose {
        "ytmix_tf=debug,ytmix_common=debug".to_string()
    } else {
        logging.level.clone()
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&default_directive))
        .with_context(|| format!("Invalid log level '{}'", default_directive))?;

    let (stderr_layer, file_layer) = match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (None, Some(layer))
        }
        None => (
            Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
            None,
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Ok(())
}

fn prompt_locator() -> Result<String> {
    print!("Enter the YouTube URL: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("Failed to read URL from stdin")?;
    Ok(line.trim().to_string())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let toml_config = resolve_toml_config(args.config.as_deref(), MODULE_NAME)?;
    init_logging(&toml_config.logging, args.verbose)?;

    info!(
        "Starting ytmix-tf {} (git {}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = FinderConfig::resolve(args.overrides(), &toml_config)?;

    let locator = match &args.locator {
        Some(locator) => locator.trim().to_string(),
        None => prompt_locator()?,
    };
    if locator.is_empty() {
        println!("✗ Error: no source given");
        return Ok(ExitCode::FAILURE);
    }

    let rate = config.analysis_sample_rate;
    let source = SourceRouter::new(
        LocalFileSource::new(rate),
        HttpSource::new(rate, config.http_timeout),
        YtDlpSource::new(config.ytdlp.clone(), rate),
    );
    let recognizer = SongRecRecognizer::new(&config.songrec_binary, config.recognizer_timeout)
        .context("Failed to create recognizer scratch directory")?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if signal::ctrl_c().await.is_ok() {
                warn!("Received Ctrl+C, stopping");
                cancel.cancel();
            }
        });
    }

    let (event_tx, mut event_rx) = mpsc::channel(100);
    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            print!("{}", progress_text(&event));
            let _ = std::io::stdout().flush();
        }
    });

    let finder = TrackFinder::new(Arc::new(source), Arc::new(recognizer), config.run_settings())
        .with_events(event_tx)
        .with_cancellation(cancel);

    let outcome = finder.run(&locator).await;
    // Closes the event channel and releases the recognizer's scratch space
    drop(finder);
    let _ = printer.await;

    let result = match outcome {
        Ok(result) => result,
        Err(FinderError::Cancelled) => {
            println!("\n✗ Cancelled, nothing to report");
            return Ok(ExitCode::from(EXIT_INTERRUPTED));
        }
        Err(e) => {
            println!("\n✗ Error: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    println!();
    print!("{}", render_tracklist(&result.segments));

    if args.no_export {
        info!("Export skipped (--no-export)");
    } else {
        match JsonExporter::new(&config.output_dir).export(&result) {
            Ok(path) => println!("  Saved to: {}", path),
            Err(e) => println!("✗ {}", e),
        }
    }

    Ok(ExitCode::SUCCESS)
}
