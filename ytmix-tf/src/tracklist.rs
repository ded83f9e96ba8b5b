//! Terminal rendering of progress and the final tracklist

use crate::types::TrackSegment;
use crate::workflow::FinderEvent;
use ytmix_common::human_time::{format_duration_ms, format_timestamp_ms};

const BANNER_WIDTH: usize = 60;

/// Text to print for a progress event
///
/// The returned text carries its own line endings: a window's start line is
/// left open so the outcome lands on the same line
/// (`  → Chunk 3/120 at 01:00... ✓ Title - Artist`).
pub fn progress_text(event: &FinderEvent) -> String {
    match event {
        FinderEvent::SourceFetching { .. } => "[1/4] Fetching audio...\n".to_string(),
        FinderEvent::SourceReady { title, duration_ms } => format!(
            "  Title: {}\n  Duration: {}\n",
            title,
            format_duration_ms(*duration_ms)
        ),
        FinderEvent::WindowsPlanned { total } => format!(
            "\n[2/4] Split audio into {} chunks\n\n[3/4] Identifying songs from {} chunks...\n",
            total, total
        ),
        FinderEvent::WindowStarted {
            index,
            total,
            start_ms,
        } => format!(
            "  → Chunk {}/{} at {}... ",
            index + 1,
            total,
            format_timestamp_ms(*start_ms)
        ),
        FinderEvent::WindowIdentified { title, artist, .. } => {
            format!("✓ {} - {}\n", title, artist)
        }
        FinderEvent::WindowUnidentified { .. } => "✗ Not identified\n".to_string(),
        FinderEvent::WindowFailed { message, .. } => {
            format!("✗ Not identified ({})\n", message)
        }
        FinderEvent::Cancelled { processed: 0, .. } => {
            "\n! Cancelled before any chunk was processed\n".to_string()
        }
        FinderEvent::Cancelled { processed, total } => format!(
            "\n! Cancelled after {}/{} chunks, keeping partial results\n",
            processed, total
        ),
        FinderEvent::RunCompleted { segments } => format!(
            "\n[4/4] Processing results...\n✓ Found {} unique songs\n",
            segments
        ),
    }
}

/// Numbered tracklist framed by `=` banners
pub fn render_tracklist(segments: &[TrackSegment]) -> String {
    let rule = "=".repeat(BANNER_WIDTH);
    let mut out = String::new();
    out.push_str(&rule);
    out.push_str("\nIDENTIFIED SONGS:\n");
    out.push_str(&rule);
    out.push('\n');
    for (i, segment) in segments.iter().enumerate() {
        out.push_str(&format!(
            "{}. [{}] {} - {}\n",
            i + 1,
            format_timestamp_ms(segment.start_ms),
            segment.identification.title,
            segment.identification.artist
        ));
    }
    out.push_str(&rule);
    out.push('\n');
    out
}
