//! Human-readable time formatting
//!
//! Provides consistent time display formatting for tracklists, progress
//! output and exported results.

const MS_PER_SECOND: u64 = 1000;
const SECONDS_PER_MINUTE: u64 = 60;

/// Format a millisecond offset as a zero-padded `MM:SS` timestamp.
///
/// Sub-second remainders are truncated. Minutes are not wrapped into hours,
/// so offsets past the first hour keep counting (`75:03`).
///
/// # Examples
///
/// ```
/// use ytmix_common::human_time::format_timestamp_ms;
///
/// assert_eq!(format_timestamp_ms(0), "00:00");
/// assert_eq!(format_timestamp_ms(30_000), "00:30");
/// assert_eq!(format_timestamp_ms(61_999), "01:01");
/// assert_eq!(format_timestamp_ms(4_503_000), "75:03");
/// ```
pub fn format_timestamp_ms(ms: u64) -> String {
    let seconds = ms / MS_PER_SECOND;
    let minutes = seconds / SECONDS_PER_MINUTE;
    let seconds = seconds % SECONDS_PER_MINUTE;
    format!("{:02}:{:02}", minutes, seconds)
}

/// Format a whole-second duration as `M:SS` (minutes not padded).
///
/// Used for source metadata, e.g. the length of a downloaded mix.
///
/// # Examples
///
/// ```
/// use ytmix_common::human_time::format_duration_secs;
///
/// assert_eq!(format_duration_secs(0), "0:00");
/// assert_eq!(format_duration_secs(330), "5:30");
/// assert_eq!(format_duration_secs(3725), "62:05");
/// ```
pub fn format_duration_secs(seconds: u64) -> String {
    format!(
        "{}:{:02}",
        seconds / SECONDS_PER_MINUTE,
        seconds % SECONDS_PER_MINUTE
    )
}

/// Format a millisecond duration as `M:SS`.
///
/// Convenience wrapper over [`format_duration_secs`].
pub fn format_duration_ms(ms: u64) -> String {
    format_duration_secs(ms / MS_PER_SECOND)
}
