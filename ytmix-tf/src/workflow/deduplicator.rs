//! Tracklist deduplication
//!
//! Collapses the raw recognition timeline into track segments. A segment is
//! emitted whenever an identified event's provider key differs from the key
//! of the last emitted segment. Unidentified events emit nothing.
//!
//! What an unidentified event does to the tracked key is an
//! [`AbsencePolicy`]. The default, `Bridge`, leaves it untouched, so a single
//! missed window inside a song does not split that song in two.

use crate::types::{Identification, RecognitionEvent, TrackSegment};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// How unidentified events affect segment collapsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AbsencePolicy {
    /// Keep tracking the last emitted key across gaps
    #[default]
    Bridge,
    /// A gap forgets the last emitted key; the same song after a gap starts
    /// a new segment
    Split,
}

impl FromStr for AbsencePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bridge" => Ok(AbsencePolicy::Bridge),
            "split" => Ok(AbsencePolicy::Split),
            other => Err(format!(
                "unknown absence policy '{}' (expected 'bridge' or 'split')",
                other
            )),
        }
    }
}

impl fmt::Display for AbsencePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbsencePolicy::Bridge => write!(f, "bridge"),
            AbsencePolicy::Split => write!(f, "split"),
        }
    }
}

/// Collapse consecutive identical identifications into track segments
///
/// Output depends only on the ordered input. Identifications with an empty
/// provider key never match anything, so each one becomes its own segment.
pub fn deduplicate(events: &[RecognitionEvent], policy: AbsencePolicy) -> Vec<TrackSegment> {
    let mut segments: Vec<TrackSegment> = Vec::new();
    let mut last_emitted: Option<&Identification> = None;

    for event in events {
        let Some(identification) = &event.identification else {
            if policy == AbsencePolicy::Split {
                last_emitted = None;
            }
            continue;
        };

        let repeat = last_emitted.is_some_and(|last| last.same_song(identification));
        if !repeat {
            segments.push(TrackSegment {
                start_ms: event.start_ms,
                identification: identification.clone(),
            });
            last_emitted = Some(identification);
        }
    }

    tracing::debug!(
        events = events.len(),
        segments = segments.len(),
        policy = %policy,
        "Deduplicated recognition timeline"
    );

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(key: &str) -> Identification {
        Identification {
            title: format!("Title {}", key),
            artist: format!("Artist {}", key),
            album: "Unknown Album".to_string(),
            external_ref: String::new(),
            provider_key: key.to_string(),
            raw: serde_json::Value::Null,
        }
    }

    /// Events 30s apart; `None` entries are unidentified windows
    fn timeline(keys: &[Option<&str>]) -> Vec<RecognitionEvent> {
        keys.iter()
            .enumerate()
            .map(|(i, key)| RecognitionEvent {
                start_ms: i as u64 * 30_000,
                identification: key.map(ident),
            })
            .collect()
    }

    fn keys_of(segments: &[TrackSegment]) -> Vec<&str> {
        segments
            .iter()
            .map(|s| s.identification.provider_key.as_str())
            .collect()
    }

    #[test]
    fn test_collapses_runs_and_bridges_gaps() {
        let events = timeline(&[
            Some("A"),
            Some("A"),
            None,
            Some("A"),
            Some("B"),
            Some("B"),
            None,
            Some("A"),
        ]);

        let segments = deduplicate(&events, AbsencePolicy::Bridge);

        assert_eq!(keys_of(&segments), vec!["A", "B", "A"]);
        let starts: Vec<u64> = segments.iter().map(|s| s.start_ms).collect();
        assert_eq!(starts, vec![0, 120_000, 210_000]);
    }

    #[test]
    fn test_split_policy_breaks_on_gap() {
        let events = timeline(&[Some("A"), None, Some("A"), Some("B")]);
        let segments = deduplicate(&events, AbsencePolicy::Split);
        assert_eq!(keys_of(&segments), vec!["A", "A", "B"]);
    }

    #[test]
    fn test_rerun_on_own_output_is_unchanged() {
        let events = timeline(&[Some("A"), Some("A"), None, Some("B"), Some("C"), Some("C")]);
        let first = deduplicate(&events, AbsencePolicy::Bridge);

        let as_events: Vec<RecognitionEvent> = first
            .iter()
            .map(|s| RecognitionEvent {
                start_ms: s.start_ms,
                identification: Some(s.identification.clone()),
            })
            .collect();
        let second = deduplicate(&as_events, AbsencePolicy::Bridge);

        assert_eq!(first, second);
    }

    #[test]
    fn test_all_absent_is_empty() {
        let events = timeline(&[None, None, None]);
        assert!(deduplicate(&events, AbsencePolicy::Bridge).is_empty());
        assert!(deduplicate(&events, AbsencePolicy::Split).is_empty());
    }

    #[test]
    fn test_empty_input_is_empty() {
        assert!(deduplicate(&[], AbsencePolicy::Bridge).is_empty());
    }

    #[test]
    fn test_empty_keys_never_collapse() {
        let events = timeline(&[Some(""), Some(""), Some("A")]);
        let segments = deduplicate(&events, AbsencePolicy::Bridge);
        assert_eq!(keys_of(&segments), vec!["", "", "A"]);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("bridge".parse::<AbsencePolicy>(), Ok(AbsencePolicy::Bridge));
        assert_eq!(" Split ".parse::<AbsencePolicy>(), Ok(AbsencePolicy::Split));
        assert!("merge".parse::<AbsencePolicy>().is_err());
        assert_eq!(AbsencePolicy::default().to_string(), "bridge");
    }
}
