//! Output formatting for transcription results.
//!
//! Three renderings: plain text, paragraphs broken at silence gaps, and a
//! timestamped listing with optional speaker labels. All formatters fall
//! back to the combined text when no segments are available.

use crate::defaults;
use crate::speaker;
use crate::transcript::{Segment, TranscriptionResult};
use std::str::FromStr;

/// Rendering selected for a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    Plain,
    #[default]
    Paragraphs,
    Timestamped,
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "plain" => Ok(Format::Plain),
            "paragraphs" => Ok(Format::Paragraphs),
            "timestamped" => Ok(Format::Timestamped),
            other => Err(format!(
                "unknown format '{other}' (expected plain, paragraphs, or timestamped)"
            )),
        }
    }
}

/// Render a result in the requested format.
pub fn format(result: &TranscriptionResult, format: Format, include_speakers: bool) -> String {
    match format {
        Format::Plain => plain(result),
        Format::Paragraphs => {
            paragraphs(display_segments(result), &result.text, defaults::PARAGRAPH_GAP_S)
        }
        Format::Timestamped => timestamped(display_segments(result), &result.text, include_speakers),
    }
}

/// The segment track the formatters should display: Urdu when present,
/// otherwise English.
fn display_segments(result: &TranscriptionResult) -> &[Segment] {
    if result.urdu_segments.is_empty() {
        &result.english_segments
    } else {
        &result.urdu_segments
    }
}

/// The combined text, as-is.
pub fn plain(result: &TranscriptionResult) -> String {
    result.text.clone()
}

/// Group segments into paragraphs, starting a new one whenever the silence
/// before a segment exceeds `min_gap_s`. Segments under two characters are
/// skipped as punctuation noise.
pub fn paragraphs(segments: &[Segment], fallback: &str, min_gap_s: f64) -> String {
    if segments.is_empty() {
        return fallback.to_string();
    }

    let mut paragraphs: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut prev_end = 0.0f64;

    for segment in segments {
        let text = segment.text.trim();
        if text.chars().count() < 2 {
            continue;
        }

        if segment.start - prev_end > min_gap_s && !current.is_empty() {
            paragraphs.push(current.join(" "));
            current.clear();
        }

        current.push(text);
        prev_end = segment.end;
    }

    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }

    paragraphs.join("\n\n")
}

/// One line per segment: `[start - end] {Speaker: }text`. Speaker labels
/// come from the two-party gap heuristic when requested.
pub fn timestamped(segments: &[Segment], fallback: &str, include_speakers: bool) -> String {
    if segments.is_empty() {
        return fallback.to_string();
    }

    let labeled;
    let segments = if include_speakers {
        labeled = speaker::assign_speakers(segments);
        &labeled[..]
    } else {
        segments
    };

    let mut lines = Vec::with_capacity(segments.len());
    for segment in segments {
        let text = segment.text.trim();
        if text.chars().count() < 2 {
            continue;
        }

        let start = format_timestamp(segment.start);
        let end = format_timestamp(segment.end);
        match &segment.speaker {
            Some(speaker) => lines.push(format!("[{start} - {end}] {speaker}: {text}")),
            None => lines.push(format!("[{start} - {end}] {text}")),
        }
    }

    lines.join("\n")
}

/// Seconds to `HH:MM:SS.mmm`, truncating rather than rounding.
fn format_timestamp(seconds: f64) -> String {
    let hours = (seconds / 3600.0) as u64;
    let minutes = ((seconds % 3600.0) / 60.0) as u64;
    let secs = (seconds % 60.0) as u64;
    let millis = ((seconds % 1.0) * 1000.0) as u64;
    format!("{hours:02}:{minutes:02}:{secs:02}.{millis:03}")
}
