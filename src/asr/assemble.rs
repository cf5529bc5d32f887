//! Multi-chunk result assembly.
//!
//! Each chunk is transcribed in isolation with timestamps starting at zero;
//! assembly shifts them back onto the recording's timeline, joins the text
//! tracks, and removes segments repeated verbatim across chunk boundaries.

use crate::transcript::{Segment, TranscriptionResult};

/// Accumulates per-chunk transcription results into one combined result.
#[derive(Debug, Default)]
pub struct ChunkAssembly {
    urdu_segments: Vec<Segment>,
    english_segments: Vec<Segment>,
    urdu_text_parts: Vec<String>,
    english_text_parts: Vec<String>,
    original_text_parts: Vec<String>,
    original_language: String,
}

impl ChunkAssembly {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in one chunk's result, shifting its segments by
    /// `chunk_index × chunk_length` seconds.
    pub fn push(&mut self, result: TranscriptionResult, chunk_index: usize, chunk_length_s: f64) {
        let offset = chunk_index as f64 * chunk_length_s;

        self.urdu_segments
            .extend(result.urdu_segments.into_iter().map(|mut s| {
                s.shift(offset);
                s
            }));
        self.english_segments
            .extend(result.english_segments.into_iter().map(|mut s| {
                s.shift(offset);
                s
            }));

        if !result.urdu_text.is_empty() {
            self.urdu_text_parts.push(result.urdu_text);
        }
        if !result.english_text.is_empty() {
            self.english_text_parts.push(result.english_text);
        }
        if !result.original_text.is_empty() {
            self.original_text_parts.push(result.original_text);
        }
        self.original_language = result.original_language;
    }

    /// Produce the combined result: joined text tracks and deduplicated
    /// segment lists. The `text` field prefers the Urdu track.
    pub fn finish(self) -> TranscriptionResult {
        let urdu_text = self.urdu_text_parts.join(" ").trim().to_string();
        let english_text = self.english_text_parts.join(" ").trim().to_string();
        let text = if urdu_text.is_empty() {
            english_text.clone()
        } else {
            urdu_text.clone()
        };

        TranscriptionResult {
            original_text: self.original_text_parts.join(" ").trim().to_string(),
            urdu_text,
            english_text,
            original_language: self.original_language,
            urdu_segments: dedup_segments(self.urdu_segments),
            english_segments: dedup_segments(self.english_segments),
            text,
        }
    }
}

/// Remove segments whose trimmed text exactly matches an earlier segment,
/// case-insensitively. Empty-text segments are dropped outright.
pub fn dedup_segments(segments: Vec<Segment>) -> Vec<Segment> {
    let mut seen = std::collections::HashSet::new();
    segments
        .into_iter()
        .filter(|segment| {
            let text = segment.text.trim();
            if text.is_empty() {
                return false;
            }
            seen.insert(text.to_lowercase())
        })
        .collect()
}
