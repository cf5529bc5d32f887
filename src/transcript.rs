//! Data types for transcription results.

use serde::{Deserialize, Serialize};

/// One timestamped span of recognized text.
///
/// Timestamps are chunk-relative when produced by a model pass and shifted
/// to run-relative time during assembly. `end >= start` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// Probability that the span contains no speech (0.0 to 1.0).
    #[serde(default)]
    pub no_speech_prob: f32,
    /// Text compression ratio reported by the decoder; high values mean
    /// repetitive, degenerate output.
    #[serde(default)]
    pub compression_ratio: f32,
    /// Conversational party label, attached by speaker assignment only.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub speaker: Option<String>,
}

impl Segment {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            no_speech_prob: 0.0,
            compression_ratio: 1.0,
            speaker: None,
        }
    }

    /// Shift both timestamps by a chunk offset.
    pub fn shift(&mut self, offset: f64) {
        self.start += offset;
        self.end += offset;
    }
}

/// Complete result of a transcription run.
///
/// Segment sequences are time-ordered by `start` and deduplicated across
/// chunk boundaries. Created once per run and never mutated after return.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptionResult {
    /// Text as recognized in the source language.
    pub original_text: String,
    /// Urdu-script text (the original text when no translation applied).
    pub urdu_text: String,
    /// English text from the translate pass.
    pub english_text: String,
    /// Language the model reported for the audio.
    pub original_language: String,
    pub urdu_segments: Vec<Segment>,
    pub english_segments: Vec<Segment>,
    /// Display text: the Urdu track when present, else the English track.
    pub text: String,
}
