//! Segment quality filtering.
//!
//! Whisper-class decoders degenerate on noisy or silent stretches into
//! looped words or punctuation runs. This filter removes only the obviously
//! broken segments; borderline text passes through so real speech is never
//! discarded on a hunch.

use crate::defaults;
use crate::transcript::Segment;

/// Drop segments whose text is empty, extremely repetitive, or nonsensical.
///
/// Filtering is deliberately light. Callers that cannot afford an empty
/// result should fall back to the unfiltered segments.
pub fn filter_segments(segments: Vec<Segment>) -> Vec<Segment> {
    segments
        .into_iter()
        .filter(|segment| {
            let text = segment.text.trim();
            !text.is_empty() && !is_extremely_repetitive(text) && !is_nonsensical(text)
        })
        .collect()
}

/// Detect pathological repetition loops, e.g. the same word five times over.
fn is_extremely_repetitive(text: &str) -> bool {
    if text.chars().count() < 6 {
        return false;
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() < 3 {
        return false;
    }

    // Substring count, not word count: catches run-together repeats too
    for word in &words {
        if word.chars().count() > 1 && count_occurrences(text, word) >= defaults::WORD_REPEAT_LIMIT
        {
            return true;
        }
    }

    let unique: std::collections::HashSet<&str> = words.iter().copied().collect();
    (unique.len() as f64) < (words.len() as f64) * defaults::UNIQUE_WORD_RATIO as f64
}

/// Detect text with no linguistic content: punctuation-only, a single
/// character repeated, or mostly Urdu full stops.
fn is_nonsensical(text: &str) -> bool {
    let cleaned: Vec<char> = text
        .chars()
        .filter(|&c| c != ' ' && c != defaults::URDU_FULL_STOP && c != '.')
        .collect();
    if cleaned.is_empty() {
        return true;
    }

    let distinct: std::collections::HashSet<char> = cleaned.iter().copied().collect();
    if distinct.len() == 1 && cleaned.len() > 5 {
        return true;
    }

    let full_stops = text.chars().filter(|&c| c == defaults::URDU_FULL_STOP).count();
    (full_stops as f64) > (text.chars().count() as f64) * defaults::FULL_STOP_RATIO as f64
}

/// Count non-overlapping occurrences of `needle` in `haystack`.
fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}
