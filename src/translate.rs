//! Text-translation capability seam.
//!
//! The translation model itself lives outside this crate; the pipeline only
//! depends on this trait. Implementations must return input unchanged when
//! source and target languages match, and an empty string for
//! empty/whitespace-only input.

use crate::error::{AwaazError, Result};
use crate::transcript::Segment;

/// Trait for machine translation between language codes.
pub trait Translator: Send {
    /// Translate text from `source_lang` to `target_lang`.
    fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String>;

    /// Translate each segment's text, keeping timestamps intact.
    ///
    /// Default implementation translates segment-by-segment; segments with
    /// empty text pass through untouched.
    fn translate_segments(
        &self,
        segments: &[Segment],
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Vec<Segment>> {
        let mut translated = Vec::with_capacity(segments.len());
        for segment in segments {
            if segment.text.trim().is_empty() {
                translated.push(segment.clone());
                continue;
            }
            let text = self.translate(&segment.text, source_lang, target_lang)?;
            let mut copy = segment.clone();
            copy.text = text;
            translated.push(copy);
        }
        Ok(translated)
    }

    /// Check if the translation backend is loaded and usable.
    fn is_available(&self) -> bool;
}

/// Word-substitution translator for tests and offline smoke runs.
///
/// Looks up whole words in a fixed mapping, passing unknown words through.
#[derive(Debug, Clone, Default)]
pub struct DictionaryTranslator {
    entries: Vec<(String, String)>,
    available: bool,
    fail: bool,
}

impl DictionaryTranslator {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            available: true,
            fail: false,
        }
    }

    /// Add a word mapping.
    pub fn with_entry(mut self, from: &str, to: &str) -> Self {
        self.entries.push((from.to_string(), to.to_string()));
        self
    }

    /// Configure the translator to report itself unavailable.
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Configure translate calls to fail.
    pub fn with_failure(mut self) -> Self {
        self.fail = true;
        self
    }
}

impl Translator for DictionaryTranslator {
    fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }
        if source_lang == target_lang {
            return Ok(text.to_string());
        }
        if self.fail {
            return Err(AwaazError::Translation {
                message: "dictionary translator failure".to_string(),
            });
        }
        let translated: Vec<&str> = text
            .split_whitespace()
            .map(|word| {
                self.entries
                    .iter()
                    .find(|(from, _)| from == word)
                    .map(|(_, to)| to.as_str())
                    .unwrap_or(word)
            })
            .collect();
        Ok(translated.join(" "))
    }

    fn is_available(&self) -> bool {
        self.available
    }
}
