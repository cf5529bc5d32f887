//! Language routing: which script to decode toward and whether a secondary
//! translation pass is needed.

use crate::defaults;

/// Per-chunk routing decision derived from the language selection and/or
/// detection. Ephemeral: computed fresh for every transcription call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageRoute {
    /// Language code handed to the speech model for decoding.
    pub source_lang: String,
    /// Bias decoding toward Urdu script instead of visually similar
    /// Devanagari output.
    pub force_urdu_script: bool,
    /// A machine-translation pass to Urdu is required after transcription.
    pub needs_translation: bool,
}

/// Resolve the effective language for a chunk.
///
/// An explicit (non-auto) request is authoritative. Otherwise the detected
/// language is used, unless its confidence is below
/// [`defaults::DETECTION_CONFIDENCE_THRESHOLD`], in which case Sindhi is
/// assumed rather than trusting the guess.
pub fn route(requested: Option<&str>, detected: &str, confidence: f32) -> LanguageRoute {
    let lang_code = match requested {
        Some(lang) if lang != defaults::AUTO_LANGUAGE => lang.to_string(),
        _ => {
            if confidence < defaults::DETECTION_CONFIDENCE_THRESHOLD {
                defaults::LOW_CONFIDENCE_LANGUAGE.to_string()
            } else {
                detected.to_string()
            }
        }
    };

    let needs_translation = defaults::TRANSLATION_LANGUAGES.contains(&lang_code.as_str());

    // Hindi and Urdu share a spoken register; both decode as Urdu. Balochi
    // has no dedicated decode path and rides on the Sindhi model. Anything
    // unrecognized passes through unchanged.
    let mut source_lang = match lang_code.as_str() {
        "ur" | "hi" => "ur".to_string(),
        "bal" => "sd".to_string(),
        other => other.to_string(),
    };

    let force_urdu_script = lang_code == "hi"
        || lang_code == defaults::PRIMARY_LANGUAGE
        || requested == Some(defaults::PRIMARY_LANGUAGE);

    if force_urdu_script {
        source_lang = defaults::PRIMARY_LANGUAGE.to_string();
    }

    LanguageRoute {
        source_lang,
        force_urdu_script,
        needs_translation,
    }
}

/// True if any character falls in the Devanagari block.
pub fn contains_devanagari(text: &str) -> bool {
    text.chars()
        .any(|c| defaults::DEVANAGARI_RANGE.contains(&(c as u32)))
}
