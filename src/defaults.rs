//! Default configuration constants for awaaz.
//!
//! Heuristic thresholds are named here rather than inlined so tests can
//! probe boundary behavior exactly.

/// Audio sample rate in Hz.
///
/// 16kHz mono is what the speech model consumes; everything entering the
/// pipeline is resampled to this rate first.
pub const SAMPLE_RATE: u32 = 16_000;

/// Peak amplitude target for normalization.
///
/// Audio is rescaled so the loudest sample sits at ±0.95, leaving headroom
/// against clipping from resampling artifacts.
pub const PEAK_AMPLITUDE: f32 = 0.95;

/// Default speech model size.
pub const DEFAULT_MODEL: &str = "base";

/// Model sizes that materially constrain chunk length and decode search
/// width. Long single passes through these exhaust accelerator memory.
pub const HIGH_MEMORY_MODELS: &[&str] = &["large", "large-v2", "large-v3", "large-v3-turbo", "turbo"];

/// Language value that triggers automatic language detection.
pub const AUTO_LANGUAGE: &str = "auto";

/// Primary target language (Urdu).
pub const PRIMARY_LANGUAGE: &str = "ur";

/// English language code.
pub const ENGLISH_LANGUAGE: &str = "en";

/// Source language assumed when auto-detection is too uncertain to trust.
pub const LOW_CONFIDENCE_LANGUAGE: &str = "sd";

/// Minimum detection confidence before the detected language is trusted.
pub const DETECTION_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Languages requiring a secondary machine-translation pass to reach Urdu.
pub const TRANSLATION_LANGUAGES: &[&str] = &["sd", "ps", "bal"];

/// Initial prompt that biases decoding toward Urdu script ("this is in Urdu").
pub const URDU_PROMPT: &str = "یہ اردو میں ہے";

/// Urdu full stop glyph.
pub const URDU_FULL_STOP: char = '۔';

/// Devanagari Unicode block, inclusive. Output in this range while Urdu
/// script was forced indicates the model drifted into Hindi.
pub const DEVANAGARI_RANGE: std::ops::RangeInclusive<u32> = 0x0900..=0x097F;

/// Temperature ladder tried in order to recover from failed decodes.
pub const TEMPERATURE_LADDER: &[f32] = &[0.0, 0.2, 0.4];

/// No-speech probability above which the model call rejects a segment.
pub const NO_SPEECH_THRESHOLD: f32 = 0.6;

/// Compression ratio above which decoded text is treated as degenerate.
pub const COMPRESSION_RATIO_THRESHOLD: f32 = 2.4;

/// Average log probability below which a decode attempt is considered failed.
pub const LOGPROB_THRESHOLD: f32 = -1.0;

/// Beam / best-of width for high-memory models on an accelerated device.
pub const NARROW_SEARCH_WIDTH: u32 = 3;

/// Beam / best-of width for everything else.
pub const WIDE_SEARCH_WIDTH: u32 = 5;

/// Word repetition count at which a segment is extremely repetitive.
pub const WORD_REPEAT_LIMIT: usize = 5;

/// Unique-word ratio below which a segment is extremely repetitive.
pub const UNIQUE_WORD_RATIO: f32 = 0.2;

/// Fraction of full-stop glyphs above which a segment is nonsensical.
pub const FULL_STOP_RATIO: f32 = 0.7;

/// Inter-segment silence in seconds treated as a possible speaker change.
pub const SPEAKER_GAP_THRESHOLD_S: f64 = 3.0;

/// Minimum ratio of significant gaps for two-party labeling to stand.
pub const SPEAKER_GAP_RATIO_MIN: f64 = 0.25;

/// Multiplier on the gap threshold used by the speaker reversion rule.
pub const SPEAKER_AVG_GAP_FACTOR: f64 = 1.5;

/// Inter-segment gap in seconds that starts a new paragraph when formatting.
pub const PARAGRAPH_GAP_S: f64 = 2.0;

/// Report the GPU backend compiled into this build.
///
/// Only one GPU backend can be active at a time; if none is enabled,
/// returns "CPU".
pub fn gpu_backend() -> &'static str {
    if cfg!(feature = "cuda") {
        "CUDA"
    } else if cfg!(feature = "vulkan") {
        "Vulkan"
    } else if cfg!(feature = "hipblas") {
        "HipBLAS (AMD)"
    } else if cfg!(feature = "openblas") {
        "OpenBLAS"
    } else {
        "CPU"
    }
}
