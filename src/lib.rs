//! awaaz - Multilingual speech transcription to Urdu and English
//!
//! Chunked dual-pass transcription for Urdu, Hindi, Sindhi, Pashto,
//! Punjabi, and Balochi audio, with machine-translation fallback and
//! speaker-labeled output formatting.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod asr;
pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod lang;
pub mod output;
pub mod speaker;
pub mod transcript;
pub mod translate;

// Engine and the seams it orchestrates
pub use asr::{
    DecodeParams, Device, EngineConfig, ModelProvider, SpeechModel, Task, TranscriptionEngine,
};
pub use translate::Translator;

// Data types
pub use transcript::{Segment, TranscriptionResult};

// Error handling
pub use error::{AwaazError, Result};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
