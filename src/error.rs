//! Error types for awaaz.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwaazError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Model lifecycle errors
    #[error("Failed to load speech model '{model}' on {device}: {message}")]
    ModelLoad {
        model: String,
        device: String,
        message: String,
    },

    // Hardware acceleration errors (recoverable, trigger CPU fallback)
    #[error("Hardware acceleration failed: {message}")]
    Acceleration { message: String },

    // Audio decode errors (fatal for the specific file)
    #[error("Failed to decode audio file {path}: {message}")]
    Decode { path: String, message: String },

    // Transcription errors
    #[error("Transcription failed: {message}")]
    Transcription { message: String },

    // Translation errors (recoverable, pipeline substitutes source text)
    #[error("Translation failed: {message}")]
    Translation { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl AwaazError {
    /// True for errors the pipeline absorbs by degrading (CPU fallback,
    /// untranslated source text) rather than surfacing to the caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AwaazError::Acceleration { .. } | AwaazError::Translation { .. }
        )
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, AwaazError>;
