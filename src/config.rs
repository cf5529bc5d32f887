use crate::defaults;
use crate::error::{AwaazError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
#[cfg(feature = "cli")]
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub language: LanguageConfig,
    pub output: OutputConfig,
}

/// Speech model configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    /// Model size name ("tiny" through "large-v3").
    pub size: String,
    /// Compute device: "cuda" or "cpu".
    pub device: String,
}

/// Language selection configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LanguageConfig {
    /// Input language code, or "auto" for detection.
    pub input: String,
}

/// Output rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// "plain", "paragraphs", or "timestamped".
    pub format: String,
    /// Attach Party1/Party2 labels in timestamped output.
    pub speakers: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            size: defaults::DEFAULT_MODEL.to_string(),
            device: "cpu".to_string(),
        }
    }
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            input: defaults::AUTO_LANGUAGE.to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "paragraphs".to_string(),
            speakers: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only a missing file yields defaults; invalid TOML is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(AwaazError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - AWAAZ_MODEL → model.size
    /// - AWAAZ_DEVICE → model.device
    /// - AWAAZ_LANGUAGE → language.input
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(size) = std::env::var("AWAAZ_MODEL")
            && !size.is_empty()
        {
            self.model.size = size;
        }

        if let Ok(device) = std::env::var("AWAAZ_DEVICE")
            && !device.is_empty()
        {
            self.model.device = device;
        }

        if let Ok(language) = std::env::var("AWAAZ_LANGUAGE")
            && !language.is_empty()
        {
            self.language.input = language;
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/awaaz/config.toml on Linux
    #[cfg(feature = "cli")]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("awaaz").join("config.toml"))
    }
}
