//! Command-line interface for awaaz
//!
//! Provides argument parsing using clap derive macros.

use clap::Parser;
use std::path::PathBuf;

/// Multilingual speech transcription to Urdu and English
#[derive(Parser, Debug)]
#[command(
    name = "awaaz",
    version,
    about = "Multilingual speech transcription to Urdu and English"
)]
pub struct Cli {
    /// WAV file to transcribe
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Language code of the recording (default: auto-detect). Examples: auto, ur, sd, ps, pa
    #[arg(short, long, value_name = "LANG")]
    pub language: Option<String>,

    /// Whisper model size (tiny, base, small, medium, large-v3)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Compute device (cpu, cuda)
    #[arg(short, long, value_name = "DEVICE")]
    pub device: Option<String>,

    /// Output format (plain, paragraphs, timestamped)
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<crate::output::Format>,

    /// Disable Party1/Party2 speaker labels in timestamped output
    #[arg(long)]
    pub no_speakers: bool,

    /// Directory containing ggml model files
    #[arg(long, value_name = "DIR")]
    pub model_dir: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress progress and status output
    #[arg(short, long)]
    pub quiet: bool,
}
