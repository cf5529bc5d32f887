//! Speech recognition: model seam, quality filtering, dual-pass engine,
//! and multi-chunk assembly.

pub mod assemble;
pub mod engine;
pub mod filter;
pub mod model;
#[cfg(feature = "whisper")]
pub mod whisper;

pub use engine::{EngineConfig, TranscriptionEngine};
pub use model::{DecodeParams, Device, ModelOutput, ModelProvider, SpeechModel, Task};
