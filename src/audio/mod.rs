//! Audio buffers, chunk planning, and WAV decoding.

pub mod buffer;
pub mod chunker;
pub mod wav;

pub use buffer::AudioBuffer;
pub use chunker::{AudioChunk, ChunkPlan, plan, split};
