//! Chunk planning for bounded-memory transcription.
//!
//! Long recordings must be split before the speech model sees them: large
//! models exhaust accelerator memory on long single passes. Short audio is
//! never split, since artificial boundaries lose decoding context.

use crate::audio::buffer::AudioBuffer;
use crate::defaults;

/// Decision on how a buffer of a given duration will be sliced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkPlan {
    /// Nominal chunk length in seconds. Equals the full duration for
    /// single-chunk runs.
    pub chunk_length_s: f64,
    /// Whole buffer goes through as one chunk; assembly is skipped.
    pub single_chunk: bool,
}

/// A contiguous slice of an audio buffer queued for one model pass.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioChunk {
    pub samples: Vec<f32>,
    /// Ordinal position within the run; multiplied by the plan's chunk
    /// length to recover absolute timestamps.
    pub index: usize,
    /// Actual duration of this chunk in seconds (the trailing chunk may be
    /// shorter than the plan's nominal length).
    pub duration_s: f64,
}

/// Decide chunk length for a recording.
///
/// Duration tiers: up to 2 minutes runs as a single chunk, up to 10 minutes
/// uses 60s chunks, up to 30 minutes 45s, beyond that 30s. High-memory
/// models get capped harder: 30s once past the minute mark, 25s past 20
/// minutes, and even short recordings over 40s are split.
pub fn plan(duration_seconds: f64, model_size: &str) -> ChunkPlan {
    let high_memory = defaults::HIGH_MEMORY_MODELS.contains(&model_size);

    let mut chunk_length_s = if duration_seconds <= 120.0 {
        if high_memory && duration_seconds > 40.0 {
            duration_seconds.min(30.0)
        } else {
            return ChunkPlan {
                chunk_length_s: duration_seconds,
                single_chunk: true,
            };
        }
    } else if duration_seconds <= 600.0 {
        60.0
    } else if duration_seconds <= 1800.0 {
        45.0
    } else {
        30.0
    };

    if high_memory {
        if duration_seconds > 60.0 {
            chunk_length_s = chunk_length_s.min(30.0);
        }
        if duration_seconds > 1200.0 {
            chunk_length_s = chunk_length_s.min(25.0);
        }
    }

    ChunkPlan {
        chunk_length_s: chunk_length_s.max(1.0),
        single_chunk: false,
    }
}

/// Slice a buffer according to a plan.
///
/// Chunks are cut at multiples of `chunk_length × sample_rate`; a trailing
/// partial chunk is kept when non-empty. Chunks never overlap.
pub fn split(buffer: &AudioBuffer, plan: ChunkPlan) -> Vec<AudioChunk> {
    let sample_rate = buffer.sample_rate();
    if plan.single_chunk {
        return vec![AudioChunk {
            samples: buffer.samples().to_vec(),
            index: 0,
            duration_s: buffer.duration_seconds(),
        }];
    }

    let chunk_samples = ((plan.chunk_length_s.max(1.0)) * sample_rate as f64) as usize;
    buffer
        .samples()
        .chunks(chunk_samples.max(1))
        .enumerate()
        .map(|(index, samples)| AudioChunk {
            samples: samples.to_vec(),
            index,
            duration_s: samples.len() as f64 / sample_rate as f64,
        })
        .collect()
}
