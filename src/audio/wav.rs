//! WAV decode capability.
//!
//! Decodes a WAV container into the pipeline's native format: mono f32 at
//! 16 kHz. Stereo input is downmixed, other sample rates are linearly
//! resampled. Unreadable input surfaces as [`AwaazError::Decode`].

use crate::audio::buffer::AudioBuffer;
use crate::defaults::SAMPLE_RATE;
use crate::error::{AwaazError, Result};
use std::io::Read;
use std::path::Path;

/// Load a WAV file into a normalized-format audio buffer.
pub fn load(path: &Path) -> Result<AudioBuffer> {
    let file = std::fs::File::open(path).map_err(|e| AwaazError::Decode {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    from_reader(Box::new(file)).map_err(|e| match e {
        AwaazError::Decode { message, .. } => AwaazError::Decode {
            path: path.display().to_string(),
            message,
        },
        other => other,
    })
}

/// Decode WAV data from any reader (for testing/flexibility).
pub fn from_reader(reader: Box<dyn Read + Send>) -> Result<AudioBuffer> {
    let mut wav_reader = hound::WavReader::new(reader).map_err(|e| AwaazError::Decode {
        path: "<reader>".to_string(),
        message: format!("Failed to parse WAV file: {}", e),
    })?;

    let spec = wav_reader.spec();
    let source_rate = spec.sample_rate;
    let source_channels = spec.channels;

    let raw_samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => wav_reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / 32_768.0))
            .collect::<std::result::Result<Vec<_>, _>>(),
        hound::SampleFormat::Float => wav_reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>(),
    }
    .map_err(|e| AwaazError::Decode {
        path: "<reader>".to_string(),
        message: format!("Failed to read WAV samples: {}", e),
    })?;

    // Downmix to mono
    let mono_samples = if source_channels == 2 {
        raw_samples
            .chunks_exact(2)
            .map(|pair| (pair[0] + pair[1]) / 2.0)
            .collect()
    } else {
        raw_samples
    };

    let samples = if source_rate != SAMPLE_RATE {
        resample(&mono_samples, source_rate, SAMPLE_RATE)
    } else {
        mono_samples
    };

    Ok(AudioBuffer::new(samples, SAMPLE_RATE))
}

/// Simple linear interpolation resampling.
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = source_pos.floor() as usize;
            let fraction = (source_pos - source_idx as f64) as f32;

            if source_idx + 1 >= samples.len() {
                samples[samples.len() - 1]
            } else {
                let left = samples[source_idx];
                let right = samples[source_idx + 1];
                left + (right - left) * fraction
            }
        })
        .collect()
}
