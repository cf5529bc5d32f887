//! Mono 16 kHz audio buffer with peak normalization.

use crate::defaults;

/// Mono floating-point audio at a fixed sample rate.
///
/// The pipeline reads buffers but never mutates a caller's copy;
/// [`AudioBuffer::normalized`] produces a new buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Convenience constructor at the pipeline's native 16 kHz rate.
    pub fn at_native_rate(samples: Vec<f32>) -> Self {
        Self::new(samples, defaults::SAMPLE_RATE)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration of the buffer in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Rescale so the loudest sample sits at ±[`defaults::PEAK_AMPLITUDE`].
    ///
    /// Silent buffers come back unchanged.
    pub fn normalized(&self) -> Self {
        let peak = self.samples.iter().fold(0.0_f32, |acc, s| acc.max(s.abs()));
        if peak <= 0.0 {
            return self.clone();
        }
        let scale = defaults::PEAK_AMPLITUDE / peak;
        Self {
            samples: self.samples.iter().map(|s| s * scale).collect(),
            sample_rate: self.sample_rate,
        }
    }
}
