//! Whisper-backed speech model.
//!
//! Implements [`SpeechModel`] and [`ModelProvider`] on top of whisper-rs.
//!
//! # Feature Gate
//!
//! This module requires the `whisper` feature to be enabled and cmake to be
//! installed. To build with Whisper support:
//!
//! ```bash
//! cargo build --features whisper
//! ```

use crate::asr::model::{DecodeParams, Device, ModelOutput, ModelProvider, SpeechModel, Task};
use crate::error::{AwaazError, Result};
use crate::transcript::Segment;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};
use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, install_logging_hooks,
};

static LOGGING_HOOKS_INSTALLED: Once = Once::new();

/// Whisper model wrapper.
///
/// The WhisperContext is wrapped in a Mutex to ensure thread safety; each
/// decoding pass gets its own state.
pub struct WhisperModel {
    context: Mutex<WhisperContext>,
    device: Device,
    threads: Option<i32>,
}

impl std::fmt::Debug for WhisperModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperModel")
            .field("device", &self.device)
            .field("threads", &self.threads)
            .field("context", &"<WhisperContext>")
            .finish()
    }
}

impl WhisperModel {
    /// Load a ggml model file onto a device.
    pub fn load(model_path: &Path, device: Device, threads: Option<i32>) -> Result<Self> {
        // Install logging hooks to suppress whisper.cpp output (only once)
        LOGGING_HOOKS_INSTALLED.call_once(|| {
            install_logging_hooks();
        });

        if !model_path.exists() {
            return Err(AwaazError::ModelLoad {
                model: model_path.to_string_lossy().to_string(),
                device: device.as_str().to_string(),
                message: "model file not found".to_string(),
            });
        }

        let mut context_params = WhisperContextParameters::default();
        context_params.use_gpu(device == Device::Cuda);
        // Fused attention kernels avoid the standalone softmax CUDA kernel,
        // which crashes on Blackwell GPUs (sm_120) with ggml <= 1.7.6
        context_params.flash_attn(device == Device::Cuda);

        let path_str = model_path.to_str().ok_or_else(|| AwaazError::ModelLoad {
            model: model_path.to_string_lossy().to_string(),
            device: device.as_str().to_string(),
            message: "invalid UTF-8 in model path".to_string(),
        })?;
        let context = WhisperContext::new_with_params(path_str, context_params).map_err(|e| {
            AwaazError::ModelLoad {
                model: model_path.to_string_lossy().to_string(),
                device: device.as_str().to_string(),
                message: e.to_string(),
            }
        })?;

        Ok(Self {
            context: Mutex::new(context),
            device,
            threads,
        })
    }

    fn inference_error(&self, message: String) -> AwaazError {
        // Failures on the accelerated device are treated as recoverable so
        // the engine can retry the pass on the CPU
        if self.device == Device::Cuda {
            AwaazError::Acceleration { message }
        } else {
            AwaazError::Transcription { message }
        }
    }

    fn full_params<'a>(&self, decode: &'a DecodeParams) -> FullParams<'a, 'a> {
        let strategy = if decode.beam_size > 1 {
            SamplingStrategy::BeamSearch {
                beam_size: decode.beam_size as i32,
                patience: -1.0,
            }
        } else {
            SamplingStrategy::Greedy {
                best_of: decode.best_of as i32,
            }
        };
        let mut params = FullParams::new(strategy);

        params.set_language(Some(&decode.language));
        params.set_translate(decode.task == Task::Translate);
        if let Some(prompt) = &decode.initial_prompt {
            params.set_initial_prompt(prompt);
        }

        // whisper.cpp models the temperature ladder as a start value plus a
        // fixed increment per fallback attempt
        let first = decode.temperatures.first().copied().unwrap_or(0.0);
        let increment = if decode.temperatures.len() > 1 {
            decode.temperatures[1] - decode.temperatures[0]
        } else {
            0.0
        };
        params.set_temperature(first);
        params.set_temperature_inc(increment);

        params.set_no_speech_thold(decode.no_speech_threshold);
        params.set_logprob_thold(decode.logprob_threshold);
        params.set_no_context(!decode.condition_on_previous_text);

        if let Some(threads) = self.threads {
            params.set_n_threads(threads);
        }

        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        params
    }
}

impl SpeechModel for WhisperModel {
    fn run(&self, samples: &[f32], params: &DecodeParams) -> Result<ModelOutput> {
        let context = self
            .context
            .lock()
            .map_err(|e| self.inference_error(format!("context lock poisoned: {e}")))?;

        let mut state = context
            .create_state()
            .map_err(|e| self.inference_error(format!("failed to create state: {e}")))?;

        let full_params = self.full_params(params);
        state
            .full(full_params, samples)
            .map_err(|e| self.inference_error(format!("inference failed: {e}")))?;

        let lang_id = state.full_lang_id_from_state();
        let detected_language = whisper_rs::get_lang_str(lang_id).unwrap_or("").to_string();

        let mut segments = Vec::new();
        for segment in state.as_iter() {
            // Timestamps arrive in centiseconds
            let mut out = Segment::new(
                segment.to_string().trim(),
                segment.start_timestamp() as f64 / 100.0,
                segment.end_timestamp() as f64 / 100.0,
            );
            out.no_speech_prob = segment.no_speech_probability();
            segments.push(out);
        }

        Ok(ModelOutput {
            segments,
            detected_language,
        })
    }

    fn detect_language(&self, samples: &[f32]) -> Result<(String, f32)> {
        // whisper.cpp does not expose per-language probabilities through a
        // completed decode, so run a minimal greedy pass and report its
        // language choice with full confidence
        let context = self
            .context
            .lock()
            .map_err(|e| self.inference_error(format!("context lock poisoned: {e}")))?;
        let mut state = context
            .create_state()
            .map_err(|e| self.inference_error(format!("failed to create state: {e}")))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(None);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        if let Some(threads) = self.threads {
            params.set_n_threads(threads);
        }

        state
            .full(params, samples)
            .map_err(|e| self.inference_error(format!("language detection failed: {e}")))?;

        let lang_id = state.full_lang_id_from_state();
        let language = whisper_rs::get_lang_str(lang_id).unwrap_or("").to_string();
        Ok((language, 1.0))
    }

    fn device(&self) -> Device {
        self.device
    }
}

/// Loads ggml models from a directory by size name.
#[derive(Debug, Clone)]
pub struct WhisperProvider {
    model_dir: PathBuf,
    threads: Option<i32>,
}

impl WhisperProvider {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            threads: None,
        }
    }

    pub fn with_threads(mut self, threads: i32) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Default model directory: `~/.cache/awaaz/models`, falling back to a
    /// local `models/` directory.
    pub fn default_model_dir() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            let cache = PathBuf::from(home).join(".cache/awaaz/models");
            if cache.exists() {
                return cache;
            }
        }
        PathBuf::from("models")
    }

    pub fn model_path(&self, model_size: &str) -> PathBuf {
        self.model_dir.join(format!("ggml-{model_size}.bin"))
    }
}

impl ModelProvider for WhisperProvider {
    fn load(&self, model_size: &str, device: Device) -> Result<Box<dyn SpeechModel>> {
        let path = self.model_path(model_size);
        let model = WhisperModel::load(&path, device, self.threads)?;
        Ok(Box::new(model))
    }
}
