//! Speech-recognition capability seam.
//!
//! The engine talks to the model through [`SpeechModel`] and reloads it
//! through [`ModelProvider`] when a hardware-acceleration failure forces a
//! device downgrade. Mock implementations let the orchestration logic be
//! tested without any model weights.

use crate::defaults;
use crate::error::{AwaazError, Result};
use crate::transcript::Segment;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Decoding task for a model pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Recognize speech in the source language.
    Transcribe,
    /// Recognize and translate to English in one pass.
    Translate,
}

/// Compute device for model inference. Only ever downgraded
/// (accelerated → CPU), never upgraded mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Cuda,
    Cpu,
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Cuda => "cuda",
            Device::Cpu => "cpu",
        }
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoding parameters for one model pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeParams {
    pub task: Task,
    pub language: String,
    pub beam_size: u32,
    pub best_of: u32,
    /// Temperatures tried in order to recover from failed decodes.
    pub temperatures: Vec<f32>,
    /// Half-precision inference; cleared after an acceleration failure.
    pub fp16: bool,
    /// Optional prompt biasing the decoder toward a script/register.
    pub initial_prompt: Option<String>,
    pub no_speech_threshold: f32,
    pub compression_ratio_threshold: f32,
    pub logprob_threshold: f32,
    pub condition_on_previous_text: bool,
}

impl DecodeParams {
    pub fn new(task: Task, language: impl Into<String>) -> Self {
        Self {
            task,
            language: language.into(),
            beam_size: defaults::WIDE_SEARCH_WIDTH,
            best_of: defaults::WIDE_SEARCH_WIDTH,
            temperatures: defaults::TEMPERATURE_LADDER.to_vec(),
            fp16: false,
            initial_prompt: None,
            no_speech_threshold: defaults::NO_SPEECH_THRESHOLD,
            compression_ratio_threshold: defaults::COMPRESSION_RATIO_THRESHOLD,
            logprob_threshold: defaults::LOGPROB_THRESHOLD,
            condition_on_previous_text: true,
        }
    }
}

/// Output of one model pass.
#[derive(Debug, Clone, Default)]
pub struct ModelOutput {
    pub segments: Vec<Segment>,
    pub detected_language: String,
}

/// Trait for the underlying speech-recognition model.
pub trait SpeechModel: Send {
    /// Run one decoding pass over 16 kHz mono samples.
    fn run(&self, samples: &[f32], params: &DecodeParams) -> Result<ModelOutput>;

    /// Detect the spoken language and a confidence in [0, 1].
    fn detect_language(&self, samples: &[f32]) -> Result<(String, f32)>;

    /// Device this model instance is loaded on.
    fn device(&self) -> Device;

    /// Release cached accelerator memory between chunks. No-op on CPU.
    fn reclaim_memory(&self) {}
}

/// Trait for loading a model onto a device.
///
/// Separate from [`SpeechModel`] because the acceleration fallback must
/// reload the model on the CPU mid-run without discarding completed passes.
pub trait ModelProvider: Send {
    fn load(&self, model_size: &str, device: Device) -> Result<Box<dyn SpeechModel>>;
}

// ── Mock implementations ─────────────────────────────────────────────────

/// Scripted response for one `run` call on [`MockSpeechModel`].
#[derive(Debug, Clone)]
pub enum MockResponse {
    Segments(Vec<Segment>),
    AccelerationFailure,
}

/// Scripted speech model for orchestration tests.
///
/// Responses are consumed in order from a shared queue; when the queue is
/// empty, `run` returns the default segments. The queue is shared with
/// [`MockModelProvider`] so a reloaded model continues the same script.
pub struct MockSpeechModel {
    script: Arc<Mutex<VecDeque<MockResponse>>>,
    default_segments: Vec<Segment>,
    detected: (String, f32),
    device: Device,
    calls: Arc<Mutex<Vec<DecodeParams>>>,
}

impl MockSpeechModel {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            default_segments: vec![Segment::new("mock transcription", 0.0, 1.0)],
            detected: ("ur".to_string(), 0.9),
            device: Device::Cpu,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_default_segments(mut self, segments: Vec<Segment>) -> Self {
        self.default_segments = segments;
        self
    }

    pub fn with_detected(mut self, language: &str, confidence: f32) -> Self {
        self.detected = (language.to_string(), confidence);
        self
    }

    pub fn on_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Queue segments for the next unscripted `run` call.
    pub fn push_segments(self, segments: Vec<Segment>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(MockResponse::Segments(segments));
        }
        self
    }

    /// Queue an acceleration failure for the next `run` call.
    pub fn push_acceleration_failure(self) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(MockResponse::AccelerationFailure);
        }
        self
    }

    /// Decode parameters recorded from every `run` call, in order.
    pub fn recorded_calls(&self) -> Vec<DecodeParams> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Handle onto the shared script/call log, for building a provider that
    /// continues this model's script after a reload.
    pub fn shared_state(
        &self,
    ) -> (
        Arc<Mutex<VecDeque<MockResponse>>>,
        Arc<Mutex<Vec<DecodeParams>>>,
    ) {
        (Arc::clone(&self.script), Arc::clone(&self.calls))
    }
}

impl Default for MockSpeechModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechModel for MockSpeechModel {
    fn run(&self, _samples: &[f32], params: &DecodeParams) -> Result<ModelOutput> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(params.clone());
        }
        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        match next {
            Some(MockResponse::AccelerationFailure) => Err(AwaazError::Acceleration {
                message: "mock CUDA timeout".to_string(),
            }),
            Some(MockResponse::Segments(segments)) => Ok(ModelOutput {
                segments,
                detected_language: self.detected.0.clone(),
            }),
            None => Ok(ModelOutput {
                segments: self.default_segments.clone(),
                detected_language: self.detected.0.clone(),
            }),
        }
    }

    fn detect_language(&self, _samples: &[f32]) -> Result<(String, f32)> {
        Ok(self.detected.clone())
    }

    fn device(&self) -> Device {
        self.device
    }
}

/// Provider that hands out [`MockSpeechModel`]s sharing one script.
pub struct MockModelProvider {
    script: Arc<Mutex<VecDeque<MockResponse>>>,
    calls: Arc<Mutex<Vec<DecodeParams>>>,
    detected: (String, f32),
    default_segments: Vec<Segment>,
    fail_on: Vec<Device>,
}

impl MockModelProvider {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            detected: ("ur".to_string(), 0.9),
            default_segments: vec![Segment::new("mock transcription", 0.0, 1.0)],
            fail_on: Vec::new(),
        }
    }

    pub fn with_detected(mut self, language: &str, confidence: f32) -> Self {
        self.detected = (language.to_string(), confidence);
        self
    }

    pub fn with_default_segments(mut self, segments: Vec<Segment>) -> Self {
        self.default_segments = segments;
        self
    }

    /// Queue a scripted response shared by every model this provider loads.
    pub fn push(self, response: MockResponse) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(response);
        }
        self
    }

    /// Make `load` fail for a given device.
    pub fn failing_on(mut self, device: Device) -> Self {
        self.fail_on.push(device);
        self
    }

    pub fn recorded_calls(&self) -> Vec<DecodeParams> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Clone the shared handles so the provider can be inspected after the
    /// engine takes ownership of a boxed copy.
    pub fn handle(&self) -> MockModelProvider {
        MockModelProvider {
            script: Arc::clone(&self.script),
            calls: Arc::clone(&self.calls),
            detected: self.detected.clone(),
            default_segments: self.default_segments.clone(),
            fail_on: self.fail_on.clone(),
        }
    }
}

impl Default for MockModelProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelProvider for MockModelProvider {
    fn load(&self, model_size: &str, device: Device) -> Result<Box<dyn SpeechModel>> {
        if self.fail_on.contains(&device) {
            return Err(AwaazError::ModelLoad {
                model: model_size.to_string(),
                device: device.as_str().to_string(),
                message: "mock load failure".to_string(),
            });
        }
        Ok(Box::new(MockSpeechModel {
            script: Arc::clone(&self.script),
            default_segments: self.default_segments.clone(),
            detected: self.detected.clone(),
            device,
            calls: Arc::clone(&self.calls),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_params_defaults() {
        let params = DecodeParams::new(Task::Transcribe, "ur");
        assert_eq!(params.language, "ur");
        assert_eq!(params.beam_size, 5);
        assert_eq!(params.best_of, 5);
        assert_eq!(params.temperatures, vec![0.0, 0.2, 0.4]);
        assert_eq!(params.no_speech_threshold, 0.6);
        assert_eq!(params.compression_ratio_threshold, 2.4);
        assert!(params.condition_on_previous_text);
        assert!(params.initial_prompt.is_none());
    }

    #[test]
    fn test_mock_model_returns_default_segments() {
        let model = MockSpeechModel::new()
            .with_default_segments(vec![Segment::new("salaam", 0.0, 2.0)]);
        let out = model
            .run(&[0.0; 100], &DecodeParams::new(Task::Transcribe, "ur"))
            .unwrap();
        assert_eq!(out.segments.len(), 1);
        assert_eq!(out.segments[0].text, "salaam");
    }

    #[test]
    fn test_mock_model_scripted_responses_in_order() {
        let model = MockSpeechModel::new()
            .push_segments(vec![Segment::new("first", 0.0, 1.0)])
            .push_acceleration_failure();

        let params = DecodeParams::new(Task::Transcribe, "ur");
        let first = model.run(&[], &params).unwrap();
        assert_eq!(first.segments[0].text, "first");

        let second = model.run(&[], &params);
        assert!(matches!(second, Err(AwaazError::Acceleration { .. })));

        // Script exhausted, back to defaults
        let third = model.run(&[], &params).unwrap();
        assert_eq!(third.segments[0].text, "mock transcription");
    }

    #[test]
    fn test_mock_model_records_calls() {
        let model = MockSpeechModel::new();
        let mut params = DecodeParams::new(Task::Translate, "sd");
        params.beam_size = 3;
        model.run(&[], &params).unwrap();

        let calls = model.recorded_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].task, Task::Translate);
        assert_eq!(calls[0].beam_size, 3);
    }

    #[test]
    fn test_mock_provider_load_failure() {
        let provider = MockModelProvider::new().failing_on(Device::Cpu);
        let result = provider.load("base", Device::Cpu);
        assert!(matches!(result, Err(AwaazError::ModelLoad { .. })));
        assert!(provider.load("base", Device::Cuda).is_ok());
    }

    #[test]
    fn test_mock_provider_models_share_script() {
        let provider = MockModelProvider::new()
            .push(MockResponse::Segments(vec![Segment::new("a", 0.0, 1.0)]))
            .push(MockResponse::Segments(vec![Segment::new("b", 0.0, 1.0)]));

        let params = DecodeParams::new(Task::Transcribe, "ur");
        let m1 = provider.load("base", Device::Cuda).unwrap();
        assert_eq!(m1.run(&[], &params).unwrap().segments[0].text, "a");

        // A second model (e.g. after CPU fallback) continues the script
        let m2 = provider.load("base", Device::Cpu).unwrap();
        assert_eq!(m2.run(&[], &params).unwrap().segments[0].text, "b");
    }

    #[test]
    fn test_device_display() {
        assert_eq!(Device::Cuda.to_string(), "cuda");
        assert_eq!(Device::Cpu.to_string(), "cpu");
    }
}
