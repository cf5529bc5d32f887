//! Dual-pass transcription engine.
//!
//! Orchestrates everything between raw samples and a finished
//! [`TranscriptionResult`]: language routing, the native-script decoding
//! pass, the English translate pass, quality filtering, the Urdu-script
//! retry, machine translation for minority languages, and multi-chunk
//! assembly. The model and device are owned for the engine's lifetime and
//! the device only ever downgrades.

use crate::asr::assemble::ChunkAssembly;
use crate::asr::filter::filter_segments;
use crate::asr::model::{DecodeParams, Device, ModelOutput, ModelProvider, SpeechModel, Task};
use crate::audio::AudioChunk;
use crate::defaults;
use crate::error::{AwaazError, Result};
use crate::lang::{self, LanguageRoute};
use crate::transcript::{Segment, TranscriptionResult};
use crate::translate::Translator;

/// Progress callback: `(completed_chunks, total_chunks)`.
pub type ProgressFn<'a> = &'a mut dyn FnMut(usize, usize);

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub model_size: String,
    pub device: Device,
    /// Suppress status reporting on stderr.
    pub quiet: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_size: defaults::DEFAULT_MODEL.to_string(),
            device: Device::Cpu,
            quiet: false,
        }
    }
}

pub struct TranscriptionEngine {
    provider: Box<dyn ModelProvider>,
    model: Box<dyn SpeechModel>,
    translator: Option<Box<dyn Translator>>,
    model_size: String,
    device: Device,
    accel_failed: bool,
    quiet: bool,
}

impl TranscriptionEngine {
    /// Load the model and build an engine.
    ///
    /// If loading on the accelerated device fails, loading is retried on the
    /// CPU before giving up.
    pub fn new(provider: Box<dyn ModelProvider>, config: EngineConfig) -> Result<Self> {
        let (model, device) = match provider.load(&config.model_size, config.device) {
            Ok(model) => (model, config.device),
            Err(e) if config.device == Device::Cuda => {
                if !config.quiet {
                    eprintln!("awaaz: model load on cuda failed ({e}), retrying on cpu");
                }
                let model = provider.load(&config.model_size, Device::Cpu)?;
                (model, Device::Cpu)
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            provider,
            model,
            translator: None,
            model_size: config.model_size,
            device,
            accel_failed: false,
            quiet: config.quiet,
        })
    }

    /// Attach a translator for minority-language routes. Without one, those
    /// routes fall back to the source-language text.
    pub fn with_translator(mut self, translator: Box<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Device the model currently runs on.
    pub fn device(&self) -> Device {
        self.device
    }

    pub fn model_size(&self) -> &str {
        &self.model_size
    }

    fn log(&self, message: &str) {
        if !self.quiet {
            eprintln!("awaaz: {message}");
        }
    }

    /// Beam/best-of width for the current model and device. Large models on
    /// an accelerated device get a narrower search to fit in memory.
    fn search_width(&self) -> u32 {
        let high_memory = defaults::HIGH_MEMORY_MODELS.contains(&self.model_size.as_str());
        if high_memory && self.device == Device::Cuda {
            defaults::NARROW_SEARCH_WIDTH
        } else {
            defaults::WIDE_SEARCH_WIDTH
        }
    }

    fn decode_params(&self, task: Task, route: &LanguageRoute) -> DecodeParams {
        let width = self.search_width();
        let mut params = DecodeParams::new(task, route.source_lang.clone());
        params.beam_size = width;
        params.best_of = width;
        params.fp16 = self.device == Device::Cuda && !self.accel_failed;
        if task == Task::Transcribe && route.force_urdu_script {
            params.initial_prompt = Some(defaults::URDU_PROMPT.to_string());
        }
        params
    }

    /// Run one decoding pass, absorbing at most one acceleration failure by
    /// reloading the model on the CPU and redoing only this pass.
    fn run_pass(&mut self, samples: &[f32], params: &DecodeParams) -> Result<ModelOutput> {
        match self.model.run(samples, params) {
            Ok(output) => Ok(output),
            Err(AwaazError::Acceleration { message }) if self.device == Device::Cuda => {
                self.log(&format!(
                    "acceleration failure ({message}), falling back to cpu"
                ));
                self.device = Device::Cpu;
                self.accel_failed = true;
                self.model = self.provider.load(&self.model_size, Device::Cpu)?;

                let mut retry = params.clone();
                retry.fp16 = false;
                self.model.run(samples, &retry)
            }
            Err(e) => Err(e),
        }
    }

    /// Filter a pass's segments, keeping the unfiltered non-empty segments
    /// when filtering would discard everything.
    fn filter_with_fallback(raw: &[Segment]) -> Vec<Segment> {
        let filtered = filter_segments(raw.to_vec());
        if !filtered.is_empty() {
            return filtered;
        }
        raw.iter()
            .filter(|s| !s.text.trim().is_empty())
            .cloned()
            .collect()
    }

    fn joined_text(segments: &[Segment]) -> String {
        segments
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Transcribe one span of 16 kHz mono audio.
    pub fn transcribe(
        &mut self,
        samples: &[f32],
        requested_language: Option<&str>,
    ) -> Result<TranscriptionResult> {
        let (detected, confidence) = match requested_language {
            Some(lang) if lang != defaults::AUTO_LANGUAGE => (String::new(), 1.0),
            _ => self.model.detect_language(samples)?,
        };
        let route = lang::route(requested_language, &detected, confidence);

        // Native-script pass
        let params = self.decode_params(Task::Transcribe, &route);
        let native = self.run_pass(samples, &params)?;
        let mut filtered = Self::filter_with_fallback(&native.segments);
        let mut original_text = Self::joined_text(&filtered);

        // The decoder sometimes drifts into Devanagari for Urdu/Hindi audio.
        // One retry at temperature 0.0 with the Urdu prompt; the retry is
        // only adopted if it comes back clean.
        if route.force_urdu_script && lang::contains_devanagari(&original_text) {
            self.log("output drifted into Devanagari, retrying with Urdu prompt");
            let mut retry_params = self.decode_params(Task::Transcribe, &route);
            retry_params.language = defaults::PRIMARY_LANGUAGE.to_string();
            retry_params.initial_prompt = Some(defaults::URDU_PROMPT.to_string());
            retry_params.temperatures = vec![0.0];

            match self.run_pass(samples, &retry_params) {
                Ok(retry) => {
                    let retry_filtered = filter_segments(retry.segments);
                    if !retry_filtered.is_empty() {
                        let retry_text = Self::joined_text(&retry_filtered);
                        if !lang::contains_devanagari(&retry_text) {
                            filtered = retry_filtered;
                            original_text = retry_text;
                        }
                    }
                }
                Err(e) => self.log(&format!("Urdu-script retry failed: {e}")),
            }
        }

        // English translate pass, skipped when the source already is English
        let (english_segments, english_text) = if route.source_lang != defaults::ENGLISH_LANGUAGE {
            let en_params = self.decode_params(Task::Translate, &route);
            let translated = self.run_pass(samples, &en_params)?;
            let en_segments = Self::filter_with_fallback(&translated.segments);
            let en_text = Self::joined_text(&en_segments);
            (en_segments, en_text)
        } else {
            (filtered.clone(), original_text.clone())
        };

        // Urdu track: native output when decoding already targeted Urdu,
        // machine translation for minority languages, source text otherwise
        let (urdu_segments, urdu_text) = if route.source_lang == defaults::PRIMARY_LANGUAGE {
            (filtered.clone(), original_text.clone())
        } else if route.needs_translation {
            self.translate_track(&filtered, &original_text, &route.source_lang)
        } else {
            (filtered.clone(), original_text.clone())
        };

        let original_language = if native.detected_language.is_empty() {
            "unknown".to_string()
        } else {
            native.detected_language
        };

        let text = if urdu_text.is_empty() {
            english_text.clone()
        } else {
            urdu_text.clone()
        };

        Ok(TranscriptionResult {
            original_text,
            urdu_text,
            english_text,
            original_language,
            urdu_segments,
            english_segments,
            text,
        })
    }

    /// Translate the native track to Urdu, falling back to the source text
    /// when no translator is attached, it reports unavailable, or it fails.
    fn translate_track(
        &mut self,
        segments: &[Segment],
        text: &str,
        source_lang: &str,
    ) -> (Vec<Segment>, String) {
        let Some(translator) = self.translator.as_ref() else {
            self.log(&format!(
                "no translator for {source_lang}, keeping source text"
            ));
            return (segments.to_vec(), text.to_string());
        };
        if !translator.is_available() {
            self.log(&format!(
                "translator unavailable for {source_lang}, keeping source text"
            ));
            return (segments.to_vec(), text.to_string());
        }

        let target = defaults::PRIMARY_LANGUAGE;
        match translator.translate(text, source_lang, target) {
            Ok(urdu_text) => {
                let urdu_segments = translator
                    .translate_segments(segments, source_lang, target)
                    .unwrap_or_else(|e| {
                        self.log(&format!("segment translation failed: {e}"));
                        segments.to_vec()
                    });
                (urdu_segments, urdu_text)
            }
            Err(e) => {
                self.log(&format!("translation failed ({e}), keeping source text"));
                (segments.to_vec(), text.to_string())
            }
        }
    }

    /// Transcribe a planned sequence of chunks into one combined result.
    ///
    /// Single-chunk runs bypass assembly entirely. The progress callback is
    /// invoked once after each completed chunk.
    pub fn transcribe_chunks(
        &mut self,
        chunks: &[AudioChunk],
        requested_language: Option<&str>,
        chunk_length_s: f64,
        mut progress: Option<ProgressFn<'_>>,
    ) -> Result<TranscriptionResult> {
        if chunks.is_empty() {
            return Err(AwaazError::Transcription {
                message: "no audio chunks to transcribe".to_string(),
            });
        }

        if chunks.len() == 1 {
            let result = self.transcribe(&chunks[0].samples, requested_language)?;
            if let Some(cb) = progress.as_mut() {
                cb(1, 1);
            }
            return Ok(result);
        }

        let total = chunks.len();
        let mut assembly = ChunkAssembly::new();
        for (i, chunk) in chunks.iter().enumerate() {
            let result = self.transcribe(&chunk.samples, requested_language)?;
            self.model.reclaim_memory();
            assembly.push(result, chunk.index, chunk_length_s);
            if let Some(cb) = progress.as_mut() {
                cb(i + 1, total);
            }
        }

        Ok(assembly.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asr::model::{MockModelProvider, MockResponse};
    use crate::translate::DictionaryTranslator;

    fn quiet_config(model_size: &str, device: Device) -> EngineConfig {
        EngineConfig {
            model_size: model_size.to_string(),
            device,
            quiet: true,
        }
    }

    fn engine_with(provider: MockModelProvider, config: EngineConfig) -> TranscriptionEngine {
        TranscriptionEngine::new(Box::new(provider), config).unwrap()
    }

    #[test]
    fn test_urdu_route_fills_urdu_track_from_native_pass() {
        let provider = MockModelProvider::new()
            .with_detected("ur", 0.95)
            .with_default_segments(vec![Segment::new("سلام دنیا", 0.0, 2.0)]);
        let handle = provider.handle();
        let mut engine = engine_with(provider, quiet_config("base", Device::Cpu));

        let result = engine.transcribe(&[0.0; 100], None).unwrap();
        assert_eq!(result.urdu_text, "سلام دنیا");
        assert_eq!(result.text, "سلام دنیا");
        assert_eq!(result.original_language, "ur");

        // Native pass plus English translate pass
        let calls = handle.recorded_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].task, Task::Transcribe);
        assert_eq!(calls[0].language, "ur");
        assert_eq!(
            calls[0].initial_prompt.as_deref(),
            Some(defaults::URDU_PROMPT)
        );
        assert_eq!(calls[1].task, Task::Translate);
    }

    #[test]
    fn test_english_source_skips_translate_pass() {
        let provider = MockModelProvider::new()
            .with_detected("en", 0.99)
            .with_default_segments(vec![Segment::new("hello world", 0.0, 2.0)]);
        let handle = provider.handle();
        let mut engine = engine_with(provider, quiet_config("base", Device::Cpu));

        let result = engine.transcribe(&[0.0; 100], Some("en")).unwrap();
        assert_eq!(handle.recorded_calls().len(), 1);
        assert_eq!(result.english_text, "hello world");
        // The native pass doubles as the English track
        assert_eq!(result.english_segments.len(), 1);
    }

    #[test]
    fn test_high_memory_model_on_cuda_narrows_search() {
        let provider = MockModelProvider::new().with_detected("ur", 0.9);
        let handle = provider.handle();
        let mut engine = engine_with(provider, quiet_config("large-v3", Device::Cuda));

        engine.transcribe(&[0.0; 100], Some("ur")).unwrap();
        let calls = handle.recorded_calls();
        assert_eq!(calls[0].beam_size, 3);
        assert_eq!(calls[0].best_of, 3);
        assert!(calls[0].fp16);
    }

    #[test]
    fn test_high_memory_model_on_cpu_keeps_wide_search() {
        let provider = MockModelProvider::new().with_detected("ur", 0.9);
        let handle = provider.handle();
        let mut engine = engine_with(provider, quiet_config("large-v3", Device::Cpu));

        engine.transcribe(&[0.0; 100], Some("ur")).unwrap();
        let calls = handle.recorded_calls();
        assert_eq!(calls[0].beam_size, 5);
        assert!(!calls[0].fp16);
    }

    #[test]
    fn test_acceleration_failure_redoes_only_failed_pass_on_cpu() {
        let provider = MockModelProvider::new()
            .with_detected("ur", 0.9)
            .with_default_segments(vec![Segment::new("متن", 0.0, 1.0)])
            .push(MockResponse::AccelerationFailure);
        let handle = provider.handle();
        let mut engine = engine_with(provider, quiet_config("base", Device::Cuda));

        let result = engine.transcribe(&[0.0; 100], Some("ur")).unwrap();
        assert_eq!(result.urdu_text, "متن");
        assert_eq!(engine.device(), Device::Cpu);

        // Failed native pass, its CPU redo, then the English pass
        let calls = handle.recorded_calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].fp16);
        assert!(!calls[1].fp16, "redo must clear half precision");
        assert_eq!(calls[1].task, Task::Transcribe);
        assert!(!calls[2].fp16, "later passes stay on cpu settings");
    }

    #[test]
    fn test_cuda_load_failure_falls_back_to_cpu_load() {
        let provider = MockModelProvider::new().failing_on(Device::Cuda);
        let engine = engine_with(provider, quiet_config("base", Device::Cuda));
        assert_eq!(engine.device(), Device::Cpu);
    }

    #[test]
    fn test_cpu_load_failure_is_fatal() {
        let provider = MockModelProvider::new()
            .failing_on(Device::Cuda)
            .failing_on(Device::Cpu);
        let result = TranscriptionEngine::new(
            Box::new(provider),
            quiet_config("base", Device::Cuda),
        );
        assert!(matches!(result, Err(AwaazError::ModelLoad { .. })));
    }

    #[test]
    fn test_devanagari_drift_retried_with_urdu_prompt() {
        let provider = MockModelProvider::new()
            .with_detected("ur", 0.9)
            .with_default_segments(vec![Segment::new("english pass", 0.0, 1.0)])
            .push(MockResponse::Segments(vec![Segment::new(
                "यह हिंदी में है",
                0.0,
                2.0,
            )]))
            .push(MockResponse::Segments(vec![Segment::new(
                "یہ اردو میں ہے",
                0.0,
                2.0,
            )]));
        let handle = provider.handle();
        let mut engine = engine_with(provider, quiet_config("base", Device::Cpu));

        let result = engine.transcribe(&[0.0; 100], Some("ur")).unwrap();
        assert_eq!(result.urdu_text, "یہ اردو میں ہے");

        let calls = handle.recorded_calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1].temperatures, vec![0.0]);
        assert_eq!(
            calls[1].initial_prompt.as_deref(),
            Some(defaults::URDU_PROMPT)
        );
        assert_eq!(calls[1].language, "ur");
    }

    #[test]
    fn test_devanagari_retry_rejected_when_still_devanagari() {
        let provider = MockModelProvider::new()
            .with_detected("hi", 0.9)
            .with_default_segments(vec![Segment::new("english pass", 0.0, 1.0)])
            .push(MockResponse::Segments(vec![Segment::new(
                "पहला उत्तर",
                0.0,
                2.0,
            )]))
            .push(MockResponse::Segments(vec![Segment::new(
                "दूसरा उत्तर",
                0.0,
                2.0,
            )]));
        let mut engine = engine_with(provider, quiet_config("base", Device::Cpu));

        let result = engine.transcribe(&[0.0; 100], None).unwrap();
        // Retry came back in Devanagari again; the first output stands
        assert_eq!(result.urdu_text, "पहला उत्तर");
    }

    #[test]
    fn test_minority_language_uses_translator() {
        let provider = MockModelProvider::new()
            .with_default_segments(vec![Segment::new("paani", 0.0, 1.0)]);
        let translator = DictionaryTranslator::new().with_entry("paani", "پانی");
        let mut engine = engine_with(provider, quiet_config("base", Device::Cpu))
            .with_translator(Box::new(translator));

        let result = engine.transcribe(&[0.0; 100], Some("sd")).unwrap();
        assert_eq!(result.original_text, "paani");
        assert_eq!(result.urdu_text, "پانی");
        assert_eq!(result.urdu_segments[0].text, "پانی");
        assert_eq!(result.text, "پانی");
    }

    #[test]
    fn test_translation_failure_keeps_source_text() {
        let provider = MockModelProvider::new()
            .with_default_segments(vec![Segment::new("sindhi text here", 0.0, 1.0)]);
        let translator = DictionaryTranslator::new().with_failure();
        let mut engine = engine_with(provider, quiet_config("base", Device::Cpu))
            .with_translator(Box::new(translator));

        let result = engine.transcribe(&[0.0; 100], Some("sd")).unwrap();
        assert_eq!(result.urdu_text, "sindhi text here");
    }

    #[test]
    fn test_translator_unavailable_keeps_source_text() {
        let provider = MockModelProvider::new()
            .with_default_segments(vec![Segment::new("sindhi text here", 0.0, 1.0)]);
        let translator = DictionaryTranslator::new().unavailable();
        let mut engine = engine_with(provider, quiet_config("base", Device::Cpu))
            .with_translator(Box::new(translator));

        let result = engine.transcribe(&[0.0; 100], Some("sd")).unwrap();
        assert_eq!(result.urdu_text, "sindhi text here");
    }

    #[test]
    fn test_no_translator_attached_keeps_source_text() {
        let provider = MockModelProvider::new()
            .with_default_segments(vec![Segment::new("sindhi text here", 0.0, 1.0)]);
        let mut engine = engine_with(provider, quiet_config("base", Device::Cpu));

        let result = engine.transcribe(&[0.0; 100], Some("sd")).unwrap();
        assert_eq!(result.urdu_text, "sindhi text here");
    }

    #[test]
    fn test_filter_fallback_keeps_raw_segments() {
        // Every segment is degenerate, so filtering empties the pass and the
        // raw non-empty segments are kept instead
        let provider = MockModelProvider::new()
            .with_detected("ur", 0.9)
            .with_default_segments(vec![Segment::new("ہاں ہاں ہاں ہاں ہاں", 0.0, 2.0)]);
        let mut engine = engine_with(provider, quiet_config("base", Device::Cpu));

        let result = engine.transcribe(&[0.0; 100], Some("ur")).unwrap();
        assert_eq!(result.original_text, "ہاں ہاں ہاں ہاں ہاں");
    }

    #[test]
    fn test_empty_chunk_list_is_an_error() {
        let provider = MockModelProvider::new();
        let mut engine = engine_with(provider, quiet_config("base", Device::Cpu));
        let result = engine.transcribe_chunks(&[], None, 30.0, None);
        assert!(matches!(result, Err(AwaazError::Transcription { .. })));
    }

    #[test]
    fn test_single_chunk_reports_progress_once() {
        let provider = MockModelProvider::new().with_detected("ur", 0.9);
        let mut engine = engine_with(provider, quiet_config("base", Device::Cpu));

        let chunks = vec![AudioChunk {
            samples: vec![0.0; 160],
            index: 0,
            duration_s: 0.01,
        }];
        let mut calls = Vec::new();
        let mut cb = |done: usize, total: usize| calls.push((done, total));
        engine
            .transcribe_chunks(&chunks, Some("ur"), 30.0, Some(&mut cb))
            .unwrap();
        assert_eq!(calls, vec![(1, 1)]);
    }

    #[test]
    fn test_multi_chunk_offsets_and_progress() {
        let provider = MockModelProvider::new()
            .with_detected("ur", 0.9)
            // Per chunk: native pass then English pass
            .push(MockResponse::Segments(vec![Segment::new("پہلا", 0.0, 5.0)]))
            .push(MockResponse::Segments(vec![Segment::new("first", 0.0, 5.0)]))
            .push(MockResponse::Segments(vec![Segment::new("دوسرا", 0.0, 5.0)]))
            .push(MockResponse::Segments(vec![Segment::new("second", 0.0, 5.0)]));
        let mut engine = engine_with(provider, quiet_config("base", Device::Cpu));

        let chunks = vec![
            AudioChunk {
                samples: vec![0.0; 160],
                index: 0,
                duration_s: 30.0,
            },
            AudioChunk {
                samples: vec![0.0; 160],
                index: 1,
                duration_s: 30.0,
            },
        ];
        let mut calls = Vec::new();
        let mut cb = |done: usize, total: usize| calls.push((done, total));

        let result = engine
            .transcribe_chunks(&chunks, Some("ur"), 30.0, Some(&mut cb))
            .unwrap();
        assert_eq!(calls, vec![(1, 2), (2, 2)]);
        assert_eq!(result.urdu_text, "پہلا دوسرا");
        assert_eq!(result.english_text, "first second");
        assert_eq!(result.urdu_segments[1].start, 30.0);
        assert_eq!(result.urdu_segments[1].end, 35.0);
    }
}
