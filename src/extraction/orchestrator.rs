//! The extraction pipeline.
//!
//! `Assessing → StrategySelected → Extracting → Rescoring → Done`, single
//! pass, no internal parallelism. The only suspension point is the optional
//! completion call. Anything that goes wrong past the collaborator boundary,
//! panics included, is converted into a zero-confidence `failed` result at
//! the top of [`ExtractionOrchestrator::analyze`].

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use futures::FutureExt;
use tracing::Instrument;

use super::cleaner::StructuredCleaner;
use super::language_model::{EnhanceMode, LanguageModelExtractor};
use super::metadata::MetadataBuilder;
use super::quality::QualityAssessor;
use super::strategy::select_strategy;
use super::types::{
    ExtractionMethod, ExtractionResult, ExtractionStrategy, ProcessingOptions, QualityTier,
    ResultMetadata,
};
use crate::llm::TextCompletionService;

/// Pipeline states, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PipelineStage {
    Assessing = 0,
    StrategySelected = 1,
    Extracting = 2,
    Rescoring = 3,
    Done = 4,
}

impl PipelineStage {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Assessing,
            1 => Self::StrategySelected,
            2 => Self::Extracting,
            3 => Self::Rescoring,
            _ => Self::Done,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Assessing => "assessing",
            Self::StrategySelected => "strategy_selected",
            Self::Extracting => "extracting",
            Self::Rescoring => "rescoring",
            Self::Done => "done",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a run ended on the `failed` path.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Input was empty or whitespace only.
    #[error("No content to analyze")]
    EmptyContent,

    /// Something panicked mid-run.
    #[error("Unexpected failure in {stage} stage: {message}")]
    Panicked {
        stage: PipelineStage,
        message: String,
    },
}

/// Current stage of a run; readable after a panic unwinds the run.
#[derive(Debug, Default)]
struct StageTracker(AtomicU8);

impl StageTracker {
    fn enter(&self, stage: PipelineStage) {
        self.0.store(stage as u8, Ordering::Relaxed);
        tracing::trace!(stage = %stage, "Pipeline stage entered");
    }

    fn current(&self) -> PipelineStage {
        PipelineStage::from_u8(self.0.load(Ordering::Relaxed))
    }
}

/// What an extractor produced and which one actually ran.
#[derive(Debug)]
struct ExtractorOutput {
    text: String,
    method: ExtractionMethod,
    fallback_note: Option<String>,
}

impl ExtractorOutput {
    fn ran(text: String, strategy: ExtractionStrategy) -> Self {
        Self {
            text,
            method: strategy.method(),
            fallback_note: None,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Stateless pipeline; one instance serves any number of concurrent runs.
#[derive(Debug, Clone)]
pub struct ExtractionOrchestrator {
    assessor: QualityAssessor,
    cleaner: StructuredCleaner,
    language_model: LanguageModelExtractor,
}

impl ExtractionOrchestrator {
    /// Create a pipeline that sends language-model work to `service`.
    pub fn new(service: Arc<dyn TextCompletionService>) -> Self {
        Self {
            assessor: QualityAssessor::new(),
            cleaner: StructuredCleaner::new(),
            language_model: LanguageModelExtractor::new(service),
        }
    }

    /// Bound each completion call to `timeout`.
    #[must_use]
    pub fn with_llm_timeout(mut self, timeout: Duration) -> Self {
        self.language_model = self.language_model.with_timeout(timeout);
        self
    }

    /// Turn raw document text into cleaned, confidence-scored text.
    ///
    /// Never fails and never panics; see [`ExtractionResult::is_usable`].
    pub async fn analyze(&self, content: &str, options: &ProcessingOptions) -> ExtractionResult {
        let run_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!(
            "extraction.run",
            %run_id,
            content_bytes = content.len(),
            enable_ocr = options.enable_ocr,
            max_pages = options.max_pages,
            quality_threshold = options.quality_threshold,
            enable_image_analysis = options.enable_image_analysis,
        );

        let stages = StageTracker::default();
        let outcome = AssertUnwindSafe(self.run(content, options, &stages))
            .catch_unwind()
            .instrument(span.clone())
            .await;

        let _guard = span.enter();
        match outcome {
            Ok(Ok(result)) => {
                tracing::info!(
                    name: "extraction.completed",
                    method = %result.extraction_method,
                    confidence = result.confidence,
                    pages = result.metadata.pages,
                    "Extraction completed"
                );
                result
            }
            Ok(Err(err)) => {
                tracing::error!(name: "extraction.failed", error = %err, "Extraction failed");
                Self::failed(content, &err)
            }
            Err(payload) => {
                let err = PipelineError::Panicked {
                    stage: stages.current(),
                    message: panic_message(&*payload),
                };
                tracing::error!(name: "extraction.failed", error = %err, "Extraction panicked");
                Self::failed(content, &err)
            }
        }
    }

    async fn run(
        &self,
        content: &str,
        options: &ProcessingOptions,
        stages: &StageTracker,
    ) -> Result<ExtractionResult, PipelineError> {
        stages.enter(PipelineStage::Assessing);
        if content.trim().is_empty() {
            return Err(PipelineError::EmptyContent);
        }
        let raw = self.assessor.assess(content);
        tracing::debug!(
            name: "extraction.assessed",
            text_quality = raw.text_quality,
            artifacts = raw.artifact_count,
            binary = raw.binary_count,
            words = raw.word_count,
            scanned = raw.is_scanned,
            "Raw content assessed"
        );

        stages.enter(PipelineStage::StrategySelected);
        let (strategy, rule) = select_strategy(&raw, options);
        tracing::info!(
            name: "extraction.strategy.selected",
            strategy = ?strategy,
            rule,
            text_quality = raw.text_quality,
            "Extraction strategy selected"
        );

        stages.enter(PipelineStage::Extracting);
        let output = self.extract(content, strategy).await;

        stages.enter(PipelineStage::Rescoring);
        let processed = self.assessor.assess(&output.text);
        let mut confidence = strategy.base_confidence(raw.text_quality);
        if processed.text_quality > raw.text_quality {
            confidence = confidence.saturating_add(10);
        }
        let confidence = confidence.min(100);

        let mut builder = MetadataBuilder::new(&raw, output.method, confidence);
        if let Some(note) = output.fallback_note {
            builder = builder.note(note);
        }
        let metadata = builder.build(&output.text);

        stages.enter(PipelineStage::Done);
        Ok(ExtractionResult {
            text: output.text,
            confidence,
            extraction_method: output.method,
            metadata,
        })
    }

    async fn extract(&self, content: &str, strategy: ExtractionStrategy) -> ExtractorOutput {
        if !strategy.uses_language_model() {
            let text = match strategy {
                ExtractionStrategy::Structured => self.cleaner.clean(content),
                _ => self.cleaner.basic_cleanup(content),
            };
            return ExtractorOutput::ran(text, strategy);
        }

        let mode = if strategy == ExtractionStrategy::OcrEnhanced {
            EnhanceMode::Reconstruct
        } else {
            EnhanceMode::Enhance
        };

        match self.language_model.enhance(content, mode).await {
            Ok(text) => ExtractorOutput::ran(text, strategy),
            Err(err) => {
                tracing::warn!(
                    name: "extraction.llm.fallback",
                    strategy = ?strategy,
                    error = %err,
                    "Completion failed, falling back to basic cleanup"
                );
                ExtractorOutput {
                    text: self.cleaner.basic_cleanup(content),
                    method: ExtractionMethod::Basic,
                    fallback_note: Some(format!(
                        "{} extraction unavailable, used basic cleanup instead: {err}",
                        strategy.method()
                    )),
                }
            }
        }
    }

    fn failed(content: &str, err: &PipelineError) -> ExtractionResult {
        ExtractionResult {
            text: content.to_string(),
            confidence: 0,
            extraction_method: ExtractionMethod::Failed,
            metadata: ResultMetadata {
                pages: 1,
                word_count: content.split_whitespace().count(),
                has_images: false,
                is_scanned: false,
                quality: QualityTier::Low,
                notes: vec![format!("Processing failed: {err}")],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{CompletionError, CompletionRequest};
    use std::sync::atomic::AtomicUsize;

    #[derive(Debug, Default)]
    struct CountingService {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl TextCompletionService for CountingService {
        async fn complete(&self, _request: CompletionRequest) -> Result<String, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(CompletionError::NotConfigured("test".to_string()))
        }
    }

    #[derive(Debug)]
    struct PanickingService;

    #[async_trait::async_trait]
    impl TextCompletionService for PanickingService {
        async fn complete(&self, _request: CompletionRequest) -> Result<String, CompletionError> {
            panic!("collaborator exploded");
        }
    }

    const GARBLED: &str = "endstream endobj BT ET Td Tj TJ Tm Tc Tw Tz TL Ts Tr Tf \u{0}\u{1}\u{2} garbled fragments ";

    #[test]
    fn test_stage_roundtrip() {
        let tracker = StageTracker::default();
        assert_eq!(tracker.current(), PipelineStage::Assessing);
        tracker.enter(PipelineStage::Rescoring);
        assert_eq!(tracker.current(), PipelineStage::Rescoring);
    }

    #[tokio::test]
    async fn test_structured_path_never_calls_service() {
        let service = Arc::new(CountingService::default());
        let orchestrator = ExtractionOrchestrator::new(service.clone());
        let result = orchestrator
            .analyze(
                "A clean paragraph of prose. It reads well and has plenty of ordinary words for the scorer to count.",
                &ProcessingOptions::default(),
            )
            .await;

        assert_eq!(result.extraction_method, ExtractionMethod::Structured);
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_collaborator_failure_falls_back_with_note() {
        let service = Arc::new(CountingService::default());
        let orchestrator = ExtractionOrchestrator::new(service.clone());
        let result = orchestrator
            .analyze(&GARBLED.repeat(2), &ProcessingOptions::default())
            .await;

        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.extraction_method, ExtractionMethod::Basic);
        // raw score 61, ai_enhanced formula: min(85, 61 + 30)
        assert_eq!(result.confidence, 85);
        assert_eq!(result.text, "\u{0}\u{1}\u{2} garbled fragments \u{0}\u{1}\u{2} garbled fragments");
        assert!(
            result
                .metadata
                .notes
                .iter()
                .any(|n| n.starts_with("ai_enhanced extraction unavailable"))
        );
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let orchestrator = ExtractionOrchestrator::new(Arc::new(PanickingService));
        let raw = GARBLED.repeat(2);
        let result = orchestrator.analyze(&raw, &ProcessingOptions::default()).await;

        assert_eq!(result.extraction_method, ExtractionMethod::Failed);
        assert_eq!(result.confidence, 0);
        assert_eq!(result.text, raw);
        assert_eq!(
            result.metadata.notes,
            vec!["Processing failed: Unexpected failure in extracting stage: collaborator exploded".to_string()]
        );
    }

    #[tokio::test]
    async fn test_whitespace_only_input_fails() {
        let orchestrator = ExtractionOrchestrator::new(Arc::new(CountingService::default()));
        let result = orchestrator.analyze(" \n\t ", &ProcessingOptions::default()).await;

        assert_eq!(result.extraction_method, ExtractionMethod::Failed);
        assert_eq!(result.text, " \n\t ");
        assert_eq!(result.metadata.word_count, 0);
        assert_eq!(result.metadata.notes, vec!["Processing failed: No content to analyze".to_string()]);
    }
}
