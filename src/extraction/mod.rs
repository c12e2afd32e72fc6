//! Content-quality assessment and multi-strategy text extraction.
//!
//! Turns raw, possibly binary-laden document text into clean prose with a
//! confidence score and diagnostic metadata.
//!
//! # Components
//!
//! - [`QualityAssessor`] - heuristic artifact / noise scoring
//! - [`StructuredCleaner`] - deterministic normalization and the basic-cleanup subset
//! - [`LanguageModelExtractor`] - completion-service adapter for garbled or scanned text
//! - [`select_strategy`] - ordered decision table over the assessment
//! - [`MetadataBuilder`] - page estimate, quality tier and notes
//! - [`ExtractionOrchestrator`] - the pipeline tying them together
//!
//! # Usage
//!
//! ```rust,ignore
//! use docsift::extraction::{ExtractionOrchestrator, ProcessingOptions};
//!
//! let orchestrator = ExtractionOrchestrator::new(completion_service);
//! let result = orchestrator.analyze(&raw_text, &ProcessingOptions::default()).await;
//! if result.is_usable() {
//!     println!("{} ({}%)", result.text, result.confidence);
//! }
//! ```

mod cleaner;
mod language_model;
mod metadata;
mod orchestrator;
mod quality;
mod strategy;
mod types;

pub use cleaner::StructuredCleaner;
pub use language_model::{
    EnhanceMode, LanguageModelExtractor, TRUNCATION_MARKER, sanitize_reply, truncate_excerpt,
};
pub use metadata::{MetadataBuilder, estimate_pages};
pub use orchestrator::{ExtractionOrchestrator, PipelineError, PipelineStage};
pub use quality::QualityAssessor;
pub use strategy::{FALLBACK_STRATEGY, STRATEGY_RULES, StrategyRule, select_strategy};
pub use types::{
    ExtractionMethod, ExtractionResult, ExtractionStrategy, ProcessingOptions, QualityAssessment,
    QualityTier, ResultMetadata,
};
