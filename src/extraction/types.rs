//! Data model shared by every stage of the extraction pipeline.

use serde::{Deserialize, Serialize};

/// Heuristic assessment of a block of text.
///
/// Produced fresh for every call to [`QualityAssessor::assess`]; never merged
/// or cached.
///
/// [`QualityAssessor::assess`]: super::QualityAssessor::assess
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityAssessment {
    /// Overall quality score in `0..=100`.
    pub text_quality: u8,
    /// Content looks like a scan or is dominated by markup artifacts.
    pub is_scanned: bool,
    /// Score below 50.
    pub has_low_text_quality: bool,
    /// Score above 70.
    pub has_good_text_quality: bool,
    /// Content mentions images, pictures or photos.
    pub has_images: bool,
    /// Number of structural markup tokens found.
    pub artifact_count: usize,
    /// Number of characters outside printable ASCII (plus `\n`, `\r`, `\t`).
    pub binary_count: usize,
    /// Length in characters.
    pub content_length: usize,
    /// Pieces produced by splitting on whitespace runs.
    pub word_count: usize,
}

/// Extraction strategy chosen once per pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionStrategy {
    /// Deterministic cleanup of text that is already readable.
    Structured,
    /// Language-model cleanup of garbled text.
    AiEnhanced,
    /// Language-model reconstruction of scanned / OCR-degraded text.
    OcrEnhanced,
    /// Cheap token and whitespace removal.
    BasicCleanup,
}

impl ExtractionStrategy {
    /// Method reported when this strategy's extractor produced the text.
    pub fn method(self) -> ExtractionMethod {
        match self {
            Self::Structured => ExtractionMethod::Structured,
            Self::AiEnhanced => ExtractionMethod::AiEnhanced,
            Self::OcrEnhanced => ExtractionMethod::OcrEnhanced,
            Self::BasicCleanup => ExtractionMethod::Basic,
        }
    }

    /// Whether the strategy calls the external completion service.
    pub fn uses_language_model(self) -> bool {
        matches!(self, Self::AiEnhanced | Self::OcrEnhanced)
    }

    /// Base confidence for this strategy given the raw quality score.
    pub fn base_confidence(self, text_quality: u8) -> u8 {
        let q = u32::from(text_quality);
        let confidence = match self {
            Self::Structured => (q + 20).min(95),
            Self::AiEnhanced => (q + 30).min(85),
            Self::OcrEnhanced => (q + 40).min(75),
            Self::BasicCleanup => q.max(20),
        };
        // every arm is at most 100
        confidence.min(100) as u8
    }
}

/// Method name reported to callers in [`ExtractionResult::extraction_method`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    Structured,
    AiEnhanced,
    OcrEnhanced,
    #[default]
    Basic,
    Failed,
}

impl ExtractionMethod {
    /// Wire name, e.g. `ai_enhanced`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Structured => "structured",
            Self::AiEnhanced => "ai_enhanced",
            Self::OcrEnhanced => "ocr_enhanced",
            Self::Basic => "basic",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied options, read-only for the duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessingOptions {
    /// Upgrade the language-model path to scanned-text reconstruction.
    #[serde(rename = "enableOCR", alias = "enableOcr")]
    pub enable_ocr: bool,
    pub max_pages: u32,
    pub quality_threshold: f32,
    pub enable_image_analysis: bool,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            enable_ocr: false,
            max_pages: 50,
            quality_threshold: 0.3,
            enable_image_analysis: false,
        }
    }
}

/// Coarse display bucket derived from confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    High,
    Medium,
    Low,
}

impl QualityTier {
    pub fn from_confidence(confidence: u8) -> Self {
        if confidence >= 80 {
            Self::High
        } else if confidence >= 50 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Metadata attached to every [`ExtractionResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    pub pages: usize,
    pub word_count: usize,
    pub has_images: bool,
    pub is_scanned: bool,
    pub quality: QualityTier,
    /// Human-readable diagnostics. Never empty.
    pub notes: Vec<String>,
}

/// Output of one pipeline run, owned by the caller.
///
/// Treat `confidence == 0` or [`ExtractionMethod::Failed`] as "do not use for
/// automated downstream processing".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub text: String,
    /// Trust estimate in `0..=100`.
    pub confidence: u8,
    pub extraction_method: ExtractionMethod,
    pub metadata: ResultMetadata,
}

impl ExtractionResult {
    /// Whether the text is usable for automated downstream processing.
    pub fn is_usable(&self) -> bool {
        self.confidence > 0 && self.extraction_method != ExtractionMethod::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_formulas() {
        assert_eq!(ExtractionStrategy::Structured.base_confidence(80), 95);
        assert_eq!(ExtractionStrategy::Structured.base_confidence(60), 80);
        assert_eq!(ExtractionStrategy::AiEnhanced.base_confidence(40), 70);
        assert_eq!(ExtractionStrategy::AiEnhanced.base_confidence(70), 85);
        assert_eq!(ExtractionStrategy::OcrEnhanced.base_confidence(20), 60);
        assert_eq!(ExtractionStrategy::OcrEnhanced.base_confidence(50), 75);
        assert_eq!(ExtractionStrategy::BasicCleanup.base_confidence(5), 20);
        assert_eq!(ExtractionStrategy::BasicCleanup.base_confidence(65), 65);
    }

    #[test]
    fn test_only_model_strategies_call_the_service() {
        assert!(ExtractionStrategy::AiEnhanced.uses_language_model());
        assert!(ExtractionStrategy::OcrEnhanced.uses_language_model());
        assert!(!ExtractionStrategy::Structured.uses_language_model());
        assert!(!ExtractionStrategy::BasicCleanup.uses_language_model());
    }

    #[test]
    fn test_quality_tier_bands() {
        assert_eq!(QualityTier::from_confidence(100), QualityTier::High);
        assert_eq!(QualityTier::from_confidence(80), QualityTier::High);
        assert_eq!(QualityTier::from_confidence(79), QualityTier::Medium);
        assert_eq!(QualityTier::from_confidence(50), QualityTier::Medium);
        assert_eq!(QualityTier::from_confidence(49), QualityTier::Low);
        assert_eq!(QualityTier::from_confidence(0), QualityTier::Low);
    }

    #[test]
    fn test_method_wire_names() {
        let json = serde_json::to_string(&ExtractionMethod::OcrEnhanced).unwrap();
        assert_eq!(json, "\"ocr_enhanced\"");
        assert_eq!(ExtractionMethod::AiEnhanced.to_string(), "ai_enhanced");
        assert_eq!(ExtractionMethod::default(), ExtractionMethod::Basic);
    }

    #[test]
    fn test_options_defaults_and_partial_json() {
        let opts: ProcessingOptions = serde_json::from_str(r#"{"enableOCR": true}"#).unwrap();
        assert!(opts.enable_ocr);
        assert_eq!(opts.max_pages, 50);

        let opts: ProcessingOptions = serde_json::from_str(r#"{"enableOcr": true}"#).unwrap();
        assert!(opts.enable_ocr);
        assert_eq!(opts.max_pages, 50);
        assert!((opts.quality_threshold - 0.3).abs() < f32::EPSILON);
        assert!(!opts.enable_image_analysis);
    }
}
