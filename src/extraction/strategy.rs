//! Strategy selection.
//!
//! An ordered table of predicates over the raw assessment; the first match
//! wins. Content scoring `50..=70` that is not scanned matches no rule and
//! lands on [`ExtractionStrategy::BasicCleanup`], even with OCR enabled.

use super::types::{ExtractionStrategy, ProcessingOptions, QualityAssessment};

/// One row of the decision table.
#[derive(Debug, Clone, Copy)]
pub struct StrategyRule {
    /// Short label used in logs.
    pub name: &'static str,
    pub applies: fn(&QualityAssessment) -> bool,
    pub choose: fn(&ProcessingOptions) -> ExtractionStrategy,
}

fn needs_language_model(q: &QualityAssessment) -> bool {
    q.is_scanned || q.has_low_text_quality
}

fn language_model_strategy(options: &ProcessingOptions) -> ExtractionStrategy {
    if options.enable_ocr {
        ExtractionStrategy::OcrEnhanced
    } else {
        ExtractionStrategy::AiEnhanced
    }
}

fn is_good_quality(q: &QualityAssessment) -> bool {
    q.has_good_text_quality
}

fn structured_strategy(_options: &ProcessingOptions) -> ExtractionStrategy {
    ExtractionStrategy::Structured
}

/// Rules in priority order.
pub const STRATEGY_RULES: &[StrategyRule] = &[
    StrategyRule {
        name: "scanned_or_low_quality",
        applies: needs_language_model,
        choose: language_model_strategy,
    },
    StrategyRule {
        name: "good_quality",
        applies: is_good_quality,
        choose: structured_strategy,
    },
];

/// Used when no rule matches.
pub const FALLBACK_STRATEGY: ExtractionStrategy = ExtractionStrategy::BasicCleanup;

/// Pick the strategy for a run, returning the matching rule's name
/// (`"fallback"` when none matched).
pub fn select_strategy(
    assessment: &QualityAssessment,
    options: &ProcessingOptions,
) -> (ExtractionStrategy, &'static str) {
    STRATEGY_RULES
        .iter()
        .find(|rule| (rule.applies)(assessment))
        .map_or((FALLBACK_STRATEGY, "fallback"), |rule| {
            ((rule.choose)(options), rule.name)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assessment(text_quality: u8, artifact_count: usize) -> QualityAssessment {
        QualityAssessment {
            text_quality,
            is_scanned: text_quality < 30 || artifact_count > 20,
            has_low_text_quality: text_quality < 50,
            has_good_text_quality: text_quality > 70,
            has_images: false,
            artifact_count,
            binary_count: 0,
            content_length: 500,
            word_count: 80,
        }
    }

    fn pick(q: u8, artifacts: usize, enable_ocr: bool) -> ExtractionStrategy {
        let options = ProcessingOptions {
            enable_ocr,
            ..Default::default()
        };
        select_strategy(&assessment(q, artifacts), &options).0
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(pick(29, 0, false), ExtractionStrategy::AiEnhanced);
        assert_eq!(pick(49, 0, false), ExtractionStrategy::AiEnhanced);
        assert_eq!(pick(50, 0, false), ExtractionStrategy::BasicCleanup);
        assert_eq!(pick(70, 0, false), ExtractionStrategy::BasicCleanup);
        assert_eq!(pick(71, 0, false), ExtractionStrategy::Structured);
        assert_eq!(pick(100, 0, false), ExtractionStrategy::Structured);
    }

    #[test]
    fn test_ocr_upgrades_only_the_language_model_path() {
        assert_eq!(pick(10, 0, true), ExtractionStrategy::OcrEnhanced);
        assert_eq!(pick(60, 0, true), ExtractionStrategy::BasicCleanup);
        assert_eq!(pick(90, 0, true), ExtractionStrategy::Structured);
    }

    #[test]
    fn test_artifact_density_wins_over_good_score() {
        // scanned by artifact count, score still "good"
        assert_eq!(pick(80, 21, false), ExtractionStrategy::AiEnhanced);
        assert_eq!(pick(80, 20, false), ExtractionStrategy::Structured);
    }

    #[test]
    fn test_rule_names() {
        let options = ProcessingOptions::default();
        assert_eq!(select_strategy(&assessment(10, 0), &options).1, "scanned_or_low_quality");
        assert_eq!(select_strategy(&assessment(90, 0), &options).1, "good_quality");
        assert_eq!(select_strategy(&assessment(60, 0), &options).1, "fallback");
    }
}
