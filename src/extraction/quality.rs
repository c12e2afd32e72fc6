//! Heuristic content-quality scoring.
//!
//! Scores raw text for residual document-structure tokens and binary noise
//! and derives the boolean signals the strategy table keys on.

use std::sync::LazyLock;

use regex::Regex;

use super::types::QualityAssessment;

/// Structural keywords left behind by a failed PDF text-layer parse:
/// object/stream boundaries and text-positioning operators.
pub(crate) static ARTIFACT_TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:obj|endobj|stream|endstream|xref|trailer|startxref|BT|ET|Td|TD|Tj|TJ|Tm|Tf|Tc|Tw|Tz|TL|Ts|Tr)\b",
    )
    .expect("artifact token pattern is valid")
});

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

static STOP_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:the|and|or|but|in|on|at|to|for|of|with|by)\b")
        .expect("stop word pattern is valid")
});

static IMAGE_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)image|img|picture|photo").expect("image pattern is valid"));

/// Below this score content is treated as scanned.
pub const SCANNED_THRESHOLD: u8 = 30;
/// More artifact tokens than this marks content as scanned regardless of score.
pub const SCANNED_ARTIFACT_LIMIT: usize = 20;
/// Below this score content is low quality.
pub const LOW_QUALITY_THRESHOLD: u8 = 50;
/// Above this score content is good quality.
pub const GOOD_QUALITY_THRESHOLD: u8 = 70;

/// Characters counted as binary noise: anything outside printable ASCII
/// except newline, carriage return and tab.
pub(crate) fn is_binary_char(c: char) -> bool {
    !matches!(c, ' '..='~' | '\n' | '\r' | '\t')
}

/// Scores text for extraction artifacts and readability.
///
/// Stateless; [`assess`](Self::assess) never fails and always returns a
/// best-effort score, including for empty input.
#[derive(Debug, Default, Clone, Copy)]
pub struct QualityAssessor;

impl QualityAssessor {
    pub fn new() -> Self {
        Self
    }

    /// Score `content` and derive the quality signals.
    pub fn assess(&self, content: &str) -> QualityAssessment {
        let artifact_count = ARTIFACT_TOKENS.find_iter(content).count();
        let binary_count = content.chars().filter(|c| is_binary_char(*c)).count();
        let content_length = content.chars().count();
        let word_count = WHITESPACE_RUN.split(content).count();

        let mut score = 100.0_f64;
        score -= (artifact_count as f64 * 2.0).min(40.0);
        score -= (binary_count as f64 * 0.6).min(30.0);
        if content_length < 100 {
            score -= 20.0;
        }
        if word_count < 20 {
            score -= 15.0;
        }
        if content.contains(['.', '!', '?']) {
            score += 10.0;
        }
        if content.chars().any(|c| c.is_ascii_uppercase()) {
            score += 5.0;
        }
        if STOP_WORDS.is_match(content) {
            score += 5.0;
        }
        // clamped to 0..=100 before the cast
        let text_quality = score.clamp(0.0, 100.0).round() as u8;

        QualityAssessment {
            text_quality,
            is_scanned: text_quality < SCANNED_THRESHOLD || artifact_count > SCANNED_ARTIFACT_LIMIT,
            has_low_text_quality: text_quality < LOW_QUALITY_THRESHOLD,
            has_good_text_quality: text_quality > GOOD_QUALITY_THRESHOLD,
            has_images: IMAGE_MENTION.is_match(content),
            artifact_count,
            binary_count,
            content_length,
            word_count,
        }
    }
}
