//! Result metadata: page estimate, quality tier and diagnostic notes.

use super::types::{ExtractionMethod, QualityAssessment, QualityTier, ResultMetadata};

/// Final text shorter than this gets a warning note.
pub const SHORT_CONTENT_CHARS: usize = 200;

/// `(exclusive upper bound in characters, pages)` for the stepped estimate.
const PAGE_STEPS: &[(usize, usize)] = &[
    (1_000, 1),
    (5_000, 2),
    (15_000, 3),
    (30_000, 5),
    (60_000, 10),
    (120_000, 20),
];

/// Characters per page beyond the last step.
const CHARS_PER_PAGE: usize = 6_000;

/// Estimate the page count of a document from its text length.
pub fn estimate_pages(text_length: usize) -> usize {
    PAGE_STEPS
        .iter()
        .find(|(limit, _)| text_length < *limit)
        .map_or_else(|| text_length.div_ceil(CHARS_PER_PAGE), |(_, pages)| *pages)
}

/// Builds [`ResultMetadata`] for a finished run.
#[derive(Debug)]
pub struct MetadataBuilder<'a> {
    assessment: &'a QualityAssessment,
    method: ExtractionMethod,
    confidence: u8,
    extra_notes: Vec<String>,
}

impl<'a> MetadataBuilder<'a> {
    /// `assessment` is the score of the raw input, which drives the notes.
    pub fn new(assessment: &'a QualityAssessment, method: ExtractionMethod, confidence: u8) -> Self {
        Self {
            assessment,
            method,
            confidence,
            extra_notes: Vec::new(),
        }
    }

    /// Append a note after the standard ones.
    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.extra_notes.push(note.into());
        self
    }

    pub fn build(self, final_text: &str) -> ResultMetadata {
        let length = final_text.chars().count();
        let q = self.assessment;

        let mut notes = vec![
            format!("Extraction method: {}", self.method),
            format!("Content quality score: {}/100", q.text_quality),
        ];
        if q.is_scanned {
            notes.push("Document appears to be scanned or image-based".to_string());
        }
        if q.artifact_count > 0 {
            notes.push(format!("Removed {} PDF artifacts", q.artifact_count));
        }
        if q.binary_count > 0 {
            notes.push(format!("Filtered {} binary characters", q.binary_count));
        }
        if length < SHORT_CONTENT_CHARS {
            notes.push("Warning: Extracted content is very short".to_string());
        }
        notes.extend(self.extra_notes);

        ResultMetadata {
            pages: estimate_pages(length),
            word_count: final_text.split_whitespace().count(),
            has_images: q.has_images,
            is_scanned: q.is_scanned,
            quality: QualityTier::from_confidence(self.confidence),
            notes,
        }
    }
}
