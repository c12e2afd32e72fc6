//! Deterministic text normalization.
//!
//! [`StructuredCleaner::clean`] is the full pass used by the structured
//! strategy; [`StructuredCleaner::basic_cleanup`] is the cheaper subset used
//! by the basic strategy and as the universal fallback.

use std::sync::LazyLock;

use regex::Regex;

use super::quality::{ARTIFACT_TOKENS, is_binary_char};

static NAME_VALUE_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/[A-Za-z][A-Za-z0-9]*(?:\s+-?\d+(?:\.\d+)?)?").expect("name pattern is valid")
});

static COORDINATE_OPERATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:-?\d+(?:\.\d+)?\s+){2,}(?:re|cm|m|l|c|v|y|w|g|G|rg|RG|k|K)\b")
        .expect("coordinate pattern is valid")
});

static INLINE_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\S\n]+").expect("inline whitespace pattern is valid"));

static ANY_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

static CAPITAL_RUN_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").expect("capital run pattern is valid"));

static CASE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])([A-Z])").expect("case boundary pattern is valid"));

static SPACE_AROUND_NEWLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" *\n *").expect("newline pattern is valid"));

static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("blank line pattern is valid"));

/// Upper bound on normalization passes; real input settles in two.
const MAX_PASSES: usize = 8;

/// Pattern-based cleaner for text that is already mostly readable.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredCleaner;

impl StructuredCleaner {
    pub fn new() -> Self {
        Self
    }

    /// Full normalization pass.
    ///
    /// Removing tokens can fuse neighbouring words and splitting fused words
    /// can expose new tokens, so the pass repeats until the output is stable.
    /// The result is idempotent: `clean(clean(x)) == clean(x)`.
    pub fn clean(&self, content: &str) -> String {
        let mut current = Self::normalize_once(content);
        for _ in 1..MAX_PASSES {
            let next = Self::normalize_once(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    /// Token removal and whitespace collapse only.
    pub fn basic_cleanup(&self, content: &str) -> String {
        let stripped = ARTIFACT_TOKENS.replace_all(content, "");
        ANY_WHITESPACE.replace_all(&stripped, " ").trim().to_string()
    }

    fn normalize_once(content: &str) -> String {
        let text = ARTIFACT_TOKENS.replace_all(content, "");
        let text = NAME_VALUE_PAIR.replace_all(&text, "");
        let text = COORDINATE_OPERATOR.replace_all(&text, "");
        let text: String = text.chars().filter(|c| !is_binary_char(*c)).collect();
        let text = INLINE_WHITESPACE.replace_all(&text, " ");
        let text = CAPITAL_RUN_BOUNDARY.replace_all(&text, "$1 $2");
        let text = CASE_BOUNDARY.replace_all(&text, "$1 $2");
        let text = SPACE_AROUND_NEWLINE.replace_all(&text, "\n");
        let text = BLANK_LINES.replace_all(&text, "\n\n");
        text.trim().to_string()
    }
}
