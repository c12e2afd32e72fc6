//! Language-model text recovery.
//!
//! Sends a bounded excerpt of raw content with a task-specific instruction to
//! a [`TextCompletionService`] and sanitizes the reply. Failures come back as
//! `Err` for the orchestrator to absorb; nothing here panics or retries.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;

use crate::llm::{CompletionError, CompletionRequest, TextCompletionService};

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```.*?```").expect("code fence pattern is valid"));

static BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]").expect("bracket pattern is valid"));

static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("parenthetical pattern is valid"));

/// Anything but ASCII word characters, whitespace and basic punctuation.
static DISALLOWED_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^A-Za-z0-9_\s.,;:!?-]").expect("character class pattern is valid")
});

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Appended to an excerpt that was cut to fit the character budget.
pub const TRUNCATION_MARKER: &str = "\n\n[Content truncated...]";

/// Sampling temperature for every recovery request.
pub const TEMPERATURE: f32 = 0.1;

/// Default bound on a single completion round-trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Recovery task sent to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnhanceMode {
    /// Pull readable text out of artifact-laden extraction output.
    Enhance,
    /// Rebuild paragraphs from scanned / OCR-degraded text.
    Reconstruct,
}

impl EnhanceMode {
    /// Maximum characters of raw content sent to the model.
    pub fn char_budget(self) -> usize {
        match self {
            Self::Enhance => 8000,
            Self::Reconstruct => 6000,
        }
    }

    pub fn max_output_tokens(self) -> u32 {
        match self {
            Self::Enhance => 2000,
            Self::Reconstruct => 3000,
        }
    }

    fn system_instruction(self) -> &'static str {
        match self {
            Self::Enhance => {
                "You extract readable text from corrupted document extraction output. \
                 Return only the meaningful human-readable text. Remove PDF structure \
                 keywords, positioning operators, object references, encoding noise and \
                 binary fragments. Preserve the original wording, paragraph order and \
                 headings. Do not summarize, translate or add commentary."
            }
            Self::Reconstruct => {
                "You reconstruct text recovered from a scanned document by OCR. The input \
                 contains recognition errors, broken lines and stray symbols. Rebuild it into \
                 logical sentences and paragraphs, fixing obvious character-level mistakes \
                 only where the intended word is clear. Preserve the original meaning and \
                 order. Do not summarize or add commentary."
            }
        }
    }

    fn user_prompt(self, excerpt: &str) -> String {
        match self {
            Self::Enhance => format!("Extract the readable text from this content:\n\n{excerpt}"),
            Self::Reconstruct => {
                format!("Reconstruct the text of this scanned document:\n\n{excerpt}")
            }
        }
    }
}

/// Cut `content` to `budget` characters, marking the cut.
pub fn truncate_excerpt(content: &str, budget: usize) -> String {
    match content.char_indices().nth(budget) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &content[..cut]),
        None => content.to_string(),
    }
}

/// Strip markup and commentary a model tends to wrap its answer in.
pub fn sanitize_reply(reply: &str) -> String {
    let text = CODE_FENCE.replace_all(reply, "");
    let text = BRACKETED.replace_all(&text, "");
    let text = PARENTHETICAL.replace_all(&text, "");
    let text = DISALLOWED_CHARS.replace_all(&text, "");
    WHITESPACE_RUN.replace_all(&text, " ").trim().to_string()
}

/// Adapter between the pipeline and the completion collaborator.
#[derive(Debug, Clone)]
pub struct LanguageModelExtractor {
    service: Arc<dyn TextCompletionService>,
    timeout: Duration,
}

impl LanguageModelExtractor {
    pub fn new(service: Arc<dyn TextCompletionService>) -> Self {
        Self {
            service,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Recover readable text from `content`.
    ///
    /// A reply that sanitizes to nothing is reported as
    /// [`CompletionError::InvalidResponse`].
    pub async fn enhance(&self, content: &str, mode: EnhanceMode) -> Result<String, CompletionError> {
        let excerpt = truncate_excerpt(content, mode.char_budget());
        let request = CompletionRequest {
            system_instruction: mode.system_instruction().to_string(),
            user_content: mode.user_prompt(&excerpt),
            temperature: TEMPERATURE,
            max_output_tokens: mode.max_output_tokens(),
        };

        tracing::debug!(
            name: "extraction.llm.request",
            mode = ?mode,
            excerpt_chars = excerpt.chars().count(),
            "Sending content to completion service"
        );

        let reply = tokio::time::timeout(self.timeout, self.service.complete(request))
            .await
            .map_err(|_elapsed| CompletionError::Timeout(self.timeout))??;

        let cleaned = sanitize_reply(&reply);
        if cleaned.is_empty() {
            return Err(CompletionError::InvalidResponse(
                "reply contained no usable text".to_string(),
            ));
        }
        Ok(cleaned)
    }
}
