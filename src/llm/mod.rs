//! Text-completion collaborator used by the extraction pipeline.
//!
//! The pipeline only ever sees the [`TextCompletionService`] trait, so its
//! control flow and confidence math stay testable without a network. The
//! concrete client speaks the `OpenAI` Chat Completions protocol, which most
//! hosted and self-hosted providers implement.
//!
//! # Implementations
//!
//! - [`ChatCompletionsClient`]: single non-streaming `/v1/chat/completions` call
//! - [`LazyCompletionService`]: builds the client on first use; used at the
//!   application's composition root only
//!
//! # Example
//!
//! ```rust,ignore
//! use docsift::llm::{CompletionRequest, LlmSettings, Provider, ChatCompletionsClient};
//!
//! let settings = LlmSettings {
//!     base_url: "https://api.openai.com".to_string(),
//!     api_key: Some("sk-...".to_string()),
//!     model: "gpt-4o-mini".to_string(),
//!     provider: Provider::OpenAI,
//! };
//! let client = ChatCompletionsClient::new(settings);
//! ```

pub mod chat_completions;
pub mod lazy;
pub mod provider;

pub use chat_completions::ChatCompletionsClient;
pub use lazy::LazyCompletionService;
pub use provider::Provider;

use std::time::Duration;

/// LLM connection and model settings.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    /// Base URL for the LLM API (e.g., `https://api.openai.com`).
    pub base_url: String,
    /// Optional API key for authentication.
    pub api_key: Option<String>,
    /// Model identifier (e.g., `gpt-4o-mini`).
    pub model: String,
    /// Provider type (auto-detected from `base_url` if not specified).
    pub provider: Provider,
}

/// A single completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Instruction sent as the system message.
    pub system_instruction: String,
    /// Content sent as the user message.
    pub user_content: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Errors a completion service may return.
///
/// Callers in this crate treat every variant the same way; the taxonomy
/// exists for logging.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// The service has no usable settings or credentials.
    #[error("Completion service not configured: {0}")]
    NotConfigured(String),

    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The provider answered with a non-success status.
    #[error("Provider error ({status}): {body}")]
    Provider { status: u16, body: String },

    /// The provider answered with a body we could not interpret.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// No answer within the allotted time.
    #[error("Completion timed out after {0:?}")]
    Timeout(Duration),
}

/// External text-completion collaborator.
///
/// Implementations must be cheap to share across tasks; one instance serves
/// every concurrent pipeline run.
#[async_trait::async_trait]
pub trait TextCompletionService: Send + Sync + std::fmt::Debug {
    /// Complete `request` and return the raw reply text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError>;
}
