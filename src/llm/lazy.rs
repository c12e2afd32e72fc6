//! Lazily-constructed completion client for the composition root.

use std::sync::OnceLock;

use super::{
    ChatCompletionsClient, CompletionError, CompletionRequest, LlmSettings, TextCompletionService,
};

/// Builds a [`ChatCompletionsClient`] on first use and reuses it afterwards.
///
/// Settings problems are kept, not raised: every call then fails with
/// [`CompletionError::NotConfigured`], which the pipeline handles like any
/// other collaborator failure.
#[derive(Debug)]
pub struct LazyCompletionService {
    settings: Result<LlmSettings, String>,
    client: OnceLock<ChatCompletionsClient>,
}

impl LazyCompletionService {
    pub fn new(settings: Result<LlmSettings, String>) -> Self {
        Self {
            settings,
            client: OnceLock::new(),
        }
    }

    /// Settings read from `LLM_*` environment variables.
    pub fn from_env() -> Self {
        Self::new(crate::config::load_llm_settings())
    }

    pub fn is_configured(&self) -> bool {
        self.settings.is_ok()
    }

    fn client(&self) -> Result<&ChatCompletionsClient, CompletionError> {
        let settings = self
            .settings
            .as_ref()
            .map_err(|reason| CompletionError::NotConfigured(reason.clone()))?;

        Ok(self.client.get_or_init(|| {
            tracing::info!(
                name: "llm.client.initialized",
                base_url = %settings.base_url,
                model = %settings.model,
                "Completion client initialized"
            );
            ChatCompletionsClient::new(settings.clone())
        }))
    }
}

#[async_trait::async_trait]
impl TextCompletionService for LazyCompletionService {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        self.client()?.complete(request).await
    }
}
