//! Provider-specific URL and authentication handling.
//!
//! All supported providers speak the Chat Completions protocol; they differ
//! in where the endpoint lives and how the key is presented.

/// Supported LLM providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    /// `OpenAI` (api.openai.com)
    OpenAI,
    /// Azure `OpenAI` Service
    AzureOpenAI {
        /// Deployment name (required for Azure)
        deployment_name: String,
        /// API version (e.g., "2024-08-01-preview")
        api_version: String,
    },
    /// `OpenRouter` (openrouter.ai)
    OpenRouter,
    /// Together AI (together.ai, together.xyz)
    TogetherAI,
    /// Groq (groq.com)
    Groq,
    /// Generic OpenAI-compatible provider (Ollama, vLLM, LM Studio, ...)
    Generic,
}

/// How the API key is attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStyle {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `api-key: <key>`
    ApiKeyHeader,
}

impl Provider {
    /// Default API version used for Azure when none is configured.
    pub const AZURE_DEFAULT_API_VERSION: &'static str = "2024-08-01-preview";

    /// Detect provider from base URL.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let provider = Provider::detect_from_url("https://api.groq.com/openai");
    /// assert_eq!(provider, Provider::Groq);
    /// ```
    #[must_use]
    pub fn detect_from_url(base_url: &str) -> Self {
        let lower = base_url.to_lowercase();

        if lower.contains("openai.azure.com") || lower.contains("azure.com") {
            Self::AzureOpenAI {
                deployment_name: String::new(),
                api_version: Self::AZURE_DEFAULT_API_VERSION.to_string(),
            }
        } else if lower.contains("openrouter.ai") {
            Self::OpenRouter
        } else if lower.contains("together.ai") || lower.contains("together.xyz") {
            Self::TogetherAI
        } else if lower.contains("groq.com") {
            Self::Groq
        } else if lower.contains("openai.com") {
            Self::OpenAI
        } else {
            Self::Generic
        }
    }

    /// Fill in Azure deployment details; other providers are returned as-is.
    #[must_use]
    pub fn with_azure_deployment(self, deployment: Option<String>, api_version: Option<String>) -> Self {
        match (self, deployment) {
            (Self::AzureOpenAI { api_version: detected, .. }, Some(deployment_name)) => {
                Self::AzureOpenAI {
                    deployment_name,
                    api_version: api_version.unwrap_or(detected),
                }
            }
            (provider, _) => provider,
        }
    }

    /// Header style used to send the API key.
    #[must_use]
    pub fn auth_style(&self) -> AuthStyle {
        match self {
            Self::AzureOpenAI { .. } => AuthStyle::ApiKeyHeader,
            _ => AuthStyle::Bearer,
        }
    }

    /// Whether the request body must carry the model name.
    ///
    /// Azure routes by deployment and ignores it.
    #[must_use]
    pub fn sends_model_in_body(&self) -> bool {
        !matches!(self, Self::AzureOpenAI { .. })
    }

    /// Build the chat completions URL for this provider.
    #[must_use]
    pub fn build_chat_url(&self, base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');

        match self {
            Self::AzureOpenAI {
                deployment_name,
                api_version,
            } => {
                format!(
                    "{base}/openai/deployments/{deployment_name}/chat/completions?api-version={api_version}"
                )
            }
            _ if base.ends_with("/v1") => format!("{base}/chat/completions"),
            _ => format!("{base}/v1/chat/completions"),
        }
    }
}
