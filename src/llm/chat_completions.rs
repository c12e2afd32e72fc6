//! `OpenAI` Chat Completions client.
//!
//! Sends one non-streaming request per call to `/v1/chat/completions` and
//! returns the first choice's message content.

use serde::Deserialize;

use super::provider::AuthStyle;
use super::{CompletionError, CompletionRequest, LlmSettings, TextCompletionService};

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for the `OpenAI` Chat Completions API.
#[derive(Clone)]
pub struct ChatCompletionsClient {
    http: reqwest::Client,
    settings: LlmSettings,
}

impl std::fmt::Debug for ChatCompletionsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsClient")
            .field("base_url", &self.settings.base_url)
            .field("model", &self.settings.model)
            .field("provider", &self.settings.provider)
            .finish()
    }
}

impl ChatCompletionsClient {
    /// Create a new client with the given settings.
    #[must_use]
    pub fn new(settings: LlmSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    /// Request body for `req`.
    fn build_body(&self, req: &CompletionRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "messages": [
                { "role": "system", "content": req.system_instruction },
                { "role": "user", "content": req.user_content },
            ],
            "temperature": req.temperature,
            "max_tokens": req.max_output_tokens,
            "stream": false,
        });
        if self.settings.provider.sends_model_in_body() {
            body["model"] = serde_json::Value::String(self.settings.model.clone());
        }
        body
    }
}

/// Pull the first choice's text out of a response body.
fn parse_reply(body: &str) -> Result<String, CompletionError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| CompletionError::InvalidResponse(e.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| CompletionError::InvalidResponse("response has no message content".to_string()))
}

#[async_trait::async_trait]
impl TextCompletionService for ChatCompletionsClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        let url = self.settings.provider.build_chat_url(&self.settings.base_url);
        let body = self.build_body(&request);

        let mut rb = self.http.post(&url).json(&body);
        if let Some(key) = &self.settings.api_key {
            rb = match self.settings.provider.auth_style() {
                AuthStyle::Bearer => rb.bearer_auth(key),
                AuthStyle::ApiKeyHeader => rb.header("api-key", key),
            };
        }

        let response = rb
            .send()
            .await
            .map_err(|e| CompletionError::Http(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CompletionError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(CompletionError::Provider {
                status: status.as_u16(),
                body: text,
            });
        }

        tracing::debug!(
            name: "llm.completion.received",
            model = %self.settings.model,
            bytes = text.len(),
            "Completion received"
        );

        parse_reply(&text)
    }
}
