//! OpenAI-compatible chat completions backend (OpenAI, OpenRouter, vLLM)

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::provider::{non_empty, upstream_error, CompletionProvider};
use crate::types::{ChatMessage, CompletionRequest, ProviderInfo};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

/// Key-authenticated OpenAI-compatible provider
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    config: ProviderConfig,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// Build from config
    ///
    /// # Errors
    /// `MissingApiKey` when no key is configured; `Http` if the client cannot be built.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let api_key = config.require_api_key()?;
        let client = config.http_client()?;
        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    fn encode_message(message: &ChatMessage) -> Value {
        if message.images.is_empty() {
            return json!({
                "role": message.role.as_str(),
                "content": message.content,
            });
        }
        let mut parts = vec![json!({ "type": "text", "text": message.content })];
        parts.extend(message.images.iter().map(|image| {
            json!({
                "type": "image_url",
                "image_url": { "url": image.data_url() },
            })
        }));
        json!({ "role": message.role.as_str(), "content": parts })
    }

    fn body(&self, request: &CompletionRequest) -> Value {
        let mut messages = vec![json!({ "role": "system", "content": request.system })];
        messages.extend(request.messages.iter().map(Self::encode_message));
        json!({
            "model": request.options.model.as_deref().unwrap_or(&self.config.model),
            "messages": messages,
            "temperature": request.options.temperature,
            "max_tokens": request.options.max_tokens.unwrap_or(self.config.max_tokens),
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.config.base_url());
        tracing::debug!(
            provider = "openai",
            model = %self.config.model,
            temperature = request.options.temperature,
            "sending completion request"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.body(&request))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("missing choices".to_string()))?
            .message
            .content
            .unwrap_or_default();
        non_empty(content)
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "openai".to_string(),
            model: self.config.model.clone(),
            supports_vision: true,
        }
    }
}
