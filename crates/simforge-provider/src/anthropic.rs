//! Anthropic messages API backend

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::provider::{non_empty, upstream_error, CompletionProvider};
use crate::types::{ChatMessage, CompletionRequest, ProviderInfo, Role};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Key-authenticated Anthropic provider
#[derive(Debug, Clone)]
pub struct AnthropicProvider {
    config: ProviderConfig,
    api_key: String,
    client: reqwest::Client,
}

impl AnthropicProvider {
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
            return json!({ "role": message.role.as_str(), "content": message.content });
        }
        let mut blocks: Vec<Value> = message
            .images
            .iter()
            .map(|image| {
                json!({
                    "type": "image",
                    "source": {
                        "type": "base64",
                        "media_type": image.media_type,
                        "data": image.data_base64,
                    },
                })
            })
            .collect();
        blocks.push(json!({ "type": "text", "text": message.content }));
        json!({ "role": message.role.as_str(), "content": blocks })
    }

    fn body(&self, request: &CompletionRequest) -> Value {
        // System-role turns are folded into the top-level system field.
        let mut system = request.system.clone();
        for extra in request.messages.iter().filter(|m| m.role == Role::System) {
            system.push_str("\n\n");
            system.push_str(&extra.content);
        }
        let messages: Vec<Value> = request
            .messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(Self::encode_message)
            .collect();
        json!({
            "model": request.options.model.as_deref().unwrap_or(&self.config.model),
            "system": system,
            "messages": messages,
            "max_tokens": request.options.max_tokens.unwrap_or(self.config.max_tokens),
            "temperature": request.options.temperature,
        })
    }
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        let url = format!("{}/v1/messages", self.config.base_url());
        tracing::debug!(
            provider = "anthropic",
            model = %self.config.model,
            temperature = request.options.temperature,
            "sending completion request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&self.body(&request))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        let parsed: MessagesResponse = response.json().await?;
        let text: String = parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");
        non_empty(text)
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "anthropic".to_string(),
            model: self.config.model.clone(),
            supports_vision: true,
        }
    }
}
