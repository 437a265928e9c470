//! Keyless local backend served by Ollama

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::provider::{non_empty, upstream_error, CompletionProvider};
use crate::types::{CompletionRequest, ProviderInfo};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

const VISION_MODEL_MARKERS: &[&str] = &["llava", "vision", "moondream", "bakllava", "gemma3"];

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Local provider; no authentication
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Build from config
    ///
    /// # Errors
    /// `Http` if the client cannot be built.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = config.http_client()?;
        Ok(Self { config, client })
    }

    fn body(&self, request: &CompletionRequest) -> Value {
        let mut messages = vec![json!({ "role": "system", "content": request.system })];
        messages.extend(request.messages.iter().map(|message| {
            let mut value = json!({ "role": message.role.as_str(), "content": message.content });
            if !message.images.is_empty() {
                value["images"] = message
                    .images
                    .iter()
                    .map(|image| Value::String(image.data_base64.clone()))
                    .collect();
            }
            value
        }));
        json!({
            "model": request.options.model.as_deref().unwrap_or(&self.config.model),
            "messages": messages,
            "stream": false,
            "options": {
                "temperature": request.options.temperature,
                "num_predict": request.options.max_tokens.unwrap_or(self.config.max_tokens),
            },
        })
    }
}

#[async_trait]
impl CompletionProvider for OllamaProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        let url = format!("{}/api/chat", self.config.base_url());
        tracing::debug!(
            provider = "ollama",
            model = %self.config.model,
            temperature = request.options.temperature,
            "sending completion request"
        );

        let response = self.client.post(&url).json(&self.body(&request)).send().await?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .message
            .ok_or_else(|| ProviderError::InvalidResponse("missing message".to_string()))?
            .content;
        non_empty(content)
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "ollama".to_string(),
            model: self.config.model.clone(),
            supports_vision: is_vision_model(&self.config.model),
        }
    }

    fn supports_vision(&self, model: Option<&str>) -> bool {
        is_vision_model(model.unwrap_or(&self.config.model))
    }
}

fn is_vision_model(model: &str) -> bool {
    let model = model.to_lowercase();
    VISION_MODEL_MARKERS.iter().any(|m| model.contains(m))
}
