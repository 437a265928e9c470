//! Construct a provider from a caller-supplied identifier

use crate::anthropic::AnthropicProvider;
use crate::config::{ProviderConfig, ProviderKind};
use crate::error::ProviderError;
use crate::ollama::OllamaProvider;
use crate::openai::OpenAiProvider;
use crate::provider::CompletionProvider;
use std::sync::Arc;

/// Build the backend selected by `config.provider`
///
/// # Errors
/// `MissingApiKey` for key-authenticated backends without a key.
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn CompletionProvider>, ProviderError> {
    tracing::info!(
        provider = %config.provider,
        model = %config.model,
        base_url = %config.base_url(),
        "creating completion provider"
    );
    let provider: Arc<dyn CompletionProvider> = match config.provider {
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(config.clone())?),
        ProviderKind::Anthropic => Arc::new(AnthropicProvider::new(config.clone())?),
        ProviderKind::Ollama => Arc::new(OllamaProvider::new(config.clone())?),
    };
    Ok(provider)
}

/// Parse an identifier and build the backend with defaults
///
/// # Errors
/// `UnknownProvider` for unrecognised identifiers, plus everything
/// [`create_provider`] returns.
pub fn create_provider_by_name(
    name: &str,
    api_key: Option<String>,
) -> Result<Arc<dyn CompletionProvider>, ProviderError> {
    let kind: ProviderKind = name.parse()?;
    let mut config = ProviderConfig::new(kind);
    config.api_key = api_key;
    create_provider(&config)
}
