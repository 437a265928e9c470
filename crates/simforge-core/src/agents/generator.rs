//! Generator agent

use super::{call, options, AgentRole};
use crate::config::GenerationConfig;
use crate::error::AgentError;
use crate::prompts;
use simforge_artifact::{extract, ArtifactKind};
use simforge_provider::{CompletionProvider, CompletionRequest, ImageAttachment};

/// Produces the first candidate from the request and plan
pub struct Generator<'a> {
    provider: &'a dyn CompletionProvider,
    config: &'a GenerationConfig,
}

impl<'a> Generator<'a> {
    /// Create generator
    #[inline]
    #[must_use]
    pub fn new(provider: &'a dyn CompletionProvider, config: &'a GenerationConfig) -> Self {
        Self { provider, config }
    }

    /// Generate and normalize a candidate
    ///
    /// Images are attached only when the model being called accepts them,
    /// which honors a per-request model override.
    ///
    /// # Errors
    /// Returns [`AgentError`] when the provider call fails.
    pub async fn generate(
        &self,
        request_text: &str,
        kind: ArtifactKind,
        plan: &[String],
        images: &[ImageAttachment],
    ) -> Result<String, AgentError> {
        let mut request = CompletionRequest::new(
            prompts::generator_system(kind, &self.config.capabilities),
            prompts::generation_request(request_text, plan),
            options(self.config, self.config.generator_temperature),
        );

        if !images.is_empty() {
            let model = self.config.model.as_deref();
            if self.provider.supports_vision(model) {
                request = request.with_images(images.to_vec());
            } else {
                let info = self.provider.info();
                tracing::warn!(
                    provider = %info.name,
                    model = model.unwrap_or(&info.model),
                    dropped = images.len(),
                    "model has no vision support; images not sent"
                );
            }
        }

        let raw = call(self.provider, AgentRole::Generator, request).await?;
        Ok(extract(&raw, kind))
    }
}
