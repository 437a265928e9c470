//! Refiner agent

use super::{call, options, AgentRole};
use crate::config::GenerationConfig;
use crate::error::AgentError;
use crate::prompts;
use simforge_artifact::{extract, ArtifactKind};
use simforge_provider::{CompletionProvider, CompletionRequest};

/// Repairs a rejected candidate, touching only the listed defects
pub struct Refiner<'a> {
    provider: &'a dyn CompletionProvider,
    config: &'a GenerationConfig,
}

impl<'a> Refiner<'a> {
    /// Create refiner
    #[inline]
    #[must_use]
    pub fn new(provider: &'a dyn CompletionProvider, config: &'a GenerationConfig) -> Self {
        Self { provider, config }
    }

    /// Produce a corrected, normalized candidate
    ///
    /// # Errors
    /// Returns [`AgentError`] when the provider call fails.
    pub async fn refine(
        &self,
        request_text: &str,
        kind: ArtifactKind,
        candidate: &str,
        defects: &[String],
    ) -> Result<String, AgentError> {
        let request = CompletionRequest::new(
            prompts::refiner_system(kind, &self.config.capabilities),
            prompts::refinement_request(request_text, candidate, defects),
            options(self.config, self.config.refiner_temperature),
        );
        let raw = call(self.provider, AgentRole::Refiner, request).await?;
        Ok(extract(&raw, kind))
    }
}
