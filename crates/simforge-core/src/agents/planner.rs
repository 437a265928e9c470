//! Planner agent

use super::{call, options, AgentRole};
use crate::config::GenerationConfig;
use crate::prompts::{self, DEFAULT_PLAN_STEP};
use simforge_artifact::{numbered_items, ArtifactKind};
use simforge_provider::{CompletionProvider, CompletionRequest};

/// Turns a request into ordered implementation steps
///
/// Planning is advisory: a provider error or a reply without numbered lines
/// yields the single default step instead of an error.
pub struct Planner<'a> {
    provider: &'a dyn CompletionProvider,
    config: &'a GenerationConfig,
}

impl<'a> Planner<'a> {
    /// Create planner
    #[inline]
    #[must_use]
    pub fn new(provider: &'a dyn CompletionProvider, config: &'a GenerationConfig) -> Self {
        Self { provider, config }
    }

    /// Plan steps for a request; never empty
    pub async fn plan(&self, request_text: &str, kind: ArtifactKind) -> Vec<String> {
        let request = CompletionRequest::new(
            prompts::planner_system(kind, &self.config.capabilities),
            request_text,
            options(self.config, self.config.planner_temperature),
        );

        match call(self.provider, AgentRole::Planner, request).await {
            Ok(reply) => {
                let steps = numbered_items(&reply);
                if steps.is_empty() {
                    tracing::warn!("planner reply had no numbered steps; using default plan");
                    default_plan()
                } else {
                    steps
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "planner failed; using default plan");
                default_plan()
            }
        }
    }
}

fn default_plan() -> Vec<String> {
    vec![DEFAULT_PLAN_STEP.to_string()]
}
