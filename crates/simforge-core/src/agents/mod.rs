//! Agents: one provider call each, with prompt assembly and post-processing
//!
//! - [`Planner`]: numbered implementation steps, never fails
//! - [`Generator`]: first candidate, failure is fatal to the request
//! - [`Refiner`]: corrected candidate from defects
//! - [`SemanticValidator`]: AI review after local validation passes
//!
//! Agents never call each other; the orchestrator sequences them.

mod generator;
mod planner;
mod refiner;
mod semantic;

pub use generator::Generator;
pub use planner::Planner;
pub use refiner::Refiner;
pub use semantic::{parse_review, SemanticValidator};

use crate::config::GenerationConfig;
use crate::error::AgentError;
use serde::{Deserialize, Serialize};
use simforge_provider::{CompletionOptions, CompletionProvider, CompletionRequest};

/// Longest prompt or output preview written to debug logs
pub(crate) const MAX_LOG_TEXT_CHARS: usize = 240;

/// Which agent made a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    /// Produces the plan
    Planner,
    /// Produces the first candidate
    Generator,
    /// Repairs rejected candidates
    Refiner,
    /// Reviews locally valid candidates
    SemanticValidator,
}

impl AgentRole {
    /// Short identifier used in logs and errors
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            AgentRole::Planner => "planner",
            AgentRole::Generator => "generator",
            AgentRole::Refiner => "refiner",
            AgentRole::SemanticValidator => "semantic validator",
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Sampling options for one agent call
pub(crate) fn options(config: &GenerationConfig, temperature: f32) -> CompletionOptions {
    let options = CompletionOptions::with_temperature(temperature);
    match &config.model {
        Some(model) => options.model(model.clone()),
        None => options,
    }
}

/// Run one call, logging previews of both sides
pub(crate) async fn call(
    provider: &dyn CompletionProvider,
    role: AgentRole,
    request: CompletionRequest,
) -> Result<String, AgentError> {
    tracing::debug!(
        agent = %role,
        temperature = request.options.temperature,
        images = request.has_images(),
        prompt = %truncate_for_log(request.last_user_content().unwrap_or_default(), MAX_LOG_TEXT_CHARS),
        "agent call"
    );
    match provider.complete(request).await {
        Ok(text) => {
            tracing::debug!(
                agent = %role,
                output = %truncate_for_log(&text, MAX_LOG_TEXT_CHARS),
                "agent reply"
            );
            Ok(text)
        }
        Err(source) => Err(AgentError::new(role, source)),
    }
}

pub(crate) fn truncate_for_log(input: &str, max_chars: usize) -> String {
    let char_count = input.chars().count();
    if char_count <= max_chars {
        return input.to_string();
    }
    let mut preview: String = input.chars().take(max_chars).collect();
    preview.push_str(&format!("... [truncated, total_chars={char_count}]"));
    preview
}
