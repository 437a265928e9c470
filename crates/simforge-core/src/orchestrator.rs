//! Orchestrator - the plan, generate, validate, refine state machine
//!
//! ```text
//! Planning -> Generating -> Validating -> Accepted
//!                               |  ^
//!                               v  |
//!                             Refining -> AttemptsExhausted
//! ```
//!
//! One request runs strictly sequentially: at most one provider call is in
//! flight, and the loop is bounded by the attempt counter alone.

use crate::agents::{Generator, Planner, Refiner, SemanticValidator};
use crate::config::{GenerationConfig, SimForgeConfig};
use crate::context::{GenerationContext, GenerationOutcome, GenerationRequest, GenerationResult};
use crate::error::{ConfigError, PipelineError};
use simforge_artifact::{validate_local, ValidationVerdict};
use simforge_provider::{
    create_provider, CancellableProvider, CompletionProvider, ImageAttachment, ProviderInfo,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Pipeline stage of one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Waiting on the planner
    Planning,
    /// Waiting on the generator
    Generating,
    /// Running local and semantic checks
    Validating,
    /// Waiting on the refiner
    Refining,
    /// Terminal: candidate passed
    Accepted,
    /// Terminal: no refine budget left, or the refiner failed
    AttemptsExhausted,
}

impl Stage {
    /// Stages reachable in one step
    #[must_use]
    pub fn allowed_transitions(self) -> &'static [Stage] {
        use Stage::{Accepted, AttemptsExhausted, Generating, Planning, Refining, Validating};
        match self {
            Planning => &[Generating],
            Generating => &[Validating],
            Validating => &[Accepted, Refining, AttemptsExhausted],
            Refining => &[Validating, AttemptsExhausted],
            Accepted | AttemptsExhausted => &[],
        }
    }

    /// Whether no further transition exists
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }
}

/// Terminal branch of the refine loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopExit {
    Accepted,
    AttemptsExhausted,
    RefinementFailed,
}

impl From<LoopExit> for GenerationOutcome {
    fn from(exit: LoopExit) -> Self {
        match exit {
            LoopExit::Accepted => GenerationOutcome::Accepted,
            LoopExit::AttemptsExhausted => GenerationOutcome::AttemptsExhausted,
            LoopExit::RefinementFailed => GenerationOutcome::RefinementFailed,
        }
    }
}

struct StageTracker {
    current: Stage,
    request_id: Uuid,
}

impl StageTracker {
    fn new(request_id: Uuid) -> Self {
        Self {
            current: Stage::Planning,
            request_id,
        }
    }

    fn advance(&mut self, to: Stage) {
        debug_assert!(
            self.current.allowed_transitions().contains(&to),
            "illegal stage transition: {:?} -> {:?}",
            self.current,
            to
        );
        tracing::debug!(request_id = %self.request_id, from = ?self.current, to = ?to, "stage transition");
        self.current = to;
    }
}

/// Drives one generation request from prompt to artifact
///
/// Holds no per-request state; share it behind an `Arc` across concurrent
/// requests.
pub struct Orchestrator {
    provider: Arc<dyn CompletionProvider>,
    config: GenerationConfig,
}

impl Orchestrator {
    /// Create orchestrator over a provider
    #[inline]
    #[must_use]
    pub fn new(provider: Arc<dyn CompletionProvider>, config: GenerationConfig) -> Self {
        Self { provider, config }
    }

    /// Build the provider described by a config file
    ///
    /// # Errors
    /// Returns [`PipelineError::Config`] when the provider cannot be created.
    pub fn from_config(config: &SimForgeConfig) -> Result<Self, PipelineError> {
        let provider = create_provider(&config.provider).map_err(ConfigError::from)?;
        Ok(Self::new(provider, config.generation.clone()))
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Description of the underlying provider
    #[must_use]
    pub fn provider_info(&self) -> ProviderInfo {
        self.provider.info()
    }

    /// Run a request to completion
    ///
    /// # Errors
    /// Returns [`PipelineError::Generation`] when no first candidate could be
    /// produced. Every other failure is reported through the result.
    pub async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResult, PipelineError> {
        self.generate_with_cancel(request, CancellationToken::new())
            .await
    }

    /// Run a request, abandoning it when `token` fires
    ///
    /// Cancellation drops the provider call in flight.
    ///
    /// # Errors
    /// As [`Orchestrator::generate`], plus [`PipelineError::Cancelled`].
    pub async fn generate_with_cancel(
        &self,
        request: GenerationRequest,
        token: CancellationToken,
    ) -> Result<GenerationResult, PipelineError> {
        let provider = CancellableProvider::new(self.provider.as_ref(), token);
        let ctx = GenerationContext::new(request.text, request.kind);
        self.run(&provider, ctx, &request.images).await
    }

    async fn run(
        &self,
        provider: &CancellableProvider<'_>,
        mut ctx: GenerationContext,
        images: &[ImageAttachment],
    ) -> Result<GenerationResult, PipelineError> {
        let config = &self.config;
        let max_attempts = config.effective_max_attempts();
        let request_id = ctx.request_id;
        let mut stage = StageTracker::new(request_id);

        tracing::info!(
            request_id = %request_id,
            kind = %ctx.artifact_kind,
            images = images.len(),
            "generation started"
        );

        ctx.plan = Planner::new(provider, config)
            .plan(&ctx.request_text, ctx.artifact_kind)
            .await;
        ensure_live(provider, request_id)?;
        tracing::info!(request_id = %request_id, steps = ctx.plan.len(), "plan ready");

        stage.advance(Stage::Generating);
        let candidate = Generator::new(provider, config)
            .generate(&ctx.request_text, ctx.artifact_kind, &ctx.plan, images)
            .await
            .map_err(|e| {
                tracing::error!(request_id = %request_id, error = %e, "generation failed");
                PipelineError::from_agent(e)
            })?;
        ctx.set_candidate(candidate);
        stage.advance(Stage::Validating);

        let exit = loop {
            let verdict = self.validate(provider, &ctx).await;
            ensure_live(provider, request_id)?;

            if verdict.accepted {
                stage.advance(Stage::Accepted);
                break LoopExit::Accepted;
            }

            tracing::info!(
                request_id = %request_id,
                attempt = ctx.attempt_count,
                defects = ?verdict.defects,
                "candidate rejected"
            );
            ctx.record_rejection(verdict.defects);

            if ctx.attempt_count >= max_attempts {
                stage.advance(Stage::AttemptsExhausted);
                break LoopExit::AttemptsExhausted;
            }

            stage.advance(Stage::Refining);
            ctx.attempt_count += 1;
            let refined = Refiner::new(provider, config)
                .refine(
                    &ctx.request_text,
                    ctx.artifact_kind,
                    ctx.candidate.as_deref().unwrap_or_default(),
                    &ctx.defects,
                )
                .await;

            match refined {
                Ok(candidate) => {
                    ctx.set_candidate(candidate);
                    stage.advance(Stage::Validating);
                }
                Err(e) if e.is_cancelled() => return Err(PipelineError::Cancelled),
                Err(e) => {
                    tracing::warn!(
                        request_id = %request_id,
                        attempt = ctx.attempt_count,
                        error = %e,
                        "refinement failed; returning last candidate"
                    );
                    stage.advance(Stage::AttemptsExhausted);
                    break LoopExit::RefinementFailed;
                }
            }
        };

        let result = ctx.into_result(exit.into());
        tracing::info!(
            request_id = %request_id,
            outcome = ?result.outcome,
            attempts = result.attempts,
            duration_ms = result.duration_ms,
            "generation finished"
        );
        Ok(result)
    }

    /// Local check first; the semantic check only sees locally valid candidates
    async fn validate(
        &self,
        provider: &CancellableProvider<'_>,
        ctx: &GenerationContext,
    ) -> ValidationVerdict {
        let candidate = ctx.candidate.as_deref().unwrap_or_default();
        let local = validate_local(candidate, ctx.artifact_kind);
        if !local.accepted || !self.config.semantic_validation {
            return local;
        }
        SemanticValidator::new(provider, &self.config)
            .review(&ctx.request_text, ctx.artifact_kind, candidate)
            .await
    }
}

fn ensure_live(provider: &CancellableProvider<'_>, request_id: Uuid) -> Result<(), PipelineError> {
    if provider.is_cancelled() {
        tracing::info!(request_id = %request_id, "generation cancelled");
        return Err(PipelineError::Cancelled);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ALL: [Stage; 6] = [
        Stage::Planning,
        Stage::Generating,
        Stage::Validating,
        Stage::Refining,
        Stage::Accepted,
        Stage::AttemptsExhausted,
    ];

    #[test]
    fn terminal_stages() {
        assert!(Stage::Accepted.is_terminal());
        assert!(Stage::AttemptsExhausted.is_terminal());
        assert!(!Stage::Refining.is_terminal());
    }

    #[test]
    fn planning_always_proceeds_to_generation() {
        assert_eq!(Stage::Planning.allowed_transitions(), &[Stage::Generating]);
    }

    #[test]
    fn refine_loop_exit_maps_to_outcome() {
        assert_eq!(
            GenerationOutcome::from(LoopExit::RefinementFailed),
            GenerationOutcome::RefinementFailed
        );
    }

    proptest! {
        #[test]
        fn prop_no_stage_is_reentered_backwards(from in 0..ALL.len(), to in 0..ALL.len()) {
            let (from, to) = (ALL[from], ALL[to]);
            if from.allowed_transitions().contains(&to) {
                // Only the refine cycle returns to an earlier stage.
                let backwards = ALL.iter().position(|s| *s == to) < ALL.iter().position(|s| *s == from);
                prop_assert!(!backwards || (from == Stage::Refining && to == Stage::Validating));
            }
        }
    }
}
