use async_trait::async_trait;
use pretty_assertions::assert_eq;
use simforge_artifact::CommandList;
use simforge_core::prelude::*;
use simforge_core::prompts::DEFAULT_PLAN_STEP;
use simforge_core::MAX_ATTEMPTS;
use simforge_provider::{CompletionRequest, ProviderError, ProviderInfo};
use simforge_test_utils::fixtures::{
    fenced, BROKEN_COMPONENT, COUNTER_COMPONENT, COUNTER_PLAN, TRAILING_COMMA_COMMANDS, VALID,
};
use simforge_test_utils::ScriptedProvider;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn orchestrator(provider: &Arc<ScriptedProvider>, config: GenerationConfig) -> Orchestrator {
    Orchestrator::new(provider.clone(), config)
}

fn counter_request() -> GenerationRequest {
    GenerationRequest::new(
        "a button that increments a counter",
        ArtifactKind::ComponentSource,
    )
}

fn user_message(request: &CompletionRequest) -> String {
    request.last_user_content().unwrap_or_default().to_string()
}

#[tokio::test]
async fn counter_button_accepted_without_refinement() {
    let provider = Arc::new(ScriptedProvider::replying([
        COUNTER_PLAN.to_string(),
        fenced("jsx", COUNTER_COMPONENT),
        VALID.to_string(),
    ]));

    let result = orchestrator(&provider, GenerationConfig::default())
        .generate(counter_request())
        .await
        .unwrap();

    assert_eq!(result.artifact, COUNTER_COMPONENT);
    assert_eq!(result.attempts, 0);
    assert_eq!(result.outcome, GenerationOutcome::Accepted);
    assert_eq!(result.plan.len(), 3);
    assert!(result.defect_history.is_empty());

    let requests = provider.requests();
    assert_eq!(requests.len(), 3);
    assert!(user_message(&requests[1]).contains("1. Keep a count in state"));
    assert!(user_message(&requests[2]).contains(COUNTER_COMPONENT));
}

#[tokio::test]
async fn command_list_trailing_comma_is_repaired() {
    let provider = Arc::new(ScriptedProvider::replying([
        "1. Create a slider".to_string(),
        TRAILING_COMMA_COMMANDS.to_string(),
        VALID.to_string(),
    ]));

    let request = GenerationRequest::new("a slider from 0 to 5", ArtifactKind::CommandList);
    let result = orchestrator(&provider, GenerationConfig::default())
        .generate(request)
        .await
        .unwrap();

    assert_eq!(result.attempts, 0);
    assert_eq!(result.artifact, r#"{"commands": ["a = Slider(0,5,0.1)"]}"#);
    let parsed = CommandList::parse(&result.artifact).unwrap();
    assert_eq!(parsed.commands, vec!["a = Slider(0,5,0.1)".to_string()]);
}

#[tokio::test]
async fn planner_without_numbered_lines_uses_default_plan() {
    let provider = Arc::new(ScriptedProvider::replying([
        "I would just write it.".to_string(),
        COUNTER_COMPONENT.to_string(),
        VALID.to_string(),
    ]));

    let result = orchestrator(&provider, GenerationConfig::default())
        .generate(counter_request())
        .await
        .unwrap();

    assert_eq!(result.plan, vec![DEFAULT_PLAN_STEP.to_string()]);
    assert_eq!(result.outcome, GenerationOutcome::Accepted);
    assert!(user_message(&provider.requests()[1]).contains(DEFAULT_PLAN_STEP));
}

#[tokio::test]
async fn planner_error_does_not_abort() {
    let provider = Arc::new(ScriptedProvider::new([
        Err(ProviderError::Http("connection reset".into())),
        Ok(COUNTER_COMPONENT.to_string()),
        Ok(VALID.to_string()),
    ]));

    let result = orchestrator(&provider, GenerationConfig::default())
        .generate(counter_request())
        .await
        .unwrap();
    assert_eq!(result.plan, vec![DEFAULT_PLAN_STEP.to_string()]);
    assert_eq!(result.artifact, COUNTER_COMPONENT);
}

#[tokio::test]
async fn generator_failure_is_fatal() {
    let provider = Arc::new(ScriptedProvider::new([
        Ok(COUNTER_PLAN.to_string()),
        Err(ProviderError::upstream(500, "internal error")),
    ]));

    let err = orchestrator(&provider, GenerationConfig::default())
        .generate(counter_request())
        .await
        .unwrap_err();

    match err {
        PipelineError::Generation(agent) => {
            assert_eq!(agent.source, ProviderError::upstream(500, "internal error"));
        }
        other => panic!("expected generation error, got {other:?}"),
    }
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn local_rejections_exhaust_attempts_and_return_last_candidate() {
    let last = "function Simulation() {\n  return (<p>third</p>));\n}";
    let provider = Arc::new(ScriptedProvider::replying([
        COUNTER_PLAN.to_string(),
        BROKEN_COMPONENT.to_string(),
        BROKEN_COMPONENT.to_string(),
        BROKEN_COMPONENT.to_string(),
        last.to_string(),
    ]));

    let result = orchestrator(&provider, GenerationConfig::default())
        .generate(counter_request())
        .await
        .unwrap();

    assert_eq!(result.attempts, MAX_ATTEMPTS);
    assert_eq!(result.outcome, GenerationOutcome::AttemptsExhausted);
    assert_eq!(result.artifact, last);
    assert_eq!(result.defect_history.len(), 4);
    assert!(result.defect_history[0][0].starts_with("unmatched delimiter ')'"));
    // Locally invalid candidates never reach the semantic check.
    assert_eq!(provider.call_count(), 5);
    assert_eq!(provider.remaining(), 0);
}

#[tokio::test]
async fn semantic_rejections_are_bounded() {
    let provider = Arc::new(ScriptedProvider::replying([
        COUNTER_PLAN.to_string(),
        COUNTER_COMPONENT.to_string(),
        "1. uses fetch".to_string(),
        COUNTER_COMPONENT.to_string(),
        "1. count is undefined".to_string(),
        COUNTER_COMPONENT.to_string(),
        "1. still uses fetch".to_string(),
        COUNTER_COMPONENT.to_string(),
        "1. gave up".to_string(),
    ]));

    let result = orchestrator(&provider, GenerationConfig::default())
        .generate(counter_request())
        .await
        .unwrap();

    assert_eq!(result.attempts, 3);
    assert_eq!(result.outcome, GenerationOutcome::AttemptsExhausted);
    assert_eq!(result.artifact, COUNTER_COMPONENT);
    assert_eq!(
        result.defect_history.last().unwrap(),
        &vec!["gave up".to_string()]
    );
    assert_eq!(provider.remaining(), 0);

    let refine_request = &provider.requests()[3];
    assert!(user_message(refine_request).contains("1. uses fetch"));
}

#[tokio::test]
async fn bulleted_semantic_rejection_drives_refinement() {
    let provider = Arc::new(ScriptedProvider::replying([
        COUNTER_PLAN.to_string(),
        COUNTER_COMPONENT.to_string(),
        "INVALID\n- uses fetch()\n- `speed` is undefined".to_string(),
        COUNTER_COMPONENT.to_string(),
        VALID.to_string(),
    ]));

    let result = orchestrator(&provider, GenerationConfig::default())
        .generate(counter_request())
        .await
        .unwrap();

    assert_eq!(result.outcome, GenerationOutcome::Accepted);
    assert_eq!(result.attempts, 1);
    assert_eq!(
        result.defect_history,
        vec![vec!["uses fetch()".to_string(), "`speed` is undefined".to_string()]]
    );
    let refine_request = &provider.requests()[3];
    assert!(user_message(refine_request).contains("2. `speed` is undefined"));
}

#[tokio::test]
async fn reduced_budget_is_respected() {
    let provider = Arc::new(ScriptedProvider::replying([
        COUNTER_PLAN.to_string(),
        BROKEN_COMPONENT.to_string(),
        BROKEN_COMPONENT.to_string(),
    ]));

    let config = GenerationConfig::default().with_max_attempts(1);
    let result = orchestrator(&provider, config)
        .generate(counter_request())
        .await
        .unwrap();
    assert_eq!(result.attempts, 1);
    assert_eq!(result.outcome, GenerationOutcome::AttemptsExhausted);
}

#[tokio::test]
async fn refiner_failure_returns_last_candidate() {
    let provider = Arc::new(ScriptedProvider::new([
        Ok(COUNTER_PLAN.to_string()),
        Ok(BROKEN_COMPONENT.to_string()),
        Err(ProviderError::upstream(429, "rate limited")),
    ]));

    let result = orchestrator(&provider, GenerationConfig::default())
        .generate(counter_request())
        .await
        .unwrap();

    assert_eq!(result.outcome, GenerationOutcome::RefinementFailed);
    assert_eq!(result.attempts, 1);
    assert_eq!(result.artifact, BROKEN_COMPONENT);
}

#[tokio::test]
async fn semantic_error_fails_open() {
    let provider = Arc::new(ScriptedProvider::new([
        Ok(COUNTER_PLAN.to_string()),
        Ok(COUNTER_COMPONENT.to_string()),
        Err(ProviderError::Http("timeout".into())),
    ]));

    let result = orchestrator(&provider, GenerationConfig::default())
        .generate(counter_request())
        .await
        .unwrap();
    assert_eq!(result.outcome, GenerationOutcome::Accepted);
    assert_eq!(result.attempts, 0);
}

#[tokio::test]
async fn semantic_error_triggers_refinement_when_fail_closed() {
    let provider = Arc::new(ScriptedProvider::new([
        Ok(COUNTER_PLAN.to_string()),
        Ok(COUNTER_COMPONENT.to_string()),
        Err(ProviderError::Http("timeout".into())),
        Ok(COUNTER_COMPONENT.to_string()),
        Ok(VALID.to_string()),
    ]));

    let config = GenerationConfig::default().with_fail_open(false);
    let result = orchestrator(&provider, config)
        .generate(counter_request())
        .await
        .unwrap();
    assert_eq!(result.outcome, GenerationOutcome::Accepted);
    assert_eq!(result.attempts, 1);
    assert_eq!(result.defect_history.len(), 1);
}

#[tokio::test]
async fn semantic_validation_can_be_disabled() {
    let provider = Arc::new(ScriptedProvider::replying([
        COUNTER_PLAN.to_string(),
        COUNTER_COMPONENT.to_string(),
    ]));

    let config = GenerationConfig::default().with_semantic_validation(false);
    let result = orchestrator(&provider, config)
        .generate(counter_request())
        .await
        .unwrap();
    assert_eq!(result.outcome, GenerationOutcome::Accepted);
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn images_reach_only_the_generator() {
    let provider = Arc::new(
        ScriptedProvider::replying([
            COUNTER_PLAN.to_string(),
            COUNTER_COMPONENT.to_string(),
            VALID.to_string(),
        ])
        .with_vision(true),
    );

    let request =
        counter_request().with_images(vec![ImageAttachment::from_bytes("image/png", b"png")]);
    orchestrator(&provider, GenerationConfig::default())
        .generate(request)
        .await
        .unwrap();

    let with_images: Vec<bool> = provider.requests().iter().map(CompletionRequest::has_images).collect();
    assert_eq!(with_images, vec![false, true, false]);
}

#[tokio::test]
async fn cancelled_before_start_makes_no_calls() {
    let provider = Arc::new(ScriptedProvider::replying([COUNTER_PLAN.to_string()]));
    let token = CancellationToken::new();
    token.cancel();

    let err = orchestrator(&provider, GenerationConfig::default())
        .generate_with_cancel(counter_request(), token)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Cancelled));
    assert_eq!(provider.call_count(), 0);
}

/// Answers the planner, then cancels the request from inside the generator call
struct CancelDuringGeneration {
    token: CancellationToken,
    calls: AtomicUsize,
}

#[async_trait]
impl CompletionProvider for CancelDuringGeneration {
    async fn complete(&self, _request: CompletionRequest) -> Result<String, ProviderError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            return Ok(COUNTER_PLAN.to_string());
        }
        self.token.cancel();
        std::future::pending().await
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "cancelling".into(),
            model: "none".into(),
            supports_vision: false,
        }
    }
}

#[tokio::test]
async fn cancellation_drops_call_in_flight() {
    let token = CancellationToken::new();
    let provider = Arc::new(CancelDuringGeneration {
        token: token.clone(),
        calls: AtomicUsize::new(0),
    });

    let err = Orchestrator::new(provider.clone(), GenerationConfig::default())
        .generate_with_cancel(counter_request(), token)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Cancelled));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn orchestrator_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Orchestrator>();
}
