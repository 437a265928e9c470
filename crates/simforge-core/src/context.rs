//! Per-request generation state and the value returned to callers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use simforge_artifact::ArtifactKind;
use simforge_provider::ImageAttachment;
use std::time::Instant;
use uuid::Uuid;

/// What the caller asks for
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Natural-language prompt
    pub text: String,
    /// Output dialect
    pub kind: ArtifactKind,
    /// Reference images for vision-capable providers
    pub images: Vec<ImageAttachment>,
}

impl GenerationRequest {
    /// Request without images
    #[inline]
    #[must_use]
    pub fn new(text: impl Into<String>, kind: ArtifactKind) -> Self {
        Self {
            text: text.into(),
            kind,
            images: Vec::new(),
        }
    }

    /// With image attachments
    #[inline]
    #[must_use]
    pub fn with_images(mut self, images: Vec<ImageAttachment>) -> Self {
        self.images = images;
        self
    }
}

/// Mutable state of one request, owned by the orchestrator for its lifetime
#[derive(Debug, Clone)]
pub struct GenerationContext {
    /// Correlates log lines of one request
    pub request_id: Uuid,
    /// Original prompt
    pub request_text: String,
    /// Output dialect
    pub artifact_kind: ArtifactKind,
    /// Steps from the planner
    pub plan: Vec<String>,
    /// Current normalized candidate
    pub candidate: Option<String>,
    /// Defects of the current candidate, pending a refine call
    pub defects: Vec<String>,
    /// Refine cycles started
    pub attempt_count: u32,
    /// Defects of every rejected verdict, oldest first
    pub defect_history: Vec<Vec<String>>,
    /// Wall-clock start
    pub started_at: DateTime<Utc>,
    started: Instant,
}

impl GenerationContext {
    /// Fresh context for a request
    #[must_use]
    pub fn new(request_text: impl Into<String>, artifact_kind: ArtifactKind) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            request_text: request_text.into(),
            artifact_kind,
            plan: Vec::new(),
            candidate: None,
            defects: Vec::new(),
            attempt_count: 0,
            defect_history: Vec::new(),
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    /// Replace the candidate; pending defects no longer apply
    pub fn set_candidate(&mut self, candidate: String) {
        self.candidate = Some(candidate);
        self.defects.clear();
    }

    /// Store the defects of a rejected verdict
    pub fn record_rejection(&mut self, defects: Vec<String>) {
        self.defect_history.push(defects.clone());
        self.defects = defects;
    }

    /// Milliseconds since the request started
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Freeze into the caller-facing result
    #[must_use]
    pub fn into_result(self, outcome: GenerationOutcome) -> GenerationResult {
        let duration_ms = self.elapsed_ms();
        GenerationResult {
            request_id: self.request_id,
            artifact: self.candidate.unwrap_or_default(),
            artifact_kind: self.artifact_kind,
            plan: self.plan,
            attempts: self.attempt_count,
            duration_ms,
            outcome,
            defect_history: self.defect_history,
            started_at: self.started_at,
        }
    }
}

/// How the refine loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationOutcome {
    /// The final candidate passed validation
    Accepted,
    /// The refine budget ran out; the candidate is best effort
    AttemptsExhausted,
    /// The refiner failed; the candidate is the last one produced
    RefinementFailed,
}

impl GenerationOutcome {
    /// Whether the artifact passed every enabled check
    #[inline]
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, GenerationOutcome::Accepted)
    }
}

/// Final artifact plus audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Request correlation id
    pub request_id: Uuid,
    /// Normalized artifact text
    pub artifact: String,
    /// Dialect of `artifact`
    pub artifact_kind: ArtifactKind,
    /// Planner steps
    pub plan: Vec<String>,
    /// Refine cycles performed
    pub attempts: u32,
    /// Total wall-clock time
    pub duration_ms: u64,
    /// How the loop ended
    pub outcome: GenerationOutcome,
    /// Defects of every rejected verdict, oldest first
    pub defect_history: Vec<Vec<String>>,
    /// Wall-clock start
    pub started_at: DateTime<Utc>,
}
