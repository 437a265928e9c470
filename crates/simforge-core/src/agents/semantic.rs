//! Semantic validator agent

use super::{call, options, AgentRole};
use crate::config::GenerationConfig;
use crate::prompts::{self, ACCEPTANCE_TOKEN};
use simforge_artifact::{bulleted_items, numbered_items, ArtifactKind, ValidationVerdict};
use simforge_provider::{CompletionProvider, CompletionRequest};

/// AI review of a candidate that already passed local validation
pub struct SemanticValidator<'a> {
    provider: &'a dyn CompletionProvider,
    config: &'a GenerationConfig,
}

impl<'a> SemanticValidator<'a> {
    /// Create validator
    #[inline]
    #[must_use]
    pub fn new(provider: &'a dyn CompletionProvider, config: &'a GenerationConfig) -> Self {
        Self { provider, config }
    }

    /// Review a candidate
    ///
    /// An inconclusive reply is accepted. A provider error is accepted when
    /// `fail_open` is set and becomes a single defect otherwise.
    pub async fn review(
        &self,
        request_text: &str,
        kind: ArtifactKind,
        candidate: &str,
    ) -> ValidationVerdict {
        let request = CompletionRequest::new(
            prompts::validator_system(kind, &self.config.capabilities),
            prompts::validation_request(request_text, candidate),
            options(self.config, self.config.validator_temperature),
        );

        match call(self.provider, AgentRole::SemanticValidator, request).await {
            Ok(reply) => parse_review(&reply).unwrap_or_else(|| {
                tracing::warn!("semantic review inconclusive; accepting");
                ValidationVerdict::accept()
            }),
            Err(e) if self.config.fail_open => {
                tracing::warn!(error = %e, "semantic validation failed; accepting (fail-open)");
                ValidationVerdict::accept()
            }
            Err(e) => {
                tracing::warn!(error = %e, "semantic validation failed; rejecting");
                ValidationVerdict::reject(vec![format!("semantic validation unavailable: {}", e.source)])
            }
        }
    }
}

/// First-word verdicts that reject even without a parseable defect list
const REJECTION_TOKENS: &[&str] = &["INVALID", "REJECT", "REJECTED", "FAIL", "FAILED"];

const NO_DETAILS_DEFECT: &str = "semantic review rejected the artifact without listing defects";

fn strip_emphasis(text: &str) -> &str {
    text.trim_matches(|c: char| matches!(c, '`' | '*' | '.' | ':' | '"' | '\''))
}

/// Interpret a review reply
///
/// The acceptance token on the first non-empty line accepts. Otherwise
/// numbered or bulleted lines are defects. A rejection word leading the
/// reply rejects even without a list, using whatever text follows it.
/// `None` means no verdict could be read.
#[must_use]
pub fn parse_review(reply: &str) -> Option<ValidationVerdict> {
    let first_line = reply.lines().map(str::trim).find(|l| !l.is_empty())?;
    if strip_emphasis(first_line).eq_ignore_ascii_case(ACCEPTANCE_TOKEN) {
        return Some(ValidationVerdict::accept());
    }

    let mut defects = numbered_items(reply);
    if defects.is_empty() {
        defects = bulleted_items(reply);
    }
    if !defects.is_empty() {
        return Some(ValidationVerdict::reject(defects));
    }

    let word_end = first_line
        .find(|c: char| c.is_whitespace() || matches!(c, ':' | ',' | '-'))
        .unwrap_or(first_line.len());
    let word = strip_emphasis(&first_line[..word_end]);
    if !REJECTION_TOKENS.iter().any(|t| word.eq_ignore_ascii_case(t)) {
        return None;
    }

    let details = std::iter::once(&first_line[word_end..])
        .chain(reply.lines().map(str::trim).skip_while(|l| l.is_empty()).skip(1))
        .map(|l| strip_emphasis(l.trim_start_matches([':', ',', '-', ' '])).trim())
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>();
    Some(if details.is_empty() {
        ValidationVerdict::reject(vec![NO_DETAILS_DEFECT.to_string()])
    } else {
        ValidationVerdict::reject(details)
    })
}
