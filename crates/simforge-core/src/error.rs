//! Error types for the generation pipeline
//!
//! Only two things end a request with an error: the Generator failing to
//! produce a first candidate, and the caller cancelling. Every other failure
//! degrades inside the pipeline and is visible only in the result.

use crate::agents::AgentRole;
use simforge_provider::ProviderError;
use std::path::PathBuf;

/// Failure of one agent's provider call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{role} call failed: {source}")]
pub struct AgentError {
    /// Agent that made the call
    pub role: AgentRole,
    /// Underlying provider failure
    #[source]
    pub source: ProviderError,
}

impl AgentError {
    /// Wrap a provider failure
    #[inline]
    #[must_use]
    pub fn new(role: AgentRole, source: ProviderError) -> Self {
        Self { role, source }
    }

    /// Whether the call was abandoned because the request was cancelled
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self.source, ProviderError::Cancelled)
    }
}

/// Fatal outcome of a generation request
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The Generator could not produce a first candidate
    #[error("generation failed: {0}")]
    Generation(#[source] AgentError),

    /// The caller cancelled the request
    #[error("generation cancelled")]
    Cancelled,

    /// Invalid configuration or provider setup
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl PipelineError {
    /// Whether the caller could reasonably resubmit the same request
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            PipelineError::Generation(e) => e.source.is_retryable(),
            PipelineError::Cancelled | PipelineError::Config(_) => false,
        }
    }

    /// Whether resubmitting unchanged would fail the same way
    ///
    /// Cancellation is neither retryable nor fatal: the caller chose it.
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, PipelineError::Cancelled) && !self.is_retryable()
    }

    /// Map an agent failure on the fatal path
    pub(crate) fn from_agent(err: AgentError) -> Self {
        if err.is_cancelled() {
            PipelineError::Cancelled
        } else {
            PipelineError::Generation(err)
        }
    }
}

/// Configuration loading and provider construction failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// File that was requested
        path: PathBuf,
        /// IO failure
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`crate::SimForgeConfig`]
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config could not be rendered as TOML
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Provider could not be built from the config
    #[error("provider setup failed: {0}")]
    Provider(#[from] ProviderError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_agent_error_maps_to_cancelled() {
        let err = AgentError::new(AgentRole::Generator, ProviderError::Cancelled);
        assert!(err.is_cancelled());
        assert!(matches!(PipelineError::from_agent(err), PipelineError::Cancelled));
    }

    #[test]
    fn generation_error_keeps_upstream_text() {
        let err = PipelineError::from_agent(AgentError::new(
            AgentRole::Generator,
            ProviderError::upstream(503, "overloaded"),
        ));
        assert_eq!(
            err.to_string(),
            "generation failed: generator call failed: upstream returned 503: overloaded"
        );
        assert!(err.is_retryable());
        assert!(!err.is_fatal());
    }

    #[test]
    fn cancellation_is_neither_retryable_nor_fatal() {
        assert!(!PipelineError::Cancelled.is_retryable());
        assert!(!PipelineError::Cancelled.is_fatal());
    }

    #[test]
    fn config_errors_are_not_retryable() {
        let err = PipelineError::from(ConfigError::Provider(ProviderError::MissingApiKey {
            provider: "openai".into(),
        }));
        assert!(!err.is_retryable());
        assert!(err.is_fatal());
    }
}
