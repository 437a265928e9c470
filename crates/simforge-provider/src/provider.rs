//! The completion trait every backend implements

use crate::error::ProviderError;
use crate::types::{CompletionRequest, ProviderInfo};
use async_trait::async_trait;
use std::sync::Arc;

/// Uniform call surface over text-generation backends
///
/// Implementations perform exactly one network call per `complete` and never
/// retry; retry policy belongs to the caller.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Run one completion and return the generated text
    ///
    /// # Errors
    /// Returns [`ProviderError`] on transport, auth, quota, or shape failures,
    /// and [`ProviderError::EmptyCompletion`] instead of an empty string.
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError>;

    /// Static provider description
    fn info(&self) -> ProviderInfo;

    /// Whether image payloads reach the model actually called
    ///
    /// `model` is the per-request override; `None` means the configured
    /// model described by [`CompletionProvider::info`].
    fn supports_vision(&self, model: Option<&str>) -> bool {
        let _ = model;
        self.info().supports_vision
    }
}

#[async_trait]
impl CompletionProvider for Arc<dyn CompletionProvider> {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        (**self).complete(request).await
    }

    fn info(&self) -> ProviderInfo {
        (**self).info()
    }

    fn supports_vision(&self, model: Option<&str>) -> bool {
        (**self).supports_vision(model)
    }
}

/// Reject blank completions
pub(crate) fn non_empty(text: String) -> Result<String, ProviderError> {
    if text.trim().is_empty() {
        Err(ProviderError::EmptyCompletion)
    } else {
        Ok(text)
    }
}

/// Read a failed response into an `Upstream` error, keeping the raw body
pub(crate) async fn upstream_error(response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    ProviderError::upstream(status, body)
}
