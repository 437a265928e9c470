//! Cancellation at the provider-call boundary

use crate::error::ProviderError;
use crate::provider::CompletionProvider;
use crate::types::{CompletionRequest, ProviderInfo};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Races each call of an inner provider against a cancellation token
///
/// Once the token fires the in-flight call is dropped and every subsequent
/// call returns [`ProviderError::Cancelled`] without touching the network.
pub struct CancellableProvider<'a> {
    inner: &'a dyn CompletionProvider,
    token: CancellationToken,
}

impl<'a> CancellableProvider<'a> {
    /// Wrap a provider
    #[inline]
    #[must_use]
    pub fn new(inner: &'a dyn CompletionProvider, token: CancellationToken) -> Self {
        Self { inner, token }
    }

    /// Whether the token has fired
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[async_trait]
impl CompletionProvider for CancellableProvider<'_> {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        if self.token.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }
        tokio::select! {
            biased;
            () = self.token.cancelled() => Err(ProviderError::Cancelled),
            result = self.inner.complete(request) => result,
        }
    }

    fn info(&self) -> ProviderInfo {
        self.inner.info()
    }

    fn supports_vision(&self, model: Option<&str>) -> bool {
        self.inner.supports_vision(model)
    }
}
