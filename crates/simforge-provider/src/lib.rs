//! SimForge Completion Providers
//!
//! One narrow `complete(...)` interface over interchangeable text-generation
//! backends:
//! - [`OpenAiProvider`]: OpenAI-compatible chat completions (API key)
//! - [`AnthropicProvider`]: Anthropic messages API (API key)
//! - [`OllamaProvider`]: local Ollama server (no key)
//!
//! Providers never retry; a failed call surfaces a [`ProviderError`] carrying
//! the raw upstream message. Latency is bounded by the caller-supplied
//! timeout in [`ProviderConfig`], and [`CancellableProvider`] propagates a
//! cancellation signal to the call in flight.
//!
//! # Example
//!
//! ```rust,ignore
//! use simforge_provider::{create_provider, CompletionOptions, CompletionRequest, ProviderConfig, ProviderKind};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = create_provider(&ProviderConfig::new(ProviderKind::Ollama))?;
//! let request = CompletionRequest::new("You are terse.", "Say hi", CompletionOptions::default());
//! let text = provider.complete(request).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod anthropic;
mod cancel;
mod config;
mod error;
mod factory;
mod ollama;
mod openai;
mod provider;
mod types;

pub use anthropic::AnthropicProvider;
pub use cancel::CancellableProvider;
pub use config::{ProviderConfig, ProviderKind};
pub use error::ProviderError;
pub use factory::{create_provider, create_provider_by_name};
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
pub use provider::CompletionProvider;
pub use types::{
    ChatMessage, CompletionOptions, CompletionRequest, ImageAttachment, ProviderInfo, Role,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
