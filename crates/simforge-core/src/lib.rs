//! SimForge Core - the generation pipeline
//!
//! Turns a natural-language request into a validated simulation artifact:
//! - Plans implementation steps (advisory, never fatal)
//! - Generates a first candidate
//! - Validates it locally, then semantically
//! - Refines rejected candidates up to [`MAX_ATTEMPTS`] times
//!
//! # Example
//!
//! ```rust,ignore
//! use simforge_core::prelude::*;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SimForgeConfig::load("simforge.toml")?;
//! let orchestrator = Orchestrator::from_config(&config)?;
//!
//! let request = GenerationRequest::new("a button that increments a counter", ArtifactKind::ComponentSource);
//! let result = orchestrator.generate(request).await?;
//!
//! println!("{} after {} refinements", result.artifact, result.attempts);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

pub mod agents;
pub mod config;
pub mod context;
pub mod error;
pub mod orchestrator;
pub mod prompts;

pub use agents::AgentRole;
pub use config::{GenerationConfig, SimForgeConfig, MAX_ATTEMPTS};
pub use context::{GenerationContext, GenerationOutcome, GenerationRequest, GenerationResult};
pub use error::{AgentError, ConfigError, PipelineError};
pub use orchestrator::{Orchestrator, Stage};
pub use prompts::CapabilitySurface;

pub use simforge_artifact::{ArtifactKind, ValidationVerdict};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running generations
    pub use crate::{
        ArtifactKind, GenerationConfig, GenerationOutcome, GenerationRequest, GenerationResult,
        Orchestrator, PipelineError, SimForgeConfig,
    };
    pub use simforge_provider::{CompletionProvider, ImageAttachment, ProviderConfig, ProviderKind};
    pub use tokio_util::sync::CancellationToken;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
