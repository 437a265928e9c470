//! Pipeline configuration
//!
//! [`GenerationConfig`] tunes the loop itself; [`SimForgeConfig`] adds the
//! provider settings and is what a TOML config file deserializes into.

use crate::error::ConfigError;
use crate::prompts::CapabilitySurface;
use serde::{Deserialize, Serialize};
use simforge_provider::ProviderConfig;
use std::path::Path;

/// Hard ceiling on refine cycles per request
pub const MAX_ATTEMPTS: u32 = 3;

/// Loop and sampling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Planner sampling temperature
    pub planner_temperature: f32,
    /// Generator sampling temperature
    pub generator_temperature: f32,
    /// Refiner sampling temperature; lower than the generator's
    pub refiner_temperature: f32,
    /// Semantic validator sampling temperature
    pub validator_temperature: f32,
    /// Refine cycles allowed; never more than [`MAX_ATTEMPTS`]
    pub max_attempts: u32,
    /// Run the AI check after local validation passes
    pub semantic_validation: bool,
    /// Accept when the semantic check itself fails
    pub fail_open: bool,
    /// Model override for every agent call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Symbols the prompts allow per dialect
    pub capabilities: CapabilitySurface,
}

impl GenerationConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With refine budget, clamped to [`MAX_ATTEMPTS`]
    #[inline]
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.min(MAX_ATTEMPTS);
        self
    }

    /// With semantic validation on or off
    #[inline]
    #[must_use]
    pub fn with_semantic_validation(mut self, enabled: bool) -> Self {
        self.semantic_validation = enabled;
        self
    }

    /// With fail-open policy for semantic validation errors
    #[inline]
    #[must_use]
    pub fn with_fail_open(mut self, fail_open: bool) -> Self {
        self.fail_open = fail_open;
        self
    }

    /// With model override
    #[inline]
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// With capability surface
    #[inline]
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: CapabilitySurface) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Refine budget actually enforced
    ///
    /// Deserialized configs can carry any value, so the ceiling is applied
    /// again here.
    #[inline]
    #[must_use]
    pub fn effective_max_attempts(&self) -> u32 {
        self.max_attempts.min(MAX_ATTEMPTS)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            planner_temperature: 0.3,
            generator_temperature: 0.7,
            refiner_temperature: 0.2,
            validator_temperature: 0.0,
            max_attempts: MAX_ATTEMPTS,
            semantic_validation: true,
            fail_open: true,
            model: None,
            capabilities: CapabilitySurface::default(),
        }
    }
}

/// Top-level config file
///
/// ```toml
/// [provider]
/// provider = "anthropic"
/// model = "claude-3-5-sonnet-latest"
/// api_key_env = "ANTHROPIC_API_KEY"
///
/// [generation]
/// max_attempts = 2
/// fail_open = false
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimForgeConfig {
    /// Completion backend
    pub provider: ProviderConfig,
    /// Loop settings
    pub generation: GenerationConfig,
}

impl SimForgeConfig {
    /// Parse TOML text
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] when the file cannot be read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), provider = %config.provider.provider, "loaded config");
        Ok(config)
    }

    /// Render as TOML
    ///
    /// # Errors
    /// Returns [`ConfigError::Serialize`] if a value has no TOML form.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
