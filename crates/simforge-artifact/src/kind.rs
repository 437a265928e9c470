//! Output dialects

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

/// Function-declaration token every component artifact must define
///
/// Both the extractor (start/end boundary) and the prompts rely on it.
pub const ENTRY_MARKER: &str = "function Simulation";

/// Key that identifies a command-list JSON object
pub const COMMANDS_KEY: &str = "commands";

/// Target dialect of a generation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Executable UI-component source text
    ComponentSource,
    /// JSON object with a `commands` array and optional `settings`
    CommandList,
}

impl ArtifactKind {
    /// Short identifier
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ArtifactKind::ComponentSource => "component_source",
            ArtifactKind::CommandList => "command_list",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Unrecognised dialect name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown artifact kind: '{0}' (expected 'component' or 'commands')")]
pub struct UnknownArtifactKind(pub String);

impl FromStr for ArtifactKind {
    type Err = UnknownArtifactKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "component" | "component_source" | "component-source" | "jsx" => {
                Ok(ArtifactKind::ComponentSource)
            }
            "commands" | "command_list" | "command-list" => Ok(ArtifactKind::CommandList),
            other => Err(UnknownArtifactKind(other.to_string())),
        }
    }
}

/// Parsed command-list artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandList {
    /// Instructions, executed in order
    pub commands: Vec<String>,
    /// Optional viewer settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Map<String, Value>>,
}

impl CommandList {
    /// Strict parse of a candidate
    ///
    /// # Errors
    /// Returns the `serde_json` error for malformed JSON or a wrong shape.
    pub fn parse(candidate: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(candidate)
    }
}
