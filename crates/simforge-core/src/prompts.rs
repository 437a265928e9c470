//! System prompts and user-message rendering for every agent
//!
//! Each prompt is the dialect's rules plus the capability surface: the
//! external symbols an artifact may reference without defining them.

use serde::{Deserialize, Serialize};
use simforge_artifact::{ArtifactKind, ENTRY_MARKER};

/// Reply the semantic validator expects for an acceptable candidate
pub const ACCEPTANCE_TOKEN: &str = "VALID";

/// Plan used when the planner yields nothing usable
pub const DEFAULT_PLAN_STEP: &str = "Generate the complete artifact directly";

/// External symbols each dialect may use without defining them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilitySurface {
    /// Globals available to component source
    pub component_symbols: Vec<String>,
    /// Command names available to command lists
    pub command_symbols: Vec<String>,
}

impl CapabilitySurface {
    /// Allowed symbols for a dialect
    #[must_use]
    pub fn symbols_for(&self, kind: ArtifactKind) -> &[String] {
        match kind {
            ArtifactKind::ComponentSource => &self.component_symbols,
            ArtifactKind::CommandList => &self.command_symbols,
        }
    }
}

impl Default for CapabilitySurface {
    fn default() -> Self {
        let owned = |names: &[&str]| -> Vec<String> { names.iter().map(|s| (*s).to_string()).collect() };
        Self {
            component_symbols: owned(&[
                "React",
                "useState",
                "useEffect",
                "useRef",
                "useMemo",
                "useCallback",
                "requestAnimationFrame",
                "cancelAnimationFrame",
                "Math",
            ]),
            command_symbols: owned(&[
                "Point", "Segment", "Line", "Circle", "Polygon", "Vector", "Slider", "Function",
                "Text", "SetColor", "SetVisibleInView",
            ]),
        }
    }
}

fn dialect_rules(kind: ArtifactKind) -> String {
    match kind {
        ArtifactKind::ComponentSource => format!(
            "The artifact is the source of one interactive UI component.\n\
             - Declare it exactly as `{ENTRY_MARKER}() {{ ... }}` and return its markup.\n\
             - Do not write import or require statements; allowed globals are already in scope.\n\
             - Do not fetch data or perform network requests.\n\
             - Define every identifier before it is used."
        ),
        ArtifactKind::CommandList => "The artifact is a JSON object of the form \
             {\"commands\": [\"...\"], \"settings\": {...}}.\n\
             - `commands` is an array of strings, executed in order.\n\
             - `settings` is optional.\n\
             - Define every object before a later command refers to it.\n\
             - Output JSON only, with no trailing commas."
            .to_string(),
    }
}

fn capability_section(kind: ArtifactKind, surface: &CapabilitySurface) -> String {
    let symbols = surface.symbols_for(kind);
    if symbols.is_empty() {
        return "No external symbols are available.".to_string();
    }
    format!("Allowed external symbols: {}.", symbols.join(", "))
}

/// Planner instruction
#[must_use]
pub fn planner_system(kind: ArtifactKind, surface: &CapabilitySurface) -> String {
    format!(
        "You plan interactive educational simulations.\n{}\n{}\n\
         Reply with a short numbered list of implementation steps (`1. ...`), one per line, and nothing else.",
        dialect_rules(kind),
        capability_section(kind, surface)
    )
}

/// Generator instruction
#[must_use]
pub fn generator_system(kind: ArtifactKind, surface: &CapabilitySurface) -> String {
    format!(
        "You write interactive educational simulations.\n{}\n{}\n\
         Reply with the complete artifact only.",
        dialect_rules(kind),
        capability_section(kind, surface)
    )
}

/// Refiner instruction
#[must_use]
pub fn refiner_system(kind: ArtifactKind, surface: &CapabilitySurface) -> String {
    format!(
        "You repair interactive educational simulations.\n{}\n{}\n\
         Preserve the artifact's functional intent and fix only the listed defects. \
         Reply with the complete corrected artifact only.",
        dialect_rules(kind),
        capability_section(kind, surface)
    )
}

/// Semantic validator rubric
#[must_use]
pub fn validator_system(kind: ArtifactKind, surface: &CapabilitySurface) -> String {
    format!(
        "You review interactive educational simulations before they run.\n{}\n{}\n\
         Check that the artifact uses only the allowed external symbols, performs no data fetching, \
         and defines every identifier before use.\n\
         If the artifact is acceptable reply with exactly `{ACCEPTANCE_TOKEN}`. \
         Otherwise reply with a numbered list of concrete defects, one per line.",
        dialect_rules(kind),
        capability_section(kind, surface)
    )
}

/// Generator user message: request plus the rendered plan
#[must_use]
pub fn generation_request(request_text: &str, plan: &[String]) -> String {
    if plan.is_empty() {
        return request_text.to_string();
    }
    format!("{request_text}\n\nImplementation plan:\n{}", render_plan(plan))
}

/// Refiner user message: candidate, defects, and the preserve-intent instruction
#[must_use]
pub fn refinement_request(request_text: &str, candidate: &str, defects: &[String]) -> String {
    format!(
        "Original request: {request_text}\n\nCurrent artifact:\n{candidate}\n\n\
         Defects to fix:\n{}\n\n\
         Keep everything else unchanged and return the full corrected artifact.",
        render_plan(defects)
    )
}

/// Semantic validator user message
#[must_use]
pub fn validation_request(request_text: &str, candidate: &str) -> String {
    format!("Request: {request_text}\n\nArtifact to review:\n{candidate}")
}

/// `1. step` lines
#[must_use]
pub fn render_plan(steps: &[String]) -> String {
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {step}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_prompt_names_entry_marker_and_symbols() {
        let prompt = generator_system(ArtifactKind::ComponentSource, &CapabilitySurface::default());
        assert!(prompt.contains("function Simulation() { ... }"));
        assert!(prompt.contains("useState"));
        assert!(!prompt.contains("Slider"));
    }

    #[test]
    fn empty_surface_is_stated() {
        let surface = CapabilitySurface {
            component_symbols: vec![],
            command_symbols: vec![],
        };
        assert!(validator_system(ArtifactKind::CommandList, &surface)
            .contains("No external symbols are available."));
    }

    #[test]
    fn plan_rendering() {
        let plan = vec!["Add state".to_string(), "Render".to_string()];
        assert_eq!(render_plan(&plan), "1. Add state\n2. Render");
        assert_eq!(generation_request("counter", &[]), "counter");
        assert!(generation_request("counter", &plan).ends_with("1. Add state\n2. Render"));
    }

    #[test]
    fn refinement_lists_defects() {
        let msg = refinement_request("counter", "function Simulation() {", &["missing '}'".into()]);
        assert!(msg.contains("Defects to fix:\n1. missing '}'"));
        assert!(msg.contains("Current artifact:\nfunction Simulation() {"));
    }
}
