//! Local syntax validation
//!
//! Cheap, deterministic checks that run before any model is asked for an
//! opinion. Defects are data: a rejected verdict is a normal outcome, not an
//! error.

use crate::kind::{ArtifactKind, CommandList};
use crate::lexer::{is_import_line, CodeChars, Syntax};
use crate::verdict::ValidationVerdict;
use once_cell::sync::Lazy;
use regex::Regex;

static RETURN_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\breturn\b|\brender\s*\(").expect("return marker regex is valid")
});

/// Validate a candidate for its dialect
#[must_use]
pub fn validate_local(candidate: &str, kind: ArtifactKind) -> ValidationVerdict {
    match kind {
        ArtifactKind::ComponentSource => validate_component(candidate),
        ArtifactKind::CommandList => validate_command_list(candidate),
    }
}

/// Structural checks for component source
///
/// Delimiters and the return marker are matched outside literals and
/// comments. The first mismatched closer ends the delimiter scan with a
/// single defect; the import and return checks run regardless.
#[must_use]
pub fn validate_component(candidate: &str) -> ValidationVerdict {
    let mut defects = Vec::new();

    if let Some(defect) = delimiter_defect(candidate) {
        defects.push(defect);
    }
    defects.extend(import_defects(candidate));
    if !RETURN_MARKER.is_match(&code_text(candidate)) {
        defects.push("missing return statement or render( call".to_string());
    }

    ValidationVerdict::from_defects(defects)
}

/// Strict parse into a [`CommandList`]
#[must_use]
pub fn validate_command_list(candidate: &str) -> ValidationVerdict {
    match CommandList::parse(candidate) {
        Ok(_) => ValidationVerdict::accept(),
        Err(e) => ValidationVerdict::reject(vec![format!("invalid command list JSON: {e}")]),
    }
}

fn closer_for(open: char) -> Option<char> {
    match open {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        _ => None,
    }
}

fn delimiter_defect(candidate: &str) -> Option<String> {
    let mut expected: Vec<char> = Vec::new();
    for (pos, ch) in CodeChars::new(candidate, Syntax::SOURCE) {
        if let Some(close) = closer_for(ch) {
            expected.push(close);
        } else if matches!(ch, ')' | ']' | '}') && expected.pop() != Some(ch) {
            return Some(format!("unmatched delimiter '{ch}' at position {pos}"));
        }
    }

    if expected.is_empty() {
        return None;
    }
    let closers = expected
        .iter()
        .rev()
        .map(|c| format!("'{c}'"))
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!("unclosed delimiters, expected {closers}"))
}

/// Code characters only; each skipped literal or comment becomes one space
fn code_text(candidate: &str) -> String {
    let mut out = String::with_capacity(candidate.len());
    let mut next_expected = 0;
    for (pos, ch) in CodeChars::new(candidate, Syntax::SOURCE) {
        if pos != next_expected {
            out.push(' ');
        }
        out.push(ch);
        next_expected = pos + ch.len_utf8();
    }
    out
}

fn import_defects(candidate: &str) -> Vec<String> {
    let mut defects = Vec::new();
    let mut in_block_comment = false;

    for line in candidate.lines() {
        if in_block_comment {
            if line.contains("*/") {
                in_block_comment = false;
            }
            continue;
        }
        if is_import_line(line) {
            defects.push(format!("import statements are not allowed: `{}`", line.trim()));
        }
        if let Some(open) = line.find("/*") {
            in_block_comment = !line[open + 2..].contains("*/");
        }
    }
    defects
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const COUNTER: &str = "function Simulation() {\n  const [n, setN] = useState(0);\n  return <button onClick={() => setN(n + 1)}>{n}</button>;\n}";

    #[test]
    fn accepts_clean_component() {
        let verdict = validate_component(COUNTER);
        assert!(verdict.accepted, "{:?}", verdict.defects);
        assert!(verdict.defects.is_empty());
    }

    #[test]
    fn stray_closer_is_reported_once_at_its_offset() {
        let source = "function Simulation() {\n  return x);\n}";
        let verdict = validate_component(source);
        assert_eq!(
            verdict.defects,
            vec!["unmatched delimiter ')' at position 34".to_string()]
        );
        assert!(!verdict.accepted);
    }

    #[test]
    fn wrong_closer_stops_the_scan() {
        let verdict = validate_component("function Simulation() { return [1, 2}; }");
        assert_eq!(
            verdict.defects,
            vec!["unmatched delimiter '}' at position 36".to_string()]
        );
    }

    #[test]
    fn leftover_openers_listed_innermost_first() {
        let verdict = validate_component("function Simulation() { return f([1");
        assert_eq!(
            verdict.defects,
            vec!["unclosed delimiters, expected ']', ')', '}'".to_string()]
        );
    }

    #[test]
    fn delimiters_inside_literals_and_comments_are_ignored() {
        let source = r#"function Simulation() {
  // closing } in a comment
  /* and ) here */
  const s = "}" + '(' + `]`;
  return s;
}"#;
        assert!(validate_component(source).accepted);
    }

    #[test]
    fn trailing_unclosed_literal_is_not_a_defect() {
        let source = "function Simulation() { return <p>{count}</p>; }\n// done\nconst tip = `keep";
        let verdict = validate_component(source);
        assert!(verdict.accepted, "{:?}", verdict.defects);
    }

    #[test]
    fn return_in_comment_or_literal_does_not_count() {
        let missing = vec!["missing return statement or render( call".to_string()];
        let commented = "function Simulation() {\n  // return later\n  const s = \"return\";\n}";
        assert_eq!(validate_component(commented).defects, missing);
        assert_eq!(
            validate_component("function Simulation() { const r = 're'; /* turn */ }").defects,
            missing
        );
        assert!(validate_component("function Simulation() { return\"x\"; }").accepted);
    }

    #[test]
    fn apostrophe_in_markup_text() {
        let source = "function Simulation() {\n  return (<p>Newton's cradle</p>);\n}";
        assert!(validate_component(source).accepted);
    }

    #[test]
    fn import_lines_are_defects_unless_commented() {
        let source = "import React from 'react';\n/*\nimport x from 'y';\n*/\n// import z from 'z';\nfunction Simulation() { return 1; }";
        let verdict = validate_component(source);
        assert_eq!(
            verdict.defects,
            vec!["import statements are not allowed: `import React from 'react';`".to_string()]
        );
    }

    #[test]
    fn missing_return_marker() {
        let verdict = validate_component("function Simulation() { const a = 1; }");
        assert_eq!(
            verdict.defects,
            vec!["missing return statement or render( call".to_string()]
        );
        assert!(validate_component("render(<App />);").accepted);
        assert!(!validate_component("returned()").accepted);
    }

    #[test]
    fn command_list_parse_is_the_only_check() {
        assert!(validate_command_list(r#"{"commands": ["a = Slider(0,5,0.1)"]}"#).accepted);

        let verdict = validate_command_list(r#"{"commands": ["a",]}"#);
        assert!(!verdict.accepted);
        assert_eq!(verdict.defects.len(), 1);
        assert!(verdict.defects[0].starts_with("invalid command list JSON: "));
    }

    #[test]
    fn dispatch_by_kind() {
        assert!(validate_local(COUNTER, ArtifactKind::ComponentSource).accepted);
        assert!(!validate_local(COUNTER, ArtifactKind::CommandList).accepted);
    }
}
