//! Artifact extraction and normalization
//!
//! Turns free-form model output (markdown fences, commentary, partial JSON)
//! into a clean candidate for one dialect. Every function here is pure and
//! total: absence of the expected markers falls back to the trimmed input,
//! and correctness is left to the validators.

use crate::kind::{ArtifactKind, COMMANDS_KEY, ENTRY_MARKER};
use crate::lexer::{is_fence_line, is_import_line, matching_close, CodeChars, Syntax};
use once_cell::sync::Lazy;
use regex::Regex;

/// Leading text shorter than this is never treated as prose
pub const MIN_PROSE_LEN: usize = 20;

/// Trailing text at least this long after the component body is discarded
pub const MIN_TRAILING_LEN: usize = 20;

const SENTENCE_PUNCTUATION: &[char] = &['.', '!', '?', ':'];
const CODE_CHARS: &[char] = &[';', '{', '}', '=', '<', '>'];
const CODE_WORDS: &[&str] = &["const ", "let ", "var ", "function ", "return ", "//", "/*"];

static COMMANDS_KEY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r#""{COMMANDS_KEY}"\s*:"#)).expect("commands regex is valid")
});

static NUMBERED_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:\d+[.)]|\(\d+\))\s+(.+?)\s*$").expect("numbered item regex is valid")
});

static BULLET_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*[-*\u{2022}]\s+(.+?)\s*$").expect("bullet item regex is valid")
});

/// Normalize raw model output for the target dialect
#[must_use]
pub fn extract(raw: &str, kind: ArtifactKind) -> String {
    match kind {
        ArtifactKind::ComponentSource => extract_component(raw),
        ArtifactKind::CommandList => extract_command_list(raw),
    }
}

/// Normalize component source text
#[must_use]
pub fn extract_component(raw: &str) -> String {
    let fenced = select_fenced_block(raw, ENTRY_MARKER);
    let body = fenced.as_deref().unwrap_or(raw);
    let cleaned = strip_noise_lines(body);
    let text = cleaned.trim();

    let Some(marker) = text.find(ENTRY_MARKER) else {
        return text.to_string();
    };

    let line_start = text[..marker].rfind('\n').map_or(0, |i| i + 1);
    let start = if looks_like_prose(&text[..line_start]) {
        line_start
    } else {
        0
    };

    let end = match component_body_end(text, marker) {
        Some(close) if text[close + 1..].trim().chars().count() >= MIN_TRAILING_LEN => close + 1,
        _ => text.len(),
    };

    text[start..end].trim().to_string()
}

/// Normalize command-list JSON
#[must_use]
pub fn extract_command_list(raw: &str) -> String {
    let fenced = select_fenced_block(raw, &format!("\"{COMMANDS_KEY}\""));
    let body = strip_fence_lines(fenced.as_deref().unwrap_or(raw));
    let text = body.trim();

    let Some(key) = COMMANDS_KEY_PATTERN.find(text) else {
        return text.to_string();
    };
    let Some(start) = enclosing_object_start(text, key.start()) else {
        return text.to_string();
    };
    let matched = match matching_close(text, start, '{', '}', Syntax::JSON) {
        Some(close) => &text[start..=close],
        None => &text[start..],
    };

    if serde_json::from_str::<serde_json::Value>(matched).is_ok() {
        return matched.to_string();
    }
    let repaired = remove_trailing_commas(matched);
    if serde_json::from_str::<serde_json::Value>(&repaired).is_ok() {
        repaired
    } else {
        matched.to_string()
    }
}

/// Items of a numbered list (`1. foo`, `2) bar`, `(3) baz`), in order
#[must_use]
pub fn numbered_items(text: &str) -> Vec<String> {
    NUMBERED_ITEM
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Items of a bulleted list (`- foo`, `* bar`, `\u{2022} baz`), in order
#[must_use]
pub fn bulleted_items(text: &str) -> Vec<String> {
    BULLET_ITEM
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Remove commas that directly precede `}` or `]`, outside string literals
#[must_use]
pub fn remove_trailing_commas(json: &str) -> String {
    let chars: Vec<char> = json.chars().collect();
    let mut out = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &ch) in chars.iter().enumerate() {
        if in_string {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        if ch == '"' {
            in_string = true;
        } else if ch == ',' {
            let next = chars[i + 1..].iter().copied().find(|c| !c.is_whitespace());
            if matches!(next, Some('}' | ']')) {
                continue;
            }
        }
        out.push(ch);
    }
    out
}

/// Content of the first fenced block, preferring one that contains `prefer`
///
/// An unclosed fence runs to the end of the input.
fn select_fenced_block(text: &str, prefer: &str) -> Option<String> {
    let mut blocks: Vec<String> = Vec::new();
    let mut current: Option<Vec<&str>> = None;

    for line in text.lines() {
        if is_fence_line(line) {
            match current.take() {
                Some(lines) => blocks.push(lines.join("\n")),
                None => current = Some(Vec::new()),
            }
        } else if let Some(lines) = current.as_mut() {
            lines.push(line);
        }
    }
    if let Some(lines) = current {
        blocks.push(lines.join("\n"));
    }

    match blocks.iter().position(|b| b.contains(prefer)) {
        Some(i) => Some(blocks.swap_remove(i)),
        // The artifact sits outside the fences; let line stripping handle them.
        None if text.contains(prefer) => None,
        None => blocks.into_iter().next(),
    }
}

/// Drop stray fence markers and bare import lines
fn strip_noise_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !is_fence_line(line) && !is_import_line(line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_fence_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !is_fence_line(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Narrative text: sentence punctuation, long enough, nothing code-like
fn looks_like_prose(text: &str) -> bool {
    let text = text.trim();
    text.chars().count() >= MIN_PROSE_LEN
        && text.contains(SENTENCE_PUNCTUATION)
        && !text.contains(CODE_CHARS)
        && !CODE_WORDS.iter().any(|w| text.contains(w))
}

/// Byte offset of the `}` closing the entry function's body
///
/// Skips the parameter list first so destructured props do not end the scan.
fn component_body_end(text: &str, marker: usize) -> Option<usize> {
    let after_marker = marker + ENTRY_MARKER.len();
    let body_search_from = CodeChars::new(&text[after_marker..], Syntax::SOURCE)
        .find(|&(_, ch)| ch == '(' || ch == '{')
        .and_then(|(idx, ch)| {
            let at = after_marker + idx;
            if ch == '(' {
                matching_close(text, at, '(', ')', Syntax::SOURCE).map(|close| close + 1)
            } else {
                Some(at)
            }
        })?;
    matching_close(text, body_search_from, '{', '}', Syntax::SOURCE)
}

/// Start of the innermost object still open at `key_pos`
fn enclosing_object_start(text: &str, key_pos: usize) -> Option<usize> {
    let mut open: Vec<usize> = Vec::new();
    for (idx, ch) in CodeChars::new(&text[..key_pos], Syntax::JSON) {
        match ch {
            '{' => open.push(idx),
            '}' => {
                open.pop();
            }
            _ => {}
        }
    }
    open.pop()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const COUNTER: &str = "function Simulation() {\n  const [n, setN] = useState(0);\n  return <button onClick={() => setN(n + 1)}>{n}</button>;\n}";

    #[test]
    fn strips_fences_and_commentary() {
        let raw = format!(
            "Sure! Here is the component you asked for.\n\n```jsx\n{COUNTER}\n```\n\nLet me know if you want changes."
        );
        assert_eq!(extract_component(&raw), COUNTER);
    }

    #[test]
    fn prefers_fence_with_entry_marker() {
        let raw = format!("```bash\nnpm install\n```\n\n```tsx\n{COUNTER}\n```");
        assert_eq!(extract_component(&raw), COUNTER);
    }

    #[test]
    fn unclosed_fence_runs_to_end() {
        let raw = format!("```jsx\n{COUNTER}");
        assert_eq!(extract_component(&raw), COUNTER);
    }

    #[test]
    fn stray_fence_after_unfenced_code() {
        let raw = format!("{COUNTER}\n```\nHappy to adjust the styling if needed.");
        assert_eq!(extract_component(&raw), COUNTER);
    }

    #[test]
    fn drops_narrative_leading_text_without_fences() {
        let raw = format!("Here is a counter simulation for your class.\n{COUNTER}");
        assert_eq!(extract_component(&raw), COUNTER);
    }

    #[test]
    fn keeps_leading_code() {
        let raw = format!("const STEP = 1;\n\n{COUNTER}");
        assert_eq!(extract_component(&raw), format!("const STEP = 1;\n\n{COUNTER}"));
    }

    #[test]
    fn keeps_short_leading_text() {
        let raw = format!("Code:\n{COUNTER}");
        assert_eq!(extract_component(&raw), format!("Code:\n{COUNTER}"));
    }

    #[test]
    fn drops_long_trailing_text() {
        let raw = format!("{COUNTER}\n\nThis component keeps a count in local state and re-renders.");
        assert_eq!(extract_component(&raw), COUNTER);
    }

    #[test]
    fn keeps_short_trailing_text() {
        let raw = format!("{COUNTER}\n// end");
        assert_eq!(extract_component(&raw), format!("{COUNTER}\n// end"));
    }

    #[test]
    fn brace_in_string_does_not_end_body() {
        let source = "function Simulation() {\n  const label = \"}\";\n  const other = 'it\\'s }';\n  return <p>{label}{other}</p>;\n}";
        let raw = format!("{source}\nThat is the whole thing, enjoy using it today.");
        assert_eq!(extract_component(&raw), source);
    }

    #[test]
    fn destructured_props_do_not_end_body() {
        let source = "function Simulation({ speed = 1 }) {\n  return <div>{speed}</div>;\n}";
        let raw = format!("{source}\n\nAdjust the speed prop to change the animation rate.");
        assert_eq!(extract_component(&raw), source);
    }

    #[test]
    fn strips_import_lines() {
        let raw = format!("import React, {{ useState }} from 'react';\n\n{COUNTER}");
        assert_eq!(extract_component(&raw), COUNTER);
    }

    #[test]
    fn passthrough_without_marker() {
        assert_eq!(extract_component("  just some text  "), "just some text");
        assert_eq!(extract_component(""), "");
    }

    #[test]
    fn component_extraction_is_idempotent_on_clean_input() {
        let once = extract_component(COUNTER);
        assert_eq!(once, COUNTER);
        assert_eq!(extract_component(&once), once);
    }

    #[test]
    fn command_list_from_fenced_json() {
        let raw = "Here you go:\n```json\n{\"commands\": [\"A = (0, 0)\"]}\n```";
        assert_eq!(extract_command_list(raw), "{\"commands\": [\"A = (0, 0)\"]}");
    }

    #[test]
    fn command_list_repairs_trailing_comma() {
        let raw = r#"{"commands": ["a = Slider(0,5,0.1)",]}"#;
        let out = extract_command_list(raw);
        assert_eq!(out, r#"{"commands": ["a = Slider(0,5,0.1)"]}"#);
        assert!(serde_json::from_str::<serde_json::Value>(&out).is_ok());
    }

    #[test]
    fn command_list_nested_inside_wrapper() {
        let raw = r#"{"result": {"commands": ["x = 1"], "settings": {"grid": true}}, "note": "ok"}"#;
        assert_eq!(
            extract_command_list(raw),
            r#"{"commands": ["x = 1"], "settings": {"grid": true}}"#
        );
    }

    #[test]
    fn command_list_settings_before_commands() {
        let raw = r#"Output: {"settings": {"axes": true}, "commands": ["y = 2"]} done"#;
        assert_eq!(
            extract_command_list(raw),
            r#"{"settings": {"axes": true}, "commands": ["y = 2"]}"#
        );
    }

    #[test]
    fn command_list_unrepairable_returns_raw_match() {
        let raw = r#"{"commands": ["a = 1" "b = 2"]}"#;
        assert_eq!(extract_command_list(raw), raw);
    }

    #[test]
    fn command_list_without_key_passes_through() {
        assert_eq!(extract_command_list("  no json here "), "no json here");
    }

    #[test]
    fn command_list_drops_fence_inside_unclosed_object() {
        let raw = "```json\n{\n```json\n\"commands\": ";
        let once = extract_command_list(raw);
        assert_eq!(once, "{\n\"commands\":");
        assert_eq!(extract_command_list(&once), once);
    }

    #[test]
    fn trailing_comma_inside_string_is_kept() {
        assert_eq!(remove_trailing_commas(r#"{"a": ",]", }"#), r#"{"a": ",]" }"#);
    }

    #[test]
    fn numbered_items_parsing() {
        let text = "Plan:\n1. Add state\n2) Render button\n (3) Wire click handler\n- not numbered\n";
        assert_eq!(
            numbered_items(text),
            vec!["Add state", "Render button", "Wire click handler"]
        );
    }

    #[test]
    fn bulleted_items_parsing() {
        let text = "INVALID\n- uses fetch()\n  * `speed` is undefined\n**bold** is not a bullet\n1. numbered";
        assert_eq!(bulleted_items(text), vec!["uses fetch()", "`speed` is undefined"]);
    }

    #[test]
    fn extract_dispatches_by_kind() {
        let json = r#"{"commands": []}"#;
        assert_eq!(extract(json, ArtifactKind::CommandList), json);
        assert_eq!(extract(COUNTER, ArtifactKind::ComponentSource), COUNTER);
    }
}
