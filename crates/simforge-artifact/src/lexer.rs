//! String- and comment-aware character scanning
//!
//! Shared by the extractor (boundary detection) and the local validator
//! (delimiter matching). The scanner is an explicit state machine; it only
//! yields characters that sit in code, never inside literals or comments.

use once_cell::sync::Lazy;
use regex::Regex;
use std::iter::Peekable;
use std::str::CharIndices;

/// Which literal and comment forms a dialect has
#[derive(Debug, Clone, Copy)]
pub(crate) struct Syntax {
    quotes: &'static [char],
    comments: bool,
}

impl Syntax {
    /// Component source: `'`, `"`, and backtick literals, `//` and `/* */` comments
    pub(crate) const SOURCE: Syntax = Syntax {
        quotes: &['\'', '"', '`'],
        comments: true,
    };

    /// JSON: double-quoted strings only
    pub(crate) const JSON: Syntax = Syntax {
        quotes: &['"'],
        comments: false,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Code,
    Str { quote: char, escaped: bool },
    LineComment,
    BlockComment,
}

/// Iterator over `(byte_offset, char)` pairs that are outside literals and comments
pub(crate) struct CodeChars<'a> {
    chars: Peekable<CharIndices<'a>>,
    state: ScanState,
    syntax: Syntax,
    prev: Option<char>,
}

impl<'a> CodeChars<'a> {
    pub(crate) fn new(text: &'a str, syntax: Syntax) -> Self {
        Self {
            chars: text.char_indices().peekable(),
            state: ScanState::Code,
            syntax,
            prev: None,
        }
    }

    /// A `'` directly after a letter or digit is an apostrophe in markup text
    fn opens_literal(&self, ch: char) -> bool {
        self.syntax.quotes.contains(&ch)
            && !(ch == '\'' && self.prev.is_some_and(char::is_alphanumeric))
    }

    fn next_is(&mut self, expected: char) -> bool {
        matches!(self.chars.peek(), Some(&(_, c)) if c == expected)
    }
}

impl Iterator for CodeChars<'_> {
    type Item = (usize, char);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (idx, ch) = self.chars.next()?;
            match self.state {
                ScanState::Code => {
                    let opens = self.opens_literal(ch);
                    self.prev = Some(ch);
                    if opens {
                        self.state = ScanState::Str {
                            quote: ch,
                            escaped: false,
                        };
                    } else if self.syntax.comments && ch == '/' && self.next_is('/') {
                        self.chars.next();
                        self.state = ScanState::LineComment;
                    } else if self.syntax.comments && ch == '/' && self.next_is('*') {
                        self.chars.next();
                        self.state = ScanState::BlockComment;
                    } else {
                        return Some((idx, ch));
                    }
                }
                ScanState::Str { quote, escaped } => {
                    self.state = if escaped {
                        ScanState::Str {
                            quote,
                            escaped: false,
                        }
                    } else if ch == '\\' {
                        ScanState::Str {
                            quote,
                            escaped: true,
                        }
                    } else if ch == quote || (ch == '\n' && quote != '`') {
                        // Only template literals may span lines.
                        ScanState::Code
                    } else {
                        ScanState::Str { quote, escaped }
                    };
                }
                ScanState::LineComment => {
                    if ch == '\n' {
                        self.state = ScanState::Code;
                        return Some((idx, ch));
                    }
                }
                ScanState::BlockComment => {
                    if ch == '*' && self.next_is('/') {
                        self.chars.next();
                        self.state = ScanState::Code;
                    }
                }
            }
        }
    }
}

/// Byte offset of the brace that closes the block opened at or after `from`
///
/// Depth counts `open`/`close` only; returns `None` when no opener is found
/// or the block never closes.
pub(crate) fn matching_close(
    text: &str,
    from: usize,
    open: char,
    close: char,
    syntax: Syntax,
) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, ch) in CodeChars::new(&text[from..], syntax) {
        if ch == open {
            depth += 1;
        } else if ch == close && depth > 0 {
            depth -= 1;
            if depth == 0 {
                return Some(from + idx);
            }
        }
    }
    None
}

static IMPORT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^\s*(?:import(?:\s+|\s*[{*'"])|export\s+.*\bfrom\s+['"]|(?:const|let|var)\s+[\w{}\s,:]+=\s*require\s*\()"#,
    )
    .expect("import regex is valid")
});

/// Whether a line is a bare module import (`import`, re-export, or `require`)
#[must_use]
pub fn is_import_line(line: &str) -> bool {
    IMPORT_LINE.is_match(line)
}

/// Whether a line opens or closes a markdown code fence
#[must_use]
pub fn is_fence_line(line: &str) -> bool {
    line.trim_start().starts_with("```")
}
