//! Template tokenizer.
//!
//! Scans raw template text once, left to right, and splits it into literal text
//! runs and `{{ ... }}` markers. The lexer knows nothing about nesting; it only
//! recognizes the marker families:
//!
//! - `{{name}}` - variable reference (also `{{this}}` and `{{@index}}`)
//! - `{{#if name}}` / `{{/if}}` - conditional open/close
//! - `{{#each name}}` / `{{/each}}` - iteration open/close
//!
//! Markers must match these forms exactly: no whitespace inside the braces,
//! and exactly one space between `#if`/`#each` and the name. Anything else
//! that happens to sit between `{{` and `}}` (including `{{ name }}`) is kept
//! as literal text. Malformed markup never produces an error here.

use std::fmt;

use super::ast::BlockKind;

/// Name bound to the 1-based position inside an iteration block.
pub const INDEX_NAME: &str = "@index";

/// Name bound to the current element inside an iteration block.
pub const THIS_NAME: &str = "this";

/// Location of a token in the template source.
///
/// `line` and `column` are 1-based; `column` counts characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    /// Byte offset from the start of the template
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// The kind of a lexed token. Names and text borrow from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind<'a> {
    /// Verbatim text between markers
    Text(&'a str),
    /// `{{name}}`
    Variable(&'a str),
    /// `{{#if name}}` or `{{#each name}}`
    Open {
        kind: BlockKind,
        name: &'a str,
    },
    /// `{{/if}}` or `{{/each}}`
    Close(BlockKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub position: Position,
}

/// Returns true if `name` matches `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Returns true if `name` may appear as a reference inside a marker.
pub fn is_reference(name: &str) -> bool {
    name == INDEX_NAME || is_identifier(name)
}

/// Maps byte offsets to line/column positions.
struct LineIndex<'a> {
    source: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(source: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        Self {
            source,
            line_starts,
        }
    }

    fn position(&self, offset: usize) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        let column = self.source[line_start..offset].chars().count() + 1;
        Position {
            offset,
            line: line + 1,
            column,
        }
    }
}

/// Split a template into tokens.
///
/// Adjacent literal text (including the text of any malformed markers) is
/// always merged into a single `Text` token, so two `Text` tokens are never
/// neighbors in the output.
///
/// # Examples
///
/// ```
/// use lessonforge::templating::lexer::{tokenize, TokenKind};
///
/// let tokens = tokenize("Hi {{name}}!");
/// let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
/// assert_eq!(
///     kinds,
///     vec![TokenKind::Text("Hi "), TokenKind::Variable("name"), TokenKind::Text("!")]
/// );
/// ```
pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    let index = LineIndex::new(source);
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut cursor = 0;

    while let Some(relative) = source[cursor..].find("{{") {
        let start = cursor + relative;
        match classify_marker(&source[start..]) {
            Some((kind, consumed)) => {
                if text_start < start {
                    tokens.push(Token {
                        kind: TokenKind::Text(&source[text_start..start]),
                        position: index.position(text_start),
                    });
                }
                tokens.push(Token {
                    kind,
                    position: index.position(start),
                });
                cursor = start + consumed;
                text_start = cursor;
            }
            None => {
                // Not a marker: keep the first brace as text and rescan, so
                // `{{{name}}}` still finds the inner `{{name}}`.
                cursor = start + 1;
            }
        }
    }

    if text_start < source.len() {
        tokens.push(Token {
            kind: TokenKind::Text(&source[text_start..]),
            position: index.position(text_start),
        });
    }

    tracing::trace!("Tokenized template into {} token(s)", tokens.len());
    tokens
}

/// Try to read a marker at the start of `input` (which begins with `{{`).
///
/// Returns the token kind and the number of bytes consumed, or `None` if the
/// text is not a well-formed marker.
fn classify_marker(input: &str) -> Option<(TokenKind<'_>, usize)> {
    let inner_len = input[2..].find("}}")?;
    let inner = &input[2..2 + inner_len];
    let consumed = inner_len + 4;

    if let Some(rest) = inner.strip_prefix('#') {
        let (keyword, name) = rest.split_once(' ')?;
        let kind = block_kind(keyword)?;
        return is_reference(name).then_some((
            TokenKind::Open {
                kind,
                name,
            },
            consumed,
        ));
    }

    if let Some(rest) = inner.strip_prefix('/') {
        return block_kind(rest).map(|kind| (TokenKind::Close(kind), consumed));
    }

    is_reference(inner).then_some((TokenKind::Variable(inner), consumed))
}

fn block_kind(keyword: &str) -> Option<BlockKind> {
    match keyword {
        "if" => Some(BlockKind::If),
        "each" => Some(BlockKind::Each),
        _ => None,
    }
}
