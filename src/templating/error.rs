//! Template parse errors.
//!
//! Parsing is the only stage of a render that can fail. Each error carries the
//! position of the offending marker so callers can point authors at it, and
//! [`ParseError::format_with_context`] produces a multi-line report with the
//! surrounding source lines.

use thiserror::Error;

use super::ast::BlockKind;
use super::lexer::Position;

/// Number of source lines shown before and after the error line.
const CONTEXT_LINES: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A close marker with no open block, or closing the wrong kind of block.
    #[error("unmatched {{{{/{kind}}}}} at {position}")]
    UnmatchedClose {
        kind: BlockKind,
        position: Position,
        /// Kind of the innermost block that was open at the time, if any
        open: Option<BlockKind>,
    },

    /// End of input reached while a block was still open.
    #[error("unclosed {{{{#{kind} {name}}}}} opened at {position}")]
    UnclosedBlock {
        kind: BlockKind,
        name: String,
        position: Position,
    },

    /// Blocks nested deeper than the configured limit.
    #[error("blocks nested deeper than {limit} levels at {position}")]
    DepthLimitExceeded {
        limit: usize,
        position: Position,
    },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::UnmatchedClose {
                position,
                ..
            }
            | ParseError::UnclosedBlock {
                position,
                ..
            }
            | ParseError::DepthLimitExceeded {
                position,
                ..
            } => *position,
        }
    }

    /// Generate a user-friendly report with source context and a suggestion.
    ///
    /// # Arguments
    ///
    /// * `source` - The template text that failed to parse
    /// * `template_name` - Display name of the template (file name, descriptor title)
    pub fn format_with_context(&self, source: &str, template_name: Option<&str>) -> String {
        let position = self.position();
        let mut msg = String::new();

        msg.push_str("ERROR: Template Syntax Error\n\n");
        msg.push_str(&format!("Error: {}\n", self));
        if let Some(name) = template_name {
            msg.push_str(&format!("Template: {}\n", name));
        }
        msg.push_str(&format!("Line: {}\n", position.line));

        let lines = extract_context_lines(source, position.line, CONTEXT_LINES);
        if !lines.is_empty() {
            let width = lines.last().map(|(n, _)| n.to_string().len()).unwrap_or(1);
            msg.push('\n');
            for (number, line) in &lines {
                msg.push_str(&format!("{:>width$} | {}\n", number, line, width = width));
                if *number == position.line {
                    let caret_pad = " ".repeat(position.column.saturating_sub(1));
                    msg.push_str(&format!("{:>width$} | {}^\n", "", caret_pad, width = width));
                }
            }
        }

        msg.push('\n');
        msg.push_str(&self.suggestion());
        msg
    }

    fn suggestion(&self) -> String {
        match self {
            ParseError::UnmatchedClose {
                kind,
                open: Some(open),
                ..
            } => format!(
                "SUGGESTION: This {{{{/{kind}}}}} closes an open {{{{#{open}}}}} block.\n\
                 Close the inner {{{{#{open}}}}} with {{{{/{open}}}}} first, or fix the block order.\n"
            ),
            ParseError::UnmatchedClose {
                kind,
                open: None,
                ..
            } => format!(
                "SUGGESTION: No block is open here. Remove this {{{{/{kind}}}}} or add the\n\
                 matching {{{{#{kind} name}}}} before it.\n"
            ),
            ParseError::UnclosedBlock {
                kind,
                ..
            } => format!("SUGGESTION: Add {{{{/{kind}}}}} where this block should end.\n"),
            ParseError::DepthLimitExceeded {
                limit,
                ..
            } => format!(
                "SUGGESTION: Flatten the template so no more than {limit} blocks are nested,\n\
                 or raise `max_depth` in the configuration file.\n"
            ),
        }
    }
}

/// Extract lines around an error location.
///
/// Returns up to `context_size` lines before and after `error_line`, paired
/// with their 1-based line numbers.
fn extract_context_lines(
    content: &str,
    error_line: usize,
    context_size: usize,
) -> Vec<(usize, String)> {
    let lines: Vec<&str> = content.split('\n').collect();
    let total_lines = lines.len();

    if error_line == 0 || error_line > total_lines {
        return Vec::new();
    }

    let start = error_line.saturating_sub(context_size + 1);
    let end = (error_line + context_size).min(total_lines);

    lines[start..end]
        .iter()
        .enumerate()
        .map(|(idx, line)| (start + idx + 1, line.trim_end_matches('\r').to_string()))
        .collect()
}
