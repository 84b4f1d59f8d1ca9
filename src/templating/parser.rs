//! Block-matching parser.
//!
//! Turns the flat token stream from [`lexer`](super::lexer) into an [`Ast`]
//! using an explicit stack of open blocks. Parsing itself does not recurse,
//! but evaluating, inspecting and dropping an [`Ast`] do, so every parse
//! enforces a nesting limit no higher than [`MAX_DEPTH_CEILING`].

use super::ast::{Ast, BlockKind, Node};
use super::error::ParseError;
use super::lexer::{Position, Token, TokenKind, tokenize};

/// Default maximum block nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Hard upper bound on nesting depth. Larger limits are clamped to it.
pub const MAX_DEPTH_CEILING: usize = 1024;

/// Tunables for a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum number of nested blocks, clamped to [`MAX_DEPTH_CEILING`].
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth,
        }
    }

    /// The limit the parser actually enforces.
    pub fn effective_max_depth(&self) -> usize {
        self.max_depth.min(MAX_DEPTH_CEILING)
    }
}

/// Parse a template with default options.
///
/// # Examples
///
/// ```
/// use lessonforge::templating::{parse, Node};
///
/// let ast = parse("Hello {{name}}")?;
/// assert_eq!(ast.nodes()[1], Node::VariableRef("name".into()));
/// # Ok::<(), lessonforge::templating::ParseError>(())
/// ```
pub fn parse(source: &str) -> Result<Ast, ParseError> {
    parse_with_options(source, ParseOptions::default())
}

/// Parse a template, enforcing `options`.
pub fn parse_with_options(source: &str, options: ParseOptions) -> Result<Ast, ParseError> {
    parse_tokens(&tokenize(source), options)
}

/// Build an [`Ast`] from an already lexed token stream.
pub fn parse_tokens(tokens: &[Token<'_>], options: ParseOptions) -> Result<Ast, ParseError> {
    let mut parser = Parser::new(options);
    for token in tokens {
        parser.feed(token)?;
    }
    parser.finish()
}

/// A block whose close marker has not been seen yet.
struct OpenBlock {
    kind: BlockKind,
    name: String,
    position: Position,
    body: Vec<Node>,
}

impl OpenBlock {
    fn into_node(self) -> Node {
        match self.kind {
            BlockKind::If => Node::ConditionalBlock {
                condition: self.name,
                body: self.body,
            },
            BlockKind::Each => Node::IterationBlock {
                source: self.name,
                body: self.body,
            },
        }
    }
}

struct Parser {
    options: ParseOptions,
    root: Vec<Node>,
    stack: Vec<OpenBlock>,
}

impl Parser {
    fn new(options: ParseOptions) -> Self {
        Self {
            options,
            root: Vec::new(),
            stack: Vec::new(),
        }
    }

    /// Body that new nodes are appended to: the innermost open block, or the root.
    fn current_body(&mut self) -> &mut Vec<Node> {
        match self.stack.last_mut() {
            Some(block) => &mut block.body,
            None => &mut self.root,
        }
    }

    fn feed(&mut self, token: &Token<'_>) -> Result<(), ParseError> {
        match token.kind {
            TokenKind::Text(text) => self.current_body().push(Node::Literal(text.to_string())),
            TokenKind::Variable(name) => {
                self.current_body().push(Node::VariableRef(name.to_string()));
            }
            TokenKind::Open {
                kind,
                name,
            } => {
                let limit = self.options.effective_max_depth();
                if self.stack.len() >= limit {
                    return Err(ParseError::DepthLimitExceeded {
                        limit,
                        position: token.position,
                    });
                }
                self.stack.push(OpenBlock {
                    kind,
                    name: name.to_string(),
                    position: token.position,
                    body: Vec::new(),
                });
            }
            TokenKind::Close(kind) => {
                let open = self.stack.last().map(|block| block.kind);
                if open != Some(kind) {
                    return Err(ParseError::UnmatchedClose {
                        kind,
                        position: token.position,
                        open,
                    });
                }
                if let Some(block) = self.stack.pop() {
                    let node = block.into_node();
                    self.current_body().push(node);
                }
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Ast, ParseError> {
        if let Some(block) = self.stack.pop() {
            return Err(ParseError::UnclosedBlock {
                kind: block.kind,
                name: block.name,
                position: block.position,
            });
        }
        Ok(Ast::new(self.root))
    }
}
