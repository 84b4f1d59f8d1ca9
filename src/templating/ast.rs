//! Parsed template tree.
//!
//! An [`Ast`] owns its node strings so it can outlive the source text and be
//! shared (behind an `Arc`) between renders.

use serde::Serialize;
use std::fmt;

use super::lexer::{INDEX_NAME, THIS_NAME};

/// Which kind of block a marker opens or closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    /// `{{#if name}} ... {{/if}}`
    If,
    /// `{{#each name}} ... {{/each}}`
    Each,
}

impl BlockKind {
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::If => "if",
            Self::Each => "each",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A single node of the template tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Text emitted unchanged
    Literal(String),
    /// `{{name}}`
    VariableRef(String),
    /// `{{#if condition}} body {{/if}}`
    ConditionalBlock {
        condition: String,
        body: Vec<Node>,
    },
    /// `{{#each source}} body {{/each}}`
    IterationBlock {
        source: String,
        body: Vec<Node>,
    },
}

/// Names a template refers to, in first-seen order without duplicates.
///
/// `this` and `@index` are left out when they appear inside an iteration
/// block, since there they are bound by the block rather than the context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct References {
    pub variables: Vec<String>,
    pub conditions: Vec<String>,
    pub sources: Vec<String>,
}

impl References {
    /// Every referenced name across all three categories, deduplicated.
    pub fn all_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for name in self.variables.iter().chain(&self.conditions).chain(&self.sources) {
            if !names.contains(&name.as_str()) {
                names.push(name.as_str());
            }
        }
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.iter().chain(&self.conditions).chain(&self.sources).any(|n| n == name)
    }

    fn record(list: &mut Vec<String>, name: &str, loop_depth: usize) {
        if loop_depth > 0 && (name == THIS_NAME || name == INDEX_NAME) {
            return;
        }
        if !list.iter().any(|n| n == name) {
            list.push(name.to_string());
        }
    }
}

/// The root node sequence of a parsed template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ast {
    nodes: Vec<Node>,
}

impl Ast {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self {
            nodes,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Deepest block nesting level (0 for a template without blocks).
    pub fn depth(&self) -> usize {
        fn depth_of(nodes: &[Node]) -> usize {
            nodes
                .iter()
                .map(|node| match node {
                    Node::ConditionalBlock {
                        body,
                        ..
                    }
                    | Node::IterationBlock {
                        body,
                        ..
                    } => 1 + depth_of(body),
                    _ => 0,
                })
                .max()
                .unwrap_or(0)
        }
        depth_of(&self.nodes)
    }

    /// Collect every name the template looks up in the context.
    pub fn references(&self) -> References {
        fn walk(nodes: &[Node], loop_depth: usize, refs: &mut References) {
            for node in nodes {
                match node {
                    Node::Literal(_) => {}
                    Node::VariableRef(name) => {
                        References::record(&mut refs.variables, name, loop_depth);
                    }
                    Node::ConditionalBlock {
                        condition,
                        body,
                    } => {
                        References::record(&mut refs.conditions, condition, loop_depth);
                        walk(body, loop_depth, refs);
                    }
                    Node::IterationBlock {
                        source,
                        body,
                    } => {
                        References::record(&mut refs.sources, source, loop_depth);
                        walk(body, loop_depth + 1, refs);
                    }
                }
            }
        }

        let mut refs = References::default();
        walk(&self.nodes, 0, &mut refs);
        refs
    }

    /// Indented, human-readable outline of the block structure.
    ///
    /// Literal text is summarized by its character count.
    pub fn outline(&self) -> String {
        fn walk(nodes: &[Node], indent: usize, out: &mut String) {
            let pad = "  ".repeat(indent);
            for node in nodes {
                match node {
                    Node::Literal(text) => {
                        out.push_str(&format!("{pad}text ({} chars)\n", text.chars().count()));
                    }
                    Node::VariableRef(name) => {
                        out.push_str(&format!("{pad}{{{{{name}}}}}\n"));
                    }
                    Node::ConditionalBlock {
                        condition,
                        body,
                    } => {
                        out.push_str(&format!("{pad}#if {condition}\n"));
                        walk(body, indent + 1, out);
                    }
                    Node::IterationBlock {
                        source,
                        body,
                    } => {
                        out.push_str(&format!("{pad}#each {source}\n"));
                        walk(body, indent + 1, out);
                    }
                }
            }
        }

        let mut out = String::new();
        walk(&self.nodes, 0, &mut out);
        out
    }
}
