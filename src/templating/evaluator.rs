//! Tree-walking evaluator.
//!
//! Evaluation never fails. Missing names render as empty text, conditions use
//! [`Value::is_truthy`], and iteration over anything but a list renders
//! nothing. Inside an iteration body `this` and `@index` resolve to the
//! current element and its 1-based position; they are held on a scope stack
//! and never written into the caller's [`Context`].

use std::borrow::Cow;

use super::ast::{Ast, Node};
use super::lexer::{INDEX_NAME, THIS_NAME};
use super::value::{Context, Value};

/// Limits applied while evaluating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderLimits {
    /// Total number of loop iterations allowed in one render. Iterations past
    /// the budget are skipped. `None` means unlimited.
    pub max_iterations: Option<usize>,
}

/// Evaluate `ast` against `context` without limits.
pub fn evaluate(ast: &Ast, context: &Context) -> String {
    Evaluator::new(context).render(ast)
}

/// Renders parsed templates against one context.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'c> {
    context: &'c Context,
    limits: RenderLimits,
}

/// Binding introduced by one enclosing iteration block.
struct Frame<'c> {
    item: &'c Value,
    index: usize,
}

/// Mutable state for a single render.
struct Scope<'c> {
    frames: Vec<Frame<'c>>,
    iterations: usize,
    truncated: bool,
}

impl<'c> Evaluator<'c> {
    pub fn new(context: &'c Context) -> Self {
        Self {
            context,
            limits: RenderLimits::default(),
        }
    }

    #[must_use]
    pub fn with_limits(mut self, limits: RenderLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn render(&self, ast: &Ast) -> String {
        let mut scope = Scope {
            frames: Vec::new(),
            iterations: 0,
            truncated: false,
        };
        let mut out = String::new();
        self.render_nodes(ast.nodes(), &mut scope, &mut out);
        out
    }

    /// Resolve a name, innermost binding first.
    fn lookup(&self, name: &str, scope: &Scope<'c>) -> Option<Cow<'c, Value>> {
        if let Some(frame) = scope.frames.last() {
            if name == THIS_NAME {
                return Some(Cow::Borrowed(frame.item));
            }
            if name == INDEX_NAME {
                return Some(Cow::Owned(Value::Number(frame.index as f64)));
            }
        }
        self.context.get(name).map(Cow::Borrowed)
    }

    fn render_nodes(&self, nodes: &[Node], scope: &mut Scope<'c>, out: &mut String) {
        for node in nodes {
            match node {
                Node::Literal(text) => out.push_str(text),
                Node::VariableRef(name) => {
                    if let Some(value) = self.lookup(name, scope) {
                        value.write_text(out);
                    }
                }
                Node::ConditionalBlock {
                    condition,
                    body,
                } => {
                    let truthy = self.lookup(condition, scope).is_some_and(|v| v.is_truthy());
                    if truthy {
                        self.render_nodes(body, scope, out);
                    }
                }
                Node::IterationBlock {
                    source,
                    body,
                } => {
                    let Some(Cow::Borrowed(Value::List(items))) = self.lookup(source, scope) else {
                        tracing::trace!("'{}' is not a list, skipping iteration block", source);
                        continue;
                    };
                    for (i, item) in items.iter().enumerate() {
                        if !self.consume_iteration(scope) {
                            break;
                        }
                        scope.frames.push(Frame {
                            item,
                            index: i + 1,
                        });
                        self.render_nodes(body, scope, out);
                        scope.frames.pop();
                    }
                }
            }
        }
    }

    /// Count one loop iteration against the budget. Returns false once exhausted.
    fn consume_iteration(&self, scope: &mut Scope<'c>) -> bool {
        if let Some(max) = self.limits.max_iterations {
            if scope.iterations >= max {
                if !scope.truncated {
                    tracing::warn!(
                        "Iteration budget of {} exhausted; remaining loop iterations skipped",
                        max
                    );
                    scope.truncated = true;
                }
                return false;
            }
        }
        scope.iterations += 1;
        true
    }
}
