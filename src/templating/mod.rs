//! Template engine for lesson and worksheet documents.
//!
//! Templates are plain text with three kinds of markers:
//!
//! - Variable substitution: `{{name}}`
//! - Conditional blocks: `{{#if name}}...{{/if}}`
//! - Iteration blocks: `{{#each name}}...{{/each}}`, with `{{this}}` bound to
//!   the current element and `{{@index}}` to its 1-based position
//!
//! There is no expression language, no `else`, no helpers and no partials.
//!
//! # Pipeline
//!
//! ```text
//! template text -> lexer -> tokens -> parser -> Ast -> evaluator (+ Context) -> output
//! ```
//!
//! - [`lexer`] splits the text into literal runs and markers, recording the
//!   line and column of each. Anything inside `{{ }}` that is not a valid
//!   marker stays literal text.
//! - [`parser`] matches block markers with an explicit stack and reports
//!   [`ParseError`]s for unbalanced blocks.
//! - [`evaluator`] walks the tree. It never fails: missing names render as
//!   nothing, and iterating over a non-list renders nothing.
//!
//! # Examples
//!
//! ```
//! use lessonforge::templating::{render, Context, Value};
//!
//! let ctx = Context::new()
//!     .with("title", "Fractions")
//!     .with("homework", true)
//!     .with("steps", vec!["Warm-up", "Practice"]);
//!
//! let out = render(
//!     "# {{title}}\n{{#each steps}}{{@index}}. {{this}}\n{{/each}}{{#if homework}}Homework due Friday{{/if}}",
//!     &ctx,
//! )?;
//! assert_eq!(out, "# Fractions\n1. Warm-up\n2. Practice\nHomework due Friday");
//! # Ok::<(), lessonforge::templating::ParseError>(())
//! ```
//!
//! Unbalanced blocks are reported with their position:
//!
//! ```
//! use lessonforge::templating::{parse, ParseError};
//!
//! let err = parse("{{#if x}}no close").unwrap_err();
//! assert!(matches!(err, ParseError::UnclosedBlock { ref name, .. } if name == "x"));
//! ```

pub mod ast;
pub mod cache;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod renderer;
pub mod value;

pub use ast::{Ast, BlockKind, Node, References};
pub use cache::{CacheStats, ParseCache};
pub use error::ParseError;
pub use evaluator::{Evaluator, RenderLimits, evaluate};
pub use lexer::Position;
pub use parser::{DEFAULT_MAX_DEPTH, MAX_DEPTH_CEILING, ParseOptions, parse, parse_with_options};
pub use renderer::TemplateRenderer;
pub use value::{Context, Value, ValueError};

/// Parse and evaluate `template` in one step, with the default depth limit
/// and no iteration budget or caching.
///
/// # Errors
///
/// Returns a [`ParseError`] if the template's blocks are unbalanced or
/// nested deeper than [`DEFAULT_MAX_DEPTH`].
pub fn render(template: &str, context: &Context) -> Result<String, ParseError> {
    let ast = parse(template)?;
    Ok(evaluate(&ast, context))
}
