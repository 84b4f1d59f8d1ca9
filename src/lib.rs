//! lessonforge - template rendering for lesson plans and worksheets
//!
//! Authors write parameterized documents with three constructs: variable
//! substitution (`{{name}}`), conditional sections (`{{#if name}}...{{/if}}`)
//! and list iteration (`{{#each name}}...{{/each}}`). A descriptor file pairs
//! the template with the form fields that feed it, and rendering turns the
//! pair plus user input into the final text.
//!
//! # Architecture Overview
//!
//! ```text
//! descriptor file -> TemplateDescriptor -> lexer -> parser -> Ast
//!                                  |                            |
//!                         build_context(inputs) -> Context -> evaluator -> text
//! ```
//!
//! Rendering is fail-open: missing values render as nothing and malformed
//! markers stay literal text. Only unbalanced blocks are errors.
//!
//! # Core Modules
//!
//! - [`templating`] - lexer, parser, evaluator, parse cache and renderer
//! - [`descriptor`] - descriptor model, loading, input coercion and validation
//! - [`config`] - global configuration (`~/.lessonforge/config.toml`)
//! - [`core`] - error types and user-facing error reporting
//! - [`cli`] - the `lessonforge` command-line interface
//!
//! # Example
//!
//! ```
//! use lessonforge::descriptor::{TemplateDescriptor, Variable, VariableType};
//! use lessonforge::templating::{Context, TemplateRenderer};
//!
//! let mut descriptor =
//!     TemplateDescriptor::from_template("{{#if quiz}}Quiz: {{questions}} questions{{/if}}");
//! descriptor.variables.push(Variable::new("quiz", VariableType::Boolean));
//! descriptor.variables.push(Variable::new("questions", VariableType::Number));
//!
//! let inputs = Context::new().with("quiz", "yes").with("questions", "10");
//! let (context, issues) = descriptor.build_context(&inputs);
//! assert!(issues.is_empty());
//!
//! let out = TemplateRenderer::new().render_template(&descriptor.template, &context)?;
//! assert_eq!(out, "Quiz: 10 questions");
//! # Ok::<(), lessonforge::templating::ParseError>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod descriptor;
pub mod templating;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
