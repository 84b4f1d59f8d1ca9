//! Template renderer with caching and configured limits.
//!
//! [`TemplateRenderer`] bundles the parse options, render limits and an
//! optional [`ParseCache`] so callers can render many templates (or the same
//! template many times) with one consistent configuration. It is `Send` and
//! `Sync`; share it behind a reference or an `Arc` to render from several
//! threads at once.

use std::sync::Arc;

use super::ast::Ast;
use super::cache::{CacheStats, ParseCache};
use super::error::ParseError;
use super::evaluator::{Evaluator, RenderLimits};
use super::parser::{ParseOptions, parse_with_options};
use super::value::Context;
use crate::config::GlobalConfig;

/// Parses and renders templates.
///
/// # Examples
///
/// ```
/// use lessonforge::templating::{Context, TemplateRenderer};
///
/// let renderer = TemplateRenderer::new();
/// let ctx = Context::new().with("topic", "Volcanoes");
/// let out = renderer.render_template("Today: {{topic}}", &ctx)?;
/// assert_eq!(out, "Today: Volcanoes");
/// # Ok::<(), lessonforge::templating::ParseError>(())
/// ```
#[derive(Debug, Default)]
pub struct TemplateRenderer {
    parse_options: ParseOptions,
    limits: RenderLimits,
    cache: Option<ParseCache>,
}

impl TemplateRenderer {
    /// A renderer with the default depth limit, no iteration budget and no cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// A renderer configured from the global configuration file.
    pub fn from_config(config: &GlobalConfig) -> Self {
        Self::new()
            .with_parse_options(config.parse_options())
            .with_limits(config.render_limits())
            .with_cache(config.cache)
    }

    #[must_use]
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse_options = options;
        // Cached ASTs were accepted under the old options.
        if let Some(cache) = &self.cache {
            cache.clear();
        }
        self
    }

    #[must_use]
    pub fn with_limits(mut self, limits: RenderLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Enable or disable the parse cache.
    #[must_use]
    pub fn with_cache(mut self, enabled: bool) -> Self {
        let existing = self.cache.take();
        self.cache = enabled.then(|| existing.unwrap_or_default());
        self
    }

    pub fn parse_options(&self) -> ParseOptions {
        self.parse_options
    }

    pub fn limits(&self) -> RenderLimits {
        self.limits
    }

    /// Parse `template`, going through the cache when one is enabled.
    pub fn parse(&self, template: &str) -> Result<Arc<Ast>, ParseError> {
        match &self.cache {
            Some(cache) => cache.get_or_parse(template, self.parse_options),
            None => parse_with_options(template, self.parse_options).map(Arc::new),
        }
    }

    /// Evaluate an already parsed template.
    pub fn evaluate(&self, ast: &Ast, context: &Context) -> String {
        Evaluator::new(context).with_limits(self.limits).render(ast)
    }

    /// Parse and evaluate `template` against `context`.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] when the template's blocks are unbalanced or
    /// nested deeper than the configured limit. Evaluation itself never fails.
    pub fn render_template(&self, template: &str, context: &Context) -> Result<String, ParseError> {
        tracing::debug!("Rendering template ({} bytes)", template.len());
        Self::log_context_as_kv(context);

        let ast = self.parse(template)?;
        let rendered = self.evaluate(&ast, context);

        tracing::debug!("Template rendering complete ({} bytes)", rendered.len());
        Ok(rendered)
    }

    /// Cache counters, or `None` when caching is disabled.
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(ParseCache::stats)
    }

    /// Format the context as indented `key: value` lines.
    fn format_context_as_string(context: &Context) -> String {
        let mut out = String::from("Template context:\n");
        if context.is_empty() {
            out.push_str("  (empty)\n");
        }
        for (name, value) in context.iter() {
            out.push_str(&format!("  {name} ({}): {value:?}\n", value.type_name()));
        }
        out
    }

    /// Log the context as key-value pairs at debug level.
    fn log_context_as_kv(context: &Context) {
        if !tracing::enabled!(tracing::Level::DEBUG) {
            return;
        }
        let formatted = Self::format_context_as_string(context);
        for line in formatted.lines() {
            tracing::debug!("{}", line);
        }
    }
}
