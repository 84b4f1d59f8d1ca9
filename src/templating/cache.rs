//! Parse cache for template ASTs.
//!
//! Parsing is a pure function of the template text, so an AST can be reused
//! for every render of the same string. Entries are keyed by the exact
//! template text: editing a descriptor's template produces a new key and the
//! old entry is simply never hit again.

use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::ast::Ast;
use super::error::ParseError;
use super::parser::{ParseOptions, parse_with_options};

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub entries: usize,
}

impl CacheStats {
    /// Calculate hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Concurrent map from template text to parsed AST.
///
/// Safe to share between threads. Two threads missing on the same key at the
/// same time may both parse it; the results are identical and one is kept.
/// Failed parses are not cached.
///
/// A cache must only be used with one set of [`ParseOptions`], since a cached
/// AST is returned without re-checking limits.
#[derive(Debug, Default)]
pub struct ParseCache {
    entries: DashMap<String, Arc<Ast>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl ParseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached AST for `template`, parsing and storing it on a miss.
    pub fn get_or_parse(
        &self,
        template: &str,
        options: ParseOptions,
    ) -> Result<Arc<Ast>, ParseError> {
        if let Some(ast) = self.entries.get(template) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(ast.value()));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let ast = Arc::new(parse_with_options(template, options)?);
        tracing::debug!("Cached parsed template ({} bytes)", template.len());
        let stored = self.entries.entry(template.to_string()).or_insert(ast);
        Ok(Arc::clone(stored.value()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clear all cached ASTs and reset counters
    pub fn clear(&self) {
        self.entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}
