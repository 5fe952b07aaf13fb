//! Swappable handle to the current compiled template set.
//!
//! # Thread Safety
//!
//! `TemplateSet` is designed for one writer and many readers:
//! - `get()` returns `Arc<CompiledTemplates>` with minimal locking (just Arc clone)
//! - `reload()` compiles outside the lock and only takes the write lock for
//!   the pointer swap, so readers never observe a half-built set

use std::sync::{Arc, RwLock};
use std::time::Instant;

use hotpage_source::TemplateSource;

use crate::compiled::CompiledTemplates;
use crate::error::TemplateError;
use crate::patterns::TemplatePatterns;

/// Current compiled template snapshot, atomically replaceable.
#[derive(Debug)]
pub struct TemplateSet {
    current: RwLock<Arc<CompiledTemplates>>,
}

impl TemplateSet {
    /// Create a handle holding `initial`.
    #[must_use]
    pub fn new(initial: CompiledTemplates) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    /// Get the current snapshot.
    ///
    /// The returned `Arc` stays valid after later swaps.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn get(&self) -> Arc<CompiledTemplates> {
        Arc::clone(&self.current.read().unwrap())
    }

    /// Replace the current snapshot, returning the new one.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    pub fn swap(&self, templates: CompiledTemplates) -> Arc<CompiledTemplates> {
        let templates = Arc::new(templates);
        *self.current.write().unwrap() = Arc::clone(&templates);
        templates
    }

    /// Recompile from `source` and swap in the result.
    ///
    /// On failure the current snapshot is left untouched.
    ///
    /// # Errors
    ///
    /// Returns the [`TemplateError`] from compilation.
    pub fn reload(
        &self,
        source: &dyn TemplateSource,
        patterns: &TemplatePatterns,
    ) -> Result<Arc<CompiledTemplates>, TemplateError> {
        let start = Instant::now();
        let compiled = CompiledTemplates::compile(source, patterns)?;
        let count = compiled.names().len();
        let templates = self.swap(compiled);

        tracing::info!(
            count,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Templates reloaded"
        );

        Ok(templates)
    }
}
