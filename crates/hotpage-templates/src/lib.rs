//! Template compilation for hotpage.
//!
//! Compiles every template file in a [`TemplateSource`](hotpage_source::TemplateSource)
//! into one [`minijinja`] environment and provides a swappable handle for
//! sharing the compiled set between request handlers and the live reload
//! pipeline.
//!
//! # Naming
//!
//! Templates are registered under their base file name, so
//! `partials/footer.html` is rendered (and included) as `footer.html`.
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use hotpage_source::FsSource;
//! use hotpage_templates::{CompiledTemplates, TemplatePatterns, TemplateSet};
//!
//! let source = FsSource::new(PathBuf::from("www"));
//! let patterns = TemplatePatterns::default();
//! let set = TemplateSet::new(CompiledTemplates::compile(&source, &patterns)?);
//!
//! let html = set.get().render("index.html")?;
//! ```

mod compiled;
mod error;
mod patterns;
mod set;

pub use compiled::CompiledTemplates;
pub use error::TemplateError;
pub use patterns::{DEFAULT_PATTERNS, TemplatePatterns};
pub use set::TemplateSet;
