//! Template error types.

use hotpage_source::SourceError;

/// Error produced while compiling or rendering templates.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// Listing or reading the template source failed.
    #[error("Template source error: {0}")]
    Source(#[from] SourceError),

    /// A template failed to parse.
    #[error("Failed to compile template {name}: {source}")]
    Compile {
        /// Template name (base file name).
        name: String,
        #[source]
        source: minijinja::Error,
    },

    /// A template failed to render, or does not exist.
    #[error("Failed to render template {name}: {source}")]
    Render {
        /// Template name (base file name).
        name: String,
        #[source]
        source: minijinja::Error,
    },

    /// No file in the source matched the template patterns.
    #[error("No templates matched patterns {0:?}")]
    NoTemplates(Vec<String>),

    /// A template pattern is not a valid glob.
    #[error("Invalid template pattern {pattern}: {source}")]
    Pattern {
        /// The offending pattern.
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}
