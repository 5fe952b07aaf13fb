//! Glob patterns selecting template files.

use std::path::Path;

use glob::{MatchOptions, Pattern};

use crate::error::TemplateError;

/// Patterns used when none are configured.
pub const DEFAULT_PATTERNS: &[&str] = &["*.html", "**/*.html"];

/// `*` never crosses a directory boundary; only `**` does.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Set of glob patterns matched against source-relative paths.
#[derive(Clone, Debug)]
pub struct TemplatePatterns {
    patterns: Vec<Pattern>,
}

impl TemplatePatterns {
    /// Parse a list of glob patterns.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Pattern`] for the first invalid pattern.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, TemplateError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Pattern::new(p.as_ref()).map_err(|source| TemplateError::Pattern {
                    pattern: p.as_ref().to_owned(),
                    source,
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { patterns })
    }

    /// Check whether a relative path matches any pattern.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        self.patterns
            .iter()
            .any(|p| p.matches_path_with(path, MATCH_OPTIONS))
    }

    /// Pattern strings, for diagnostics.
    #[must_use]
    pub fn as_strings(&self) -> Vec<String> {
        self.patterns.iter().map(|p| p.as_str().to_owned()).collect()
    }
}

impl Default for TemplatePatterns {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_PATTERNS
                .iter()
                .filter_map(|p| Pattern::new(p).ok())
                .collect(),
        }
    }
}
