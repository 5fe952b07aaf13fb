//! Template source trait and error types.
//!
//! Provides the core [`TemplateSource`] trait for abstracting directory
//! traversal and file access, along with [`SourceError`] for unified error
//! handling across backends.

use std::path::{Path, PathBuf};

/// A file or directory found while listing a source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    /// Path relative to the source root (e.g., "index.html", "partials/footer.html").
    pub path: PathBuf,
    /// True if the entry is a directory.
    pub is_dir: bool,
}

impl Entry {
    /// Create a file entry.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_dir: false,
        }
    }

    /// Create a directory entry.
    #[must_use]
    pub fn dir(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_dir: true,
        }
    }
}

/// Stat information for a single path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntryInfo {
    /// True if the path is a directory.
    pub is_dir: bool,
}

/// Semantic error categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum SourceErrorKind {
    /// Path does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Absolute path or path escaping the root.
    InvalidPath,
    /// File content is not valid UTF-8.
    InvalidData,
    /// Other/unknown error category.
    Other,
}

/// Source error with semantic kind and backend-specific cause.
#[derive(Debug)]
pub struct SourceError {
    kind: SourceErrorKind,
    path: Option<PathBuf>,
    backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl SourceError {
    /// Create a new source error.
    #[must_use]
    pub fn new(kind: SourceErrorKind) -> Self {
        Self {
            kind,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(SourceErrorKind::NotFound).with_path(path)
    }

    /// Create a source error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => SourceErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => SourceErrorKind::PermissionDenied,
            std::io::ErrorKind::InvalidData => SourceErrorKind::InvalidData,
            _ => SourceErrorKind::Other,
        };
        Self::new(kind).with_path(path).with_source(err)
    }

    /// Semantic error category.
    #[must_use]
    pub fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    /// Path the error refers to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Backend identifier, if any.
    #[must_use]
    pub fn backend(&self) -> Option<&'static str> {
        self.backend
    }

    /// Downcast the source error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_ref()?.downcast_ref()
    }
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (path: partials/footer.html)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            SourceErrorKind::NotFound => "Not found",
            SourceErrorKind::PermissionDenied => "Permission denied",
            SourceErrorKind::InvalidPath => "Invalid path",
            SourceErrorKind::InvalidData => "Invalid data",
            SourceErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Read-only view of a template file tree.
///
/// All path arguments are relative to [`root()`](Self::root). The empty path
/// refers to the root itself.
pub trait TemplateSource: Send + Sync {
    /// Root the source is anchored at.
    ///
    /// Used by the file watcher to translate absolute event paths into
    /// source-relative paths.
    fn root(&self) -> &Path;

    /// List every entry below the root, recursively.
    ///
    /// The root itself is not included. Entries are sorted by path.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the root or any subdirectory cannot be read.
    fn list(&self) -> Result<Vec<Entry>, SourceError>;

    /// Look up whether a path exists and whether it is a directory.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the path does not resolve.
    fn stat(&self, path: &Path) -> Result<EntryInfo, SourceError>;

    /// Read the full content of a file.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the file doesn't exist or can't be read.
    fn read(&self, path: &Path) -> Result<String, SourceError>;
}

/// Reject absolute paths and paths that climb out of the root.
pub(crate) fn validate_path(path: &Path, backend: &'static str) -> Result<(), SourceError> {
    let escapes = path.components().any(|c| {
        matches!(
            c,
            std::path::Component::ParentDir
                | std::path::Component::RootDir
                | std::path::Component::Prefix(_)
        )
    });
    if escapes {
        return Err(SourceError::new(SourceErrorKind::InvalidPath)
            .with_path(path)
            .with_backend(backend));
    }
    Ok(())
}
