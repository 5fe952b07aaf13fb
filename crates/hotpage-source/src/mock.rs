//! Mock template source for testing.
//!
//! Provides [`MockSource`] for unit testing without filesystem access.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::source::{Entry, EntryInfo, SourceError, SourceErrorKind, TemplateSource};

/// Backend identifier for error messages.
const BACKEND: &str = "Mock";

/// In-memory node: a directory or a file with content.
#[derive(Clone, Debug)]
enum Node {
    Dir,
    File(String),
}

/// Mock template source for testing.
///
/// Stores files and directories in memory. Parent directories are created
/// implicitly when a file is added. Counts calls to [`list()`](TemplateSource::list)
/// so tests can assert whether a compilation pass happened.
///
/// # Example
///
/// ```ignore
/// use std::path::Path;
/// use hotpage_source::{MockSource, TemplateSource};
///
/// let source = MockSource::new()
///     .with_file("index.html", "<h1>Home</h1>")
///     .with_file("partials/footer.html", "<footer></footer>");
///
/// assert!(source.stat(Path::new("partials")).unwrap().is_dir);
/// ```
#[derive(Debug)]
pub struct MockSource {
    root: PathBuf,
    nodes: RwLock<BTreeMap<PathBuf, Node>>,
    list_calls: AtomicUsize,
}

impl Default for MockSource {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/mock"),
            nodes: RwLock::new(BTreeMap::new()),
            list_calls: AtomicUsize::new(0),
        }
    }
}

impl MockSource {
    /// Create a new empty mock source rooted at `/mock`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with content, creating parent directories.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.write_file(path, content);
        self
    }

    /// Add an empty directory, creating parent directories.
    #[must_use]
    pub fn with_dir(self, path: impl Into<PathBuf>) -> Self {
        self.create_dir(path);
        self
    }

    /// Create or overwrite a file.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn write_file(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        let path = path.into();
        let mut nodes = self.nodes.write().unwrap();
        Self::insert_parents(&mut nodes, &path);
        nodes.insert(path, Node::File(content.into()));
    }

    /// Create a directory.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn create_dir(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        let mut nodes = self.nodes.write().unwrap();
        Self::insert_parents(&mut nodes, &path);
        nodes.insert(path, Node::Dir);
    }

    /// Remove a file or directory and everything below it.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.nodes
            .write()
            .unwrap()
            .retain(|p, _| !p.starts_with(path));
    }

    /// Number of times `list()` has been called.
    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn insert_parents(nodes: &mut BTreeMap<PathBuf, Node>, path: &Path) {
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            nodes.entry(ancestor.to_path_buf()).or_insert(Node::Dir);
        }
    }
}

impl TemplateSource for MockSource {
    fn root(&self) -> &Path {
        &self.root
    }

    fn list(&self) -> Result<Vec<Entry>, SourceError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .nodes
            .read()
            .unwrap()
            .iter()
            .map(|(path, node)| Entry {
                path: path.clone(),
                is_dir: matches!(node, Node::Dir),
            })
            .collect())
    }

    fn stat(&self, path: &Path) -> Result<EntryInfo, SourceError> {
        if path.as_os_str().is_empty() {
            return Ok(EntryInfo { is_dir: true });
        }
        self.nodes
            .read()
            .unwrap()
            .get(path)
            .map(|node| EntryInfo {
                is_dir: matches!(node, Node::Dir),
            })
            .ok_or_else(|| SourceError::not_found(path).with_backend(BACKEND))
    }

    fn read(&self, path: &Path) -> Result<String, SourceError> {
        match self.nodes.read().unwrap().get(path) {
            Some(Node::File(content)) => Ok(content.clone()),
            Some(Node::Dir) => Err(SourceError::new(SourceErrorKind::Other)
                .with_path(path)
                .with_backend(BACKEND)),
            None => Err(SourceError::not_found(path).with_backend(BACKEND)),
        }
    }
}
