//! Filesystem-backed template source.

use std::fs;
use std::path::{Path, PathBuf};

use crate::source::{Entry, EntryInfo, SourceError, TemplateSource, validate_path};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Template source reading from a directory on disk.
///
/// Paths are resolved against the root on every call, so the source always
/// reflects the current state of the directory.
#[derive(Clone, Debug)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    /// Create a new filesystem source rooted at `root`.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Resolve a relative path against the root.
    fn resolve(&self, path: &Path) -> Result<PathBuf, SourceError> {
        validate_path(path, BACKEND)?;
        Ok(self.root.join(path))
    }

    /// Walk a directory and collect its entries, depth first.
    fn walk(&self, relative: &Path, entries: &mut Vec<Entry>) -> Result<(), SourceError> {
        let dir_path = self.root.join(relative);
        let read_dir = fs::read_dir(&dir_path)
            .map_err(|e| SourceError::io(e, relative).with_backend(BACKEND))?;

        let mut children = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| SourceError::io(e, relative).with_backend(BACKEND))?;
            let child = relative.join(entry.file_name());
            let is_dir = entry
                .file_type()
                .map_err(|e| SourceError::io(e, &child).with_backend(BACKEND))?
                .is_dir();
            children.push((child, is_dir));
        }
        children.sort_by(|a, b| a.0.cmp(&b.0));

        for (child, is_dir) in children {
            entries.push(Entry {
                path: child.clone(),
                is_dir,
            });
            if is_dir {
                self.walk(&child, entries)?;
            }
        }

        Ok(())
    }
}

impl TemplateSource for FsSource {
    fn root(&self) -> &Path {
        &self.root
    }

    fn list(&self) -> Result<Vec<Entry>, SourceError> {
        let mut entries = Vec::new();
        self.walk(Path::new(""), &mut entries)?;
        tracing::debug!(root = %self.root.display(), count = entries.len(), "Listed template source");
        Ok(entries)
    }

    fn stat(&self, path: &Path) -> Result<EntryInfo, SourceError> {
        let full_path = self.resolve(path)?;
        let metadata = fs::metadata(&full_path)
            .map_err(|e| SourceError::io(e, path).with_backend(BACKEND))?;
        Ok(EntryInfo {
            is_dir: metadata.is_dir(),
        })
    }

    fn read(&self, path: &Path) -> Result<String, SourceError> {
        let full_path = self.resolve(path)?;
        fs::read_to_string(&full_path).map_err(|e| SourceError::io(e, path).with_backend(BACKEND))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::SourceErrorKind;

    fn assert_send_sync<T: Send + Sync>() {}

    fn create_site() -> tempfile::TempDir {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("index.html"), "<h1>Home</h1>").unwrap();
        fs::create_dir(temp_dir.path().join("partials")).unwrap();
        fs::write(
            temp_dir.path().join("partials/footer.html"),
            "<footer></footer>",
        )
        .unwrap();
        temp_dir
    }

    #[test]
    fn test_fs_source_is_send_sync() {
        assert_send_sync::<FsSource>();
    }

    #[test]
    fn test_list_empty_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = FsSource::new(temp_dir.path().to_path_buf());

        assert!(source.list().unwrap().is_empty());
    }

    #[test]
    fn test_list_missing_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = FsSource::new(temp_dir.path().join("missing"));

        let err = source.list().unwrap_err();

        assert_eq!(err.kind(), SourceErrorKind::NotFound);
        assert_eq!(err.backend(), Some("Fs"));
    }

    #[test]
    fn test_list_nested_structure() {
        let temp_dir = create_site();
        let source = FsSource::new(temp_dir.path().to_path_buf());

        let entries = source.list().unwrap();

        assert_eq!(
            entries,
            vec![
                Entry::file("index.html"),
                Entry::dir("partials"),
                Entry::file("partials/footer.html"),
            ]
        );
    }

    #[test]
    fn test_list_deeply_nested() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(temp_dir.path().join("a/b/c")).unwrap();
        fs::write(temp_dir.path().join("a/b/c/deep.html"), "deep").unwrap();
        let source = FsSource::new(temp_dir.path().to_path_buf());

        let entries = source.list().unwrap();

        assert_eq!(
            entries,
            vec![
                Entry::dir("a"),
                Entry::dir("a/b"),
                Entry::dir("a/b/c"),
                Entry::file("a/b/c/deep.html"),
            ]
        );
    }

    #[test]
    fn test_stat_file_and_dir() {
        let temp_dir = create_site();
        let source = FsSource::new(temp_dir.path().to_path_buf());

        assert!(!source.stat(Path::new("index.html")).unwrap().is_dir);
        assert!(source.stat(Path::new("partials")).unwrap().is_dir);
        assert!(source.stat(Path::new("")).unwrap().is_dir);
    }

    #[test]
    fn test_stat_missing() {
        let temp_dir = create_site();
        let source = FsSource::new(temp_dir.path().to_path_buf());

        let err = source.stat(Path::new("gone.html")).unwrap_err();

        assert_eq!(err.kind(), SourceErrorKind::NotFound);
        assert_eq!(err.path(), Some(Path::new("gone.html")));
    }

    #[test]
    fn test_stat_rejects_traversal() {
        let temp_dir = create_site();
        let source = FsSource::new(temp_dir.path().to_path_buf());

        let err = source.stat(Path::new("../index.html")).unwrap_err();

        assert_eq!(err.kind(), SourceErrorKind::InvalidPath);
    }

    #[test]
    fn test_read_content() {
        let temp_dir = create_site();
        let source = FsSource::new(temp_dir.path().to_path_buf());

        let content = source.read(Path::new("partials/footer.html")).unwrap();

        assert_eq!(content, "<footer></footer>");
    }

    #[test]
    fn test_read_reflects_changes() {
        let temp_dir = create_site();
        let source = FsSource::new(temp_dir.path().to_path_buf());

        fs::write(temp_dir.path().join("index.html"), "<h1>Changed</h1>").unwrap();

        assert_eq!(
            source.read(Path::new("index.html")).unwrap(),
            "<h1>Changed</h1>"
        );
    }

    #[test]
    fn test_read_invalid_utf8() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("bad.html"), [0xff, 0xfe, 0xfd]).unwrap();
        let source = FsSource::new(temp_dir.path().to_path_buf());

        let err = source.read(Path::new("bad.html")).unwrap_err();

        assert_eq!(err.kind(), SourceErrorKind::InvalidData);
    }
}
