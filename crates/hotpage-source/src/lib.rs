//! Template source abstraction for hotpage.
//!
//! This crate provides a [`TemplateSource`] trait for abstracting the file tree
//! that templates are compiled from. This enables:
//!
//! - **Unit testing** without touching the real filesystem
//! - **Clean separation** between the reload engine and I/O operations
//!
//! # Architecture
//!
//! The crate provides:
//! - [`TemplateSource`] trait with `list()`, `stat()`, and `read()` methods
//! - [`FsSource`] implementation backed by a directory on disk
//! - [`MockSource`] for testing (behind `mock` feature flag)
//!
//! All paths passed to and returned from a source are relative to its root.
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use hotpage_source::{FsSource, TemplateSource};
//!
//! let source = FsSource::new(PathBuf::from("www"));
//! for entry in source.list()? {
//!     println!("{} (dir: {})", entry.path.display(), entry.is_dir);
//! }
//! ```

mod fs;
#[cfg(feature = "mock")]
mod mock;
mod source;

pub use fs::FsSource;
#[cfg(feature = "mock")]
pub use mock::MockSource;
pub use source::{Entry, EntryInfo, SourceError, SourceErrorKind, TemplateSource};
