//! Live reload error types.

use std::path::PathBuf;
use std::string::FromUtf8Error;

use hotpage_source::SourceError;

/// Failure on a notification channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The socket side of the channel has gone away.
    #[error("Live reload connection is closed")]
    Closed,

    /// Frame content is not valid UTF-8.
    #[error("Frame is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),
}

/// Failure to start watching the template root.
///
/// Returned from startup only; no partial watch state survives it.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// The platform watcher could not be created.
    #[error("Could not create file watcher: {0}")]
    Create(#[source] notify::Error),

    /// A directory could not be subscribed.
    #[error("Could not watch {}: {source}", path.display())]
    Watch {
        /// Directory that failed.
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    /// The template source could not be traversed.
    #[error("Could not list template directories: {0}")]
    Source(#[from] SourceError),
}

/// Unrecoverable live reload failure, reported to the host.
#[derive(Debug, thiserror::Error)]
pub enum FatalError {
    /// A frame could not be opened on an accepted connection.
    #[error("Live reload transport is unusable: {0}")]
    WriterUnavailable(#[source] ChannelError),

    /// The file watcher stopped delivering events.
    #[error("File watcher event stream closed")]
    WatcherClosed,
}
