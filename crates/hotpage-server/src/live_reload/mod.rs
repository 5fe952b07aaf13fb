//! Live reload subsystem.
//!
//! Watches the template root, recompiles templates on change and pushes the
//! rendered changed template to the single registered WebSocket connection.

mod channel;
mod error;
mod pipeline;
mod registry;
mod watcher;
mod websocket;

use std::sync::Arc;

use hotpage_source::TemplateSource;
use hotpage_templates::{TemplatePatterns, TemplateSet};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub use channel::{FrameReceiver, NotificationChannel, TextFrameWriter};
pub use error::{ChannelError, FatalError, WatchError};
pub use pipeline::{ReloadOutcome, ReloadPipeline};
pub use registry::ConnectionRegistry;
pub use watcher::{ChangeKind, DirWatcher, EventReceiver, WatchLoop, classify};
pub(crate) use websocket::ws_handler;

/// Running live reload subsystem.
///
/// Dropping it aborts the watch task.
#[derive(Debug)]
pub struct LiveReload {
    registry: ConnectionRegistry,
    task: JoinHandle<()>,
}

impl LiveReload {
    /// Start watching `source` and reloading into `templates`.
    ///
    /// # Arguments
    ///
    /// * `source` - Template source rooted at the watched directory
    /// * `templates` - Live template set shared with request handlers
    /// * `patterns` - Patterns selecting template files
    /// * `fatal_tx` - Receives the error that stops the subsystem at runtime
    ///
    /// # Errors
    ///
    /// Returns [`WatchError`] if the root or any subdirectory cannot be
    /// watched.
    pub fn start(
        source: Arc<dyn TemplateSource>,
        templates: Arc<TemplateSet>,
        patterns: TemplatePatterns,
        fatal_tx: mpsc::Sender<FatalError>,
    ) -> Result<Self, WatchError> {
        let registry = ConnectionRegistry::new();
        let pipeline = ReloadPipeline::new(
            Arc::clone(&source),
            patterns,
            templates,
            registry.clone(),
        );
        let task = WatchLoop::start(source, pipeline, fatal_tx)?;

        Ok(Self { registry, task })
    }

    /// Registry the accept handler stores connections in.
    #[must_use]
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }
}

impl Drop for LiveReload {
    fn drop(&mut self) {
        self.task.abort();
    }
}
