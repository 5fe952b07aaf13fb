//! File-system watch loop.
//!
//! Directories are subscribed one by one (non-recursively) so that newly
//! created directories can be picked up as they appear. Events are handled
//! strictly in arrival order; each qualifying change runs the reload pipeline
//! to completion before the next event is looked at.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hotpage_source::TemplateSource;
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::error::{FatalError, WatchError};
use super::pipeline::ReloadPipeline;

/// Raw watcher results queued between the notify thread and the loop.
const EVENT_BUFFER: usize = 100;

/// Receiving end of the watcher's event stream.
pub type EventReceiver = mpsc::Receiver<notify::Result<Event>>;

/// Something that can subscribe a single directory for change events.
pub trait DirWatcher: Send {
    /// Start watching `path` (not its subdirectories).
    fn watch_dir(&mut self, path: &Path) -> notify::Result<()>;
}

impl<W: Watcher + Send> DirWatcher for W {
    fn watch_dir(&mut self, path: &Path) -> notify::Result<()> {
        self.watch(path, RecursiveMode::NonRecursive)
    }
}

/// Kind of change a watcher event represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    Create,
    Write,
    Remove,
}

/// Map a notify event kind onto the changes the loop reacts to.
///
/// Renames surface as a create for the new name; the old name no longer
/// stats and is skipped later.
#[must_use]
pub fn classify(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_)
        | EventKind::Modify(ModifyKind::Name(RenameMode::To | RenameMode::Both | RenameMode::Any)) => {
            Some(ChangeKind::Create)
        }
        EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any) => Some(ChangeKind::Write),
        EventKind::Remove(_) => Some(ChangeKind::Remove),
        _ => None,
    }
}

/// Watch loop over one template root.
pub struct WatchLoop<W> {
    source: Arc<dyn TemplateSource>,
    watcher: W,
    watched: BTreeSet<PathBuf>,
    pipeline: ReloadPipeline,
}

impl WatchLoop<RecommendedWatcher> {
    /// Create the platform watcher, subscribe every directory under the
    /// source root and spawn the loop.
    ///
    /// A runtime fatal error is sent on `fatal_tx` before the task exits.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError`] if the watcher cannot be created, the source
    /// cannot be listed, or any directory cannot be subscribed.
    pub fn start(
        source: Arc<dyn TemplateSource>,
        pipeline: ReloadPipeline,
        fatal_tx: mpsc::Sender<FatalError>,
    ) -> Result<JoinHandle<()>, WatchError> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);

        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            // Callback runs on the notify thread
            let _ = tx.blocking_send(res);
        })
        .map_err(WatchError::Create)?;

        let watch_loop = WatchLoop::with_watcher(source, watcher, pipeline)?;
        tracing::info!(
            root = %watch_loop.source.root().display(),
            directories = watch_loop.watched.len(),
            "Watching templates"
        );

        Ok(tokio::spawn(async move {
            let fatal = watch_loop.run(rx).await;
            tracing::error!(error = %fatal, "Live reload stopped");
            let _ = fatal_tx.send(fatal).await;
        }))
    }
}

impl<W: DirWatcher> WatchLoop<W> {
    /// Subscribe the root and every directory the source lists.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError`] on the first listing or subscription failure.
    pub fn with_watcher(
        source: Arc<dyn TemplateSource>,
        mut watcher: W,
        pipeline: ReloadPipeline,
    ) -> Result<Self, WatchError> {
        let root = source.root().to_path_buf();
        let mut watched = BTreeSet::new();

        watch(&mut watcher, &root)?;
        watched.insert(root.clone());

        for entry in source.list()? {
            if entry.is_dir {
                let path = root.join(&entry.path);
                watch(&mut watcher, &path)?;
                watched.insert(path);
            }
        }

        Ok(Self {
            source,
            watcher,
            watched,
            pipeline,
        })
    }

    /// Directories currently subscribed.
    #[must_use]
    pub fn watched_dirs(&self) -> &BTreeSet<PathBuf> {
        &self.watched
    }

    /// Consume events until the stream closes or a fatal error occurs.
    pub async fn run(mut self, mut rx: EventReceiver) -> FatalError {
        loop {
            match rx.recv().await {
                Some(Ok(event)) => {
                    if let Err(fatal) = self.handle_event(event).await {
                        return fatal;
                    }
                }
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "File watcher error");
                }
                None => return FatalError::WatcherClosed,
            }
        }
    }

    /// Handle one watcher event.
    ///
    /// # Errors
    ///
    /// Returns [`FatalError`] if the reload pipeline hits a fatal condition.
    pub async fn handle_event(&mut self, event: Event) -> Result<(), FatalError> {
        let Some(change) = classify(&event.kind) else {
            return Ok(());
        };

        for path in &event.paths {
            let Ok(relative) = path.strip_prefix(self.source.root()) else {
                tracing::debug!(path = %path.display(), "Ignoring event outside template root");
                continue;
            };

            if change == ChangeKind::Remove && self.watched.contains(path) {
                // The backend drops watches on deleted directories by itself
                self.watched.retain(|dir| !dir.starts_with(path));
                tracing::info!(path = %relative.display(), "Stopped watching removed directory");
                continue;
            }

            let info = match self.source.stat(relative) {
                Ok(info) => info,
                Err(e) => {
                    tracing::warn!(path = %relative.display(), error = %e, "Skipping change");
                    continue;
                }
            };

            if info.is_dir && change == ChangeKind::Create {
                match self.watcher.watch_dir(path) {
                    Ok(()) => {
                        tracing::info!(path = %relative.display(), "Watching new directory");
                        self.watched.insert(path.clone());
                    }
                    Err(e) => {
                        tracing::warn!(path = %relative.display(), error = %e, "Could not watch new directory");
                    }
                }
                continue;
            }

            let Some(file_name) = path.file_name() else {
                continue;
            };
            let file_name = file_name.to_string_lossy();
            tracing::debug!(path = %relative.display(), ?change, "Template changed");

            self.pipeline.reload(&file_name).await?;
        }

        Ok(())
    }
}

fn watch<W: DirWatcher>(watcher: &mut W, path: &Path) -> Result<(), WatchError> {
    watcher
        .watch_dir(path)
        .map_err(|source| WatchError::Watch {
            path: path.to_path_buf(),
            source,
        })
}
