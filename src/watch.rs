//! Change notifications for a single render file

use crate::error::{Error, Result};
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher, recommended_watcher};
use std::ffi::OsString;
use std::path::Path;
use tokio::sync::mpsc::{self, Receiver};

/// Watches one file and reports when its contents may have changed.
///
/// The parent directory is watched rather than the file itself, so editors
/// that save by writing a temporary file and renaming it over the original are
/// still seen. Bursts of events collapse into a single pending notification;
/// debouncing is left to [`crate::RenderScheduler`].
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    changes: Receiver<()>,
}

impl FileWatcher {
    /// Start watching `path`.
    pub fn spawn(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(OsString::from)
            .ok_or_else(|| Error::Watch(format!("{} is not a file path", path.display())))?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => Path::new(".").to_path_buf(),
        };

        let (tx, changes) = mpsc::channel(1);
        let mut watcher = recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) if touches(&event, &name) => {
                // Full means a change is already pending.
                let _ = tx.try_send(());
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("watch error: {e}"),
        })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::debug!(dir = %dir.display(), "notify watcher initialized");
        Ok(Self {
            _watcher: watcher,
            changes,
        })
    }

    /// Wait for the next change. Returns `None` once the watcher has stopped.
    pub async fn changed(&mut self) -> Option<()> {
        self.changes.recv().await
    }
}

fn touches(event: &Event, name: &OsString) -> bool {
    let relevant = matches!(
        event.kind,
        EventKind::Create(_)
            | EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Name(_) | ModifyKind::Any)
    );
    relevant
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(name.as_os_str()))
}
