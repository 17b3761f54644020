//! File-system notifications driving the [`LogTailer`].
//!
//! A [`notify`] watcher on the log directory forwards raw events over a
//! channel to a background task. Creation of the tracked file resets the
//! tailer; modification reads the appended lines on the blocking pool and
//! hands them to the [`LinePipeline`]. Events are handled one at a time, in
//! arrival order. Events for other files are ignored.

use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::reader::LinePipeline;
use crate::tailer::LogTailer;

/// What a raw notification means for the tracked file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileNotification {
    /// The file was created (or recreated); its position must be reset.
    Recreated,
    /// The file was written to.
    Changed,
}

/// Map a raw notification to its meaning for the file named `file_name`.
///
/// A rename onto the file counts as recreation; a rename away from it is
/// ignored. Returns `None` for events about other files and for event kinds
/// that do not affect the content (access, removal, ...).
pub fn classify_notification(event: &Event, file_name: &OsStr) -> Option<FileNotification> {
    let concerns_file = event
        .paths
        .iter()
        .any(|path| path.file_name() == Some(file_name));
    if !concerns_file {
        return None;
    }

    match event.kind {
        EventKind::Create(_) => Some(FileNotification::Recreated),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => None,
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            // Paths are [from, to]; only a rename onto the file replaces it.
            let onto_file = event
                .paths
                .last()
                .is_some_and(|path| path.file_name() == Some(file_name));
            onto_file.then_some(FileNotification::Recreated)
        }
        EventKind::Modify(ModifyKind::Name(_)) => Some(FileNotification::Recreated),
        EventKind::Modify(_) => Some(FileNotification::Changed),
        _ => None,
    }
}

/// Keeps the OS watcher and its event task alive. Dropping it stops both.
pub struct LogWatcher {
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl std::fmt::Debug for LogWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogWatcher")
            .field("finished", &self.task.is_finished())
            .finish_non_exhaustive()
    }
}

impl LogWatcher {
    /// Watch the tailer's directory and feed new lines into `pipeline`.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the tailer path has no directory or file name, or
    /// if the OS watcher cannot be created or armed.
    pub fn spawn(tailer: Arc<LogTailer>, pipeline: Arc<LinePipeline>) -> anyhow::Result<Self> {
        let path = tailer.path();
        let dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf();
        let file_name = path
            .file_name()
            .with_context(|| format!("log path {} has no file name", path.display()))?
            .to_os_string();

        let (tx, mut rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
        let mut watcher = notify::recommended_watcher(move |event: notify::Result<Event>| {
            if tx.send(event).is_err() {
                debug!("log watcher receiver dropped");
            }
        })
        .context("failed to create file watcher")?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("failed to watch {}", dir.display()))?;

        info!(dir = %dir.display(), file = ?file_name, "log watcher armed");

        let task = tokio::spawn(async move {
            while let Some(result) = rx.recv().await {
                let event = match result {
                    Ok(event) => event,
                    Err(e) => {
                        warn!(error = %e, "log watcher error");
                        continue;
                    }
                };

                match classify_notification(&event, &file_name) {
                    Some(FileNotification::Recreated) => tailer.reset(),
                    Some(FileNotification::Changed) => {
                        let reader = Arc::clone(&tailer);
                        match tokio::task::spawn_blocking(move || reader.read_new_lines()).await {
                            Ok(Ok(lines)) => pipeline.process_lines(&lines),
                            Ok(Err(e)) => warn!(error = %e, "failed to read log update"),
                            Err(e) => warn!(error = %e, "log read task failed"),
                        }
                    }
                    None => {}
                }
            }
        });

        Ok(Self {
            _watcher: watcher,
            task,
        })
    }
}

impl Drop for LogWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}
