//! Watches a session's script file for changes made by other programs.
//!
//! The watch is placed on the file's parent directory and filtered by file
//! name, so editors that save through a temp file + rename are still seen.
//! Raw notifications go to a debounce thread; once a burst has been quiet for
//! the debounce interval a single `SessionCommand::FileChanged` is queued for
//! the session. Nothing here touches session state.

use notify::event::ModifyKind;
use notify::{recommended_watcher, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{Result, SessionError};
use crate::session::SessionCommand;

/// Per-session file watch: `Unwatched` or `Watched(path)`
pub struct FileWatch {
    commands: Sender<SessionCommand>,
    debounce: Duration,
    generation: u64,
    active: Option<ActiveWatch>,
}

struct ActiveWatch {
    path: PathBuf,
    generation: u64,
    cancelled: Arc<AtomicBool>,
    _watcher: RecommendedWatcher,
}

impl Drop for ActiveWatch {
    fn drop(&mut self) {
        // Checked by the debounce thread before it emits
        self.cancelled.store(true, Ordering::Release);
        info!(
            path = %self.path.display(),
            generation = self.generation,
            "Script watch torn down"
        );
    }
}

impl FileWatch {
    pub fn new(commands: Sender<SessionCommand>, debounce: Duration) -> Self {
        FileWatch {
            commands,
            debounce,
            generation: 0,
            active: None,
        }
    }

    /// Watch `path`, tearing down any previous watch first.
    ///
    /// Returns the generation stamped on every `FileChanged` this watch emits.
    pub fn bind(&mut self, path: &Path) -> Result<u64> {
        self.unbind();
        self.generation += 1;
        let generation = self.generation;

        let file_name = path
            .file_name()
            .map(|name| name.to_os_string())
            .ok_or_else(|| {
                SessionError::FileWatch(format!("{} has no file name", path.display()))
            })?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (raw_tx, raw_rx) = channel::<()>();
        let mut watcher = recommended_watcher(move |res: notify::Result<notify::Event>| match res {
            Ok(event) => {
                if is_relevant_change(&event, &file_name) {
                    let _ = raw_tx.send(());
                }
            }
            Err(e) => warn!(error = %e, watcher = "script", "File watcher error"),
        })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        let cancelled = Arc::new(AtomicBool::new(false));
        let commands = self.commands.clone();
        spawn_debouncer(raw_rx, self.debounce, cancelled.clone(), move || {
            debug!(generation, "Script file settled, queueing reload");
            commands
                .send(SessionCommand::FileChanged { generation })
                .is_ok()
        })
        .map_err(|e| SessionError::FileWatch(format!("could not spawn debounce thread: {e}")))?;

        info!(
            dir = %dir.display(),
            path = %path.display(),
            generation,
            "Script watch started"
        );
        self.active = Some(ActiveWatch {
            path: path.to_path_buf(),
            generation,
            cancelled,
            _watcher: watcher,
        });
        Ok(generation)
    }

    /// Drop the current watch, if any. Safe to call repeatedly.
    pub fn unbind(&mut self) {
        if let Some(active) = self.active.take() {
            drop(active);
        }
    }

    pub fn watched_path(&self) -> Option<&Path> {
        self.active.as_ref().map(|active| active.path.as_path())
    }

    /// Generation of the armed watch, if any
    pub fn current_generation(&self) -> Option<u64> {
        self.active.as_ref().map(|active| active.generation)
    }

    /// Whether `generation` belongs to the watch that is currently armed
    pub fn is_current(&self, generation: u64) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.generation == generation)
    }

    pub fn set_debounce(&mut self, debounce: Duration) {
        self.debounce = debounce;
    }
}

/// Create/modify events that name the watched file. Metadata-only changes
/// (touch, chmod) are ignored.
fn is_relevant_change(event: &notify::Event, file_name: &OsString) -> bool {
    let is_relevant_kind = matches!(
        event.kind,
        EventKind::Create(_)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Name(_))
            | EventKind::Modify(ModifyKind::Any)
    );
    is_relevant_kind
        && event
            .paths
            .iter()
            .any(|path| path.file_name() == Some(file_name.as_os_str()))
}

/// Coalesce bursts of events from `events` into single `fire` calls.
///
/// After an event arrives the thread waits for `interval` of silence; every
/// further event restarts the wait. Then `fire` runs once, unless `cancelled`
/// has been set. The thread exits when the sender side is dropped, when
/// cancelled, or when `fire` returns false.
pub fn spawn_debouncer<T, F>(
    events: Receiver<T>,
    interval: Duration,
    cancelled: Arc<AtomicBool>,
    mut fire: F,
) -> std::io::Result<thread::JoinHandle<()>>
where
    T: Send + 'static,
    F: FnMut() -> bool + Send + 'static,
{
    thread::Builder::new()
        .name("script-watch-debounce".to_string())
        .spawn(move || {
            while events.recv().is_ok() {
                loop {
                    match events.recv_timeout(interval) {
                        Ok(_) => continue,
                        Err(RecvTimeoutError::Timeout) => break,
                        Err(RecvTimeoutError::Disconnected) => return,
                    }
                }
                if cancelled.load(Ordering::Acquire) {
                    return;
                }
                if !fire() {
                    return;
                }
            }
        })
}
