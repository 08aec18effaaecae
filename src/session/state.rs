use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::engine::ScriptEngine;
use crate::execution::{ExecutionController, ExecutionState, ScriptHandle};
use crate::prompt::PromptService;
use crate::recent_scripts::SharedRecentScripts;
use crate::storage::Storage;
use crate::watcher::FileWatch;

use super::commands::SessionCommand;

/// Title shown when no script name is known
pub const WINDOW_TITLE: &str = "Script Window";

/// External collaborators a session calls into
#[derive(Clone)]
pub struct SessionServices {
    pub storage: Arc<dyn Storage>,
    pub engine: Arc<dyn ScriptEngine>,
    pub prompts: Arc<dyn PromptService>,
    pub recent_scripts: SharedRecentScripts,
}

pub struct ScriptSession {
    pub(super) text: String,
    /// Text as of the last successful load or save; only used for dirtiness
    pub(super) saved_text: String,
    pub(super) file_path: Option<PathBuf>,
    pub(super) display_name: String,
    pub(super) config: SessionConfig,
    pub(super) storage: Arc<dyn Storage>,
    pub(super) prompts: Arc<dyn PromptService>,
    pub(super) recent_scripts: SharedRecentScripts,
    pub(super) execution: ExecutionController,
    pub(super) watch: FileWatch,
    pub(super) commands_tx: Sender<SessionCommand>,
    pub(super) commands_rx: Receiver<SessionCommand>,
    pub(super) closed: bool,
}

impl ScriptSession {
    /// Create an empty, unsaved session
    pub fn new(services: SessionServices, config: SessionConfig) -> Self {
        let (commands_tx, commands_rx) = channel();
        let watch = FileWatch::new(commands_tx.clone(), config.reload_debounce());
        let execution = ExecutionController::new(services.engine, config.engine_call_timeout());
        services
            .recent_scripts
            .lock()
            .set_max_len(config.max_recent_scripts);

        ScriptSession {
            text: String::new(),
            saved_text: String::new(),
            file_path: None,
            display_name: String::new(),
            config,
            storage: services.storage,
            prompts: services.prompts,
            recent_scripts: services.recent_scripts,
            execution,
            watch,
            commands_tx,
            commands_rx,
            closed: false,
        }
    }

    /// Replace the configuration, e.g. after the user changed settings
    pub fn apply_config(&mut self, config: SessionConfig) {
        self.watch.set_debounce(config.reload_debounce());
        self.execution.set_call_timeout(config.engine_call_timeout());
        self.recent_scripts
            .lock()
            .set_max_len(config.max_recent_scripts);
        debug!(?config, "Session config applied");
        self.config = config;
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Sender for feeding commands into this session's loop
    pub fn command_sender(&self) -> Sender<SessionCommand> {
        self.commands_tx.clone()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the edited text. Only `text` changes; the saved snapshot does not.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// True iff the text differs from the last loaded/saved snapshot
    pub fn is_dirty(&self) -> bool {
        self.text != self.saved_text
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn window_title(&self) -> String {
        if self.display_name.trim().is_empty() {
            WINDOW_TITLE.to_string()
        } else {
            format!("{} - {}", WINDOW_TITLE, self.display_name)
        }
    }

    pub fn execution_state(&self) -> ExecutionState {
        self.execution.state()
    }

    pub fn running_handle(&self) -> Option<ScriptHandle> {
        self.execution.running_handle()
    }

    /// Path of the file currently being watched, if any
    pub fn watched_path(&self) -> Option<&Path> {
        self.watch.watched_path()
    }

    pub fn watch_generation(&self) -> Option<u64> {
        self.watch.current_generation()
    }

    pub fn recent_scripts(&self) -> Vec<PathBuf> {
        self.recent_scripts.lock().list().to_vec()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Folder open/save dialogs start in: that of the most recent script
    pub(super) fn initial_dir(&self) -> Option<PathBuf> {
        self.recent_scripts
            .lock()
            .most_recent()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
    }

    /// Take new text as both the edited text and the saved snapshot
    pub(super) fn replace_contents(&mut self, content: String) {
        self.saved_text.clone_from(&content);
        self.text = content;
    }

    /// Drop the association with a file: no path, no name, no watch
    pub(super) fn detach_file(&mut self) {
        self.watch.unbind();
        self.file_path = None;
        self.display_name.clear();
    }

    pub(super) fn log_state(&self, action: &str) {
        info!(
            action,
            path = ?self.file_path,
            script = %self.display_name,
            dirty = self.is_dirty(),
            state = ?self.execution.state(),
            "Session updated"
        );
    }
}
