//! Execution and the serialized command loop.

use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{Result, ResultExt};
use crate::execution::ExecutionState;

use super::commands::SessionCommand;
use super::state::ScriptSession;

impl ScriptSession {
    /// Hand the current text to the engine.
    ///
    /// With `save_before_run` and a backing file, pending edits are saved
    /// first; a failed save is logged and the run goes ahead anyway.
    pub fn run(&mut self) -> ExecutionState {
        if self.config.save_before_run && self.file_path.is_some() {
            self.save_in_place().warn_on_err();
        }
        let state = self.execution.start(&self.display_name, &self.text);
        self.log_state("run");
        state
    }

    /// Stop the script. Always leaves the session idle.
    pub fn stop(&mut self) {
        self.execution.stop();
        self.log_state("stop");
    }

    /// End the session: gate on unsaved changes, stop the script and drop the
    /// watch. Returns `Ok(false)` if the user cancelled.
    pub fn close(&mut self) -> Result<bool> {
        if !self.confirm_discard_or_save()? {
            return Ok(false);
        }
        if self.execution.is_running() {
            self.stop();
        }
        self.watch.unbind();
        self.closed = true;
        info!(script = %self.display_name, "Session closed");
        Ok(true)
    }

    /// React to a settled change of the watched file by loading it again.
    ///
    /// The file on disk always wins over unsaved edits; this path skips the
    /// unsaved-changes prompt.
    #[instrument(skip(self))]
    pub(super) fn reload_after_external_change(&mut self, generation: u64) {
        if !self.watch.is_current(generation) {
            debug!("Dropping change notification from a retired watch");
            return;
        }
        if !self.config.auto_reload_on_external_change {
            debug!("Auto reload disabled, ignoring external change");
            return;
        }
        let Some(path) = self.file_path.clone() else {
            return;
        };

        let content = match self.storage.read(&path) {
            Ok(content) => content,
            Err(e) => {
                // Usually a writer still mid-save; its next event retries.
                warn!(error = %e, path = %path.display(), "Reload after external change failed");
                return;
            }
        };

        if self.is_dirty() {
            warn!(path = %path.display(), "External change overwrites unsaved edits");
        }
        self.recent_scripts.lock().add(&path);
        self.replace_contents(content);
        self.log_state("external_reload");

        if self.config.auto_start_on_load {
            self.run();
        }
    }

    /// Apply one command. Returns false once the session has closed.
    pub fn handle_command(&mut self, command: SessionCommand) -> bool {
        debug!(command = command.kind(), "Handling session command");

        match command {
            SessionCommand::SetText { text } => self.set_text(text),
            SessionCommand::New => {
                self.new_script().log_err();
            }
            SessionCommand::Open => {
                self.open().log_err();
            }
            SessionCommand::OpenPath { path } => {
                self.open_path(&path).log_err();
            }
            SessionCommand::OpenBuiltin { name } => {
                self.load_builtin(&name).log_err();
            }
            SessionCommand::Save => {
                self.save_in_place().log_err();
            }
            SessionCommand::SaveAs => {
                self.save_as_current_name().log_err();
            }
            SessionCommand::Run => {
                self.run();
            }
            SessionCommand::Stop => self.stop(),
            SessionCommand::Close => {
                self.close().log_err();
            }
            SessionCommand::FileChanged { generation } => {
                self.reload_after_external_change(generation)
            }
        }

        !self.closed
    }

    /// Handle queued commands, waiting up to `timeout` for the first one.
    ///
    /// Returns how many commands were handled.
    pub fn process_pending(&mut self, timeout: Duration) -> usize {
        let first = match self.commands_rx.recv_timeout(timeout) {
            Ok(command) => command,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => return 0,
        };

        let mut handled = 1;
        if !self.handle_command(first) {
            return handled;
        }
        while let Ok(command) = self.commands_rx.try_recv() {
            handled += 1;
            if !self.handle_command(command) {
                break;
            }
        }
        handled
    }

    /// Handle commands until the session is closed
    pub fn run_command_loop(&mut self) {
        info!(script = %self.display_name, "Session command loop started");
        while !self.closed {
            match self.commands_rx.recv() {
                Ok(command) => {
                    self.handle_command(command);
                }
                Err(_) => {
                    error!("Session command channel closed unexpectedly");
                    break;
                }
            }
        }
        info!("Session command loop finished");
    }
}
