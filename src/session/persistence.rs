//! Load / save / save-as and the unsaved-changes gate.
//!
//! Every action that would throw away the current text (open, new, loading a
//! built-in script, close) goes through `confirm_discard_or_save` first.
//! `Ok(false)` from these methods means the user cancelled; only storage
//! failures are errors.

use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

use crate::builtin_scripts;
use crate::error::{Result, SessionError};
use crate::prompt::{SavePromptChoice, LUA_FILTER};

use super::state::ScriptSession;

/// Name proposed when saving a script that has never been saved
pub const DEFAULT_SCRIPT_NAME: &str = "NewScript.lua";

impl ScriptSession {
    /// Read `path` and make it this session's script.
    ///
    /// On a read failure nothing changes. On success the path goes to the
    /// front of the recent list, the watch moves to it, and the script is
    /// started if `auto_start_on_load` is set.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let path = absolute_path(path);
        let path = path.as_path();
        let content = self.storage.read(path).map_err(|source| SessionError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        self.bind_file(path);
        self.replace_contents(content);
        self.log_state("load");

        if self.config.auto_start_on_load {
            self.run();
        }
        Ok(())
    }

    /// Write pending edits to the script's file.
    ///
    /// Without a file this is a save-as proposing [`DEFAULT_SCRIPT_NAME`].
    /// With a file and no edits nothing is written.
    #[instrument(skip(self))]
    pub fn save_in_place(&mut self) -> Result<bool> {
        let Some(path) = self.file_path.clone() else {
            return self.save_as(DEFAULT_SCRIPT_NAME);
        };

        if !self.is_dirty() {
            debug!("No changes to save");
            return Ok(true);
        }

        self.write_text(&path)?;
        self.saved_text.clone_from(&self.text);
        self.log_state("save");
        Ok(true)
    }

    /// Ask for a destination and write the text there.
    ///
    /// A cancelled prompt returns `Ok(false)` and changes nothing. On success
    /// the session is bound to the new path exactly as after a load.
    #[instrument(skip(self))]
    pub fn save_as(&mut self, proposed_name: &str) -> Result<bool> {
        let initial_dir = self.initial_dir();
        let Some(path) =
            self.prompts
                .choose_save_path(initial_dir.as_deref(), proposed_name, &LUA_FILTER)
        else {
            info!("Save cancelled");
            return Ok(false);
        };
        let path = absolute_path(&path);

        self.write_text(&path)?;
        self.saved_text.clone_from(&self.text);
        self.bind_file(&path);
        self.log_state("save_as");
        Ok(true)
    }

    /// Save-as proposing the current script name
    pub fn save_as_current_name(&mut self) -> Result<bool> {
        let proposed = if self.display_name.is_empty() {
            DEFAULT_SCRIPT_NAME.to_string()
        } else {
            self.display_name.clone()
        };
        self.save_as(&proposed)
    }

    /// Gate run before anything that would destroy the current text.
    ///
    /// Returns `Ok(true)` if the pending action may go ahead.
    pub fn confirm_discard_or_save(&mut self) -> Result<bool> {
        if !self.is_dirty() {
            return Ok(true);
        }

        match self.prompts.confirm_discard_or_save() {
            SavePromptChoice::Save => self.save_in_place(),
            SavePromptChoice::Discard => {
                info!("Unsaved changes discarded");
                Ok(true)
            }
            SavePromptChoice::Cancel => {
                info!("Pending action cancelled at unsaved-changes prompt");
                Ok(false)
            }
        }
    }

    /// Ask for a script and load it
    pub fn open(&mut self) -> Result<bool> {
        if !self.confirm_discard_or_save()? {
            return Ok(false);
        }

        let initial_dir = self.initial_dir();
        match self
            .prompts
            .choose_open_path(initial_dir.as_deref(), &LUA_FILTER)
        {
            Some(path) => self.load(&path).map(|()| true),
            None => Ok(false),
        }
    }

    /// Load a known path (e.g. from the recent scripts list)
    pub fn open_path(&mut self, path: &Path) -> Result<bool> {
        if !self.confirm_discard_or_save()? {
            return Ok(false);
        }
        self.load(path).map(|()| true)
    }

    /// Start over with an empty, unsaved script. The engine is not touched.
    pub fn new_script(&mut self) -> Result<bool> {
        if !self.confirm_discard_or_save()? {
            return Ok(false);
        }
        self.detach_file();
        self.replace_contents(String::new());
        self.log_state("new");
        Ok(true)
    }

    /// Load an embedded example script as an unsaved script named after it
    pub fn load_builtin(&mut self, name: &str) -> Result<bool> {
        let script = builtin_scripts::get(name)
            .ok_or_else(|| SessionError::UnknownBuiltin(name.to_string()))?;
        if !self.confirm_discard_or_save()? {
            return Ok(false);
        }

        self.detach_file();
        self.display_name = script.name.to_string();
        self.replace_contents(script.code.to_string());
        self.log_state("load_builtin");

        if self.config.auto_start_on_load {
            self.run();
        }
        Ok(true)
    }

    fn write_text(&self, path: &Path) -> Result<()> {
        self.storage
            .write(path, &self.text)
            .map_err(|source| SessionError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        info!(path = %path.display(), bytes = self.text.len(), "Script written");
        Ok(())
    }

    /// Point the session at `path`: name, recent list and file watch
    fn bind_file(&mut self, path: &Path) {
        self.file_path = Some(path.to_path_buf());
        self.display_name = display_name_for(path);
        self.recent_scripts.lock().add(path);

        if let Err(e) = self.watch.bind(path) {
            warn!(
                error = %e,
                path = %path.display(),
                "External changes to this script will not be noticed"
            );
        }
    }
}

/// Paths are kept absolute so the recent list never holds two spellings of
/// the same file.
fn absolute_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|e| {
        debug!(error = %e, path = %path.display(), "Could not make path absolute");
        path.to_path_buf()
    })
}

fn display_name_for(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
