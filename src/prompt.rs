//! User prompts the session needs answered.
//!
//! Dialog rendering belongs to the presentation layer; the session only sees
//! the answers through [`PromptService`].

use std::path::{Path, PathBuf};

/// Answer to "you have unsaved changes - save them?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavePromptChoice {
    Save,
    Discard,
    Cancel,
}

/// File type filter shown by open/save dialogs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileFilter {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
}

/// Lua scripts (*.lua)
pub const LUA_FILTER: FileFilter = FileFilter {
    name: "Lua scripts",
    extensions: &["lua"],
};

impl FileFilter {
    /// Whether `path` has one of the filter's extensions (case-insensitive)
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}

pub trait PromptService: Send + Sync {
    /// Ask what to do with unsaved changes before they would be destroyed
    fn confirm_discard_or_save(&self) -> SavePromptChoice;

    /// Ask for a script to open. `None` means the user cancelled.
    fn choose_open_path(&self, initial_dir: Option<&Path>, filter: &FileFilter) -> Option<PathBuf>;

    /// Ask where to save. `None` means the user cancelled.
    fn choose_save_path(
        &self,
        initial_dir: Option<&Path>,
        proposed_name: &str,
        filter: &FileFilter,
    ) -> Option<PathBuf>;
}

/// Non-interactive prompts for the headless runner.
///
/// Unsaved changes get a fixed answer, open dialogs are always cancelled and
/// save dialogs accept the proposed name inside the initial directory (or
/// `fallback_dir` when there is none).
#[derive(Debug, Clone)]
pub struct HeadlessPrompts {
    pub unsaved_changes: SavePromptChoice,
    pub fallback_dir: PathBuf,
}

impl HeadlessPrompts {
    pub fn new(unsaved_changes: SavePromptChoice, fallback_dir: PathBuf) -> Self {
        Self {
            unsaved_changes,
            fallback_dir,
        }
    }
}

impl PromptService for HeadlessPrompts {
    fn confirm_discard_or_save(&self) -> SavePromptChoice {
        self.unsaved_changes
    }

    fn choose_open_path(&self, _initial_dir: Option<&Path>, _filter: &FileFilter) -> Option<PathBuf> {
        None
    }

    fn choose_save_path(
        &self,
        initial_dir: Option<&Path>,
        proposed_name: &str,
        _filter: &FileFilter,
    ) -> Option<PathBuf> {
        let dir = initial_dir.unwrap_or(&self.fallback_dir);
        Some(dir.join(proposed_name))
    }
}
