//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

/// Reload the script when its file is changed by another program
pub const DEFAULT_AUTO_RELOAD_ON_EXTERNAL_CHANGE: bool = true;

/// Write pending edits to disk before handing the script to the engine
pub const DEFAULT_SAVE_BEFORE_RUN: bool = false;

/// Start the script as soon as it has been loaded
pub const DEFAULT_AUTO_START_ON_LOAD: bool = false;

/// Number of entries kept in the recent scripts list
pub const DEFAULT_MAX_RECENT_SCRIPTS: usize = 10;

/// Quiet period after the last change notification before the file is re-read
pub const DEFAULT_RELOAD_DEBOUNCE_MS: u64 = 100;

/// Upper bound on a single start/stop call into the script engine
pub const DEFAULT_ENGINE_CALL_TIMEOUT_MS: u64 = 2000;

/// Config file location, relative to the home directory
pub const CONFIG_DIR_NAME: &str = ".script-session";
pub const CONFIG_FILE_NAME: &str = "config.json";
