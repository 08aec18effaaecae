//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::defaults::*;

/// Options that shape how a script session behaves.
///
/// A copy is handed to each session at construction (and again through
/// `ScriptSession::apply_config`); sessions never read configuration from a
/// global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Re-read the script when another program changes its file (default: true)
    #[serde(default = "default_auto_reload_on_external_change")]
    pub auto_reload_on_external_change: bool,
    /// Save in place before running, when the script has a file (default: false)
    #[serde(default = "default_save_before_run")]
    pub save_before_run: bool,
    /// Run the script after every successful load (default: false)
    #[serde(default = "default_auto_start_on_load")]
    pub auto_start_on_load: bool,
    /// Maximum length of the recent scripts list (default: 10)
    #[serde(default = "default_max_recent_scripts")]
    pub max_recent_scripts: usize,
    /// Debounce interval for external change notifications (default: 100ms)
    #[serde(default = "default_reload_debounce_ms")]
    pub reload_debounce_ms: u64,
    /// Time limit for a single engine start/stop call (default: 2000ms)
    #[serde(default = "default_engine_call_timeout_ms")]
    pub engine_call_timeout_ms: u64,
    /// Recently opened scripts, most recent first
    #[serde(default)]
    pub recent_scripts: Vec<PathBuf>,
}

fn default_auto_reload_on_external_change() -> bool {
    DEFAULT_AUTO_RELOAD_ON_EXTERNAL_CHANGE
}
fn default_save_before_run() -> bool {
    DEFAULT_SAVE_BEFORE_RUN
}
fn default_auto_start_on_load() -> bool {
    DEFAULT_AUTO_START_ON_LOAD
}
fn default_max_recent_scripts() -> usize {
    DEFAULT_MAX_RECENT_SCRIPTS
}
fn default_reload_debounce_ms() -> u64 {
    DEFAULT_RELOAD_DEBOUNCE_MS
}
fn default_engine_call_timeout_ms() -> u64 {
    DEFAULT_ENGINE_CALL_TIMEOUT_MS
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            auto_reload_on_external_change: DEFAULT_AUTO_RELOAD_ON_EXTERNAL_CHANGE,
            save_before_run: DEFAULT_SAVE_BEFORE_RUN,
            auto_start_on_load: DEFAULT_AUTO_START_ON_LOAD,
            max_recent_scripts: DEFAULT_MAX_RECENT_SCRIPTS,
            reload_debounce_ms: DEFAULT_RELOAD_DEBOUNCE_MS,
            engine_call_timeout_ms: DEFAULT_ENGINE_CALL_TIMEOUT_MS,
            recent_scripts: Vec::new(),
        }
    }
}

impl SessionConfig {
    pub fn reload_debounce(&self) -> Duration {
        Duration::from_millis(self.reload_debounce_ms)
    }

    pub fn engine_call_timeout(&self) -> Duration {
        Duration::from_millis(self.engine_call_timeout_ms)
    }
}
