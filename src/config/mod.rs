//! Configuration module - session options and persisted state
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values
//! - `types` - `SessionConfig` definition
//! - `loader` - JSON loading and atomic saving

mod defaults;
mod loader;
mod types;

pub use defaults::{
    CONFIG_DIR_NAME, DEFAULT_AUTO_RELOAD_ON_EXTERNAL_CHANGE, DEFAULT_AUTO_START_ON_LOAD,
    DEFAULT_ENGINE_CALL_TIMEOUT_MS, DEFAULT_MAX_RECENT_SCRIPTS, DEFAULT_RELOAD_DEBOUNCE_MS,
    DEFAULT_SAVE_BEFORE_RUN,
};
pub use loader::{default_config_path, load_config, save_config};
pub use types::SessionConfig;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
