//! Configuration loading and saving
//!
//! The config is a plain JSON file. Reading never fails: a missing or broken
//! file yields the defaults so a session can always be created.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use super::defaults::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};
use super::types::SessionConfig;

/// Default config location (~/.script-session/config.json)
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

/// Load configuration from `path`.
///
/// Returns `SessionConfig::default()` if the file is missing or cannot be parsed.
#[instrument(name = "load_config", skip_all, fields(path = %path.display()))]
pub fn load_config(path: &Path) -> SessionConfig {
    if !path.exists() {
        info!("Config file not found, using defaults");
        return SessionConfig::default();
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(error = %e, "Failed to read config file, using defaults");
            return SessionConfig::default();
        }
    };

    match serde_json::from_str::<SessionConfig>(&content) {
        Ok(config) => {
            info!(
                recent_scripts = config.recent_scripts.len(),
                "Successfully loaded config"
            );
            config
        }
        Err(e) => {
            warn!(error = %e, "Failed to parse config JSON, using defaults");
            SessionConfig::default()
        }
    }
}

/// Save configuration to `path` using atomic write (write temp + rename)
#[instrument(name = "save_config", skip_all, fields(path = %path.display()))]
pub fn save_config(path: &Path, config: &SessionConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(config).context("Failed to serialize config")?;

    let temp_path = path.with_extension("json.tmp");
    std::fs::write(&temp_path, &json)
        .with_context(|| format!("Failed to write temp config file: {}", temp_path.display()))?;
    std::fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temp file to {}", path.display()))?;

    info!(bytes = json.len(), "Saved config (atomic)");
    Ok(())
}
