//! Headless script session.
//!
//! Opens an optional script, then applies JSONL commands from stdin until a
//! `close` command or end of input. The recent scripts list is written back
//! to the config file on exit.
//!
//! ```bash
//! script-session demo.lua --run
//! echo '{"type": "setText", "text": "print(2)"}' | script-session demo.lua
//! ```

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use script_session::config::{default_config_path, load_config, save_config};
use script_session::engine::LoggingEngine;
use script_session::error::ResultExt;
use script_session::logging;
use script_session::prompt::{HeadlessPrompts, SavePromptChoice};
use script_session::recent_scripts::RecentScripts;
use script_session::session::{ScriptSession, SessionServices};
use script_session::stdin_commands::start_stdin_listener;
use script_session::storage::FsStorage;

#[derive(Debug, Parser)]
#[command(name = "script-session", version, about = "Edit, save and run a script via stdin commands")]
struct Cli {
    /// Script to open at startup
    path: Option<PathBuf>,

    /// Config file (defaults to ~/.script-session/config.json)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Run the script once it is loaded
    #[arg(long)]
    run: bool,

    /// Save unsaved edits instead of discarding them when they would be replaced
    #[arg(long)]
    save_unsaved: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = load_config(&config_path);

    let recent_scripts =
        RecentScripts::from_entries(config.recent_scripts.clone(), config.max_recent_scripts)
            .into_shared();
    let unsaved_choice = if cli.save_unsaved {
        SavePromptChoice::Save
    } else {
        SavePromptChoice::Discard
    };
    let cwd = std::env::current_dir().context("Failed to read current directory")?;

    let services = SessionServices {
        storage: Arc::new(FsStorage),
        engine: Arc::new(LoggingEngine::new()),
        prompts: Arc::new(HeadlessPrompts::new(unsaved_choice, cwd)),
        recent_scripts: recent_scripts.clone(),
    };
    let mut session = ScriptSession::new(services, config.clone());
    info!(title = %session.window_title(), config = %config_path.display(), "Session created");

    if let Some(path) = &cli.path {
        session
            .load(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
    }
    if should_run_after_open(cli.run, cli.path.is_some(), config.auto_start_on_load) {
        session.run();
    }

    start_stdin_listener(session.command_sender())
        .context("Failed to start stdin command listener")?;
    session.run_command_loop();

    config.recent_scripts = recent_scripts.lock().list().to_vec();
    save_config(&config_path, &config).log_err();
    Ok(())
}

/// `--run` is redundant when loading the script already started it
fn should_run_after_open(run_flag: bool, opened_script: bool, auto_start_on_load: bool) -> bool {
    run_flag && !(opened_script && auto_start_on_load)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_flag_starts_script() {
        assert!(should_run_after_open(true, true, false));
        assert!(should_run_after_open(true, false, false));
        assert!(!should_run_after_open(false, true, false));
    }

    #[test]
    fn test_run_flag_skipped_when_load_auto_started() {
        assert!(!should_run_after_open(true, true, true));
        // Nothing was loaded, so nothing auto-started
        assert!(should_run_after_open(true, false, true));
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from(["script-session", "demo.lua", "--run", "--config", "c.json"])
            .unwrap();
        assert_eq!(cli.path, Some(PathBuf::from("demo.lua")));
        assert_eq!(cli.config, Some(PathBuf::from("c.json")));
        assert!(cli.run);
        assert!(!cli.save_unsaved);
    }
}
