//! Script engine boundary.
//!
//! Engines identify loaded scripts by a raw `i32` handle where any negative
//! value means "not running". That sentinel only exists at this boundary; the
//! rest of the crate uses `Option<ScriptHandle>`.

use parking_lot::Mutex;
use std::collections::HashSet;
use tracing::info;

/// Raw handle meaning "no script loaded"
pub const NO_SCRIPT: i32 = -1;

/// An engine that compiles and runs script text.
///
/// Calls may block; the execution controller runs them on a worker thread
/// with a time limit.
pub trait ScriptEngine: Send + Sync {
    /// Load and start `code`. `replacing` is the handle of the instance this
    /// one supersedes, or [`NO_SCRIPT`]. Returns the new handle, negative if
    /// the script is not running.
    fn start(&self, name: &str, code: &str, replacing: i32) -> i32;

    /// Remove the script with the given handle
    fn stop(&self, handle: i32) -> anyhow::Result<()>;
}

/// Engine for the headless runner: hands out increasing handles and logs.
///
/// It does not interpret the script; empty scripts are refused.
#[derive(Debug, Default)]
pub struct LoggingEngine {
    state: Mutex<LoggingEngineState>,
}

#[derive(Debug, Default)]
struct LoggingEngineState {
    next_handle: i32,
    running: HashSet<i32>,
}

impl LoggingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn running_count(&self) -> usize {
        self.state.lock().running.len()
    }
}

impl ScriptEngine for LoggingEngine {
    fn start(&self, name: &str, code: &str, replacing: i32) -> i32 {
        let mut state = self.state.lock();
        if replacing >= 0 {
            state.running.remove(&replacing);
        }
        if code.trim().is_empty() {
            info!(script = name, "Refusing to start empty script");
            return NO_SCRIPT;
        }

        let handle = state.next_handle;
        state.next_handle += 1;
        state.running.insert(handle);
        info!(script = name, handle, replacing, bytes = code.len(), "Script started");
        handle
    }

    fn stop(&self, handle: i32) -> anyhow::Result<()> {
        let removed = self.state.lock().running.remove(&handle);
        if !removed {
            anyhow::bail!("no running script with handle {handle}");
        }
        info!(handle, "Script stopped");
        Ok(())
    }
}
