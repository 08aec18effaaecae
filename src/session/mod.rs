//! Script session - one open script's editing and execution state
//!
//! A session keeps three things consistent: the text being edited, the file
//! it came from (and the snapshot last read from or written to it), and the
//! engine handle of the running instance.
//!
//! # Module Structure
//!
//! - `commands` - `SessionCommand`, the messages a session consumes
//! - `state` - `ScriptSession` itself, construction and dirty tracking
//! - `persistence` - load, save, save-as and the unsaved-changes gate
//! - `control` - run/stop, external-change reload and the command loop
//!
//! All mutation happens on the thread that owns the session. The file watch
//! and other producers only send `SessionCommand`s.

mod commands;
mod control;
mod persistence;
mod state;

pub use commands::SessionCommand;
pub use persistence::DEFAULT_SCRIPT_NAME;
pub use state::{ScriptSession, SessionServices, WINDOW_TITLE};

#[cfg(test)]
#[path = "../session_tests.rs"]
mod tests;
