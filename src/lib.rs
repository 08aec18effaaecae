//! Script session - edit, save, watch and run a single script
//!
//! A [`session::ScriptSession`] owns the script text, its backing file, the
//! file watch and the running-script handle. All changes, including those
//! triggered by the file watcher, go through its command queue.

pub mod builtin_scripts;
pub mod config;
pub mod engine;
pub mod error;
pub mod execution;
pub mod logging;
pub mod prompt;
pub mod recent_scripts;
pub mod session;
pub mod stdin_commands;
pub mod storage;
pub mod watcher;
