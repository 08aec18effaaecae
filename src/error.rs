use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, warn};

/// Error severity for UI display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,     // informational
    Warning,  // recoverable
    Error,    // operation failed
    Critical, // requires user action
}

/// Errors surfaced by a script session.
///
/// A user cancelling a prompt is not an error and never shows up here.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to read script '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write script '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File watch error: {0}")]
    FileWatch(String),

    #[error("Script engine error: {0}")]
    Engine(String),

    #[error("Script engine did not answer {operation} within {timeout_ms}ms")]
    EngineTimeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    #[error("No built-in script named '{0}'")]
    UnknownBuiltin(String),
}

impl SessionError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Read { .. } => ErrorSeverity::Error,
            Self::Write { .. } => ErrorSeverity::Critical,
            Self::FileWatch(_) => ErrorSeverity::Warning,
            Self::Engine(_) => ErrorSeverity::Warning,
            Self::EngineTimeout { .. } => ErrorSeverity::Warning,
            Self::UnknownBuiltin(_) => ErrorSeverity::Info,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Read { path, .. } => format!("Could not open {}", path.display()),
            Self::Write { path, .. } => {
                format!("Could not save {} - your changes are not saved", path.display())
            }
            Self::FileWatch(msg) => format!("File watcher issue: {}", msg),
            Self::Engine(msg) => format!("Script engine issue: {}", msg),
            Self::EngineTimeout { operation, .. } => {
                format!("The script engine is not responding ({})", operation)
            }
            Self::UnknownBuiltin(name) => format!("There is no built-in script called {}", name),
        }
    }
}

impl From<notify::Error> for SessionError {
    fn from(error: notify::Error) -> Self {
        Self::FileWatch(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is recoverable and the caller doesn't need to know.
///
/// # Examples
///
/// ```ignore
/// use script_session::error::ResultExt;
///
/// // Keep the session usable even if the watch cannot be armed
/// watch.bind(&path).warn_on_err();
/// ```
pub trait ResultExt<T> {
    /// Log error with caller location and return None. Use for recoverable failures.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_failure_is_critical() {
        let err = SessionError::Write {
            path: PathBuf::from("/scripts/a.lua"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.user_message().contains("/scripts/a.lua"));
    }

    #[test]
    fn test_read_error_display_includes_source() {
        let err = SessionError::Read {
            path: PathBuf::from("missing.lua"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let text = err.to_string();
        assert!(text.contains("missing.lua"));
        assert!(text.contains("no such file"));
    }

    #[test]
    fn test_engine_timeout_message() {
        let err = SessionError::EngineTimeout {
            operation: "stop",
            timeout_ms: 50,
        };
        assert_eq!(
            err.to_string(),
            "Script engine did not answer stop within 50ms"
        );
        assert_eq!(err.severity(), ErrorSeverity::Warning);
    }

    #[test]
    fn test_result_ext_converts_to_option() {
        let ok: std::result::Result<u32, String> = Ok(3);
        assert_eq!(ok.log_err(), Some(3));

        let err: std::result::Result<u32, String> = Err("boom".to_string());
        assert_eq!(err.warn_on_err(), None);
    }
}
