//! Structured JSONL logging to a file plus human-readable stderr output.
//!
//! - **JSONL to file** (~/.script-session/logs/script-session.jsonl) for tooling
//! - **Compact to stderr** for whoever is watching the terminal
//!
//! # Usage
//!
//! ```rust,ignore
//! use script_session::logging;
//!
//! // Keep the guard alive for the duration of the program
//! let _guard = logging::init();
//!
//! tracing::info!(event_type = "app_start", "Session started");
//! ```
//!
//! # JSONL Output Format
//!
//! ```json
//! {"timestamp":"2024-12-25T10:30:45.123Z","level":"INFO","target":"script_session::session::state","fields":{"message":"Session updated","action":"load","dirty":false}}
//! ```

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::CONFIG_DIR_NAME;

const LOG_FILE_NAME: &str = "script-session.jsonl";

/// Default filter when `RUST_LOG` is not set
const DEFAULT_FILTER: &str = "info,notify=warn";

/// Guard that must be kept alive for the duration of the program.
/// Dropping it flushes and closes the log file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initialize the dual-output logging system.
///
/// If the log file cannot be opened, file output is discarded and stderr
/// logging still works.
pub fn init() -> LoggingGuard {
    let log_dir = log_dir();
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("[LOGGING] Failed to create log directory: {}", e);
    }

    let log_path = log_path();
    eprintln!("[SCRIPT-SESSION] JSONL log: {}", log_path.display());

    let file: Box<dyn Write + Send> = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => Box::new(file),
        Err(e) => {
            eprintln!("[LOGGING] Failed to open log file: {}", e);
            Box::new(std::io::sink())
        }
    };

    // Non-blocking so a slow disk never stalls the command loop
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let json_layer = fmt::layer()
        .json()
        .with_writer(non_blocking_file)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_level(true)
        .with_thread_names(true)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE);

    let pretty_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_level(true)
        .compact();

    // try_init: a second call (e.g. from tests) keeps the first subscriber
    if let Err(e) = tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .try_init()
    {
        eprintln!("[LOGGING] Subscriber already installed: {}", e);
    }

    tracing::info!(
        event_type = "app_lifecycle",
        action = "started",
        log_path = %log_path.display(),
        "Logging initialized"
    );

    LoggingGuard {
        _file_guard: file_guard,
    }
}

/// Log directory (~/.script-session/logs/)
fn log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(CONFIG_DIR_NAME).join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("script-session-logs"))
}

/// Path to the JSONL log file
pub fn log_path() -> PathBuf {
    log_dir().join(LOG_FILE_NAME)
}
