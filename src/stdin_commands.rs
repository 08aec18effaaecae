//! Session control via stdin JSONL commands.
//!
//! Used by the headless binary for automation and testing. Each line is one
//! [`SessionCommand`] as JSON:
//!
//! ```json
//! {"type": "openPath", "path": "/tmp/demo.lua"}
//! {"type": "setText", "text": "print(2)"}
//! {"type": "save"}
//! {"type": "run"}
//! {"type": "stop"}
//! {"type": "close"}
//! ```
//!
//! Malformed lines are logged and skipped. End of input sends `close`.

use std::io::BufRead;
use std::sync::mpsc::Sender;
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

use crate::session::SessionCommand;

/// Parse one input line. Blank lines yield `None`.
pub fn parse_command_line(line: &str) -> Option<Result<SessionCommand, serde_json::Error>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    Some(serde_json::from_str(line))
}

/// Forward every command read from `reader` to `tx`.
///
/// Stops at end of input (sending `Close`), on a read error, or once the
/// session side of the channel is gone. Returns the number of commands sent.
pub fn forward_commands<R: BufRead>(reader: R, tx: &Sender<SessionCommand>) -> usize {
    let mut sent = 0;

    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Error reading command input");
                return sent;
            }
        };

        match parse_command_line(&line) {
            None => {}
            Some(Ok(command)) => {
                debug!(command = command.kind(), "Parsed command");
                if tx.send(command).is_err() {
                    info!("Session gone, command listener exiting");
                    return sent;
                }
                sent += 1;
            }
            Some(Err(e)) => warn!(error = %e, line = %line, "Failed to parse command"),
        }
    }

    info!("Command input closed, closing session");
    if tx.send(SessionCommand::Close).is_ok() {
        sent += 1;
    }
    sent
}

/// Spawn a thread feeding stdin commands into the session
pub fn start_stdin_listener(tx: Sender<SessionCommand>) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("stdin-commands".to_string())
        .spawn(move || {
            info!("External command listener started");
            let stdin = std::io::stdin();
            let sent = forward_commands(stdin.lock(), &tx);
            info!(sent, "External command listener exiting");
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::PathBuf;
    use std::sync::mpsc::channel;

    #[test]
    fn test_parse_blank_line_is_none() {
        assert!(parse_command_line("   ").is_none());
    }

    #[test]
    fn test_parse_open_path() {
        let cmd = parse_command_line(r#"{"type": "openPath", "path": "/tmp/a.lua"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(
            cmd,
            SessionCommand::OpenPath {
                path: PathBuf::from("/tmp/a.lua")
            }
        );
    }

    #[test]
    fn test_parse_rejects_file_changed() {
        // Change notifications only come from the watcher
        let parsed = parse_command_line(r#"{"type": "fileChanged", "generation": 1}"#).unwrap();
        assert!(parsed.is_err());
    }

    #[test]
    fn test_forward_skips_bad_lines_and_closes_at_eof() {
        let input = "{\"type\": \"run\"}\nnot json\n\n{\"type\": \"stop\"}\n";
        let (tx, rx) = channel();

        let sent = forward_commands(Cursor::new(input), &tx);

        assert_eq!(sent, 3);
        let received: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            received,
            vec![
                SessionCommand::Run,
                SessionCommand::Stop,
                SessionCommand::Close
            ]
        );
    }

    #[test]
    fn test_forward_stops_when_session_is_gone() {
        let (tx, rx) = channel();
        drop(rx);

        let sent = forward_commands(Cursor::new("{\"type\": \"run\"}\n"), &tx);

        assert_eq!(sent, 0);
    }
}
