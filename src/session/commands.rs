//! Messages consumed by a session's command loop.
//!
//! User actions arrive from the presentation layer (or the headless runner's
//! stdin as JSONL); `FileChanged` is produced internally by the file watch.
//!
//! ```json
//! {"type": "setText", "text": "print(2)"}
//! {"type": "openPath", "path": "/scripts/a.lua"}
//! {"type": "openBuiltin", "name": "Countdown.lua"}
//! {"type": "save"}
//! {"type": "run"}
//! ```

use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionCommand {
    /// Replace the edited text
    SetText { text: String },
    /// Start a new, empty script
    New,
    /// Ask for a script to open
    Open,
    /// Open a known path (e.g. picked from the recent scripts list)
    OpenPath { path: PathBuf },
    /// Load one of the embedded example scripts
    OpenBuiltin { name: String },
    Save,
    /// Save under a new name, proposing the current one
    SaveAs,
    Run,
    Stop,
    /// End the session (subject to the unsaved-changes prompt)
    Close,
    /// The watched file settled after an external change
    #[serde(skip)]
    FileChanged { generation: u64 },
}

impl SessionCommand {
    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SetText { .. } => "set_text",
            Self::New => "new",
            Self::Open => "open",
            Self::OpenPath { .. } => "open_path",
            Self::OpenBuiltin { .. } => "open_builtin",
            Self::Save => "save",
            Self::SaveAs => "save_as",
            Self::Run => "run",
            Self::Stop => "stop",
            Self::Close => "close",
            Self::FileChanged { .. } => "file_changed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_text_deserialization() {
        let cmd: SessionCommand =
            serde_json::from_str(r#"{"type": "setText", "text": "print(2)"}"#).unwrap();
        assert_eq!(
            cmd,
            SessionCommand::SetText {
                text: "print(2)".to_string()
            }
        );
    }

    #[test]
    fn test_open_path_deserialization() {
        let cmd: SessionCommand =
            serde_json::from_str(r#"{"type": "openPath", "path": "/scripts/a.lua"}"#).unwrap();
        assert_eq!(
            cmd,
            SessionCommand::OpenPath {
                path: PathBuf::from("/scripts/a.lua")
            }
        );
    }

    #[test]
    fn test_unit_commands_deserialization() {
        for (json, expected) in [
            (r#"{"type": "save"}"#, SessionCommand::Save),
            (r#"{"type": "saveAs"}"#, SessionCommand::SaveAs),
            (r#"{"type": "run"}"#, SessionCommand::Run),
            (r#"{"type": "stop"}"#, SessionCommand::Stop),
            (r#"{"type": "close"}"#, SessionCommand::Close),
        ] {
            let cmd: SessionCommand = serde_json::from_str(json).unwrap();
            assert_eq!(cmd, expected);
        }
    }

    #[test]
    fn test_file_changed_cannot_be_injected_from_json() {
        let result =
            serde_json::from_str::<SessionCommand>(r#"{"type": "fileChanged", "generation": 1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(SessionCommand::Run.kind(), "run");
        assert_eq!(
            SessionCommand::FileChanged { generation: 3 }.kind(),
            "file_changed"
        );
    }
}
