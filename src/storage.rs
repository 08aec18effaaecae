//! Script file access.
//!
//! The session only ever touches the filesystem through [`Storage`], so tests
//! can substitute an in-memory implementation.

use std::path::Path;

/// Reads and writes whole script files
pub trait Storage: Send + Sync {
    fn read(&self, path: &Path) -> std::io::Result<String>;
    fn write(&self, path: &Path, content: &str) -> std::io::Result<()>;
}

/// [`Storage`] backed by the local filesystem (UTF-8 text)
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStorage;

impl Storage for FsStorage {
    fn read(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }

    // Plain overwrite, not temp + rename: the watcher sees one modify event
    // for the script rather than a create/rename pair.
    fn write(&self, path: &Path, content: &str) -> std::io::Result<()> {
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_storage_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.lua");

        FsStorage.write(&path, "print(1)").unwrap();
        assert_eq!(FsStorage.read(&path).unwrap(), "print(1)");
    }

    #[test]
    fn test_fs_storage_read_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = FsStorage.read(&dir.path().join("missing.lua")).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
