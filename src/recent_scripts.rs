//! Recently opened scripts, most recent first.
//!
//! The list is shared by every session in the process and persisted through
//! `SessionConfig::recent_scripts`; this module only keeps it ordered and
//! bounded.

use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Bounded, de-duplicated list of script paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentScripts {
    entries: Vec<PathBuf>,
    max_len: usize,
}

/// Registry handle shared between sessions
pub type SharedRecentScripts = Arc<Mutex<RecentScripts>>;

impl RecentScripts {
    pub fn new(max_len: usize) -> Self {
        RecentScripts {
            entries: Vec::new(),
            max_len,
        }
    }

    /// Restore a persisted list, dropping duplicates and anything past `max_len`
    pub fn from_entries(entries: impl IntoIterator<Item = PathBuf>, max_len: usize) -> Self {
        let mut recent = RecentScripts::new(max_len);
        for path in entries {
            if !recent.entries.contains(&path) {
                recent.entries.push(path);
            }
        }
        recent.entries.truncate(max_len);
        recent
    }

    pub fn into_shared(self) -> SharedRecentScripts {
        Arc::new(Mutex::new(self))
    }

    /// Move `path` to the front, evicting the oldest entry on overflow
    pub fn add(&mut self, path: &Path) {
        self.entries.retain(|existing| existing != path);
        self.entries.insert(0, path.to_path_buf());
        self.entries.truncate(self.max_len);
        debug!(path = %path.display(), len = self.entries.len(), "Recent script added");
    }

    pub fn list(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn most_recent(&self) -> Option<&Path> {
        self.entries.first().map(PathBuf::as_path)
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Change the bound, truncating the tail if the list is now too long
    pub fn set_max_len(&mut self, max_len: usize) {
        self.max_len = max_len;
        self.entries.truncate(max_len);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> PathBuf {
        PathBuf::from(s)
    }

    #[test]
    fn test_add_puts_newest_first() {
        let mut recent = RecentScripts::new(5);
        recent.add(&p("/a.lua"));
        recent.add(&p("/b.lua"));
        assert_eq!(recent.list(), &[p("/b.lua"), p("/a.lua")]);
        assert_eq!(recent.most_recent(), Some(Path::new("/b.lua")));
    }

    #[test]
    fn test_re_adding_moves_to_front_without_duplicate() {
        let mut recent = RecentScripts::new(5);
        recent.add(&p("/a.lua"));
        recent.add(&p("/b.lua"));
        recent.add(&p("/c.lua"));
        recent.add(&p("/a.lua"));

        assert_eq!(recent.list(), &[p("/a.lua"), p("/c.lua"), p("/b.lua")]);
    }

    #[test]
    fn test_overflow_evicts_least_recent() {
        let mut recent = RecentScripts::new(3);
        for name in ["/1.lua", "/2.lua", "/3.lua", "/4.lua"] {
            recent.add(&p(name));
            assert!(recent.len() <= 3);
        }
        assert_eq!(recent.list(), &[p("/4.lua"), p("/3.lua"), p("/2.lua")]);
    }

    #[test]
    fn test_from_entries_dedups_and_truncates() {
        let recent = RecentScripts::from_entries(
            vec![p("/a.lua"), p("/b.lua"), p("/a.lua"), p("/c.lua"), p("/d.lua")],
            3,
        );
        assert_eq!(recent.list(), &[p("/a.lua"), p("/b.lua"), p("/c.lua")]);
    }

    #[test]
    fn test_shrinking_max_len_truncates() {
        let mut recent = RecentScripts::from_entries(vec![p("/a.lua"), p("/b.lua")], 5);
        recent.set_max_len(1);
        assert_eq!(recent.list(), &[p("/a.lua")]);
        assert_eq!(recent.max_len(), 1);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut recent = RecentScripts::new(0);
        recent.add(&p("/a.lua"));
        assert!(recent.is_empty());
    }
}
