//! Usage ledger persistence.
//!
//! One JSON document per repository under `~/.grove/history/`, holding the
//! capped launch history plus the last-used pointer fields. Writes go
//! through a temp file and a rename so a reader never observes a partially
//! written document.

use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, warn};

use super::errors::ContinuityError;
use super::types::{LedgerData, UsageEntry};
use crate::config::GroveConfig;

/// Handle on one repository's ledger file.
pub struct UsageLedger {
    path: PathBuf,
    limit: usize,
    repo_root: Option<PathBuf>,
}

impl UsageLedger {
    pub fn new(path: PathBuf, limit: usize) -> Self {
        Self {
            path,
            limit,
            repo_root: None,
        }
    }

    /// The ledger for a repository, under the user's Grove directory.
    pub fn for_repo(repo_root: &Path, config: &GroveConfig) -> Result<Self, ContinuityError> {
        let home = dirs::home_dir().ok_or(ContinuityError::HomeDirNotFound)?;
        let path = ledger_path(&home.join(".grove"), repo_root);
        Ok(Self {
            path,
            limit: config.continuity.history_limit,
            repo_root: Some(repo_root.to_path_buf()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the ledger document.
    ///
    /// A missing file is a first run and yields empty data. A file that
    /// exists but does not parse is a hard error: silently dropping the
    /// user's launch history is worse than a visible failure.
    pub fn load(&self) -> Result<LedgerData, ContinuityError> {
        if !self.path.exists() {
            debug!(
                event = "core.continuity.ledger_missing",
                path = %self.path.display()
            );
            return Ok(LedgerData::default());
        }

        let content = fs::read_to_string(&self.path)?;
        serde_json::from_str(&content).map_err(|source| ContinuityError::LedgerMalformed {
            path: self.path.display().to_string(),
            source,
        })
    }

    /// Append entries to the history, evicting the oldest past the cap,
    /// and update the last-used pointer fields from the newest entry.
    ///
    /// Appending nothing is a no-op: the file is not touched at all.
    pub fn append(&self, entries: &[UsageEntry]) -> Result<(), ContinuityError> {
        let Some(newest) = entries.last() else {
            debug!(event = "core.continuity.ledger_append_empty");
            return Ok(());
        };

        let mut data = self.load()?;
        data.history.extend_from_slice(entries);
        if data.history.len() > self.limit {
            let excess = data.history.len() - self.limit;
            data.history.drain(..excess);
        }

        data.last_branch = Some(newest.branch.clone());
        data.last_tool_id = Some(newest.tool_id.clone());
        data.last_worktree_path = newest.worktree_path.clone();
        data.last_session_id = newest.session_id.clone();
        data.timestamp = Some(newest.timestamp);
        if data.repository_root.is_empty()
            && let Some(root) = &self.repo_root
        {
            data.repository_root = root.display().to_string();
        }

        self.persist(&data)
    }

    /// Remove the ledger file. Clearing an absent ledger is not an error.
    pub fn clear(&self) -> Result<(), ContinuityError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        } else {
            debug!(
                event = "core.continuity.ledger_clear_missing",
                path = %self.path.display()
            );
        }
        Ok(())
    }

    fn persist(&self, data: &LedgerData) -> Result<(), ContinuityError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(data).map_err(|e| ContinuityError::LedgerIo {
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;

        let temp_file = self.path.with_extension("json.tmp");
        if let Err(e) = fs::write(&temp_file, &json) {
            cleanup_temp_file(&temp_file, &e);
            return Err(ContinuityError::LedgerIo { source: e });
        }
        if let Err(e) = fs::rename(&temp_file, &self.path) {
            cleanup_temp_file(&temp_file, &e);
            return Err(ContinuityError::LedgerIo { source: e });
        }

        Ok(())
    }
}

fn cleanup_temp_file(temp_file: &Path, original_error: &std::io::Error) {
    if let Err(cleanup_err) = fs::remove_file(temp_file) {
        warn!(
            event = "core.continuity.ledger_temp_cleanup_failed",
            temp_file = %temp_file.display(),
            original_error = %original_error,
            cleanup_error = %cleanup_err
        );
    }
}

/// File name for a repository's ledger: the repo's directory name plus a
/// filesystem-safe base64 of its absolute path, so same-named repos in
/// different locations stay separate.
pub fn ledger_path(grove_dir: &Path, repo_root: &Path) -> PathBuf {
    let repo_name = repo_root
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("repo");

    let encoded = STANDARD
        .encode(repo_root.to_string_lossy().as_bytes())
        .replace(['/', '+', '='], "_");

    grove_dir
        .join("history")
        .join(format!("{repo_name}_{encoded}.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn entry(branch: &str, session_id: Option<&str>, minute: u32) -> UsageEntry {
        UsageEntry {
            tool_id: "claude".to_string(),
            tool_label: "Claude Code".to_string(),
            branch: branch.to_string(),
            worktree_path: Some(format!("/repo/worktrees/{branch}")),
            model: None,
            mode: "interactive".to_string(),
            inference_level: None,
            timestamp: Utc.with_ymd_and_hms(2026, 1, 10, 12, minute, 0).unwrap(),
            session_id: session_id.map(|s| s.to_string()),
        }
    }

    fn ledger_in(dir: &TempDir, limit: usize) -> UsageLedger {
        UsageLedger::new(dir.path().join("ledger.json"), limit)
    }

    #[test]
    fn test_load_missing_file_returns_empty() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger_in(&dir, 50);

        let data = ledger.load().unwrap();
        assert!(data.history.is_empty());
        assert!(data.last_session_id.is_none());
    }

    #[test]
    fn test_append_empty_input_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger_in(&dir, 50);

        ledger.append(&[]).unwrap();
        assert!(!ledger.path().exists(), "no-op append must not write");
    }

    #[test]
    fn test_append_load_roundtrip_preserves_order() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger_in(&dir, 50);

        let entries = vec![
            entry("main", Some("sess-1"), 0),
            entry("feature/a", None, 1),
            entry("feature/b", Some("sess-3"), 2),
        ];
        ledger.append(&entries).unwrap();

        let data = ledger.load().unwrap();
        assert_eq!(data.history, entries);
    }

    #[test]
    fn test_append_updates_last_used_pointers() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger_in(&dir, 50);

        ledger
            .append(&[
                entry("main", Some("sess-1"), 0),
                entry("feature/a", Some("sess-2"), 1),
            ])
            .unwrap();

        let data = ledger.load().unwrap();
        assert_eq!(data.last_branch, Some("feature/a".to_string()));
        assert_eq!(data.last_tool_id, Some("claude".to_string()));
        assert_eq!(data.last_session_id, Some("sess-2".to_string()));
    }

    #[test]
    fn test_history_cap_evicts_oldest_first() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger_in(&dir, 3);

        ledger
            .append(&[entry("b1", None, 0), entry("b2", None, 1)])
            .unwrap();
        ledger
            .append(&[entry("b3", None, 2), entry("b4", None, 3)])
            .unwrap();

        let data = ledger.load().unwrap();
        assert_eq!(data.history.len(), 3);
        let branches: Vec<&str> = data.history.iter().map(|e| e.branch.as_str()).collect();
        assert_eq!(branches, vec!["b2", "b3", "b4"]);
    }

    #[test]
    fn test_malformed_ledger_is_a_hard_error() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger_in(&dir, 50);
        fs::write(ledger.path(), "{ this is not json }").unwrap();

        let err = ledger.load().unwrap_err();
        assert!(matches!(err, ContinuityError::LedgerMalformed { .. }));

        // Appending must surface the same error rather than clobber the file.
        let err = ledger.append(&[entry("main", None, 0)]).unwrap_err();
        assert!(matches!(err, ContinuityError::LedgerMalformed { .. }));
    }

    #[test]
    fn test_append_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger_in(&dir, 50);

        ledger.append(&[entry("main", None, 0)]).unwrap();
        assert!(ledger.path().exists());
        assert!(!dir.path().join("ledger.json.tmp").exists());
    }

    #[test]
    fn test_clear_removes_file_and_tolerates_absence() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger_in(&dir, 50);

        ledger.append(&[entry("main", None, 0)]).unwrap();
        assert!(ledger.path().exists());

        ledger.clear().unwrap();
        assert!(!ledger.path().exists());

        ledger.clear().unwrap();
    }

    #[test]
    fn test_ledger_path_distinguishes_same_named_repos() {
        let grove_dir = PathBuf::from("/home/user/.grove");
        let a = ledger_path(&grove_dir, Path::new("/work/app"));
        let b = ledger_path(&grove_dir, Path::new("/archive/app"));

        assert_ne!(a, b);
        assert!(a.to_string_lossy().contains("history"));
        assert!(a.file_name().unwrap().to_str().unwrap().starts_with("app_"));
        assert!(a.to_string_lossy().ends_with(".json"));
    }
}
