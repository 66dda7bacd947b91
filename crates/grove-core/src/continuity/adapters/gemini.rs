//! Gemini CLI session discovery.
//!
//! Gemini keeps chats under `~/.gemini/tmp/{sha256(worktree-path)}/chats/`,
//! one JSON file per session with the id embedded as a `sessionId` field.
//! The project directory is keyed by a hex SHA-256 of the absolute worktree
//! path, so a worktree hint maps to exactly one directory; without one,
//! every project-hash directory is scanned.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;

use super::{SessionAdapter, modified_at, select_candidate};
use crate::agents::AgentType;
use crate::continuity::types::{SessionCandidate, SessionQuery};

const SESSION_SCAN_LINE_LIMIT: usize = 64;

pub struct GeminiSessions {
    home: PathBuf,
}

impl GeminiSessions {
    pub fn new(home: PathBuf) -> Self {
        Self { home }
    }

    pub fn with_default_home() -> Option<Self> {
        dirs::home_dir().map(Self::new)
    }

    fn tmp_dir(&self) -> PathBuf {
        self.home.join(".gemini").join("tmp")
    }

    fn chats_dir_for(&self, worktree: &Path) -> PathBuf {
        self.tmp_dir().join(project_hash(worktree)).join("chats")
    }

    fn collect_from_chats_dir(&self, dir: &Path, out: &mut Vec<SessionCandidate>) {
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if metadata.len() == 0 {
                debug!(
                    event = "core.continuity.gemini_empty_session_skipped",
                    path = %path.display()
                );
                continue;
            }

            let Some(id) = extract_session_id(&path) else {
                debug!(
                    event = "core.continuity.gemini_candidate_discarded",
                    path = %path.display()
                );
                continue;
            };
            let Some(modified) = modified_at(&path) else {
                continue;
            };

            out.push(SessionCandidate {
                id,
                modified_at: modified,
                source_path: path,
            });
        }
    }
}

impl SessionAdapter for GeminiSessions {
    fn agent_type(&self) -> AgentType {
        AgentType::Gemini
    }

    fn find_latest_session(&self, query: &SessionQuery) -> Option<SessionCandidate> {
        let root = self.tmp_dir();
        if !root.exists() {
            return None;
        }

        let mut candidates = Vec::new();

        if let Some(worktree) = &query.worktree {
            self.collect_from_chats_dir(&self.chats_dir_for(worktree), &mut candidates);
        } else if !query.worktrees.is_empty() {
            let mut visited = HashSet::new();
            for worktree in &query.worktrees {
                let dir = self.chats_dir_for(&worktree.path);
                if visited.insert(dir.clone()) {
                    self.collect_from_chats_dir(&dir, &mut candidates);
                }
            }
        } else {
            let entries = fs::read_dir(&root).ok()?;
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    self.collect_from_chats_dir(&path.join("chats"), &mut candidates);
                }
            }
        }

        select_candidate(candidates, query)
    }
}

/// Hex SHA-256 of the worktree path, as Gemini names its project dirs.
fn project_hash(path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Read the `sessionId` field from the head of a chat file.
///
/// Only the first lines are scanned to avoid reading huge transcripts; the
/// id sits at the top of the document in practice.
fn extract_session_id(path: &Path) -> Option<String> {
    let contents = fs::read_to_string(path).ok()?;
    let limited = contents
        .lines()
        .take(SESSION_SCAN_LINE_LIMIT)
        .collect::<Vec<_>>()
        .join("\n");

    let json: serde_json::Value = serde_json::from_str(&limited).ok()?;
    let id = json.get("sessionId")?.as_str()?.trim();
    if id.is_empty() || id.chars().any(char::is_whitespace) {
        return None;
    }
    Some(id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SESSION_A: &str = "aaaaaaaa-1111-2222-3333-444444444444";
    const SESSION_B: &str = "bbbbbbbb-1111-2222-3333-444444444444";

    fn write_chat(dir: &Path, name: &str, session_id: &str) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join(name);
        fs::write(
            &path,
            format!(r#"{{"sessionId":"{session_id}","messages":[]}}"#),
        )
        .unwrap();
        path
    }

    #[test]
    fn test_missing_root_returns_none() {
        let home = tempdir().unwrap();
        let adapter = GeminiSessions::new(home.path().to_path_buf());
        assert_eq!(adapter.find_latest_session(&SessionQuery::default()), None);
    }

    #[test]
    fn test_project_hash_is_stable_hex() {
        let a = project_hash(Path::new("/repo/wt"));
        let b = project_hash(Path::new("/repo/wt"));
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, project_hash(Path::new("/repo/other")));
    }

    #[test]
    fn test_finds_session_in_hashed_project_dir() {
        let home = tempdir().unwrap();
        let worktree = PathBuf::from("/repo/worktrees/mine");
        let chats = home
            .path()
            .join(".gemini")
            .join("tmp")
            .join(project_hash(&worktree))
            .join("chats");
        write_chat(&chats, "session-1.json", SESSION_A);

        let adapter = GeminiSessions::new(home.path().to_path_buf());
        let found = adapter
            .find_latest_session(&SessionQuery::for_worktree(worktree))
            .unwrap();
        assert_eq!(found.id, SESSION_A);
    }

    #[test]
    fn test_unscoped_scan_covers_all_project_dirs() {
        let home = tempdir().unwrap();
        let tmp = home.path().join(".gemini").join("tmp");
        write_chat(&tmp.join("hash-one").join("chats"), "a.json", SESSION_A);
        write_chat(&tmp.join("hash-two").join("chats"), "b.json", SESSION_B);

        let adapter = GeminiSessions::new(home.path().to_path_buf());
        assert!(
            adapter
                .find_latest_session(&SessionQuery::default())
                .is_some()
        );
    }

    #[test]
    fn test_zero_length_file_skipped() {
        let home = tempdir().unwrap();
        let chats = home
            .path()
            .join(".gemini")
            .join("tmp")
            .join("some-hash")
            .join("chats");
        fs::create_dir_all(&chats).unwrap();
        fs::write(chats.join("empty.json"), "").unwrap();

        let adapter = GeminiSessions::new(home.path().to_path_buf());
        assert_eq!(adapter.find_latest_session(&SessionQuery::default()), None);
    }

    #[test]
    fn test_missing_session_id_field_discarded() {
        let home = tempdir().unwrap();
        let chats = home
            .path()
            .join(".gemini")
            .join("tmp")
            .join("some-hash")
            .join("chats");
        fs::create_dir_all(&chats).unwrap();
        fs::write(chats.join("broken.json"), r#"{"messages":[]}"#).unwrap();

        let adapter = GeminiSessions::new(home.path().to_path_buf());
        assert_eq!(adapter.find_latest_session(&SessionQuery::default()), None);
    }
}
