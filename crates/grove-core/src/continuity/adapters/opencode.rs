//! OpenCode session discovery.
//!
//! OpenCode keeps one flat directory of session files,
//! `~/.opencode/sessions/*.json`, with no identifier embedded in the
//! content: the filename stem itself is the session id.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use super::{SessionAdapter, is_uuid, modified_at, select_candidate};
use crate::agents::AgentType;
use crate::continuity::types::{SessionCandidate, SessionQuery};

pub struct OpenCodeSessions {
    home: PathBuf,
}

impl OpenCodeSessions {
    pub fn new(home: PathBuf) -> Self {
        Self { home }
    }

    pub fn with_default_home() -> Option<Self> {
        dirs::home_dir().map(Self::new)
    }

    fn sessions_dir(&self) -> PathBuf {
        self.home.join(".opencode").join("sessions")
    }
}

impl SessionAdapter for OpenCodeSessions {
    fn agent_type(&self) -> AgentType {
        AgentType::OpenCode
    }

    fn find_latest_session(&self, query: &SessionQuery) -> Option<SessionCandidate> {
        let root = self.sessions_dir();
        if !root.exists() {
            return None;
        }

        let mut candidates = Vec::new();
        let entries = fs::read_dir(&root).ok()?;
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if ext != "json" && ext != "jsonl" {
                continue;
            }

            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
            if !is_valid_session_id(stem) {
                debug!(
                    event = "core.continuity.opencode_candidate_discarded",
                    path = %path.display()
                );
                continue;
            }
            let Some(modified) = modified_at(&path) else {
                continue;
            };

            candidates.push(SessionCandidate {
                id: stem.to_string(),
                modified_at: modified,
                source_path: path,
            });
        }

        select_candidate(candidates, query)
    }
}

/// OpenCode ids are either UUIDs or `ses_`-prefixed lowercase tokens.
fn is_valid_session_id(stem: &str) -> bool {
    if is_uuid(stem) {
        return true;
    }
    stem.strip_prefix("ses_").is_some_and(|rest| {
        !rest.is_empty()
            && rest
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::tempdir;

    fn write_session(dir: &Path, name: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), r#"{"messages":[]}"#).unwrap();
    }

    #[test]
    fn test_missing_root_returns_none() {
        let home = tempdir().unwrap();
        let adapter = OpenCodeSessions::new(home.path().to_path_buf());
        assert_eq!(adapter.find_latest_session(&SessionQuery::default()), None);
    }

    #[test]
    fn test_filename_stem_is_the_id() {
        let home = tempdir().unwrap();
        let dir = home.path().join(".opencode").join("sessions");
        write_session(&dir, "ses_7k2m9x.json");

        let adapter = OpenCodeSessions::new(home.path().to_path_buf());
        let found = adapter
            .find_latest_session(&SessionQuery::default())
            .unwrap();
        assert_eq!(found.id, "ses_7k2m9x");
    }

    #[test]
    fn test_uuid_stem_accepted() {
        let home = tempdir().unwrap();
        let dir = home.path().join(".opencode").join("sessions");
        write_session(&dir, "12345678-1234-1234-1234-123456789012.json");

        let adapter = OpenCodeSessions::new(home.path().to_path_buf());
        let found = adapter
            .find_latest_session(&SessionQuery::default())
            .unwrap();
        assert_eq!(found.id, "12345678-1234-1234-1234-123456789012");
    }

    #[test]
    fn test_invalid_stem_discarded() {
        let home = tempdir().unwrap();
        let dir = home.path().join(".opencode").join("sessions");
        write_session(&dir, "README.json");
        write_session(&dir, "ses_UPPER.json");

        let adapter = OpenCodeSessions::new(home.path().to_path_buf());
        assert_eq!(adapter.find_latest_session(&SessionQuery::default()), None);
    }

    #[test]
    fn test_is_valid_session_id() {
        assert!(is_valid_session_id("ses_abc123"));
        assert!(is_valid_session_id("12345678-1234-1234-1234-123456789012"));
        assert!(!is_valid_session_id("ses_"));
        assert!(!is_valid_session_id("session-notes"));
        assert!(!is_valid_session_id(""));
    }
}
