//! Claude Code session discovery.
//!
//! Claude Code stores sessions under
//! `~/.claude/projects/{encoded-worktree-path}/{session-id}.jsonl`, where
//! the directory name is a lossy encoding of the absolute worktree path.
//! Two encoding variants exist in the wild and are tried in order: the
//! current one collapses every non-alphanumeric character (separators and
//! underscores alike) to a dash; an older one preserved dots and
//! underscores.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{SessionAdapter, head_json_lines, is_uuid, modified_at, select_candidate};
use crate::agents::AgentType;
use crate::continuity::types::{SessionCandidate, SessionQuery};

pub struct ClaudeSessions {
    home: PathBuf,
}

impl ClaudeSessions {
    pub fn new(home: PathBuf) -> Self {
        Self { home }
    }

    pub fn with_default_home() -> Option<Self> {
        dirs::home_dir().map(Self::new)
    }

    fn projects_dir(&self) -> PathBuf {
        self.home.join(".claude").join("projects")
    }

    /// Project directories for one worktree: each encoding variant that
    /// actually exists on disk, in preference order.
    fn project_dirs_for(&self, worktree: &Path) -> Vec<PathBuf> {
        let root = self.projects_dir();
        [
            encode_project_path(worktree),
            encode_project_path_legacy(worktree),
        ]
        .into_iter()
        .map(|encoded| root.join(encoded))
        .filter(|dir| dir.is_dir())
        .collect()
    }

    fn collect_from_dir(&self, dir: &Path, out: &mut Vec<SessionCandidate>) {
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if ext != "jsonl" && ext != "json" {
                continue;
            }

            let Some(id) = session_id_for(&path) else {
                debug!(
                    event = "core.continuity.claude_candidate_discarded",
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

impl SessionAdapter for ClaudeSessions {
    fn agent_type(&self) -> AgentType {
        AgentType::Claude
    }

    fn find_latest_session(&self, query: &SessionQuery) -> Option<SessionCandidate> {
        let root = self.projects_dir();
        if !root.exists() {
            return None;
        }

        let mut candidates = Vec::new();

        if let Some(worktree) = &query.worktree {
            // Try each encoding variant in order until one resolves.
            for dir in self.project_dirs_for(worktree) {
                self.collect_from_dir(&dir, &mut candidates);
                if !candidates.is_empty() {
                    break;
                }
            }
        } else if !query.worktrees.is_empty() {
            for worktree in &query.worktrees {
                let before = candidates.len();
                for dir in self.project_dirs_for(&worktree.path) {
                    self.collect_from_dir(&dir, &mut candidates);
                    if candidates.len() > before {
                        break;
                    }
                }
            }
        } else {
            let entries = fs::read_dir(&root).ok()?;
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    self.collect_from_dir(&path, &mut candidates);
                }
            }
        }

        select_candidate(candidates, query)
    }
}

/// Session id for a Claude session file: a UUID file stem, with a fallback
/// to the `sessionId` field declared on the file's first line.
fn session_id_for(path: &Path) -> Option<String> {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    if is_uuid(stem) {
        return Some(stem.to_string());
    }

    let declared = head_json_lines(path, 1)
        .first()
        .and_then(|value| value.get("sessionId"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())?;
    is_uuid(&declared).then_some(declared)
}

/// Current Claude Code project-directory encoding: every character outside
/// `[A-Za-z0-9]` becomes a dash.
fn encode_project_path(path: &Path) -> String {
    path.to_string_lossy()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

/// Older encoding variant that preserved dots and underscores.
fn encode_project_path_legacy(path: &Path) -> String {
    path.to_string_lossy()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
}
