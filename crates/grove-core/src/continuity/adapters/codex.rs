//! Codex CLI session discovery.
//!
//! Codex shards rollout files into date directories:
//! `~/.codex/sessions/YYYY/MM/DD/rollout-{timestamp}-{uuid}.jsonl`. The
//! session id is the UUID embedded at the end of the filename stem, with a
//! fallback to the `payload.id` field declared in the file's head lines.
//! There is no per-project directory, so worktree scoping means content
//! inspection: the `payload.cwd` of the head lines has to sit inside the
//! queried worktree.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use super::{SessionAdapter, head_json_lines, is_uuid, modified_at, select_candidate};
use crate::agents::AgentType;
use crate::continuity::types::{SessionCandidate, SessionQuery};
use crate::git::WorktreeInfo;

const MAX_SHARD_DEPTH: usize = 5;
const HEAD_LINE_SCAN: usize = 10;

pub struct CodexSessions {
    home: PathBuf,
}

impl CodexSessions {
    pub fn new(home: PathBuf) -> Self {
        Self { home }
    }

    pub fn with_default_home() -> Option<Self> {
        dirs::home_dir().map(Self::new)
    }

    fn sessions_dir(&self) -> PathBuf {
        self.home.join(".codex").join("sessions")
    }
}

impl SessionAdapter for CodexSessions {
    fn agent_type(&self) -> AgentType {
        AgentType::Codex
    }

    fn find_latest_session(&self, query: &SessionQuery) -> Option<SessionCandidate> {
        let root = self.sessions_dir();
        if !root.exists() {
            return None;
        }

        let mut candidates = Vec::new();
        for entry in WalkDir::new(&root)
            .max_depth(MAX_SHARD_DEPTH)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if ext != "jsonl" && ext != "json" {
                continue;
            }

            let Some(id) = session_id_for(path) else {
                debug!(
                    event = "core.continuity.codex_candidate_discarded",
                    path = %path.display()
                );
                continue;
            };

            if !matches_worktree_scope(path, query) {
                continue;
            }

            let Some(modified) = modified_at(path) else {
                continue;
            };

            candidates.push(SessionCandidate {
                id,
                modified_at: modified,
                source_path: path.to_path_buf(),
            });
        }

        select_candidate(candidates, query)
    }
}

/// Session id for a rollout file: the trailing UUID of the filename stem,
/// else the `payload.id` declared in the head lines. Either way the id must
/// be UUID-shaped.
fn session_id_for(path: &Path) -> Option<String> {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    if stem.len() >= 36 {
        let tail = &stem[stem.len() - 36..];
        if is_uuid(tail) {
            return Some(tail.to_string());
        }
    }

    let declared = head_json_lines(path, 5)
        .iter()
        .find_map(|value| {
            value
                .get("payload")
                .and_then(|p| p.get("id"))
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
        })?;
    is_uuid(&declared).then_some(declared)
}

/// Whether a session file belongs to the queried worktree (or, lacking a
/// single worktree, to any inventoried one). Files whose head lines carry
/// no `cwd` are excluded when scoping was requested.
fn matches_worktree_scope(path: &Path, query: &SessionQuery) -> bool {
    if query.worktree.is_none() && query.worktrees.is_empty() {
        return true;
    }

    let Some(cwd) = session_cwd(path) else {
        return false;
    };

    if let Some(worktree) = &query.worktree {
        return cwd.starts_with(worktree);
    }
    query
        .worktrees
        .iter()
        .any(|wt: &WorktreeInfo| cwd.starts_with(&wt.path))
}

fn session_cwd(path: &Path) -> Option<PathBuf> {
    head_json_lines(path, HEAD_LINE_SCAN).iter().find_map(|value| {
        value
            .get("payload")
            .and_then(|p| p.get("cwd"))
            .and_then(|v| v.as_str())
            .map(PathBuf::from)
    })
}
