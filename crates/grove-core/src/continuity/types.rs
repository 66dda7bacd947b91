//! Core data types for session continuity.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::git::WorktreeInfo;

/// A discovered, not-yet-trusted session: its identifier plus the file it
/// was read from.
///
/// Candidates are transient. Only the id and the file timestamp propagate
/// upward; the source path exists for logging.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionCandidate {
    /// Adapter-validated session identifier (typically a UUID).
    pub id: String,
    /// Modification time of the session file, not discovery time.
    pub modified_at: DateTime<Utc>,
    /// The session file the id was read from.
    pub source_path: PathBuf,
}

/// Scoping options for a session lookup.
#[derive(Debug, Clone, Default)]
pub struct SessionQuery {
    /// Restrict discovery to sessions produced inside this worktree.
    pub worktree: Option<PathBuf>,

    /// Full worktree inventory, for adapters that have to map a session
    /// file back to a working directory when no single worktree is given.
    pub worktrees: Vec<WorktreeInfo>,

    /// Prefer the candidate whose file timestamp is nearest this reference
    /// (ties go to the earlier candidate). Without it, most recently
    /// modified wins.
    pub prefer_closest_to: Option<DateTime<Utc>>,

    /// Maximum distance from `prefer_closest_to` a candidate may sit.
    /// Candidates outside the window are excluded even if they are the
    /// only ones found.
    pub window: Option<TimeDelta>,
}

impl SessionQuery {
    /// Query scoped to a single worktree, no time preference.
    pub fn for_worktree(path: PathBuf) -> Self {
        Self {
            worktree: Some(path),
            ..Default::default()
        }
    }
}

/// Lookup key for resolver queries: which branch, optionally narrowed to
/// one tool and/or one worktree.
#[derive(Debug, Clone, Default)]
pub struct ContinuityQuery {
    pub branch: String,
    pub tool_id: Option<String>,
    pub worktree_path: Option<PathBuf>,
}

/// One recorded launch: this branch + this worktree + this agent produced
/// this session at this time.
///
/// `session_id` may be absent at creation (the agent had not yet flushed
/// its session file) and is filled in later by the history refresher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageEntry {
    pub tool_id: String,
    pub tool_label: String,
    pub branch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worktree_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Launch mode as the orchestrator recorded it (e.g. "interactive").
    /// Opaque to the engine.
    pub mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inference_level: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// The persisted ledger document for one repository: the capped usage
/// history plus the "last session used anywhere" pointer fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_tool_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_worktree_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub repository_root: String,
    #[serde(default)]
    pub history: Vec<UsageEntry>,
}
