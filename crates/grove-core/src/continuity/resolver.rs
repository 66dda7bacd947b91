//! Continue/quick-start resolution over ledger data.
//!
//! Pure functions over an in-memory [`LedgerData`]: no filesystem access
//! here, so the precedence rules stay independently testable.

use std::collections::HashMap;

use super::types::{LedgerData, UsageEntry};
use crate::agents::AgentType;

/// Whether two tool ids name the same agent, tolerating the different
/// spellings external launchers use ("claude" vs "claude-code").
fn same_tool(a: &str, b: &str) -> bool {
    match (AgentType::parse(a), AgentType::parse(b)) {
        (Some(ta), Some(tb)) => ta == tb,
        _ => a.eq_ignore_ascii_case(b),
    }
}

/// Canonical grouping key for a tool id.
fn tool_key(tool_id: &str) -> String {
    AgentType::parse(tool_id)
        .map(|t| t.as_str().to_string())
        .unwrap_or_else(|| tool_id.to_lowercase())
}

/// What session should "continue" resume for this branch and tool?
///
/// Resolution order:
/// 1. The most recent history entry matching both branch and tool that
///    carries a non-empty session id — wins outright. Recorded intent is
///    trusted over any fresh heuristic lookup, since the entry was
///    captured at the moment the agent actually ran.
/// 2. The last-used pointer fields, but only if their recorded branch and
///    tool both match the query.
/// 3. Nothing.
pub fn resolve_continue_session_id(
    data: &LedgerData,
    branch: &str,
    tool_id: &str,
) -> Option<String> {
    let from_history = data
        .history
        .iter()
        .filter(|entry| {
            entry.branch == branch
                && same_tool(&entry.tool_id, tool_id)
                && entry
                    .session_id
                    .as_deref()
                    .is_some_and(|id| !id.trim().is_empty())
        })
        .max_by_key(|entry| entry.timestamp);
    if let Some(entry) = from_history {
        return entry.session_id.clone();
    }

    let pointer_matches = data.last_branch.as_deref() == Some(branch)
        && data
            .last_tool_id
            .as_deref()
            .is_some_and(|last| same_tool(last, tool_id));
    if pointer_matches
        && let Some(id) = data.last_session_id.as_deref()
        && !id.trim().is_empty()
    {
        return Some(id.to_string());
    }

    None
}

/// The most recent entry for a branch, optionally constrained to one tool.
/// Used to seed UI defaults.
pub fn find_latest_branch_session<'a>(
    history: &'a [UsageEntry],
    branch: &str,
    tool_id: Option<&str>,
) -> Option<&'a UsageEntry> {
    history
        .iter()
        .filter(|entry| entry.branch == branch)
        .filter(|entry| tool_id.is_none_or(|tool| same_tool(&entry.tool_id, tool)))
        .max_by_key(|entry| entry.timestamp)
}

/// One entry per distinct tool for a branch — the quick-start candidate
/// set, ordered most-recent-first.
///
/// When a worktree path is given and a tool has entries from several
/// worktrees, the entry recorded in that worktree outranks a more recent
/// entry from a different one: the session the user is sitting in beats
/// the session they ran somewhere else.
pub fn find_latest_branch_sessions_by_tool(
    history: &[UsageEntry],
    branch: &str,
    worktree_path: Option<&str>,
) -> Vec<UsageEntry> {
    let mut by_tool: HashMap<String, &UsageEntry> = HashMap::new();

    for entry in history.iter().filter(|e| e.branch == branch) {
        let key = tool_key(&entry.tool_id);
        match by_tool.get(&key) {
            None => {
                by_tool.insert(key, entry);
            }
            Some(existing) => {
                if prefer_new(existing, entry, worktree_path) {
                    by_tool.insert(key, entry);
                }
            }
        }
    }

    let mut entries: Vec<UsageEntry> = by_tool.into_values().cloned().collect();
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    entries
}

fn prefer_new(existing: &UsageEntry, new: &UsageEntry, worktree_path: Option<&str>) -> bool {
    if let Some(wt) = worktree_path {
        let existing_here = existing.worktree_path.as_deref() == Some(wt);
        let new_here = new.worktree_path.as_deref() == Some(wt);
        if existing_here != new_here {
            return new_here;
        }
    }
    new.timestamp > existing.timestamp
}
