//! Re-validation of quick-start entries against live filesystem state.
//!
//! Ledger entries can go stale: the agent may have written newer sessions
//! since the launch was recorded. Before presenting quick-start options,
//! each entry's session id is refreshed through the matching adapter. The
//! input is never mutated; callers get new entries back.

use tracing::debug;

use super::adapters::adapter_for;
use super::types::{ContinuityQuery, SessionQuery, UsageEntry};
use crate::agents::AgentType;
use crate::config::GroveConfig;

/// Refresh the session ids of quick-start entries for a branch/worktree.
///
/// Without a worktree path the entries come back untouched: a tool-and-
/// branch pair alone cannot be pinned to one adapter lookup. With one, a
/// lookup runs per entry (fanned out, joined before returning) and a
/// freshly discovered id replaces the recorded one. An adapter that finds
/// nothing leaves the entry's previous session id in place — absence of
/// evidence must not destroy a prior positive result.
pub fn refresh_quick_start_entries(
    config: &GroveConfig,
    entries: &[UsageEntry],
    query: &ContinuityQuery,
) -> Vec<UsageEntry> {
    let Some(worktree) = &query.worktree_path else {
        return entries.to_vec();
    };

    std::thread::scope(|scope| {
        let handles: Vec<_> = entries
            .iter()
            .map(|entry| {
                scope.spawn(move || {
                    if entry.branch != query.branch {
                        return entry.clone();
                    }
                    let Some(agent) = AgentType::parse(&entry.tool_id) else {
                        debug!(
                            event = "core.continuity.refresh_unknown_tool",
                            tool_id = %entry.tool_id
                        );
                        return entry.clone();
                    };
                    let Some(adapter) = adapter_for(agent, config) else {
                        return entry.clone();
                    };

                    let probe = SessionQuery::for_worktree(worktree.clone());
                    let mut refreshed = entry.clone();
                    if let Some(candidate) = adapter.find_latest_session(&probe) {
                        debug!(
                            event = "core.continuity.refresh_session_id",
                            tool_id = %entry.tool_id,
                            session_id = %candidate.id
                        );
                        refreshed.session_id = Some(candidate.id);
                    }
                    refreshed
                })
            })
            .collect();

        entries
            .iter()
            .zip(handles)
            .map(|(entry, handle)| handle.join().unwrap_or_else(|_| entry.clone()))
            .collect()
    })
}
