//! Session adapters: one per coding-agent backend.
//!
//! Each adapter knows one vendor CLI's on-disk session-log convention and
//! exposes a single operation: find the most recent session, optionally
//! scoped to a worktree and a reference timestamp. Adapters are stateless
//! functions over the filesystem; a missing root directory is the common
//! case on a machine where that agent has never run and always yields
//! `None`, never an error.

mod claude;
mod codex;
mod gemini;
mod opencode;

pub use claude::ClaudeSessions;
pub use codex::CodexSessions;
pub use gemini::GeminiSessions;
pub use opencode::OpenCodeSessions;

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::types::{SessionCandidate, SessionQuery};
use crate::agents::AgentType;
use crate::config::{self, GroveConfig};

/// Shared interface over the per-agent session-file conventions.
pub trait SessionAdapter: Send + Sync {
    fn agent_type(&self) -> AgentType;

    /// Find the best matching session for the query, or `None`.
    ///
    /// Malformed candidates are discarded silently; I/O problems read as
    /// "nothing found".
    fn find_latest_session(&self, query: &SessionQuery) -> Option<SessionCandidate>;
}

/// Build the adapter for an agent, resolving its session home.
///
/// Home resolution order: `[agents.<name>] home_dir` config override, the
/// `GROVE_<AGENT>_HOME` environment variable, then the real home directory.
/// Returns `None` only when no home can be resolved at all.
pub fn adapter_for(agent: AgentType, config: &GroveConfig) -> Option<Box<dyn SessionAdapter>> {
    let home = resolve_agent_home(agent, config)?;
    let adapter: Box<dyn SessionAdapter> = match agent {
        AgentType::Claude => Box::new(ClaudeSessions::new(home)),
        AgentType::Codex => Box::new(CodexSessions::new(home)),
        AgentType::Gemini => Box::new(GeminiSessions::new(home)),
        AgentType::OpenCode => Box::new(OpenCodeSessions::new(home)),
    };
    Some(adapter)
}

fn resolve_agent_home(agent: AgentType, config: &GroveConfig) -> Option<PathBuf> {
    if let Some(dir) = config::agent_home_override(config, agent.as_str()) {
        return Some(dir.to_path_buf());
    }

    let var = format!("GROVE_{}_HOME", agent.as_str().to_uppercase());
    if let Ok(value) = std::env::var(&var) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    dirs::home_dir()
}

/// Modification time of a file as UTC, falling back to creation time.
pub(crate) fn modified_at(path: &Path) -> Option<DateTime<Utc>> {
    let metadata = fs::metadata(path).ok()?;
    metadata
        .modified()
        .or_else(|_| metadata.created())
        .ok()
        .map(DateTime::<Utc>::from)
}

/// Whether a string is UUID-shaped.
pub(crate) fn is_uuid(value: &str) -> bool {
    Uuid::parse_str(value).is_ok()
}

/// Parse up to `limit` JSON lines from the head of a file, skipping blanks
/// and lines that fail to parse.
pub(crate) fn head_json_lines(path: &Path, limit: usize) -> Vec<Value> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };
    let reader = BufReader::new(file);

    let mut values = Vec::new();
    for line in reader.lines().take(limit) {
        let Ok(line) = line else { break };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
            values.push(value);
        }
    }
    values
}

/// Pick the winning candidate for a query.
///
/// With a reference timestamp, candidates outside the window are dropped
/// and the nearest remaining one wins (equidistant candidates resolve to
/// the earlier). Without one, the most recently modified file wins, with
/// a lexicographic id tie-break for stability across equal mtimes.
pub(crate) fn select_candidate(
    mut candidates: Vec<SessionCandidate>,
    query: &SessionQuery,
) -> Option<SessionCandidate> {
    match query.prefer_closest_to {
        Some(reference) => {
            if let Some(window) = query.window {
                candidates.retain(|c| (c.modified_at - reference).abs() <= window);
            }
            candidates.into_iter().min_by(|a, b| {
                let da = (a.modified_at - reference).abs();
                let db = (b.modified_at - reference).abs();
                da.cmp(&db).then_with(|| a.modified_at.cmp(&b.modified_at))
            })
        }
        None => candidates
            .into_iter()
            .max_by(|a, b| a.modified_at.cmp(&b.modified_at).then_with(|| a.id.cmp(&b.id))),
    }
}
