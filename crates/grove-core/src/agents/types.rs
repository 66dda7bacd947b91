//! Agent type definitions.

use serde::{Deserialize, Serialize};

/// Supported agent types in Grove.
///
/// Each variant represents a known AI coding assistant whose sessions
/// Grove can track and resume inside a worktree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentType {
    Claude,
    Codex,
    Gemini,
    OpenCode,
}

impl AgentType {
    /// Get the canonical string name for this agent type.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentType::Claude => "claude",
            AgentType::Codex => "codex",
            AgentType::Gemini => "gemini",
            AgentType::OpenCode => "opencode",
        }
    }

    /// Parse an agent type from a string (case-insensitive).
    ///
    /// Accepts the canonical names plus the tool-id spellings that show up
    /// in ledger entries written by older launchers (e.g. "claude-code").
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        match lower.as_str() {
            "claude" | "claude-code" => Some(AgentType::Claude),
            "codex" | "codex-cli" => Some(AgentType::Codex),
            "gemini" | "gemini-cli" => Some(AgentType::Gemini),
            "opencode" | "open-code" => Some(AgentType::OpenCode),
            _ => None,
        }
    }

    /// Get all supported agent types.
    pub fn all() -> &'static [AgentType] {
        &[
            AgentType::Claude,
            AgentType::Codex,
            AgentType::Gemini,
            AgentType::OpenCode,
        ]
    }
}

impl std::fmt::Display for AgentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AgentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            format!(
                "Unknown agent '{}'. Supported: {}",
                s,
                AgentType::all()
                    .iter()
                    .map(|a| a.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        })
    }
}
