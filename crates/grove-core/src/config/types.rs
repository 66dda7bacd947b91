//! Configuration type definitions for the Grove CLI.
//!
//! This module contains all configuration struct definitions used throughout
//! the Grove CLI. These types are serialized/deserialized from TOML config
//! files.
//!
//! # Example Configuration
//!
//! ```toml
//! [agent]
//! default = "claude"
//! flags = "--yolo"
//!
//! [agents.codex]
//! startup_command = "codex"
//! home_dir = "/Users/me/.codex-alt"
//!
//! [continuity]
//! history_limit = 50
//! poll_interval_ms = 500
//! wait_timeout_ms = 15000
//! window_ms = 120000
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Main configuration loaded from TOML config files.
///
/// Loaded from:
/// 1. User config: `~/.grove/config.toml`
/// 2. Project config: `./.grove/config.toml`
///
/// Project config values override user config values.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GroveConfig {
    /// Global agent configuration
    #[serde(default)]
    pub agent: AgentConfig,

    /// Per-agent settings that override global agent config
    #[serde(default)]
    pub agents: HashMap<String, AgentSettings>,

    /// Session continuity tuning
    #[serde(default)]
    pub continuity: ContinuityConfig,
}

/// Session continuity configuration.
///
/// Controls the usage-ledger cap and the post-launch session discovery
/// timing knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinuityConfig {
    /// Maximum number of usage-ledger entries retained per repository.
    /// Oldest entries are evicted first. Default: 50.
    #[serde(default = "super::defaults::default_history_limit")]
    pub history_limit: usize,

    /// Cadence of session-file polls after an agent launch. Default: 500ms.
    #[serde(default = "super::defaults::default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// How long to keep polling for a freshly written session file before
    /// giving up. Default: 15000ms.
    #[serde(default = "super::defaults::default_wait_timeout_ms")]
    pub wait_timeout_ms: u64,

    /// How far a candidate's file timestamp may sit from the reference
    /// timestamp before it is excluded. Default: 120000ms.
    #[serde(default = "super::defaults::default_window_ms")]
    pub window_ms: u64,
}

/// Global agent configuration.
///
/// Defines the default agent and global settings that apply to all agents
/// unless overridden by per-agent settings in `[agents.<name>]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Default agent to use when none is specified.
    /// Must be one of: claude, codex, gemini, opencode.
    #[serde(default = "super::defaults::default_agent")]
    pub default: String,

    /// Global startup command (used if no agent-specific command).
    #[serde(default)]
    pub startup_command: Option<String>,

    /// Global flags to append to agent commands.
    #[serde(default)]
    pub flags: Option<String>,
}

/// Per-agent settings that override global agent config.
///
/// Used in `[agents.<name>]` sections of the config file.
///
/// # Example
///
/// ```toml
/// [agents.claude]
/// startup_command = "claude"
/// flags = "--dangerously-skip-permissions"
/// home_dir = "/Users/me/claude-sandbox"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AgentSettings {
    /// Agent-specific startup command.
    #[serde(default)]
    pub startup_command: Option<String>,

    /// Agent-specific flags to append to the command.
    #[serde(default)]
    pub flags: Option<String>,

    /// Override of the directory the agent keeps its session files under.
    /// Falls back to the `GROVE_<AGENT>_HOME` environment variable, then
    /// the real home directory.
    #[serde(default)]
    pub home_dir: Option<PathBuf>,
}
