//! Default implementations for configuration types.
//!
//! This module contains all `Default` implementations and helper functions
//! for providing default values in serde deserialization.

use crate::agents;
use crate::config::types::{AgentConfig, ContinuityConfig};

/// Returns the default agent name.
///
/// Used by serde `#[serde(default = "...")]` attribute.
pub fn default_agent() -> String {
    agents::default_agent_name().to_string()
}

/// Returns the default ledger history cap (50 entries).
///
/// Used by serde `#[serde(default = "...")]` attribute.
pub fn default_history_limit() -> usize {
    50
}

/// Returns the default poll cadence for post-launch session discovery
/// (500ms). Most agents flush their first session line within a couple of
/// seconds of launch.
///
/// Used by serde `#[serde(default = "...")]` attribute.
pub fn default_poll_interval_ms() -> u64 {
    500
}

/// Returns the default post-launch wait timeout (15000ms).
///
/// Used by serde `#[serde(default = "...")]` attribute.
pub fn default_wait_timeout_ms() -> u64 {
    15_000
}

/// Returns the default closest-match window (120000ms). A candidate whose
/// file timestamp sits further than this from the reference timestamp is
/// excluded from selection.
///
/// Used by serde `#[serde(default = "...")]` attribute.
pub fn default_window_ms() -> u64 {
    120_000
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            default: default_agent(),
            startup_command: None,
            flags: None,
        }
    }
}

impl Default for ContinuityConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            poll_interval_ms: default_poll_interval_ms(),
            wait_timeout_ms: default_wait_timeout_ms(),
            window_ms: default_window_ms(),
        }
    }
}
