//! grove-core: Core library for git worktree and coding-agent session
//! continuity.
//!
//! This library provides the business logic for Grove: discovering the
//! sessions that external coding agents persist to disk, keeping a ledger
//! of past launches per repository, and resolving what "continue" or
//! "quick start" should resume. It is used by the CLI.
//!
//! # Main Entry Points
//!
//! - [`continuity`] - Session discovery, usage ledger, continue/quick-start resolution
//! - [`agents`] - Agent backend management
//! - [`git`] - Worktree inventory
//! - [`config`] - Configuration management

pub mod agents;
pub mod config;
pub mod continuity;
pub mod errors;
pub mod events;
pub mod git;
pub mod logging;

// Re-export commonly used types at crate root for convenience
pub use agents::{AgentBackend, AgentType};
pub use config::GroveConfig;
pub use continuity::{
    ContinuityError, ContinuityQuery, LedgerData, SessionCandidate, SessionQuery, UsageEntry,
    UsageLedger, WaitOptions,
};
pub use git::WorktreeInfo;

// Re-export logging initialization
pub use logging::init_logging;
