//! # Session Continuity Engine
//!
//! Agents write their own session transcripts to disk, asynchronously and
//! with no common convention. This module discovers the session identifier
//! an agent assigned to a launch and keeps a per-repository ledger of past
//! launches, so "continue", "resume", and quick-start can target a specific
//! branch, worktree, and agent.
//!
//! Pieces, leaves first:
//!
//! - [`adapters`] - one session-file adapter per agent backend
//! - [`locator`] - one-shot lookup and the post-launch poll loop
//! - [`ledger`] - the persisted, capped usage history
//! - [`resolver`] - continue/quick-start precedence over ledger data
//! - [`refresher`] - re-validation of stale entries against the filesystem
//!
//! Discovery flows one direction (adapter → locator → resolver); only the
//! ledger round-trips to disk. Not-found is always `None`, never an error;
//! the single hard error in the module is a malformed ledger file.

pub mod adapters;
pub mod errors;
pub mod ledger;
pub mod locator;
pub mod refresher;
pub mod resolver;
pub mod types;

pub use adapters::{SessionAdapter, adapter_for};
pub use errors::ContinuityError;
pub use ledger::UsageLedger;
pub use locator::{WaitOptions, find_latest, wait_for};
pub use refresher::refresh_quick_start_entries;
pub use resolver::{
    find_latest_branch_session, find_latest_branch_sessions_by_tool, resolve_continue_session_id,
};
pub use types::{ContinuityQuery, LedgerData, SessionCandidate, SessionQuery, UsageEntry};
