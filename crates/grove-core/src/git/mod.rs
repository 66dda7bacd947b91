//! Read-only git data layer: worktree inventory and branch lookup.

pub mod errors;
pub mod types;
pub mod worktrees;

pub use errors::GitError;
pub use types::WorktreeInfo;
pub use worktrees::{current_branch, list_worktrees, main_repo_root};
