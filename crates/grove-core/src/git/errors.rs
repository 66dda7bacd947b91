//! Git-specific error types.

use crate::errors::GroveError;

/// Errors that can occur while reading repository and worktree state.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("Not a git repository: {path}")]
    NotARepository { path: String },

    #[error("Git operation failed: {message}")]
    OperationFailed { message: String },

    #[error("Git error: {source}")]
    Git2Error {
        #[from]
        source: git2::Error,
    },
}

impl GroveError for GitError {
    fn error_code(&self) -> &'static str {
        match self {
            GitError::NotARepository { .. } => "NOT_A_REPOSITORY",
            GitError::OperationFailed { .. } => "GIT_OPERATION_FAILED",
            GitError::Git2Error { .. } => "GIT2_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, GitError::NotARepository { .. })
    }
}
