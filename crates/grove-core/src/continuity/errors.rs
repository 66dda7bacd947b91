//! Continuity-specific error types.

use crate::errors::GroveError;

/// Errors that can occur in the session continuity engine.
///
/// Discovery misses are never errors (adapters return `None`); this enum
/// only covers the ledger boundary, where a corrupt file means loss of
/// user-visible history and must fail loudly.
#[derive(Debug, thiserror::Error)]
pub enum ContinuityError {
    #[error("Usage ledger at '{path}' is malformed: {source}")]
    LedgerMalformed {
        path: String,
        source: serde_json::Error,
    },

    #[error("IO error on usage ledger: {source}")]
    LedgerIo {
        #[from]
        source: std::io::Error,
    },

    #[error("Home directory not found")]
    HomeDirNotFound,
}

impl GroveError for ContinuityError {
    fn error_code(&self) -> &'static str {
        match self {
            ContinuityError::LedgerMalformed { .. } => "LEDGER_MALFORMED",
            ContinuityError::LedgerIo { .. } => "LEDGER_IO_ERROR",
            ContinuityError::HomeDirNotFound => "HOME_DIR_NOT_FOUND",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_malformed_display() {
        let source = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let error = ContinuityError::LedgerMalformed {
            path: "/home/user/.grove/history/repo.json".to_string(),
            source,
        };
        assert!(error.to_string().contains("is malformed"));
        assert_eq!(error.error_code(), "LEDGER_MALFORMED");
        assert!(!error.is_user_error());
    }

    #[test]
    fn test_home_dir_not_found_code() {
        let error = ContinuityError::HomeDirNotFound;
        assert_eq!(error.error_code(), "HOME_DIR_NOT_FOUND");
    }
}
