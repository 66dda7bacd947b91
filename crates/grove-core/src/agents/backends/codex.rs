//! Codex CLI agent backend implementation.

use crate::agents::traits::AgentBackend;

/// Backend implementation for the Codex CLI.
pub struct CodexBackend;

impl AgentBackend for CodexBackend {
    fn name(&self) -> &'static str {
        "codex"
    }

    fn display_name(&self) -> &'static str {
        "Codex CLI"
    }

    fn is_available(&self) -> bool {
        which::which("codex").is_ok()
    }

    fn default_command(&self) -> &'static str {
        "codex"
    }

    fn resume_args(&self, session_id: &str) -> Vec<String> {
        // Codex uses a subcommand rather than a flag.
        vec!["resume".to_string(), session_id.to_string()]
    }
}
