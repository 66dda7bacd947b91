//! Gemini CLI agent backend implementation.

use crate::agents::traits::AgentBackend;

/// Backend implementation for the Gemini CLI.
pub struct GeminiBackend;

impl AgentBackend for GeminiBackend {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn display_name(&self) -> &'static str {
        "Gemini CLI"
    }

    fn is_available(&self) -> bool {
        which::which("gemini").is_ok()
    }

    fn default_command(&self) -> &'static str {
        "gemini"
    }

    fn resume_args(&self, session_id: &str) -> Vec<String> {
        vec!["--resume".to_string(), session_id.to_string()]
    }
}
