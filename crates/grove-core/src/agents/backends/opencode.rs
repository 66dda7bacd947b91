//! OpenCode agent backend implementation.

use crate::agents::traits::AgentBackend;

/// Backend implementation for OpenCode.
pub struct OpenCodeBackend;

impl AgentBackend for OpenCodeBackend {
    fn name(&self) -> &'static str {
        "opencode"
    }

    fn display_name(&self) -> &'static str {
        "OpenCode"
    }

    fn is_available(&self) -> bool {
        which::which("opencode").is_ok()
    }

    fn default_command(&self) -> &'static str {
        "opencode"
    }

    fn resume_args(&self, session_id: &str) -> Vec<String> {
        vec!["--session".to_string(), session_id.to_string()]
    }
}
