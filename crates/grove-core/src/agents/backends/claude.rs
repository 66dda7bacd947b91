//! Claude Code agent backend implementation.

use crate::agents::traits::AgentBackend;

/// Backend implementation for Claude Code.
pub struct ClaudeBackend;

impl AgentBackend for ClaudeBackend {
    fn name(&self) -> &'static str {
        "claude"
    }

    fn display_name(&self) -> &'static str {
        "Claude Code"
    }

    fn is_available(&self) -> bool {
        which::which("claude").is_ok()
    }

    fn default_command(&self) -> &'static str {
        "claude"
    }

    fn resume_args(&self, session_id: &str) -> Vec<String> {
        vec!["--resume".to_string(), session_id.to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claude_backend_name() {
        let backend = ClaudeBackend;
        assert_eq!(backend.name(), "claude");
        assert_eq!(backend.display_name(), "Claude Code");
    }

    #[test]
    fn test_claude_backend_default_command() {
        let backend = ClaudeBackend;
        assert_eq!(backend.default_command(), "claude");
    }

    #[test]
    fn test_claude_backend_resume_args() {
        let backend = ClaudeBackend;
        assert_eq!(
            backend.resume_args("12345678-1234-1234-1234-123456789012"),
            vec!["--resume", "12345678-1234-1234-1234-123456789012"]
        );
    }
}
