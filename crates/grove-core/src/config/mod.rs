//! # Configuration System
//!
//! Hierarchical TOML configuration system for the Grove CLI.
//!
//! ## Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.grove/config.toml` (global user preferences)
//! 3. **Project config** - `./.grove/config.toml` (project-specific overrides)
//! 4. **CLI arguments** - Command-line flags (highest priority)
//!
//! ## Usage Example
//!
//! ```toml
//! # ~/.grove/config.toml
//! [agent]
//! default = "claude"
//!
//! [agents.claude]
//! flags = "--dangerously-skip-permissions"
//!
//! [continuity]
//! wait_timeout_ms = 20000
//! ```

pub mod defaults;
pub mod loading;
pub mod types;
pub mod validation;

// Public API exports
pub use loading::agent_home_override;
pub use types::{AgentConfig, AgentSettings, ContinuityConfig, GroveConfig};
pub use validation::validate_config;

impl GroveConfig {
    /// Load configuration from the hierarchy of config files.
    ///
    /// See [`loading::load_hierarchy`] for details.
    pub fn load_hierarchy() -> Result<Self, Box<dyn std::error::Error>> {
        loading::load_hierarchy()
    }

    /// Validate the configuration.
    ///
    /// See [`validation::validate_config`] for details.
    pub fn validate(&self) -> Result<(), crate::errors::ConfigError> {
        validation::validate_config(self)
    }

    /// Get the command to run for a specific agent.
    ///
    /// See [`loading::get_agent_command`] for details.
    pub fn get_agent_command(
        &self,
        agent_name: &str,
    ) -> Result<String, Box<dyn std::error::Error>> {
        loading::get_agent_command(self, agent_name)
    }
}
