//! Configuration loading and merging logic.
//!
//! This module handles loading configuration from files and merging
//! configurations from different sources (user config, project config).
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.grove/config.toml` (global user preferences)
//! 3. **Project config** - `./.grove/config.toml` (project-specific overrides)
//! 4. **CLI arguments** - Command-line flags (highest priority)

use crate::agents;
use crate::config::types::{AgentConfig, ContinuityConfig, GroveConfig};
use crate::config::validation::validate_config;
use std::fs;
use std::path::{Path, PathBuf};

/// Check if an error is a "file not found" error.
fn is_file_not_found(e: &(dyn std::error::Error + 'static)) -> bool {
    if let Some(io_err) = e.downcast_ref::<std::io::Error>() {
        return io_err.kind() == std::io::ErrorKind::NotFound;
    }

    let err_str = e.to_string();
    err_str.contains("No such file or directory") || err_str.contains("cannot find the path")
}

/// Load configuration from the hierarchy of config files.
///
/// Loads and merges configuration from:
/// 1. Default values
/// 2. User config (`~/.grove/config.toml`)
/// 3. Project config (`./.grove/config.toml`)
///
/// # Errors
///
/// Returns an error if validation fails. Missing config files are not errors.
pub fn load_hierarchy() -> Result<GroveConfig, Box<dyn std::error::Error>> {
    let mut config = GroveConfig::default();

    // Load user config (file not found is expected, parse errors fail)
    match load_user_config() {
        Ok(user_config) => config = merge_configs(config, user_config),
        Err(e) if !is_file_not_found(e.as_ref()) => return Err(e),
        Err(_) => {} // File not found - continue with defaults
    }

    // Load project config (file not found is expected, parse errors fail)
    match load_project_config() {
        Ok(project_config) => config = merge_configs(config, project_config),
        Err(e) if !is_file_not_found(e.as_ref()) => return Err(e),
        Err(_) => {} // File not found - continue with merged config
    }

    // Validate the final configuration
    validate_config(&config)?;

    Ok(config)
}

/// Load the user configuration from ~/.grove/config.toml.
fn load_user_config() -> Result<GroveConfig, Box<dyn std::error::Error>> {
    let home_dir = dirs::home_dir().ok_or("Could not find home directory")?;
    let config_path = home_dir.join(".grove").join("config.toml");
    load_config_file(&config_path)
}

/// Load the project configuration from ./.grove/config.toml.
fn load_project_config() -> Result<GroveConfig, Box<dyn std::error::Error>> {
    let config_path = std::env::current_dir()?.join(".grove").join("config.toml");
    load_config_file(&config_path)
}

/// Load a configuration file from the given path.
fn load_config_file(path: &PathBuf) -> Result<GroveConfig, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;
    let config: GroveConfig = toml::from_str(&content)
        .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;
    Ok(config)
}

/// Merge two configurations, with override_config taking precedence.
///
/// For optional fields, override values replace base values only if present.
/// For collections (like the agents HashMap), entries are merged with
/// override taking precedence.
pub fn merge_configs(base: GroveConfig, override_config: GroveConfig) -> GroveConfig {
    GroveConfig {
        agent: AgentConfig {
            // We can't distinguish between an explicit "claude" and the
            // default "claude" here, so the override's agent setting always
            // wins.
            default: override_config.agent.default,
            startup_command: override_config
                .agent
                .startup_command
                .or(base.agent.startup_command),
            flags: override_config.agent.flags.or(base.agent.flags),
        },
        agents: {
            let mut merged = base.agents;
            for (key, value) in override_config.agents {
                merged.insert(key, value);
            }
            merged
        },
        continuity: ContinuityConfig {
            history_limit: override_config.continuity.history_limit,
            poll_interval_ms: override_config.continuity.poll_interval_ms,
            wait_timeout_ms: override_config.continuity.wait_timeout_ms,
            window_ms: override_config.continuity.window_ms,
        },
    }
}

/// Get the command to run for a specific agent.
///
/// Resolution order:
/// 1. Agent-specific settings from `[agents.<name>]` section
/// 2. Global agent config from `[agent]` section
/// 3. Built-in default command for the agent
///
/// # Errors
///
/// Returns an error if no command can be determined for the agent (unknown
/// agent with no configured startup_command).
pub fn get_agent_command(
    config: &GroveConfig,
    agent_name: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    // Check agent-specific settings first
    if let Some(agent_settings) = config.agents.get(agent_name)
        && let Some(command) = &agent_settings.startup_command
    {
        let mut full_command = command.clone();
        if let Some(flags) = &agent_settings.flags {
            full_command.push(' ');
            full_command.push_str(flags);
        }
        return Ok(full_command);
    }

    // Fall back to global agent config or built-in default
    let base_command = if let Some(cmd) = &config.agent.startup_command {
        cmd.as_str()
    } else {
        agents::get_default_command(agent_name).ok_or_else(|| {
            format!(
                "No command found for agent '{}'. Configure a startup_command in your config file \
                or use a known agent (claude, codex, gemini, opencode).",
                agent_name
            )
        })?
    };

    let mut full_command = base_command.to_string();
    if let Some(flags) = &config.agent.flags {
        full_command.push(' ');
        full_command.push_str(flags);
    }

    Ok(full_command)
}

/// Resolve the configured session-home override for an agent, if any.
///
/// This is the `home_dir` key of `[agents.<name>]` — the directory the
/// agent's own session files live under. Session adapters fall back to the
/// `GROVE_<AGENT>_HOME` environment variable and then the real home
/// directory when this is unset.
pub fn agent_home_override<'a>(config: &'a GroveConfig, agent_name: &str) -> Option<&'a Path> {
    config
        .agents
        .get(agent_name)
        .and_then(|settings| settings.home_dir.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::AgentSettings;
    use std::path::PathBuf;

    #[test]
    fn test_merge_configs_agent_override() {
        let base = GroveConfig::default();
        let mut override_config = GroveConfig::default();
        override_config.agent.default = "codex".to_string();
        override_config.agent.flags = Some("--full-auto".to_string());

        let merged = merge_configs(base, override_config);
        assert_eq!(merged.agent.default, "codex");
        assert_eq!(merged.agent.flags, Some("--full-auto".to_string()));
    }

    #[test]
    fn test_merge_configs_keeps_base_optionals() {
        let mut base = GroveConfig::default();
        base.agent.startup_command = Some("claude-wrapper".to_string());
        let override_config = GroveConfig::default();

        let merged = merge_configs(base, override_config);
        assert_eq!(merged.agent.startup_command, Some("claude-wrapper".to_string()));
    }

    #[test]
    fn test_merge_configs_agents_map() {
        let mut base = GroveConfig::default();
        base.agents.insert(
            "claude".to_string(),
            AgentSettings {
                startup_command: Some("claude-base".to_string()),
                ..Default::default()
            },
        );
        let mut override_config = GroveConfig::default();
        override_config.agents.insert(
            "claude".to_string(),
            AgentSettings {
                startup_command: Some("claude-override".to_string()),
                ..Default::default()
            },
        );
        override_config.agents.insert(
            "codex".to_string(),
            AgentSettings {
                flags: Some("--full-auto".to_string()),
                ..Default::default()
            },
        );

        let merged = merge_configs(base, override_config);
        assert_eq!(
            merged.agents.get("claude").unwrap().startup_command,
            Some("claude-override".to_string())
        );
        assert!(merged.agents.contains_key("codex"));
    }

    #[test]
    fn test_get_agent_command_builtin_default() {
        let config = GroveConfig::default();
        let command = get_agent_command(&config, "claude").unwrap();
        assert_eq!(command, "claude");
    }

    #[test]
    fn test_get_agent_command_with_global_flags() {
        let mut config = GroveConfig::default();
        config.agent.flags = Some("--verbose".to_string());
        let command = get_agent_command(&config, "gemini").unwrap();
        assert_eq!(command, "gemini --verbose");
    }

    #[test]
    fn test_get_agent_command_agent_specific_wins() {
        let mut config = GroveConfig::default();
        config.agent.flags = Some("--global".to_string());
        config.agents.insert(
            "codex".to_string(),
            AgentSettings {
                startup_command: Some("codex-nightly".to_string()),
                flags: Some("--full-auto".to_string()),
                home_dir: None,
            },
        );
        let command = get_agent_command(&config, "codex").unwrap();
        assert_eq!(command, "codex-nightly --full-auto");
    }

    #[test]
    fn test_get_agent_command_unknown_agent() {
        let config = GroveConfig::default();
        let result = get_agent_command(&config, "cursor");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("cursor"));
    }

    #[test]
    fn test_agent_home_override() {
        let mut config = GroveConfig::default();
        config.agents.insert(
            "claude".to_string(),
            AgentSettings {
                home_dir: Some(PathBuf::from("/tmp/claude-home")),
                ..Default::default()
            },
        );

        assert_eq!(
            agent_home_override(&config, "claude"),
            Some(std::path::Path::new("/tmp/claude-home"))
        );
        assert_eq!(agent_home_override(&config, "codex"), None);
    }
}
