//! Configuration validation.

use crate::agents;
use crate::config::types::GroveConfig;
use crate::errors::ConfigError;

/// Validate a loaded configuration.
///
/// Checks that the default agent is a known backend and that the continuity
/// timing knobs are usable (a zero poll interval would spin, a zero timeout
/// would never discover anything).
pub fn validate_config(config: &GroveConfig) -> Result<(), ConfigError> {
    if !agents::is_valid_agent(&config.agent.default) {
        return Err(ConfigError::InvalidAgent {
            agent: config.agent.default.clone(),
        });
    }

    if config.continuity.poll_interval_ms == 0 {
        return Err(ConfigError::InvalidConfiguration {
            message: "continuity.poll_interval_ms must be greater than 0".to_string(),
        });
    }

    if config.continuity.wait_timeout_ms == 0 {
        return Err(ConfigError::InvalidConfiguration {
            message: "continuity.wait_timeout_ms must be greater than 0".to_string(),
        });
    }

    if config.continuity.history_limit == 0 {
        return Err(ConfigError::InvalidConfiguration {
            message: "continuity.history_limit must be greater than 0".to_string(),
        });
    }

    Ok(())
}
