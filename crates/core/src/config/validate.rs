use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - History capacity is not 0
/// - At least one persistence attempt is allowed
/// - Planning refresh has a source and a non-zero interval when enabled
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.history.capacity == 0 {
        return Err(ConfigError::ValidationError(
            "history.capacity cannot be 0".to_string(),
        ));
    }

    if config.history.dedup_window_ms < 0 {
        return Err(ConfigError::ValidationError(
            "history.dedup_window_ms cannot be negative".to_string(),
        ));
    }

    if config.persistence.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "persistence.max_attempts cannot be 0".to_string(),
        ));
    }

    if config.planning.enabled {
        let has_source = config
            .planning
            .source_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty());
        if !has_source {
            return Err(ConfigError::ValidationError(
                "planning.source_url is required when planning is enabled".to_string(),
            ));
        }
        if config.planning.interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "planning.interval_secs cannot be 0".to_string(),
            ));
        }
    }

    Ok(())
}
