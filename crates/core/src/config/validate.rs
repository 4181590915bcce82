use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Gemini section exists (enforced by serde)
/// - Server port is not 0
/// - Gemini API key is non-empty and temperature is in range
/// - Orchestrator has at least one worker and a non-zero queue
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Gemini validation
    if config.gemini.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "gemini.api_key cannot be empty".to_string(),
        ));
    }
    if !(0.0..=2.0).contains(&config.gemini.temperature) {
        return Err(ConfigError::ValidationError(
            "gemini.temperature must be between 0.0 and 2.0".to_string(),
        ));
    }

    // Orchestrator validation
    if config.orchestrator.workers == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.workers cannot be 0".to_string(),
        ));
    }
    if config.orchestrator.queue_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.queue_capacity cannot be 0".to_string(),
        ));
    }

    Ok(())
}
