use super::{types::Config, ConfigError};
use crate::matcher::TaskMatcher;
use crate::schedule::SlotAllocator;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Schedule slots parse and are strictly ascending
/// - Matcher identifier pattern compiles
/// - Credentials are present for configured services
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    SlotAllocator::from_config(&config.schedule)
        .map_err(|e| ConfigError::ValidationError(format!("schedule: {}", e)))?;

    TaskMatcher::new(config.matcher.clone())
        .map_err(|e| ConfigError::ValidationError(format!("matcher: {}", e)))?;

    if let Some(generation) = &config.generation {
        if generation.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "generation.base_url cannot be empty".to_string(),
            ));
        }
        if generation.bearer_token.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "generation.bearer_token cannot be empty".to_string(),
            ));
        }
    }

    if let Some(hosting) = &config.hosting {
        if hosting.access_token.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "hosting.access_token cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}
