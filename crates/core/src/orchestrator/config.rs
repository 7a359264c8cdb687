//! Orchestrator configuration.

use std::path::PathBuf;

use crate::config::Config;

/// Runtime settings for the scheduling orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Directory holding media files awaiting upload.
    pub media_dir: PathBuf,
    /// Upload limit for a batch run when the caller gives none.
    pub default_limit: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for OrchestratorConfig {
    fn from(config: &Config) -> Self {
        Self {
            media_dir: config.store.media_dir.clone(),
            default_limit: config.schedule.default_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.media_dir, PathBuf::from("."));
        assert_eq!(config.default_limit, 10);
    }

    #[test]
    fn test_from_loaded_config() {
        let config = crate::config::load_config_from_str(
            r#"
            [store]
            media_dir = "/srv/media"

            [schedule]
            default_limit = 3
            "#,
        )
        .unwrap();
        let orchestrator = OrchestratorConfig::from(&config);
        assert_eq!(orchestrator.media_dir, PathBuf::from("/srv/media"));
        assert_eq!(orchestrator.default_limit, 3);
    }
}
