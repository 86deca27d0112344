//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ShaderbinConfig;
use std::path::Path;

/// Conventional configuration file name.
pub const CONFIG_FILE: &str = "shaderbin.toml";

/// Loads and validates a configuration file.
pub fn load_config(path: &Path) -> Result<ShaderbinConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ShaderbinConfig, ConfigError> {
    let config: ShaderbinConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &ShaderbinConfig) -> Result<(), ConfigError> {
    if let Some(dir) = &config.cache.dir {
        if dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "cache.dir must not be empty".to_string(),
            ));
        }
    }
    Ok(())
}
