//! Settings file loading and validation.

use crate::error::ConfigError;
use crate::types::BakeConfig;
use std::path::Path;

/// Loads and validates a `shadebake.toml` settings file.
pub fn load_config(path: &Path) -> Result<BakeConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    load_config_from_str(&content)
}

/// Parses and validates settings from a TOML string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<BakeConfig, ConfigError> {
    let config: BakeConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
        what: "settings file".to_string(),
        reason: e.to_string(),
    })?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &BakeConfig) -> Result<(), ConfigError> {
    if let Some(exe) = &config.compiler.executable {
        if exe.trim().is_empty() {
            return Err(ConfigError::Validation(
                "compiler.executable must not be empty".to_string(),
            ));
        }
    }
    if let Some(ext) = &config.compiler.object_extension {
        if ext.is_empty() || ext.contains('.') || ext.contains('/') || ext.contains('\\') {
            return Err(ConfigError::Validation(format!(
                "compiler.object_extension '{ext}' must be a bare extension such as \"cso\""
            )));
        }
    }
    Ok(())
}
