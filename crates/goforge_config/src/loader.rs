//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::WorkspaceConfig;
use std::path::Path;

/// Loads and validates a `goforge.toml` configuration from a project directory.
///
/// Reads `<project_dir>/goforge.toml`, parses it, and validates required fields.
pub fn load_config(project_dir: &Path) -> Result<WorkspaceConfig, ConfigError> {
    load_config_file(&project_dir.join("goforge.toml"))
}

/// Loads and validates a configuration from an explicit file path.
///
/// The file can carry any name; this is the entry point for callers that
/// accept a configuration path directly instead of a project directory.
pub fn load_config_file(config_path: &Path) -> Result<WorkspaceConfig, ConfigError> {
    let content = std::fs::read_to_string(config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `goforge.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<WorkspaceConfig, ConfigError> {
    let config: WorkspaceConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that the required toolchain fields are present and non-empty.
///
/// A bootstrap attempt must never start with an incomplete toolchain
/// description, so all three of goos/goarch/goroot are mandatory here.
fn validate_config(config: &WorkspaceConfig) -> Result<(), ConfigError> {
    if config.toolchain.goos.is_empty() {
        return Err(ConfigError::MissingField("toolchain.goos".to_string()));
    }
    if config.toolchain.goarch.is_empty() {
        return Err(ConfigError::MissingField("toolchain.goarch".to_string()));
    }
    if config.toolchain.goroot.is_empty() {
        return Err(ConfigError::MissingField("toolchain.goroot".to_string()));
    }
    Ok(())
}
