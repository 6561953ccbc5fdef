//! Configuration file loading for the CLI
//!
//! Finds the TOML configuration for a run, from an explicit path, the working
//! directory or the platform config directory, falling back to defaults.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use deckstyle::{DeckstyleError, config::AppConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<ConfigError> for DeckstyleError {
    fn from(err: ConfigError) -> Self {
        DeckstyleError::Config(err.to_string())
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (deckstyle/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed or fails validation
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, DeckstyleError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("deckstyle/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "deckstyle", "deckstyle") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, DeckstyleError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;

    debug!(
        missing_target:% = config.edit().missing_target(),
        max_reference_depth = config.edit().max_reference_depth();
        "Configuration loaded"
    );
    Ok(config)
}

fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig =
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    if config.edit().max_reference_depth() == 0 {
        return Err(ConfigError::Validation(
            "`edit.max_reference_depth` must be at least 1".to_string(),
        ));
    }

    Ok(config)
}
