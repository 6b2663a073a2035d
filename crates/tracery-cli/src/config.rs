//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory).

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use tracery::{TraceryError, config::AppConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),
}

impl From<ConfigError> for TraceryError {
    fn from(err: ConfigError) -> Self {
        TraceryError::Config(err.to_string())
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (tracery/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// Values are checked later, when the render pipeline is built.
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, TraceryError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("tracery/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "tracery", "tracery") {
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

fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, TraceryError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use tracery::config::FailurePolicy;

    use super::*;

    #[test]
    fn test_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[render]\nfailure = \"placeholder\"\n\n[viewport]\nmax_zoom = 4.0").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.render().failure(), FailurePolicy::Placeholder);
        assert_eq!(config.viewport().max_zoom(), 4.0);
        assert_eq!(config.viewport().zoom_step(), 1.2);
    }

    #[test]
    fn test_missing_explicit_path() {
        let err = load_config(Some("/definitely/not/here/config.toml")).unwrap_err();
        assert!(matches!(err, TraceryError::Config(message) if message.contains("Missing")));
    }

    #[test]
    fn test_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[render\nmax_nodes = ").unwrap();
        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, TraceryError::Config(message) if message.contains("TOML")));
    }
}
