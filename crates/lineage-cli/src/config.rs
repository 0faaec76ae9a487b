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

use lineage::{AppConfig, LineageError};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {}", .0.display())]
    MissingFile(PathBuf),
}

impl From<ConfigError> for LineageError {
    fn from(err: ConfigError) -> Self {
        LineageError::Config(err.to_string())
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (lineage/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, LineageError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("lineage/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "lineage", "lineage") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(
                path = system_config.display().to_string();
                "Loading configuration from system path"
            );
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load configuration from a TOML file
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, LineageError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    // Surface palette mistakes here rather than halfway through a run.
    config.style.resolver()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use lineage::EdgePolicy;
    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_explicit_path_is_loaded() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[layout]\ngrid_size = 5.0\n\n[builder]\nedge_policy = \"collapse\"\n"
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.layout.grid_size, 5.0);
        assert_eq!(config.builder.edge_policy, EdgePolicy::Collapse);
    }

    #[test]
    fn test_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(dir.path().join("nope.toml"))).unwrap_err();

        assert!(matches!(err, LineageError::Config(msg) if msg.contains("nope.toml")));
    }

    #[test]
    fn test_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[layout\ngrid_size = ").unwrap();

        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, LineageError::Config(_)));
    }

    #[test]
    fn test_invalid_palette_color() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[style.domain]\nfill = \"not-a-color\"\nstroke = \"blue\"\n"
        )
        .unwrap();

        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, LineageError::Config(_)));
    }
}
