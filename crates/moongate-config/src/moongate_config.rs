use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::{APP_NAME, engine_config::EngineConfig, logging_config::LoggingConfig, paths::ProjectPaths};

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Config file not found")]
    NotFound,
    #[error("Failed to parse config: {0}")]
    ParseError(String),
    #[error("IO error reading config: {0}")]
    IoError(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoongateConfig {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MoongateConfig {
    pub fn config_path() -> PathBuf {
        ProjectPaths::new(APP_NAME)
            .map(|p| p.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    pub fn load() -> Result<Self, ConfigLoadError> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigLoadError> {
        if !path.exists() {
            return Err(ConfigLoadError::NotFound);
        }

        let content =
            fs::read_to_string(path).map_err(|e| ConfigLoadError::IoError(e.to_string()))?;
        let config =
            toml::from_str(&content).map_err(|e| ConfigLoadError::ParseError(e.to_string()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigLoadError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigLoadError::IoError(e.to_string()))?;
        }

        let content =
            toml::to_string_pretty(&self).map_err(|e| ConfigLoadError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(|e| ConfigLoadError::IoError(e.to_string()))?;
        info!("Saved config to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = MoongateConfig::load_from(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigLoadError::NotFound)));
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[engine\ntick = ").unwrap();
        let result = MoongateConfig::load_from(&path);
        assert!(matches!(result, Err(ConfigLoadError::ParseError(_))));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = MoongateConfig::default();
        config.engine.move_pacing_ms = 600;
        config.engine.autostart.push("guard_caller".to_string());
        config.logging.file = true;
        config.save_to(&path).unwrap();

        let loaded = MoongateConfig::load_from(&path).unwrap();
        assert_eq!(loaded.engine.move_pacing_ms, 600);
        assert_eq!(loaded.engine.autostart, vec!["guard_caller"]);
        assert!(loaded.logging.file);
    }
}
