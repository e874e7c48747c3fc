//! Application configuration
//!
//! Stored as RON. The file is looked up at `$CV_CONFIG`, falling back to
//! `cad-viewer.ron` in the working directory. A missing or unreadable file
//! yields defaults; it is never an error at startup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cv_core::TessellationParams;
use cv_renderer::RendererConfig;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Environment variable overriding the config file location
pub const CONFIG_ENV_VAR: &str = "CV_CONFIG";

/// Default config file name
pub const CONFIG_FILE_NAME: &str = "cad-viewer.ron";

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Serialize error: {0}")]
    Serialize(String),
    #[error("No config file location (browser build)")]
    NoPath,
}

/// External converter used for native imports
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImporterConfig {
    /// Program to run
    pub command: String,
    /// Arguments placed before the format tag and parameters
    pub args: Vec<String>,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            command: "occt-import".to_string(),
            args: Vec::new(),
        }
    }
}

/// Browser build settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WebConfig {
    /// Base URL of the kernel's `.wasm` asset; empty means same origin
    pub wasm_base_url: String,
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Tessellation parameters passed to every import
    pub tessellation: TessellationParams,
    /// Camera, lights and background
    pub renderer: RendererConfig,
    /// Native converter
    pub importer: ImporterConfig,
    /// Browser settings
    pub web: WebConfig,
}

impl AppConfig {
    /// Parse from RON text
    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        ron::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize to pretty RON text
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }
}

/// Owns the configuration and where it is saved
#[derive(Debug)]
pub struct ConfigManager {
    config: AppConfig,
    path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load from the default location, or defaults in the browser
    pub fn load_default() -> Self {
        match default_config_path() {
            Some(path) => Self::load_or_default(path),
            None => Self::in_memory(AppConfig::default()),
        }
    }

    /// Load from `path`; missing or malformed files give defaults
    pub fn load_or_default(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let config = match Self::read(&path) {
            Ok(Some(config)) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Ok(None) => {
                tracing::debug!("No config at {}, using defaults", path.display());
                AppConfig::default()
            }
            Err(e) => {
                tracing::warn!("Ignoring config at {}: {}", path.display(), e);
                AppConfig::default()
            }
        };
        Self {
            config,
            path: Some(path),
        }
    }

    /// A manager that has nowhere to save
    pub fn in_memory(config: AppConfig) -> Self {
        Self { config, path: None }
    }

    fn read(path: &Path) -> Result<Option<AppConfig>, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => AppConfig::from_ron(&content).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ConfigError::Io(e.to_string())),
        }
    }

    /// Current configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Mutable configuration
    pub fn config_mut(&mut self) -> &mut AppConfig {
        &mut self.config
    }

    /// Where the config is saved
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Restore every setting to its default
    pub fn reset_to_defaults(&mut self) {
        self.config = AppConfig::default();
    }

    /// Write the configuration back to its file
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = self.path.as_ref().ok_or(ConfigError::NoPath)?;
        let content = self.config.to_ron()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))?;
        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn default_config_path() -> Option<PathBuf> {
    Some(
        std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME)),
    )
}

#[cfg(target_arch = "wasm32")]
fn default_config_path() -> Option<PathBuf> {
    None
}

/// Configuration shared between panels
pub type SharedConfig = Arc<RwLock<ConfigManager>>;

/// Wrap a manager for sharing
pub fn create_shared_config(manager: ConfigManager) -> SharedConfig {
    Arc::new(RwLock::new(manager))
}

#[cfg(test)]
mod tests {
    use cv_core::{DeflectionType, LinearUnit};

    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.tessellation.linear_unit, LinearUnit::Millimeter);
        assert_eq!(
            config.tessellation.linear_deflection_type,
            DeflectionType::BoundingBoxRatio
        );
        assert_eq!(config.tessellation.linear_deflection, 0.001);
        assert_eq!(config.tessellation.angular_deflection, 0.5);
        assert_eq!(config.renderer.camera.fov_degrees, 45.0);
        assert_eq!(config.importer.command, "occt-import");
        assert!(config.web.wasm_base_url.is_empty());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::load_or_default(dir.path().join("absent.ron"));
        assert_eq!(manager.config(), &AppConfig::default());
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ron");
        std::fs::write(&path, "(tessellation: [").unwrap();

        let manager = ConfigManager::load_or_default(&path);
        assert_eq!(manager.config(), &AppConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.ron");
        std::fs::write(&path, r#"(importer: (command: "/opt/occt/convert"))"#).unwrap();

        let manager = ConfigManager::load_or_default(&path);
        assert_eq!(manager.config().importer.command, "/opt/occt/convert");
        assert_eq!(manager.config().tessellation, TessellationParams::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cad-viewer.ron");

        let mut manager = ConfigManager::load_or_default(&path);
        manager.config_mut().tessellation.linear_unit = LinearUnit::Inch;
        manager.config_mut().tessellation.angular_deflection = 0.25;
        manager.config_mut().importer.args = vec!["--quiet".into()];
        manager.save().unwrap();

        let reloaded = ConfigManager::load_or_default(&path);
        assert_eq!(reloaded.config(), manager.config());
    }

    #[test]
    fn test_in_memory_cannot_save() {
        let manager = ConfigManager::in_memory(AppConfig::default());
        assert!(matches!(manager.save(), Err(ConfigError::NoPath)));
    }

    #[test]
    fn test_reset_to_defaults() {
        let mut manager = ConfigManager::in_memory(AppConfig::default());
        manager.config_mut().renderer.camera.fov_degrees = 90.0;
        manager.reset_to_defaults();
        assert_eq!(manager.config(), &AppConfig::default());
    }
}
