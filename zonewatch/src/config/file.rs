//! Configuration file handling for ~/.zonewatch/config.ini.
//!
//! Settings structs live in [`super::settings`], parsing in
//! [`super::parser`] and serialization in [`super::writer`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use super::settings::ConfigFile;
use crate::alert::AlertConfig;
use crate::engine::EngineConfig;
use crate::geo::GeoPoint;
use crate::simulation::SimulationConfig;
use crate::source::LiveSourceConfig;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<(), ConfigFileError> {
        self.save_to(&config_file_path())
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        let content = super::writer::to_config_string(self);
        std::fs::write(path, content).map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Create the default config file if it doesn't exist.
    ///
    /// Returns the path to the config file.
    pub fn ensure_exists() -> Result<PathBuf, ConfigFileError> {
        let path = config_file_path();
        if !path.exists() {
            Self::default().save_to(&path)?;
        }
        Ok(path)
    }

    /// Engine configuration described by this file.
    pub fn to_engine_config(&self) -> EngineConfig {
        EngineConfig {
            alerts: AlertConfig {
                debounce_ms: self.alerts.debounce_ms,
                buffer_radius_meters: self.alerts.buffer_radius_m,
                stay_long_any_source: self.alerts.stay_long_any_source,
            },
            simulation: SimulationConfig {
                tick_interval: Duration::from_millis(self.simulation.tick_ms),
                step: self.simulation.step,
                scale_factor: self.simulation.scale_factor,
                step_seconds: self.simulation.step_seconds,
            },
            live: LiveSourceConfig {
                address: self.device.address.clone(),
                request_timeout: Duration::from_millis(self.device.timeout_ms),
                poll_interval: Duration::from_millis(self.device.poll_interval_ms),
            },
            initial_position: GeoPoint::new(
                self.simulation.initial_latitude,
                self.simulation.initial_longitude,
            ),
        }
    }
}

/// Get the path to the config directory (~/.zonewatch).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".zonewatch")
}

/// Get the path to the config file (~/.zonewatch/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = ConfigFile::load_from(&temp_dir.path().join("missing.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_save_creates_parent_and_reloads() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.device.address = "10.0.0.7".to_string();
        config.alerts.debounce_ms = 8000;
        config.alerts.stay_long_any_source = true;
        config.alerts.recipient = Some("ops@example.com".to_string());
        config.geometry.file = Some(PathBuf::from("/srv/zones.json"));
        config.save_to(&path).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_to_engine_config() {
        let mut config = ConfigFile::default();
        config.device.timeout_ms = 1500;
        config.simulation.tick_ms = 250;
        config.alerts.buffer_radius_m = 40.0;

        let engine = config.to_engine_config();
        assert_eq!(engine.live.request_timeout, Duration::from_millis(1500));
        assert_eq!(engine.simulation.tick_interval, Duration::from_millis(250));
        assert_eq!(engine.alerts.buffer_radius_meters, 40.0);
        assert_eq!(engine.initial_position, GeoPoint::new(10.9589, 106.8554));
    }

    #[test]
    fn test_default_file_maps_to_default_engine() {
        assert_eq!(ConfigFile::default().to_engine_config(), EngineConfig::default());
    }

    #[test]
    fn test_config_path_layout() {
        let path = config_file_path();
        assert!(path.ends_with(".zonewatch/config.ini"));
    }
}
