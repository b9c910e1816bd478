//! Configuration key access and validation.
//!
//! Type-safe get/set of configuration values by `section.key` name, used by
//! the `config` CLI commands.

use std::str::FromStr;

use thiserror::Error;

use super::parser::{
    optional_path, optional_string, parse_address, parse_bool, parse_latitude, parse_longitude,
    parse_positive_f64, parse_positive_u64, parse_step,
};
use super::settings::ConfigFile;

/// Errors that can occur when getting or setting configuration values.
#[derive(Debug, Error)]
pub enum ConfigKeyError {
    /// Unknown configuration key.
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    /// Validation failed for the value.
    #[error("Invalid value for {key}: {reason}")]
    ValidationFailed { key: String, reason: String },
}

/// Supported configuration keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    DeviceAddress,
    DeviceTimeoutMs,
    DevicePollIntervalMs,

    AlertsDebounceMs,
    AlertsBufferRadiusM,
    AlertsStayLongAnySource,
    AlertsRecipient,

    SimulationTickMs,
    SimulationStep,
    SimulationScaleFactor,
    SimulationStepSeconds,
    SimulationInitialLatitude,
    SimulationInitialLongitude,

    GeometryFile,
}

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|key| key.name() == lower)
            .ok_or_else(|| ConfigKeyError::UnknownKey(s.to_string()))
    }
}

impl ConfigKey {
    /// Canonical key name (e.g., "alerts.debounce_ms").
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::DeviceAddress => "device.address",
            ConfigKey::DeviceTimeoutMs => "device.timeout_ms",
            ConfigKey::DevicePollIntervalMs => "device.poll_interval_ms",
            ConfigKey::AlertsDebounceMs => "alerts.debounce_ms",
            ConfigKey::AlertsBufferRadiusM => "alerts.buffer_radius_m",
            ConfigKey::AlertsStayLongAnySource => "alerts.stay_long_any_source",
            ConfigKey::AlertsRecipient => "alerts.recipient",
            ConfigKey::SimulationTickMs => "simulation.tick_ms",
            ConfigKey::SimulationStep => "simulation.step",
            ConfigKey::SimulationScaleFactor => "simulation.scale_factor",
            ConfigKey::SimulationStepSeconds => "simulation.step_seconds",
            ConfigKey::SimulationInitialLatitude => "simulation.initial_latitude",
            ConfigKey::SimulationInitialLongitude => "simulation.initial_longitude",
            ConfigKey::GeometryFile => "geometry.file",
        }
    }

    /// Section name (e.g., "alerts").
    pub fn section(&self) -> &'static str {
        self.name().split('.').next().unwrap_or("")
    }

    /// Key name within the section (e.g., "debounce_ms").
    pub fn key_name(&self) -> &'static str {
        self.name().split('.').nth(1).unwrap_or(self.name())
    }

    /// Get the value from a config file as a string.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::DeviceAddress => config.device.address.clone(),
            ConfigKey::DeviceTimeoutMs => config.device.timeout_ms.to_string(),
            ConfigKey::DevicePollIntervalMs => config.device.poll_interval_ms.to_string(),
            ConfigKey::AlertsDebounceMs => config.alerts.debounce_ms.to_string(),
            ConfigKey::AlertsBufferRadiusM => config.alerts.buffer_radius_m.to_string(),
            ConfigKey::AlertsStayLongAnySource => config.alerts.stay_long_any_source.to_string(),
            ConfigKey::AlertsRecipient => config.alerts.recipient.clone().unwrap_or_default(),
            ConfigKey::SimulationTickMs => config.simulation.tick_ms.to_string(),
            ConfigKey::SimulationStep => config.simulation.step.to_string(),
            ConfigKey::SimulationScaleFactor => config.simulation.scale_factor.to_string(),
            ConfigKey::SimulationStepSeconds => config.simulation.step_seconds.to_string(),
            ConfigKey::SimulationInitialLatitude => config.simulation.initial_latitude.to_string(),
            ConfigKey::SimulationInitialLongitude => {
                config.simulation.initial_longitude.to_string()
            }
            ConfigKey::GeometryFile => config
                .geometry
                .file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        }
    }

    /// Validate `value` and store it in `config`.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigKeyError> {
        let failed = |reason: String| ConfigKeyError::ValidationFailed {
            key: self.name().to_string(),
            reason,
        };

        match self {
            ConfigKey::DeviceAddress => {
                config.device.address = parse_address(value).map_err(failed)?;
            }
            ConfigKey::DeviceTimeoutMs => {
                config.device.timeout_ms = parse_positive_u64(value).map_err(failed)?;
            }
            ConfigKey::DevicePollIntervalMs => {
                config.device.poll_interval_ms = parse_positive_u64(value).map_err(failed)?;
            }
            ConfigKey::AlertsDebounceMs => {
                config.alerts.debounce_ms = parse_positive_u64(value).map_err(failed)?;
            }
            ConfigKey::AlertsBufferRadiusM => {
                config.alerts.buffer_radius_m = parse_positive_f64(value).map_err(failed)?;
            }
            ConfigKey::AlertsStayLongAnySource => {
                config.alerts.stay_long_any_source = parse_bool(value).map_err(failed)?;
            }
            ConfigKey::AlertsRecipient => {
                config.alerts.recipient = optional_string(value);
            }
            ConfigKey::SimulationTickMs => {
                config.simulation.tick_ms = parse_positive_u64(value).map_err(failed)?;
            }
            ConfigKey::SimulationStep => {
                config.simulation.step = parse_step(value).map_err(failed)?;
            }
            ConfigKey::SimulationScaleFactor => {
                config.simulation.scale_factor = parse_positive_f64(value).map_err(failed)?;
            }
            ConfigKey::SimulationStepSeconds => {
                config.simulation.step_seconds = parse_positive_f64(value).map_err(failed)?;
            }
            ConfigKey::SimulationInitialLatitude => {
                config.simulation.initial_latitude = parse_latitude(value).map_err(failed)?;
            }
            ConfigKey::SimulationInitialLongitude => {
                config.simulation.initial_longitude = parse_longitude(value).map_err(failed)?;
            }
            ConfigKey::GeometryFile => {
                config.geometry.file = optional_path(value);
            }
        }
        Ok(())
    }

    /// All supported configuration keys.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::DeviceAddress,
            ConfigKey::DeviceTimeoutMs,
            ConfigKey::DevicePollIntervalMs,
            ConfigKey::AlertsDebounceMs,
            ConfigKey::AlertsBufferRadiusM,
            ConfigKey::AlertsStayLongAnySource,
            ConfigKey::AlertsRecipient,
            ConfigKey::SimulationTickMs,
            ConfigKey::SimulationStep,
            ConfigKey::SimulationScaleFactor,
            ConfigKey::SimulationStepSeconds,
            ConfigKey::SimulationInitialLatitude,
            ConfigKey::SimulationInitialLongitude,
            ConfigKey::GeometryFile,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_key_parsing() {
        assert_eq!(
            "alerts.debounce_ms".parse::<ConfigKey>().unwrap(),
            ConfigKey::AlertsDebounceMs
        );
        assert_eq!(
            "DEVICE.ADDRESS".parse::<ConfigKey>().unwrap(),
            ConfigKey::DeviceAddress
        );
        assert!(matches!(
            "alerts.volume".parse::<ConfigKey>(),
            Err(ConfigKeyError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_key_name_parts() {
        let key = ConfigKey::SimulationScaleFactor;
        assert_eq!(key.section(), "simulation");
        assert_eq!(key.key_name(), "scale_factor");
    }

    #[test]
    fn test_set_and_get() {
        let mut config = ConfigFile::default();
        ConfigKey::AlertsStayLongAnySource
            .set(&mut config, "on")
            .unwrap();
        ConfigKey::DeviceTimeoutMs.set(&mut config, "1500").unwrap();

        assert_eq!(ConfigKey::AlertsStayLongAnySource.get(&config), "true");
        assert_eq!(ConfigKey::DeviceTimeoutMs.get(&config), "1500");
    }

    #[test]
    fn test_set_invalid_value_fails() {
        let mut config = ConfigFile::default();
        let result = ConfigKey::SimulationInitialLongitude.set(&mut config, "200");

        assert!(matches!(result, Err(ConfigKeyError::ValidationFailed { .. })));
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_clear_optional_value() {
        let mut config = ConfigFile::default();
        ConfigKey::AlertsRecipient
            .set(&mut config, "ops@example.com")
            .unwrap();
        ConfigKey::AlertsRecipient.set(&mut config, "").unwrap();
        assert!(config.alerts.recipient.is_none());
    }

    #[test]
    fn test_all_keys_round_trip_names() {
        for key in ConfigKey::all() {
            assert_eq!(key.name().parse::<ConfigKey>().unwrap(), *key);
        }
    }
}
