//! Single-key edits of a configuration file.
//!
//! `config set` must never turn a partly invalid file into defaults. The new
//! value is validated on its own, then written into the raw INI next to
//! everything else the file holds. The file is regenerated from the full
//! settings only when every entry parses; otherwise the raw INI is written
//! back with just that one key changed.

use std::path::Path;

use ini::Ini;

use super::file::ConfigFileError;
use super::keys::{ConfigKey, ConfigKeyError};
use super::settings::ConfigFile;

/// Outcome of [`set_key`].
#[derive(Debug)]
pub struct KeyUpdate {
    /// Value as stored.
    pub stored: String,
    /// First error still reported by other entries. When set, the file was
    /// kept as written apart from the updated key.
    pub remaining: Option<ConfigFileError>,
}

/// Set one key in the file at `path`, keeping every other entry.
///
/// A missing file is created with defaults for everything else.
///
/// # Errors
///
/// Returns `InvalidValue` without touching the file when `value` fails
/// validation, and read/write errors from the file itself.
pub fn set_key(path: &Path, key: ConfigKey, value: &str) -> Result<KeyUpdate, ConfigFileError> {
    let mut scratch = ConfigFile::default();
    key.set(&mut scratch, value)
        .map_err(|e| invalid_value(key, value, e))?;
    let stored = key.get(&scratch);

    let mut ini = if path.exists() {
        Ini::load_from_file(path)?
    } else {
        Ini::new()
    };
    ini.with_section(Some(key.section()))
        .set(key.key_name(), stored.as_str());

    match super::parser::parse_ini(&ini) {
        Ok(config) => {
            config.save_to(path)?;
            Ok(KeyUpdate {
                stored,
                remaining: None,
            })
        }
        Err(e) => {
            tracing::warn!(error = %e, "Config file still has invalid entries, keeping it as written");
            ini.write_to_file(path)
                .map_err(|e| ConfigFileError::WriteError(e.to_string()))?;
            Ok(KeyUpdate {
                stored,
                remaining: Some(e),
            })
        }
    }
}

fn invalid_value(key: ConfigKey, value: &str, error: ConfigKeyError) -> ConfigFileError {
    let reason = match error {
        ConfigKeyError::ValidationFailed { reason, .. } => reason,
        other => other.to_string(),
    };
    ConfigFileError::InvalidValue {
        section: key.section().to_string(),
        key: key.key_name().to_string(),
        value: value.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("config.ini");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_fixing_invalid_key_keeps_other_settings() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "[device]\naddress = 10.1.2.3\n\n[alerts]\ndebounce_ms = 0\nrecipient = ops@example.com\n",
        );
        assert!(ConfigFile::load_from(&path).is_err());

        let update = set_key(&path, ConfigKey::AlertsDebounceMs, "5000").unwrap();
        assert_eq!(update.stored, "5000");
        assert!(update.remaining.is_none());

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.alerts.debounce_ms, 5000);
        assert_eq!(config.device.address, "10.1.2.3");
        assert_eq!(config.alerts.recipient.as_deref(), Some("ops@example.com"));
    }

    #[test]
    fn test_other_invalid_key_leaves_file_as_written() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "[device]\naddress = 10.1.2.3\n\n[alerts]\ndebounce_ms = 7000\nbuffer_radius_m = -1\n",
        );

        let update = set_key(&path, ConfigKey::DeviceTimeoutMs, "1500").unwrap();
        match update.remaining {
            Some(ConfigFileError::InvalidValue { key, .. }) => assert_eq!(key, "buffer_radius_m"),
            other => panic!("expected remaining InvalidValue, got {:?}", other),
        }

        let ini = Ini::load_from_file(&path).unwrap();
        let device = ini.section(Some("device")).unwrap();
        assert_eq!(device.get("address"), Some("10.1.2.3"));
        assert_eq!(device.get("timeout_ms"), Some("1500"));
        let alerts = ini.section(Some("alerts")).unwrap();
        assert_eq!(alerts.get("debounce_ms"), Some("7000"));
        assert_eq!(alerts.get("buffer_radius_m"), Some("-1"));
    }

    #[test]
    fn test_rejected_value_does_not_touch_file() {
        let dir = TempDir::new().unwrap();
        let content = "[alerts]\ndebounce_ms = 7000\n";
        let path = write(&dir, content);

        let result = set_key(&path, ConfigKey::AlertsDebounceMs, "soon");
        assert!(matches!(result, Err(ConfigFileError::InvalidValue { .. })));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");

        set_key(&path, ConfigKey::SimulationStepSeconds, "0.5").unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.simulation.step_seconds, 0.5);
        assert_eq!(config.device, ConfigFile::default().device);
    }
}
