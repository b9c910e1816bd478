//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.
//! The value parsers are shared with [`super::keys`] so `config set` applies
//! the same rules as loading.

use std::path::PathBuf;

use ini::Ini;

use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [device] section
    if let Some(section) = ini.section(Some("device")) {
        if let Some(v) = section.get("address") {
            config.device.address = parse_address(v).map_err(invalid("device", "address", v))?;
        }
        if let Some(v) = section.get("timeout_ms") {
            config.device.timeout_ms =
                parse_positive_u64(v).map_err(invalid("device", "timeout_ms", v))?;
        }
        if let Some(v) = section.get("poll_interval_ms") {
            config.device.poll_interval_ms =
                parse_positive_u64(v).map_err(invalid("device", "poll_interval_ms", v))?;
        }
    }

    // [alerts] section
    if let Some(section) = ini.section(Some("alerts")) {
        if let Some(v) = section.get("debounce_ms") {
            config.alerts.debounce_ms =
                parse_positive_u64(v).map_err(invalid("alerts", "debounce_ms", v))?;
        }
        if let Some(v) = section.get("buffer_radius_m") {
            config.alerts.buffer_radius_m =
                parse_positive_f64(v).map_err(invalid("alerts", "buffer_radius_m", v))?;
        }
        if let Some(v) = section.get("stay_long_any_source") {
            config.alerts.stay_long_any_source =
                parse_bool(v).map_err(invalid("alerts", "stay_long_any_source", v))?;
        }
        if let Some(v) = section.get("recipient") {
            config.alerts.recipient = optional_string(v);
        }
    }

    // [simulation] section
    if let Some(section) = ini.section(Some("simulation")) {
        if let Some(v) = section.get("tick_ms") {
            config.simulation.tick_ms =
                parse_positive_u64(v).map_err(invalid("simulation", "tick_ms", v))?;
        }
        if let Some(v) = section.get("step") {
            config.simulation.step = parse_step(v).map_err(invalid("simulation", "step", v))?;
        }
        if let Some(v) = section.get("scale_factor") {
            config.simulation.scale_factor =
                parse_positive_f64(v).map_err(invalid("simulation", "scale_factor", v))?;
        }
        if let Some(v) = section.get("step_seconds") {
            config.simulation.step_seconds =
                parse_positive_f64(v).map_err(invalid("simulation", "step_seconds", v))?;
        }
        if let Some(v) = section.get("initial_latitude") {
            config.simulation.initial_latitude =
                parse_latitude(v).map_err(invalid("simulation", "initial_latitude", v))?;
        }
        if let Some(v) = section.get("initial_longitude") {
            config.simulation.initial_longitude =
                parse_longitude(v).map_err(invalid("simulation", "initial_longitude", v))?;
        }
    }

    // [geometry] section
    if let Some(section) = ini.section(Some("geometry")) {
        if let Some(v) = section.get("file") {
            config.geometry.file = optional_path(v);
        }
    }

    Ok(config)
}

fn invalid<'a>(
    section: &'a str,
    key: &'a str,
    value: &'a str,
) -> impl FnOnce(String) -> ConfigFileError + 'a {
    move |reason| ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason,
    }
}

// ============================================================================
// Value parsers
// ============================================================================

pub(super) fn parse_address(value: &str) -> Result<String, String> {
    let v = value.trim();
    if v.is_empty() {
        Err("must be a host name, IP address or URL".to_string())
    } else {
        Ok(v.to_string())
    }
}

pub(super) fn parse_positive_u64(value: &str) -> Result<u64, String> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err("must be a positive integer (milliseconds)".to_string()),
    }
}

pub(super) fn parse_positive_f64(value: &str) -> Result<f64, String> {
    match value.trim().parse::<f64>() {
        Ok(n) if n.is_finite() && n > 0.0 => Ok(n),
        _ => Err("must be a positive number".to_string()),
    }
}

pub(super) fn parse_step(value: &str) -> Result<f64, String> {
    match value.trim().parse::<f64>() {
        Ok(n) if n > 0.0 && n <= 1.0 => Ok(n),
        _ => Err("must be a number in (0, 1]".to_string()),
    }
}

pub(super) fn parse_latitude(value: &str) -> Result<f64, String> {
    match value.trim().parse::<f64>() {
        Ok(n) if (-90.0..=90.0).contains(&n) => Ok(n),
        _ => Err("must be a latitude between -90 and 90".to_string()),
    }
}

pub(super) fn parse_longitude(value: &str) -> Result<f64, String> {
    match value.trim().parse::<f64>() {
        Ok(n) if (-180.0..=180.0).contains(&n) => Ok(n),
        _ => Err("must be a longitude between -180 and 180".to_string()),
    }
}

pub(super) fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err("must be true/false, yes/no, 1/0, or on/off".to_string()),
    }
}

/// Convert empty string to None, non-empty to Some.
pub(super) fn optional_string(value: &str) -> Option<String> {
    let v = value.trim();
    if v.is_empty() {
        None
    } else {
        Some(v.to_string())
    }
}

/// Convert empty string to None, non-empty to Some path with tilde expansion.
pub(super) fn optional_path(value: &str) -> Option<PathBuf> {
    optional_string(value).map(|v| expand_tilde(&v))
}

/// Expand ~ to home directory in paths.
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
