//! Settings structs mirroring the sections of `config.ini`.

use std::path::PathBuf;

use crate::alert::{DEFAULT_BUFFER_RADIUS_METERS, DEFAULT_DEBOUNCE_MS};
use crate::engine::DEFAULT_INITIAL_POSITION;
use crate::simulation::{
    DEFAULT_SCALE_FACTOR, DEFAULT_STEP, DEFAULT_STEP_SECONDS, DEFAULT_TICK_MS,
};
use crate::source::{DEFAULT_DEVICE_ADDRESS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_REQUEST_TIMEOUT_MS};

/// User configuration loaded from `~/.zonewatch/config.ini`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub device: DeviceSettings,
    pub alerts: AlertSettings,
    pub simulation: SimulationSettings,
    pub geometry: GeometrySettings,
}

/// `[device]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSettings {
    /// Tracker host or URL.
    pub address: String,
    /// Hard timeout per request (ms).
    pub timeout_ms: u64,
    /// Interval between polls (ms).
    pub poll_interval_ms: u64,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            address: DEFAULT_DEVICE_ADDRESS.to_string(),
            timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

/// `[alerts]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertSettings {
    pub debounce_ms: u64,
    pub buffer_radius_m: f64,
    pub stay_long_any_source: bool,
    /// Address carried in alert notices.
    pub recipient: Option<String>,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            buffer_radius_m: DEFAULT_BUFFER_RADIUS_METERS,
            stay_long_any_source: false,
            recipient: None,
        }
    }
}

/// `[simulation]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSettings {
    pub tick_ms: u64,
    pub step: f64,
    pub scale_factor: f64,
    pub step_seconds: f64,
    pub initial_latitude: f64,
    pub initial_longitude: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            step: DEFAULT_STEP,
            scale_factor: DEFAULT_SCALE_FACTOR,
            step_seconds: DEFAULT_STEP_SECONDS,
            initial_latitude: DEFAULT_INITIAL_POSITION.lat,
            initial_longitude: DEFAULT_INITIAL_POSITION.lng,
        }
    }
}

/// `[geometry]` section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometrySettings {
    /// JSON file holding zones and routes.
    pub file: Option<PathBuf>,
}
