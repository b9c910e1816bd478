//! INI serialization logic for converting `ConfigFile` → INI string.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let recipient = config.alerts.recipient.as_deref().unwrap_or("");
    let geometry_file = config
        .geometry
        .file
        .as_ref()
        .map(|p| path_to_string(p))
        .unwrap_or_default();

    format!(
        r#"[device]
; Tracker address: host, IP or URL. http:// is assumed when no scheme is given.
; Readings are fetched from <address>/gps
address = {}
; Hard timeout for a single request in milliseconds (default: 3000)
timeout_ms = {}
; Interval between polls in milliseconds (default: 2000)
poll_interval_ms = {}

[alerts]
; Continuous violation time before a debounced alert fires, in ms (default: 5000)
debounce_ms = {}
; Distance from a route still considered on route, in meters (default: 100)
buffer_radius_m = {}
; Evaluate the stay-long alert under every source, not only the static simulation
stay_long_any_source = {}
; Address carried in alert notices (optional)
recipient = {}

[simulation]
; Time between simulation steps in milliseconds (default: 500)
tick_ms = {}
; Progress added per step, 0 < step <= 1 (default: 0.02)
step = {}
; Multiplier applied to intrusion motion so it is visible at demo speed (default: 100)
scale_factor = {}
; Simulated seconds covered by one intrusion step (default: 0.05)
step_seconds = {}
; Start position before the first sample
initial_latitude = {}
initial_longitude = {}

[geometry]
; JSON file with zones and routes: {{ "zones": [...], "routes": [...] }}
file = {}
"#,
        config.device.address,
        config.device.timeout_ms,
        config.device.poll_interval_ms,
        config.alerts.debounce_ms,
        config.alerts.buffer_radius_m,
        config.alerts.stay_long_any_source,
        recipient,
        config.simulation.tick_ms,
        config.simulation.step,
        config.simulation.scale_factor,
        config.simulation.step_seconds,
        config.simulation.initial_latitude,
        config.simulation.initial_longitude,
        geometry_file,
    )
}

/// Convert path to string for INI output.
fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
