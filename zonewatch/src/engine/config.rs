//! Engine configuration.

use crate::alert::AlertConfig;
use crate::geo::GeoPoint;
use crate::simulation::SimulationConfig;
use crate::source::LiveSourceConfig;

/// Default start position before any sample arrives.
pub const DEFAULT_INITIAL_POSITION: GeoPoint = GeoPoint::new(10.9589, 106.8554);

/// Everything the monitor needs to run.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub alerts: AlertConfig,
    pub simulation: SimulationConfig,
    pub live: LiveSourceConfig,
    /// Position used as the simulation origin until a sample is seen.
    pub initial_position: GeoPoint,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            alerts: AlertConfig::default(),
            simulation: SimulationConfig::default(),
            live: LiveSourceConfig::default(),
            initial_position: DEFAULT_INITIAL_POSITION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.alerts.debounce_ms, 5000);
        assert_eq!(config.alerts.buffer_radius_meters, 100.0);
        assert!(!config.alerts.stay_long_any_source);
        assert_eq!(config.live.request_timeout, Duration::from_millis(3000));
        assert_eq!(config.simulation.tick_interval, Duration::from_millis(500));
        assert_eq!(config.simulation.step, 0.02);
        assert_eq!(config.simulation.scale_factor, 100.0);
        assert_eq!(config.simulation.step_seconds, 0.05);
        assert_eq!(config.initial_position, GeoPoint::new(10.9589, 106.8554));
    }
}
