//! Simulation kinds and driver state.

/// Default heading for intrusion runs (degrees, 0 = North).
pub const DEFAULT_INTRUSION_DIRECTION_DEG: f64 = 45.0;

/// Default speed for intrusion runs (km/h).
pub const DEFAULT_INTRUSION_SPEED_KMH: f64 = 35.0;

/// Fastest accepted intrusion speed (km/h).
pub const MAX_INTRUSION_SPEED_KMH: f64 = 200.0;

/// What the simulation driver generates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimulationKind {
    /// Jitter around the position captured at start. Loops.
    Static,
    /// Straight-line motion at a fixed heading and speed. Loops.
    Intrusion { direction_deg: f64, speed_kmh: f64 },
    /// Follow the first monitored route. Loops.
    Route,
    /// Follow the first monitored route once, then stop.
    RouteOnce,
}

impl SimulationKind {
    /// Intrusion with optional heading and speed, falling back to defaults.
    ///
    /// Missing or non-finite values take the defaults. The heading is wrapped
    /// into `0..360` and the speed clamped to `0..=MAX_INTRUSION_SPEED_KMH`.
    pub fn intrusion(direction_deg: Option<f64>, speed_kmh: Option<f64>) -> Self {
        let direction_deg = direction_deg
            .filter(|d| d.is_finite())
            .unwrap_or(DEFAULT_INTRUSION_DIRECTION_DEG)
            .rem_euclid(360.0);
        let speed_kmh = speed_kmh
            .filter(|s| s.is_finite())
            .unwrap_or(DEFAULT_INTRUSION_SPEED_KMH)
            .clamp(0.0, MAX_INTRUSION_SPEED_KMH);

        Self::Intrusion {
            direction_deg,
            speed_kmh,
        }
    }

    /// Looping kinds never complete on their own.
    pub fn is_looping(&self) -> bool {
        match self {
            Self::Static | Self::Intrusion { .. } | Self::Route => true,
            Self::RouteOnce => false,
        }
    }

    /// Kinds that read their path from the monitored routes.
    pub fn follows_route(&self) -> bool {
        matches!(self, Self::Route | Self::RouteOnce)
    }
}

impl std::fmt::Display for SimulationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static => write!(f, "static"),
            Self::Intrusion {
                direction_deg,
                speed_kmh,
            } => write!(f, "intrusion ({:.0} deg, {:.0} km/h)", direction_deg, speed_kmh),
            Self::Route => write!(f, "route"),
            Self::RouteOnce => write!(f, "route-once"),
        }
    }
}

/// Snapshot of the driver's progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationState {
    pub active: bool,
    pub kind: SimulationKind,
    /// Fraction of the current loop (0..1).
    pub progress: f64,
    pub direction_deg: f64,
    pub speed_kmh: f64,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self {
            active: false,
            kind: SimulationKind::Static,
            progress: 0.0,
            direction_deg: 0.0,
            speed_kmh: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intrusion_defaults() {
        assert_eq!(
            SimulationKind::intrusion(None, None),
            SimulationKind::Intrusion {
                direction_deg: 45.0,
                speed_kmh: 35.0
            }
        );
        assert_eq!(
            SimulationKind::intrusion(Some(180.0), Some(-5.0)),
            SimulationKind::Intrusion {
                direction_deg: 180.0,
                speed_kmh: 0.0
            }
        );
    }

    #[test]
    fn test_intrusion_rejects_non_finite_inputs() {
        assert_eq!(
            SimulationKind::intrusion(Some(f64::NAN), Some(f64::INFINITY)),
            SimulationKind::intrusion(None, None)
        );
    }

    #[test]
    fn test_intrusion_clamps_speed_and_wraps_heading() {
        assert_eq!(
            SimulationKind::intrusion(Some(-90.0), Some(5000.0)),
            SimulationKind::Intrusion {
                direction_deg: 270.0,
                speed_kmh: 200.0
            }
        );
        assert_eq!(
            SimulationKind::intrusion(Some(360.0), Some(200.0)),
            SimulationKind::Intrusion {
                direction_deg: 0.0,
                speed_kmh: 200.0
            }
        );
    }

    #[test]
    fn test_only_route_once_terminates() {
        assert!(SimulationKind::Static.is_looping());
        assert!(SimulationKind::intrusion(None, None).is_looping());
        assert!(SimulationKind::Route.is_looping());
        assert!(!SimulationKind::RouteOnce.is_looping());
    }
}
