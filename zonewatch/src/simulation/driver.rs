//! Simulation driver.
//!
//! Produces one [`PositionSample`] per tick. The driver does not own a timer;
//! the caller ticks it at [`SimulationConfig::tick_interval`] and the step
//! arithmetic assumes that cadence.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;

use super::state::{SimulationKind, SimulationState};
use crate::geo::{flat_offset, GeoPoint, KM_PER_DEGREE_LATITUDE};
use crate::rules::GeometrySnapshot;
use crate::source::PositionSample;

/// Default tick interval (ms).
pub const DEFAULT_TICK_MS: u64 = 500;

/// Default progress increment per tick.
pub const DEFAULT_STEP: f64 = 0.02;

/// Default motion scale factor for intrusion runs.
pub const DEFAULT_SCALE_FACTOR: f64 = 100.0;

/// Default simulated time per intrusion step (seconds).
pub const DEFAULT_STEP_SECONDS: f64 = 0.05;

/// Full width of the static jitter window (degrees).
const STATIC_JITTER_DEG: f64 = 0.00001;

/// Reported speed band for route runs (km/h).
const ROUTE_SPEED_MIN_KMH: u32 = 40;
const ROUTE_SPEED_MAX_KMH: u32 = 55;

/// Simulation tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Time between ticks.
    pub tick_interval: Duration,
    /// Progress added per tick.
    pub step: f64,
    /// Multiplier applied to intrusion displacement so motion is visible
    /// at demo time scales. Not a physical unit.
    pub scale_factor: f64,
    /// Simulated time covered by one intrusion step (seconds). Independent
    /// of `tick_interval`.
    pub step_seconds: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(DEFAULT_TICK_MS),
            step: DEFAULT_STEP,
            scale_factor: DEFAULT_SCALE_FACTOR,
            step_seconds: DEFAULT_STEP_SECONDS,
        }
    }
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// A new sample was generated.
    Sample(PositionSample),
    /// A bounded run reached its end and the driver is now inactive.
    Completed,
    /// The driver is not running.
    Inactive,
}

/// Generates synthetic position samples.
pub struct SimulationDriver {
    config: SimulationConfig,
    state: SimulationState,
    rng: StdRng,
    /// Position captured at start for static runs.
    anchor: GeoPoint,
    /// Last generated position.
    position: GeoPoint,
}

impl SimulationDriver {
    /// Create an idle driver.
    pub fn new(config: SimulationConfig, rng: StdRng) -> Self {
        Self {
            config,
            state: SimulationState::default(),
            rng,
            anchor: GeoPoint::default(),
            position: GeoPoint::default(),
        }
    }

    /// Current state.
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Returns true while a run is active.
    pub fn is_active(&self) -> bool {
        self.state.active
    }

    /// Configuration in use.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Start a run from `current_position`.
    ///
    /// Replaces any run in progress.
    pub fn start(&mut self, kind: SimulationKind, current_position: GeoPoint) {
        let (direction_deg, speed_kmh) = match kind {
            SimulationKind::Intrusion {
                direction_deg,
                speed_kmh,
            } => (direction_deg, speed_kmh),
            _ => (0.0, 0.0),
        };

        self.anchor = current_position;
        self.position = current_position;
        self.state = SimulationState {
            active: true,
            kind,
            progress: 0.0,
            direction_deg,
            speed_kmh,
        };

        tracing::info!(
            %kind,
            latitude = current_position.lat,
            longitude = current_position.lng,
            "Simulation started"
        );
    }

    /// Stop the run, if any.
    ///
    /// Returns true if a run was active.
    pub fn stop(&mut self) -> bool {
        let was_active = self.state.active;
        self.state.active = false;
        self.state.progress = 0.0;
        if was_active {
            tracing::info!(kind = %self.state.kind, "Simulation stopped");
        }
        was_active
    }

    /// Advance one tick.
    pub fn tick(&mut self, snapshot: &GeometrySnapshot, now_ms: u64) -> StepOutcome {
        if !self.state.active {
            return StepOutcome::Inactive;
        }

        let mut progress = self.state.progress + self.config.step;
        if progress >= 1.0 {
            if !self.state.kind.is_looping() {
                self.state.active = false;
                self.state.progress = 0.0;
                tracing::info!(kind = %self.state.kind, "Simulation completed");
                return StepOutcome::Completed;
            }
            progress = 0.0;
        }
        self.state.progress = progress;

        match self.state.kind {
            SimulationKind::Static => {
                let jitter_lat = (self.rng.random::<f64>() - 0.5) * STATIC_JITTER_DEG;
                let jitter_lng = (self.rng.random::<f64>() - 0.5) * STATIC_JITTER_DEG;
                self.position = GeoPoint::new(self.anchor.lat + jitter_lat, self.anchor.lng + jitter_lng);
                self.state.speed_kmh = 0.0;
            }
            SimulationKind::Intrusion { .. } => {
                if self.state.speed_kmh > 0.0 {
                    let distance_deg = self.state.speed_kmh / KM_PER_DEGREE_LATITUDE / 3600.0
                        * self.config.step_seconds
                        * self.config.scale_factor;
                    let (lat, lng) = flat_offset(
                        self.position.lat,
                        self.position.lng,
                        self.state.direction_deg,
                        distance_deg,
                    );
                    self.position = GeoPoint::new(lat, lng);
                }
            }
            SimulationKind::Route | SimulationKind::RouteOnce => {
                match snapshot.first_monitored_route() {
                    Some(route) => {
                        if let Some(point) = interpolate_route(&route.points, progress) {
                            self.position = point;
                        }
                        self.state.speed_kmh =
                            self.rng.random_range(ROUTE_SPEED_MIN_KMH..=ROUTE_SPEED_MAX_KMH) as f64;
                    }
                    None => {
                        tracing::debug!("No monitored route, holding simulated position");
                    }
                }
            }
        }

        tracing::trace!(
            progress,
            latitude = self.position.lat,
            longitude = self.position.lng,
            speed_kmh = self.state.speed_kmh,
            "Simulation tick"
        );

        StepOutcome::Sample(PositionSample::new(
            self.position.lat,
            self.position.lng,
            self.state.speed_kmh,
            now_ms,
        ))
    }
}

/// Position along a polyline at `progress` (wrapped into 0..1).
///
/// The segment is chosen with `index = floor(progress * (n - 1))` and the
/// position is linearly interpolated toward the following point. Returns
/// `None` for fewer than two points.
pub fn interpolate_route(points: &[GeoPoint], progress: f64) -> Option<GeoPoint> {
    if points.len() < 2 {
        return None;
    }

    let loop_progress = progress.rem_euclid(1.0);
    let scaled = loop_progress * (points.len() - 1) as f64;
    let index = (scaled.floor() as usize).min(points.len() - 2);
    let local = scaled - index as f64;

    Some(points[index].lerp(&points[index + 1], local))
}
