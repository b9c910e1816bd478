//! Monitor engine.
//!
//! Owns all mutable monitoring state: the geometry snapshot, the alert state
//! machine, the hardware alarm latch and the simulation driver. The engine is
//! synchronous and has no timers of its own; the daemon feeds it samples and
//! deadline checks from a single task.
//!
//! Exactly one source supplies samples at a time. Every source switch
//! (simulation start or stop, live connect or disconnect, live failure)
//! resets all alert episodes so no alert survives a discontinuous jump in
//! position.

use rand::rngs::StdRng;

use super::config::EngineConfig;
use crate::alert::{AlertEvent, AlertStateMachine, HardwareAlarmLatch};
use crate::geo::GeoPoint;
use crate::rules::{evaluate, GeometrySnapshot, RuleFacts};
use crate::simulation::{SimulationDriver, SimulationKind, StepOutcome};
use crate::source::{ConnectionStatus, PositionSample, RawSample, SourceError, SourceMode};

/// Result of evaluating one accepted sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub sample: PositionSample,
    pub facts: RuleFacts,
    /// Events in emission order.
    pub events: Vec<AlertEvent>,
}

/// Point-in-time view of the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorStatus {
    pub mode: SourceMode,
    pub connection: ConnectionStatus,
    /// Running simulation, if any.
    pub simulation: Option<SimulationKind>,
    pub last_sample: Option<PositionSample>,
    pub facts: Option<RuleFacts>,
    /// Earliest pending debounce deadline (Unix ms).
    pub next_deadline_ms: Option<u64>,
    pub hardware_alarm_locked: bool,
}

/// Synchronous monitoring core.
pub struct MonitorEngine {
    config: EngineConfig,
    geometry: GeometrySnapshot,
    machine: AlertStateMachine,
    alarm: HardwareAlarmLatch,
    simulation: SimulationDriver,
    mode: SourceMode,
    connection: ConnectionStatus,
    position: GeoPoint,
    last_sample: Option<PositionSample>,
    last_facts: Option<RuleFacts>,
}

impl MonitorEngine {
    /// Create an idle engine.
    pub fn new(config: EngineConfig, geometry: GeometrySnapshot, rng: StdRng) -> Self {
        let machine = AlertStateMachine::new(config.alerts.debounce_ms);
        let simulation = SimulationDriver::new(config.simulation.clone(), rng);
        let position = config.initial_position;

        Self {
            config,
            geometry,
            machine,
            alarm: HardwareAlarmLatch::new(),
            simulation,
            mode: SourceMode::Idle,
            connection: ConnectionStatus::Disconnected,
            position,
            last_sample: None,
            last_facts: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn geometry(&self) -> &GeometrySnapshot {
        &self.geometry
    }

    pub fn mode(&self) -> SourceMode {
        self.mode
    }

    pub fn connection(&self) -> ConnectionStatus {
        self.connection
    }

    pub fn alerts(&self) -> &AlertStateMachine {
        &self.machine
    }

    /// Last known position (initial position before any sample).
    pub fn position(&self) -> GeoPoint {
        self.position
    }

    pub fn is_simulating(&self) -> bool {
        self.mode == SourceMode::Simulation && self.simulation.is_active()
    }

    /// Replace the zone/route snapshot used for subsequent samples.
    pub fn set_geometry(&mut self, geometry: GeometrySnapshot) {
        tracing::info!(
            zones = geometry.active_zone_count(),
            routes = geometry.monitored_route_count(),
            "Geometry updated"
        );
        self.geometry = geometry;
    }

    /// Start a simulation, replacing the live source or any running run.
    pub fn start_simulation(&mut self, kind: SimulationKind) {
        if self.mode == SourceMode::Live {
            self.connection = ConnectionStatus::Disconnected;
        }
        self.machine.reset_all();
        self.simulation.start(kind, self.position);
        self.mode = SourceMode::Simulation;
    }

    /// Stop the running simulation.
    ///
    /// Returns true if one was running.
    pub fn stop_simulation(&mut self) -> bool {
        if self.mode != SourceMode::Simulation {
            return false;
        }
        self.simulation.stop();
        self.machine.reset_all();
        self.mode = SourceMode::Idle;
        true
    }

    /// Prepare for a live handshake: the simulation stops before the
    /// device answers the handshake.
    pub fn begin_connect(&mut self) {
        if self.mode == SourceMode::Simulation {
            self.simulation.stop();
        }
        self.machine.reset_all();
        self.mode = SourceMode::Idle;
        self.connection = ConnectionStatus::Disconnected;
        tracing::info!(address = %self.config.live.address, "Connecting to device");
    }

    /// The handshake succeeded: the live device is now the source.
    pub fn connect_live(&mut self) {
        if self.mode == SourceMode::Simulation {
            self.simulation.stop();
        }
        self.machine.reset_all();
        self.mode = SourceMode::Live;
        self.connection = ConnectionStatus::Connected;
        tracing::info!(address = %self.config.live.address, "Device connected");
    }

    /// Detach the live device.
    ///
    /// Returns true if it was attached.
    pub fn disconnect_live(&mut self) -> bool {
        if self.mode != SourceMode::Live {
            return false;
        }
        self.machine.reset_all();
        self.mode = SourceMode::Idle;
        self.connection = ConnectionStatus::Disconnected;
        tracing::info!("Device disconnected");
        true
    }

    /// A live request failed. The device is detached and not retried.
    pub fn source_failed(&mut self, error: &SourceError) {
        tracing::warn!(error = %error, "Device unavailable");
        if self.mode == SourceMode::Live {
            self.machine.reset_all();
            self.mode = SourceMode::Idle;
        }
        self.connection = ConnectionStatus::Disconnected;
    }

    /// Validate and evaluate a live reading.
    ///
    /// Rejected readings leave all state untouched.
    pub fn ingest_raw(
        &mut self,
        raw: &RawSample,
        now_ms: u64,
    ) -> Result<Option<Evaluation>, SourceError> {
        if self.mode != SourceMode::Live {
            tracing::debug!(mode = %self.mode, "Ignoring device reading outside live mode");
            return Ok(None);
        }

        let sample = raw.into_sample(now_ms)?;
        let alarm_event = self.alarm.observe(raw.alarm, &sample);

        let mut evaluation = self.process_sample(sample);
        if let Some(event) = alarm_event {
            evaluation.events.insert(0, event);
        }
        Ok(Some(evaluation))
    }

    /// Advance the simulation by one tick and evaluate its sample.
    ///
    /// Generated samples pass the same validation as live readings; a
    /// rejected sample is dropped and leaves all state untouched.
    pub fn simulation_step(&mut self, now_ms: u64) -> Option<Evaluation> {
        if self.mode != SourceMode::Simulation {
            return None;
        }

        match self.simulation.tick(&self.geometry, now_ms) {
            StepOutcome::Sample(sample) => match sample.validate() {
                Ok(()) => Some(self.process_sample(sample)),
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding simulated sample");
                    None
                }
            },
            StepOutcome::Completed => {
                self.machine.reset_all();
                self.mode = SourceMode::Idle;
                None
            }
            StepOutcome::Inactive => None,
        }
    }

    /// Evaluate one accepted sample against the current geometry.
    pub fn process_sample(&mut self, sample: PositionSample) -> Evaluation {
        let facts = evaluate(
            &sample,
            &self.geometry.zones,
            &self.geometry.routes,
            self.config.alerts.buffer_radius_meters,
        );

        tracing::debug!(
            latitude = sample.latitude,
            longitude = sample.longitude,
            speed_kmh = sample.speed_kmh,
            inside_zone = facts.inside_any_active_zone,
            near_route = facts.near_any_active_route,
            "Sample evaluated"
        );

        let events = self
            .machine
            .update(&facts, &sample, self.stay_long_qualifies());

        self.position = sample.point();
        self.last_sample = Some(sample);
        self.last_facts = Some(facts);

        Evaluation {
            sample,
            facts,
            events,
        }
    }

    /// Fire debounce deadlines that elapsed at `now_ms`.
    pub fn poll_deadlines(&mut self, now_ms: u64) -> Vec<AlertEvent> {
        self.machine.poll_deadlines(now_ms)
    }

    /// Earliest pending debounce deadline.
    pub fn next_deadline(&self) -> Option<u64> {
        self.machine.next_deadline()
    }

    pub fn status(&self) -> MonitorStatus {
        MonitorStatus {
            mode: self.mode,
            connection: self.connection,
            simulation: self.is_simulating().then(|| self.simulation.state().kind),
            last_sample: self.last_sample,
            facts: self.last_facts,
            next_deadline_ms: self.machine.next_deadline(),
            hardware_alarm_locked: self.alarm.is_locked(),
        }
    }

    fn stay_long_qualifies(&self) -> bool {
        self.config.alerts.stay_long_any_source
            || (self.is_simulating() && self.simulation.state().kind == SimulationKind::Static)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::AlertCondition;
    use crate::rules::{Route, SafeZone};
    use rand::SeedableRng;

    const CENTER: GeoPoint = GeoPoint::new(10.9589, 106.8554);

    /// ~500 m north of the zone center.
    const OUTSIDE: GeoPoint = GeoPoint::new(10.9634, 106.8554);

    fn zone_snapshot() -> GeometrySnapshot {
        GeometrySnapshot::new(vec![SafeZone::new("z1", CENTER.lat, CENTER.lng, 200.0)], vec![])
    }

    fn engine(config: EngineConfig, geometry: GeometrySnapshot) -> MonitorEngine {
        MonitorEngine::new(config, geometry, StdRng::seed_from_u64(1))
    }

    fn raised(events: &[AlertEvent], condition: AlertCondition) -> usize {
        events
            .iter()
            .filter(|e| e.is_raised() && e.condition() == Some(condition))
            .count()
    }

    #[test]
    fn test_starts_idle() {
        let e = engine(EngineConfig::default(), GeometrySnapshot::default());
        let status = e.status();
        assert_eq!(status.mode, SourceMode::Idle);
        assert_eq!(status.connection, ConnectionStatus::Disconnected);
        assert_eq!(e.position(), CENTER);
    }

    #[test]
    fn test_live_reading_raises_out_of_zone() {
        let mut e = engine(EngineConfig::default(), zone_snapshot());
        e.connect_live();

        let eval = e
            .ingest_raw(&RawSample::at(CENTER.lat, CENTER.lng), 0)
            .unwrap()
            .unwrap();
        assert!(eval.facts.inside_any_active_zone);
        assert!(eval.events.is_empty());

        let eval = e
            .ingest_raw(&RawSample::at(OUTSIDE.lat, OUTSIDE.lng), 2000)
            .unwrap()
            .unwrap();
        assert_eq!(raised(&eval.events, AlertCondition::OutOfZone), 1);
        // Live source does not qualify for StayLong by default
        assert!(e.next_deadline().is_none());
    }

    #[test]
    fn test_invalid_reading_keeps_state() {
        let mut e = engine(EngineConfig::default(), zone_snapshot());
        e.connect_live();
        e.ingest_raw(&RawSample::at(OUTSIDE.lat, OUTSIDE.lng), 0).unwrap();
        let before = e.status();

        let result = e.ingest_raw(&RawSample::at(0.0, 106.0), 2000);
        assert!(matches!(result, Err(SourceError::InvalidSample(_))));
        assert_eq!(e.status(), before);
    }

    #[test]
    fn test_hardware_alarm_precedes_geofence_events() {
        let mut e = engine(EngineConfig::default(), zone_snapshot());
        e.connect_live();

        let eval = e
            .ingest_raw(&RawSample::at(OUTSIDE.lat, OUTSIDE.lng).with_alarm(true), 0)
            .unwrap()
            .unwrap();
        assert!(matches!(eval.events[0], AlertEvent::HardwareAlarm { .. }));
        assert_eq!(raised(&eval.events, AlertCondition::OutOfZone), 1);
        assert!(e.status().hardware_alarm_locked);
    }

    #[test]
    fn test_reading_outside_live_mode_is_ignored() {
        let mut e = engine(EngineConfig::default(), zone_snapshot());
        let result = e.ingest_raw(&RawSample::at(OUTSIDE.lat, OUTSIDE.lng), 0).unwrap();
        assert!(result.is_none());
        assert!(e.status().last_sample.is_none());
    }

    #[test]
    fn test_static_simulation_triggers_stay_long() {
        let config = EngineConfig {
            initial_position: OUTSIDE,
            ..Default::default()
        };
        let mut e = engine(config, zone_snapshot());
        e.start_simulation(SimulationKind::Static);

        let mut events = Vec::new();
        for tick in 1..=12u64 {
            let now = tick * 500;
            events.extend(e.poll_deadlines(now));
            if let Some(eval) = e.simulation_step(now) {
                events.extend(eval.events);
            }
        }

        assert_eq!(raised(&events, AlertCondition::OutOfZone), 1);
        assert_eq!(raised(&events, AlertCondition::StayLongOutOfZone), 1);
    }

    #[test]
    fn test_invalid_simulated_sample_is_discarded() {
        // Heading north from next to the pole overshoots 90 degrees
        let config = EngineConfig {
            initial_position: GeoPoint::new(89.9999, 0.0),
            ..Default::default()
        };
        let mut e = engine(config, zone_snapshot());
        e.start_simulation(SimulationKind::intrusion(Some(0.0), Some(200.0)));

        for tick in 1..=10u64 {
            assert!(e.simulation_step(tick * 500).is_none());
        }
        assert!(e.is_simulating());
        assert!(e.status().last_sample.is_none());
        assert!(e.next_deadline().is_none());
    }

    #[test]
    fn test_non_finite_intrusion_heading_stays_finite() {
        let mut e = engine(EngineConfig::default(), zone_snapshot());
        e.start_simulation(SimulationKind::intrusion(Some(f64::NAN), Some(35.0)));

        let eval = e.simulation_step(500).unwrap();
        assert!(eval.sample.latitude.is_finite());
        assert!(eval.sample.longitude.is_finite());
        assert!(eval.events.iter().all(|ev| match ev {
            AlertEvent::Raised {
                latitude,
                longitude,
                ..
            } => latitude.is_finite() && longitude.is_finite(),
            _ => true,
        }));
    }

    #[test]
    fn test_intrusion_does_not_qualify_for_stay_long() {
        let config = EngineConfig {
            initial_position: OUTSIDE,
            ..Default::default()
        };
        let mut e = engine(config, zone_snapshot());
        e.start_simulation(SimulationKind::intrusion(Some(0.0), Some(0.0)));

        e.simulation_step(500);
        assert!(e.next_deadline().is_none());
    }

    #[test]
    fn test_stay_long_any_source_flag() {
        let mut config = EngineConfig::default();
        config.alerts.stay_long_any_source = true;
        let mut e = engine(config, zone_snapshot());
        e.connect_live();

        e.ingest_raw(&RawSample::at(OUTSIDE.lat, OUTSIDE.lng), 0).unwrap();
        assert_eq!(e.next_deadline(), Some(5000));
    }

    #[test]
    fn test_source_switch_cancels_pending_timer() {
        let mut config = EngineConfig::default();
        config.alerts.stay_long_any_source = true;
        let mut e = engine(config, zone_snapshot());
        e.connect_live();
        e.ingest_raw(&RawSample::at(OUTSIDE.lat, OUTSIDE.lng), 0).unwrap();
        assert!(e.next_deadline().is_some());

        e.start_simulation(SimulationKind::intrusion(Some(0.0), Some(0.0)));
        assert_eq!(e.connection(), ConnectionStatus::Disconnected);
        assert!(e.next_deadline().is_none());
        assert!(e.poll_deadlines(60_000).is_empty());
    }

    #[test]
    fn test_live_failure_detaches_source() {
        let mut e = engine(EngineConfig::default(), zone_snapshot());
        e.connect_live();
        e.source_failed(&SourceError::Timeout { timeout_ms: 3000 });

        assert_eq!(e.mode(), SourceMode::Idle);
        assert_eq!(e.connection(), ConnectionStatus::Disconnected);
    }

    #[test]
    fn test_route_once_returns_to_idle() {
        let route = Route::new("r1", vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.01)]);
        let mut e = engine(
            EngineConfig::default(),
            GeometrySnapshot::new(vec![], vec![route]),
        );
        e.start_simulation(SimulationKind::RouteOnce);

        let mut samples = 0;
        for tick in 1..=100u64 {
            if e.simulation_step(tick * 500).is_some() {
                samples += 1;
            }
        }
        assert!(samples >= 49 && samples <= 50);
        assert_eq!(e.mode(), SourceMode::Idle);
        assert!(e.status().simulation.is_none());
    }

    #[test]
    fn test_stop_simulation() {
        let mut e = engine(EngineConfig::default(), zone_snapshot());
        assert!(!e.stop_simulation());

        e.start_simulation(SimulationKind::Static);
        assert_eq!(e.status().simulation, Some(SimulationKind::Static));
        assert!(e.stop_simulation());
        assert_eq!(e.mode(), SourceMode::Idle);
        assert!(e.simulation_step(500).is_none());
    }
}
