//! Alert state machine.
//!
//! # State Machine
//!
//! ```text
//! OutOfZone (immediate)
//!   Inside  --[zones exist, outside all]--> Outside   emit Raised
//!   Outside --[inside any zone]-----------> Inside    emit Cleared
//!
//! StayLongOutOfZone / RouteDeviation (debounced)
//!   Idle    --[violation, not triggered]--> Pending   start deadline
//!   Pending --[violation ends]------------> Idle      cancel, no event
//!   Pending --[deadline elapsed]----------> Triggered emit Raised (once)
//!   Triggered --[safe condition]----------> Idle      re-armed for next episode
//! ```
//!
//! Deadlines are plain timestamps checked cooperatively: [`AlertStateMachine::update`]
//! fires any deadline that elapsed before the new sample, and
//! [`AlertStateMachine::poll_deadlines`] lets a scheduler fire them between
//! samples. There is at most one pending deadline per condition.

use super::types::{AlertCondition, AlertEvent, Episode};
use crate::geo::GeoPoint;
use crate::rules::RuleFacts;
use crate::source::PositionSample;

/// Default debounce delay (ms).
pub const DEFAULT_DEBOUNCE_MS: u64 = 5000;

/// Default route buffer radius (m).
pub const DEFAULT_BUFFER_RADIUS_METERS: f64 = 100.0;

/// Configuration for alert evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertConfig {
    /// Minimum continuous violation before a debounced condition triggers.
    pub debounce_ms: u64,

    /// Maximum lateral distance from a route still considered on route.
    pub buffer_radius_meters: f64,

    /// Evaluate StayLongOutOfZone under every source instead of only the
    /// static simulation.
    pub stay_long_any_source: bool,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            buffer_radius_meters: DEFAULT_BUFFER_RADIUS_METERS,
            stay_long_any_source: false,
        }
    }
}

/// Per-condition episode tracking.
#[derive(Debug, Clone)]
pub struct AlertStateMachine {
    debounce_ms: u64,
    out_of_zone: Episode,
    stay_long: Episode,
    route_deviation: Episode,
}

impl AlertStateMachine {
    /// Create a state machine with all episodes idle.
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            debounce_ms,
            out_of_zone: Episode::default(),
            stay_long: Episode::default(),
            route_deviation: Episode::default(),
        }
    }

    /// Current episode for a condition.
    pub fn episode(&self, condition: AlertCondition) -> &Episode {
        match condition {
            AlertCondition::OutOfZone => &self.out_of_zone,
            AlertCondition::StayLongOutOfZone => &self.stay_long,
            AlertCondition::RouteDeviation => &self.route_deviation,
        }
    }

    /// Apply the facts for one sample.
    ///
    /// `stay_long_qualifies` tells whether the current source is one under
    /// which StayLongOutOfZone is evaluated. Returns the events produced, in
    /// order.
    pub fn update(
        &mut self,
        facts: &RuleFacts,
        sample: &PositionSample,
        stay_long_qualifies: bool,
    ) -> Vec<AlertEvent> {
        let now_ms = sample.timestamp_ms;
        let position = sample.point();

        // Deadlines that elapsed while the previous sample was current
        let mut events = self.poll_deadlines(now_ms);

        self.update_out_of_zone(facts, position, now_ms, &mut events);

        let stay_long_violated = stay_long_qualifies && facts.is_out_of_zone();
        self.update_debounced(
            AlertCondition::StayLongOutOfZone,
            stay_long_violated,
            facts.inside_any_active_zone,
            position,
            now_ms,
        );

        self.update_debounced(
            AlertCondition::RouteDeviation,
            facts.is_off_route(),
            facts.has_active_routes && facts.near_any_active_route,
            position,
            now_ms,
        );

        events
    }

    /// Fire every debounce deadline that has elapsed at `now_ms`.
    pub fn poll_deadlines(&mut self, now_ms: u64) -> Vec<AlertEvent> {
        let mut events = Vec::new();

        for condition in [
            AlertCondition::StayLongOutOfZone,
            AlertCondition::RouteDeviation,
        ] {
            let debounce_ms = self.debounce_ms;
            if let Some(at) = self.episode_mut(condition).fire_if_due(now_ms) {
                tracing::info!(
                    %condition,
                    latitude = at.lat,
                    longitude = at.lng,
                    debounce_ms,
                    "Alert raised"
                );
                events.push(AlertEvent::Raised {
                    condition,
                    latitude: at.lat,
                    longitude: at.lng,
                    note: Some(debounce_note(condition, debounce_ms)),
                    timestamp_ms: now_ms,
                });
            }
        }

        events
    }

    /// Earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<u64> {
        [self.stay_long.timer_deadline(), self.route_deviation.timer_deadline()]
            .into_iter()
            .flatten()
            .min()
    }

    /// Cancel all timers and clear every episode.
    ///
    /// Called whenever the sample source changes so that no alert carries
    /// over a discontinuous jump in position.
    pub fn reset_all(&mut self) {
        let pending = self.next_deadline().is_some();
        self.out_of_zone.reset();
        self.stay_long.reset();
        self.route_deviation.reset();
        tracing::debug!(cancelled_timers = pending, "Alert episodes reset");
    }

    fn update_out_of_zone(
        &mut self,
        facts: &RuleFacts,
        position: GeoPoint,
        now_ms: u64,
        events: &mut Vec<AlertEvent>,
    ) {
        let episode = &mut self.out_of_zone;

        if facts.is_out_of_zone() && !episode.is_armed() {
            episode.arm(position);
            tracing::info!(
                condition = %AlertCondition::OutOfZone,
                latitude = position.lat,
                longitude = position.lng,
                "Alert raised"
            );
            events.push(AlertEvent::Raised {
                condition: AlertCondition::OutOfZone,
                latitude: position.lat,
                longitude: position.lng,
                note: None,
                timestamp_ms: now_ms,
            });
        } else if facts.inside_any_active_zone && episode.is_armed() {
            episode.disarm();
            tracing::info!(condition = %AlertCondition::OutOfZone, "Alert cleared");
            events.push(AlertEvent::Cleared {
                condition: AlertCondition::OutOfZone,
                timestamp_ms: now_ms,
            });
        }
    }

    fn update_debounced(
        &mut self,
        condition: AlertCondition,
        violated: bool,
        safe: bool,
        position: GeoPoint,
        now_ms: u64,
    ) {
        let deadline = now_ms.saturating_add(self.debounce_ms);
        let episode = self.episode_mut(condition);

        if violated {
            if episode.timer_deadline().is_none() && !episode.is_triggered() {
                episode.start_timer(deadline, position);
                tracing::debug!(%condition, deadline_ms = deadline, "Debounce timer started");
            }
            return;
        }

        if episode.cancel_timer() {
            tracing::debug!(%condition, "Debounce timer cancelled");
        }
        if safe && (episode.is_triggered() || episode.is_armed()) {
            episode.rearm();
            tracing::debug!(%condition, "Episode re-armed");
        }
    }

    fn episode_mut(&mut self, condition: AlertCondition) -> &mut Episode {
        match condition {
            AlertCondition::OutOfZone => &mut self.out_of_zone,
            AlertCondition::StayLongOutOfZone => &mut self.stay_long,
            AlertCondition::RouteDeviation => &mut self.route_deviation,
        }
    }
}

impl Default for AlertStateMachine {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}

fn debounce_note(condition: AlertCondition, debounce_ms: u64) -> String {
    let seconds = debounce_ms as f64 / 1000.0;
    match condition {
        AlertCondition::StayLongOutOfZone => format!(
            "Device stayed outside the safe zone for more than {} seconds",
            seconds
        ),
        AlertCondition::RouteDeviation => format!(
            "Device deviated from the route for more than {} seconds",
            seconds
        ),
        AlertCondition::OutOfZone => "Device left the safe zone".to_string(),
    }
}
