//! Alert conditions, episodes and outbound events.

use serde::Serialize;

use crate::geo::GeoPoint;

/// The fixed set of monitored conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AlertCondition {
    /// Outside every active zone (immediate).
    OutOfZone,
    /// Outside every active zone for longer than the debounce delay.
    StayLongOutOfZone,
    /// Off every monitored route for longer than the debounce delay.
    RouteDeviation,
}

impl AlertCondition {
    /// All conditions, in evaluation order.
    pub const ALL: [AlertCondition; 3] = [
        AlertCondition::OutOfZone,
        AlertCondition::StayLongOutOfZone,
        AlertCondition::RouteDeviation,
    ];
}

impl std::fmt::Display for AlertCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfZone => write!(f, "OutOfZone"),
            Self::StayLongOutOfZone => write!(f, "StayLongOutOfZone"),
            Self::RouteDeviation => write!(f, "RouteDeviation"),
        }
    }
}

/// Lifecycle of one violation instance of a condition.
///
/// Episodes are reset, never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Episode {
    armed: bool,
    triggered: bool,
    timer_deadline: Option<u64>,
    armed_at: Option<GeoPoint>,
}

impl Episode {
    /// The condition is in its violating state.
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// The episode has emitted its alert.
    pub fn is_triggered(&self) -> bool {
        self.triggered
    }

    /// Pending debounce deadline (Unix ms).
    pub fn timer_deadline(&self) -> Option<u64> {
        self.timer_deadline
    }

    /// Position captured when the episode was armed.
    pub fn armed_at(&self) -> Option<GeoPoint> {
        self.armed_at
    }

    pub(super) fn arm(&mut self, at: GeoPoint) {
        self.armed = true;
        self.armed_at = Some(at);
    }

    pub(super) fn disarm(&mut self) {
        self.armed = false;
        self.armed_at = None;
    }

    pub(super) fn start_timer(&mut self, deadline: u64, at: GeoPoint) {
        self.timer_deadline = Some(deadline);
        self.arm(at);
    }

    /// Cancel the pending timer. Returns true if one was running.
    pub(super) fn cancel_timer(&mut self) -> bool {
        let was_running = self.timer_deadline.take().is_some();
        if was_running && !self.triggered {
            self.disarm();
        }
        was_running
    }

    /// Fire the timer if it is due. Returns the armed position on firing.
    pub(super) fn fire_if_due(&mut self, now_ms: u64) -> Option<GeoPoint> {
        match self.timer_deadline {
            Some(deadline) if now_ms >= deadline => {
                self.timer_deadline = None;
                self.triggered = true;
                Some(self.armed_at.unwrap_or(GeoPoint::new(0.0, 0.0)))
            }
            _ => None,
        }
    }

    /// Return to the safe condition: the next violation starts a new episode.
    pub(super) fn rearm(&mut self) {
        self.triggered = false;
        self.timer_deadline = None;
        self.disarm();
    }

    /// Clear everything.
    pub(super) fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Event emitted at a state transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AlertEvent {
    /// A condition entered its violating state.
    Raised {
        condition: AlertCondition,
        latitude: f64,
        longitude: f64,
        note: Option<String>,
        timestamp_ms: u64,
    },
    /// A condition returned to its safe state.
    Cleared {
        condition: AlertCondition,
        timestamp_ms: u64,
    },
    /// The device's emergency button was pressed.
    HardwareAlarm {
        latitude: f64,
        longitude: f64,
        timestamp_ms: u64,
    },
}

impl AlertEvent {
    /// The condition this event refers to, if any.
    pub fn condition(&self) -> Option<AlertCondition> {
        match self {
            Self::Raised { condition, .. } | Self::Cleared { condition, .. } => Some(*condition),
            Self::HardwareAlarm { .. } => None,
        }
    }

    /// Returns true for events that should be dispatched as notifications.
    pub fn is_raised(&self) -> bool {
        matches!(self, Self::Raised { .. } | Self::HardwareAlarm { .. })
    }

    /// Event time (Unix ms).
    pub fn timestamp_ms(&self) -> u64 {
        match self {
            Self::Raised { timestamp_ms, .. }
            | Self::Cleared { timestamp_ms, .. }
            | Self::HardwareAlarm { timestamp_ms, .. } => *timestamp_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_timer_lifecycle() {
        let mut episode = Episode::default();
        let at = GeoPoint::new(1.0, 2.0);

        episode.start_timer(5_000, at);
        assert!(episode.is_armed());
        assert_eq!(episode.fire_if_due(4_999), None);
        assert_eq!(episode.fire_if_due(5_000), Some(at));
        assert!(episode.is_triggered());
        assert_eq!(episode.timer_deadline(), None);
    }

    #[test]
    fn test_cancel_before_trigger_disarms() {
        let mut episode = Episode::default();
        episode.start_timer(5_000, GeoPoint::new(1.0, 2.0));

        assert!(episode.cancel_timer());
        assert!(!episode.is_armed());
        assert!(!episode.cancel_timer());
    }

    #[test]
    fn test_event_accessors() {
        let raised = AlertEvent::Raised {
            condition: AlertCondition::OutOfZone,
            latitude: 1.0,
            longitude: 2.0,
            note: None,
            timestamp_ms: 10,
        };
        let alarm = AlertEvent::HardwareAlarm {
            latitude: 1.0,
            longitude: 2.0,
            timestamp_ms: 20,
        };

        assert_eq!(raised.condition(), Some(AlertCondition::OutOfZone));
        assert!(raised.is_raised());
        assert_eq!(alarm.condition(), None);
        assert_eq!(alarm.timestamp_ms(), 20);
    }
}
