//! Hardware alarm latch.
//!
//! The device reports its emergency button as a level (`alarm: true` for as
//! long as it is held or latched in firmware). The latch turns that level
//! into a single event per activation.

use super::types::AlertEvent;
use crate::source::PositionSample;

/// Note attached to hardware alarm notifications.
pub const HARDWARE_ALARM_NOTE: &str = "Physical alarm button was activated";

/// Edge detector for the device alarm flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct HardwareAlarmLatch {
    locked: bool,
}

impl HardwareAlarmLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true while an activation has been reported and not released.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Observe the alarm flag of one reading.
    ///
    /// Raises once per continuous `true` run. Only an explicit `false`
    /// releases the latch; a reading without the field leaves it unchanged.
    pub fn observe(&mut self, alarm: Option<bool>, sample: &PositionSample) -> Option<AlertEvent> {
        match alarm {
            Some(true) if !self.locked => {
                self.locked = true;
                tracing::warn!(
                    latitude = sample.latitude,
                    longitude = sample.longitude,
                    "Hardware alarm activated"
                );
                Some(AlertEvent::HardwareAlarm {
                    latitude: sample.latitude,
                    longitude: sample.longitude,
                    timestamp_ms: sample.timestamp_ms,
                })
            }
            Some(false) if self.locked => {
                self.locked = false;
                tracing::info!("Hardware alarm released");
                None
            }
            _ => None,
        }
    }
}
