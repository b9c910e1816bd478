//! Alert notices and delivery sinks
//!
//! Raised alerts are rendered into an [`AlertNotice`] and handed to an
//! [`AlertSink`]. Delivery is the sink's business; the engine hands each
//! notice over once and never retries.

use serde::Serialize;
use tokio::sync::mpsc;

use crate::alert::{AlertCondition, AlertEvent, HARDWARE_ALARM_NOTE};

/// Message template used for a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoticeTemplate {
    /// Prolonged stay outside the safe zone.
    StayLong,
    /// Intrusion, route deviation or hardware alarm.
    Intrusion,
}

impl std::fmt::Display for NoticeTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StayLong => write!(f, "STAY_LONG"),
            Self::Intrusion => write!(f, "INTRUSION"),
        }
    }
}

/// A rendered alert ready for delivery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertNotice {
    pub template: NoticeTemplate,
    /// Originating condition; `None` for the hardware alarm.
    pub condition: Option<AlertCondition>,
    /// Latitude with six decimals.
    pub latitude: String,
    /// Longitude with six decimals.
    pub longitude: String,
    pub maps_link: String,
    pub note: Option<String>,
    pub recipient: Option<String>,
    pub timestamp_ms: u64,
}

impl AlertNotice {
    /// Render a notice for a raised event. Cleared events produce nothing.
    pub fn from_event(event: &AlertEvent, recipient: Option<&str>) -> Option<Self> {
        let (template, condition, lat, lng, note, timestamp_ms) = match event {
            AlertEvent::Raised {
                condition,
                latitude,
                longitude,
                note,
                timestamp_ms,
            } => {
                let template = match condition {
                    AlertCondition::StayLongOutOfZone => NoticeTemplate::StayLong,
                    AlertCondition::OutOfZone | AlertCondition::RouteDeviation => {
                        NoticeTemplate::Intrusion
                    }
                };
                (
                    template,
                    Some(*condition),
                    *latitude,
                    *longitude,
                    note.clone(),
                    *timestamp_ms,
                )
            }
            AlertEvent::HardwareAlarm {
                latitude,
                longitude,
                timestamp_ms,
            } => (
                NoticeTemplate::Intrusion,
                None,
                *latitude,
                *longitude,
                Some(HARDWARE_ALARM_NOTE.to_string()),
                *timestamp_ms,
            ),
            AlertEvent::Cleared { .. } => return None,
        };

        Some(Self {
            template,
            condition,
            latitude: format!("{:.6}", lat),
            longitude: format!("{:.6}", lng),
            maps_link: maps_link(lat, lng),
            note,
            recipient: recipient.map(str::to_string),
            timestamp_ms,
        })
    }
}

/// Google Maps link for a coordinate.
pub fn maps_link(latitude: f64, longitude: f64) -> String {
    format!("https://www.google.com/maps?q={},{}", latitude, longitude)
}

/// Receiver of alert notices.
///
/// Called from the monitor loop, so implementations must not block.
pub trait AlertSink: Send {
    fn deliver(&mut self, notice: AlertNotice);
}

/// Sink that writes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl AlertSink for TracingSink {
    fn deliver(&mut self, notice: AlertNotice) {
        tracing::warn!(
            template = %notice.template,
            condition = ?notice.condition,
            latitude = %notice.latitude,
            longitude = %notice.longitude,
            link = %notice.maps_link,
            note = notice.note.as_deref().unwrap_or(""),
            recipient = notice.recipient.as_deref().unwrap_or(""),
            "ALERT"
        );
    }
}

/// Sink that forwards notices to a channel.
///
/// A full or closed channel drops the notice with a warning.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<AlertNotice>,
}

impl ChannelSink {
    /// Create a sink and the receiving end of its channel.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<AlertNotice>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl AlertSink for ChannelSink {
    fn deliver(&mut self, notice: AlertNotice) {
        if let Err(e) = self.tx.try_send(notice) {
            tracing::warn!(error = %e, "Alert notice dropped");
        }
    }
}

impl<A: AlertSink, B: AlertSink> AlertSink for (A, B) {
    fn deliver(&mut self, notice: AlertNotice) {
        self.0.deliver(notice.clone());
        self.1.deliver(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stay_long_notice() {
        let event = AlertEvent::Raised {
            condition: AlertCondition::StayLongOutOfZone,
            latitude: 10.95891234,
            longitude: 106.8554,
            note: Some("Device stayed outside the safe zone for more than 5 seconds".into()),
            timestamp_ms: 42,
        };

        let notice = AlertNotice::from_event(&event, Some("ops@example.com")).unwrap();
        assert_eq!(notice.template, NoticeTemplate::StayLong);
        assert_eq!(notice.latitude, "10.958912");
        assert_eq!(notice.longitude, "106.855400");
        assert_eq!(
            notice.maps_link,
            "https://www.google.com/maps?q=10.95891234,106.8554"
        );
        assert_eq!(notice.recipient.as_deref(), Some("ops@example.com"));
    }

    #[test]
    fn test_route_deviation_uses_intrusion_template() {
        let event = AlertEvent::Raised {
            condition: AlertCondition::RouteDeviation,
            latitude: 1.0,
            longitude: 2.0,
            note: None,
            timestamp_ms: 0,
        };
        let notice = AlertNotice::from_event(&event, None).unwrap();
        assert_eq!(notice.template, NoticeTemplate::Intrusion);
        assert_eq!(notice.recipient, None);
    }

    #[test]
    fn test_hardware_alarm_notice() {
        let event = AlertEvent::HardwareAlarm {
            latitude: 1.0,
            longitude: 2.0,
            timestamp_ms: 0,
        };
        let notice = AlertNotice::from_event(&event, None).unwrap();
        assert_eq!(notice.condition, None);
        assert_eq!(notice.note.as_deref(), Some(HARDWARE_ALARM_NOTE));
    }

    #[test]
    fn test_cleared_produces_no_notice() {
        let event = AlertEvent::Cleared {
            condition: AlertCondition::OutOfZone,
            timestamp_ms: 0,
        };
        assert!(AlertNotice::from_event(&event, None).is_none());
    }

    #[tokio::test]
    async fn test_channel_sink_forwards() {
        let (mut sink, mut rx) = ChannelSink::new(4);
        let event = AlertEvent::HardwareAlarm {
            latitude: 1.0,
            longitude: 2.0,
            timestamp_ms: 7,
        };
        sink.deliver(AlertNotice::from_event(&event, None).unwrap());

        let notice = rx.recv().await.unwrap();
        assert_eq!(notice.timestamp_ms, 7);
    }

    #[test]
    fn test_channel_sink_drops_when_full() {
        let (mut sink, _rx) = ChannelSink::new(1);
        let event = AlertEvent::HardwareAlarm {
            latitude: 1.0,
            longitude: 2.0,
            timestamp_ms: 7,
        };
        let notice = AlertNotice::from_event(&event, None).unwrap();
        sink.deliver(notice.clone());
        // Must not block or panic
        sink.deliver(notice);
    }
}
