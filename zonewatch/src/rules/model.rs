//! Zone and route types read by the rule evaluator.
//!
//! Both types are owned by the surrounding application. The engine only ever
//! reads a snapshot of them and never mutates or persists what it is given.

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// A circular safety region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeZone {
    /// Opaque identifier assigned by the owning application.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Center latitude in degrees.
    #[serde(rename = "lat")]
    pub latitude: f64,
    /// Center longitude in degrees.
    #[serde(rename = "lng")]
    pub longitude: f64,
    /// Radius in meters (> 0).
    #[serde(rename = "radius")]
    pub radius_meters: f64,
    /// Inactive zones are ignored by the evaluator.
    #[serde(default = "default_true")]
    pub active: bool,
}

impl SafeZone {
    /// Create an active zone.
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64, radius_meters: f64) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            latitude,
            longitude,
            radius_meters,
            active: true,
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the active flag.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Returns true if the point lies inside this zone (boundary inclusive).
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        crate::geo::is_within_circle(
            latitude,
            longitude,
            self.latitude,
            self.longitude,
            self.radius_meters,
        )
    }
}

/// An ordered polyline the device is expected to follow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Opaque identifier assigned by the owning application.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Route vertices in travel order.
    #[serde(default)]
    pub points: Vec<GeoPoint>,
    /// False while the route is still being edited.
    #[serde(default)]
    pub confirmed: bool,
    /// Whether the route is being monitored.
    #[serde(default)]
    pub active: bool,
}

impl Route {
    /// Create a confirmed, active route.
    pub fn new(id: impl Into<String>, points: Vec<GeoPoint>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            points,
            confirmed: true,
            active: true,
        }
    }

    /// Set the confirmed flag.
    pub fn with_confirmed(mut self, confirmed: bool) -> Self {
        self.confirmed = confirmed;
        self
    }

    /// Set the active flag.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// A route takes part in evaluation only when it is active, confirmed and
    /// has at least one segment.
    pub fn is_monitored(&self) -> bool {
        self.active && self.confirmed && self.points.len() >= 2
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_deserialize_dashboard_fields() {
        let json = r##"{
            "id": "1",
            "name": "School Zone",
            "lat": 10.9589,
            "lng": 106.8554,
            "radius": 200,
            "color": "#10b981",
            "active": true
        }"##;

        let zone: SafeZone = serde_json::from_str(json).unwrap();
        assert_eq!(zone.name, "School Zone");
        assert_eq!(zone.radius_meters, 200.0);
        assert!(zone.active);
    }

    #[test]
    fn test_route_monitoring_requires_all_flags() {
        let points = vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0)];

        assert!(Route::new("r", points.clone()).is_monitored());
        assert!(!Route::new("r", points.clone()).with_confirmed(false).is_monitored());
        assert!(!Route::new("r", points).with_active(false).is_monitored());
        assert!(!Route::new("r", vec![GeoPoint::new(0.0, 0.0)]).is_monitored());
    }

    #[test]
    fn test_route_deserialize_defaults_to_unconfirmed() {
        let route: Route = serde_json::from_str(r#"{"id": "draft"}"#).unwrap();
        assert!(route.points.is_empty());
        assert!(!route.confirmed);
        assert!(!route.active);
    }
}
