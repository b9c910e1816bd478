//! Position samples and raw device readings.

use serde::{Deserialize, Serialize};

use super::error::SourceError;
use crate::geo::GeoPoint;

/// A single position fix.
///
/// Samples are immutable values: the engine hands a copy to every consumer
/// and never persists them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionSample {
    /// Latitude in degrees (-90..90).
    pub latitude: f64,
    /// Longitude in degrees (-180..180).
    pub longitude: f64,
    /// Ground speed in km/h (>= 0).
    pub speed_kmh: f64,
    /// Whether the device reported a valid fix.
    pub valid: bool,
    /// Unix timestamp in milliseconds.
    pub timestamp_ms: u64,
}

impl PositionSample {
    /// Create a valid sample.
    pub fn new(latitude: f64, longitude: f64, speed_kmh: f64, timestamp_ms: u64) -> Self {
        Self {
            latitude,
            longitude,
            speed_kmh,
            valid: true,
            timestamp_ms,
        }
    }

    /// Set the validity flag.
    pub fn with_valid(mut self, valid: bool) -> Self {
        self.valid = valid;
        self
    }

    /// Position as a point.
    #[inline]
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Check that the coordinates and speed are finite and in range.
    pub fn validate(&self) -> Result<(), SourceError> {
        let (lat, lng) = (self.latitude, self.longitude);
        if !lat.is_finite() || !lng.is_finite() {
            return Err(SourceError::InvalidSample(format!(
                "non-finite coordinates ({}, {})",
                lat, lng
            )));
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(SourceError::InvalidSample(format!(
                "coordinates out of range ({}, {})",
                lat, lng
            )));
        }
        if !self.speed_kmh.is_finite() || self.speed_kmh < 0.0 {
            return Err(SourceError::InvalidSample(format!(
                "invalid speed {}",
                self.speed_kmh
            )));
        }
        Ok(())
    }
}

/// A reading as returned by the device's `/gps` endpoint.
///
/// Every field is optional on the wire; [`RawSample::into_sample`] applies
/// the acceptance rules.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawSample {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub speed: Option<f64>,
    pub valid: Option<bool>,
    /// Hardware emergency button state.
    pub alarm: Option<bool>,
}

impl RawSample {
    /// Convenience constructor for a reading with a position.
    pub fn at(lat: f64, lng: f64) -> Self {
        Self {
            lat: Some(lat),
            lng: Some(lng),
            ..Default::default()
        }
    }

    /// Set the alarm flag.
    pub fn with_alarm(mut self, alarm: bool) -> Self {
        self.alarm = Some(alarm);
        self
    }

    /// Set the reported speed.
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Validate the reading and convert it to a sample.
    ///
    /// A missing or zero latitude is the device's "no fix yet" sentinel.
    /// Missing speed defaults to 0 and `valid` defaults to true unless the
    /// device explicitly reports false.
    pub fn into_sample(&self, timestamp_ms: u64) -> Result<PositionSample, SourceError> {
        let lat = match self.lat {
            Some(lat) if lat != 0.0 => lat,
            _ => {
                return Err(SourceError::InvalidSample(
                    "missing or zero latitude".to_string(),
                ))
            }
        };
        let lng = self
            .lng
            .ok_or_else(|| SourceError::InvalidSample("missing longitude".to_string()))?;

        let speed_kmh = match self.speed {
            Some(s) if s.is_finite() && s > 0.0 => s,
            _ => 0.0,
        };

        let sample = PositionSample {
            latitude: lat,
            longitude: lng,
            speed_kmh,
            valid: self.valid != Some(false),
            timestamp_ms,
        };
        sample.validate()?;
        Ok(sample)
    }
}
