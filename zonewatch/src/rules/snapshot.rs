//! Zone/route snapshots.
//!
//! A [`GeometrySnapshot`] is the read-only view of zones and routes handed to
//! the engine before evaluation. The CLI loads one from a JSON file exported
//! by the dashboard:
//!
//! ```json
//! {
//!   "zones":  [{ "id": "1", "lat": 10.9589, "lng": 106.8554, "radius": 200, "active": true }],
//!   "routes": [{ "id": "r1", "points": [{ "lat": 10.95, "lng": 106.85 }], "confirmed": true, "active": true }]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::{Route, SafeZone};

/// Errors loading a geometry snapshot file.
#[derive(Debug, Error)]
pub enum GeometryFileError {
    /// Failed to read the file.
    #[error("Failed to read geometry file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid snapshot.
    #[error("Failed to parse geometry file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Zones and routes as supplied by the owning application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometrySnapshot {
    /// Safety zones.
    #[serde(default)]
    pub zones: Vec<SafeZone>,
    /// Routes, including unconfirmed drafts.
    #[serde(default)]
    pub routes: Vec<Route>,
}

impl GeometrySnapshot {
    /// Create a snapshot from zones and routes.
    pub fn new(zones: Vec<SafeZone>, routes: Vec<Route>) -> Self {
        Self { zones, routes }
    }

    /// Load a snapshot from a JSON file.
    pub fn load_from(path: &Path) -> Result<Self, GeometryFileError> {
        let display = path.display().to_string();
        let bytes = std::fs::read(path).map_err(|source| GeometryFileError::Read {
            path: display.clone(),
            source,
        })?;

        serde_json::from_slice(&bytes).map_err(|source| GeometryFileError::Parse {
            path: display,
            source,
        })
    }

    /// First route eligible for monitoring, used by route simulations.
    pub fn first_monitored_route(&self) -> Option<&Route> {
        self.routes.iter().find(|r| r.is_monitored())
    }

    /// Number of active zones.
    pub fn active_zone_count(&self) -> usize {
        self.zones.iter().filter(|z| z.active).count()
    }

    /// Number of monitored routes.
    pub fn monitored_route_count(&self) -> usize {
        self.routes.iter().filter(|r| r.is_monitored()).count()
    }
}
