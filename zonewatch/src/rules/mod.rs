//! Rule evaluator
//!
//! Maps one position sample and a snapshot of zones and routes to a set of
//! [`RuleFacts`]. The evaluator is a pure function: identical inputs always
//! produce identical facts and nothing is retained between calls.
//!
//! ```text
//! PositionSample ──┐
//! SafeZone[]     ──┼──► evaluate() ──► RuleFacts ──► AlertStateMachine
//! Route[]        ──┘
//! ```
//!
//! An empty filtered set is not an error. It is reported through
//! `has_active_zones` / `has_active_routes` so the state machine can treat
//! the corresponding condition as inert for this tick.

mod model;
mod snapshot;

pub use model::{Route, SafeZone};
pub use snapshot::{GeometryFileError, GeometrySnapshot};

use crate::geo::is_near_polyline;
use crate::source::PositionSample;

/// Containment and deviation facts for a single sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuleFacts {
    /// The sample lies inside at least one active zone.
    pub inside_any_active_zone: bool,
    /// The sample lies within the buffer of at least one monitored route.
    pub near_any_active_route: bool,
    /// At least one zone is active.
    pub has_active_zones: bool,
    /// At least one route is active, confirmed and has two or more points.
    pub has_active_routes: bool,
}

impl RuleFacts {
    /// Zones exist and the sample is outside all of them.
    #[inline]
    pub fn is_out_of_zone(&self) -> bool {
        self.has_active_zones && !self.inside_any_active_zone
    }

    /// Routes exist and the sample is off all of them.
    #[inline]
    pub fn is_off_route(&self) -> bool {
        self.has_active_routes && !self.near_any_active_route
    }
}

/// Evaluate a sample against the active zones and monitored routes.
pub fn evaluate(
    sample: &PositionSample,
    zones: &[SafeZone],
    routes: &[Route],
    buffer_radius_meters: f64,
) -> RuleFacts {
    let mut active_zones = zones.iter().filter(|z| z.active).peekable();
    let has_active_zones = active_zones.peek().is_some();
    let inside_any_active_zone =
        active_zones.any(|z| z.contains(sample.latitude, sample.longitude));

    let mut monitored_routes = routes.iter().filter(|r| r.is_monitored()).peekable();
    let has_active_routes = monitored_routes.peek().is_some();
    let near_any_active_route = monitored_routes.any(|r| {
        is_near_polyline(
            sample.latitude,
            sample.longitude,
            &r.points,
            buffer_radius_meters,
        )
    });

    RuleFacts {
        inside_any_active_zone,
        near_any_active_route,
        has_active_zones,
        has_active_routes,
    }
}
