//! One-shot position check.
//!
//! Evaluates a single coordinate against the loaded zones and routes without
//! touching any alert state.

use console::style;
use zonewatch::clock::unix_now_ms;
use zonewatch::notify::maps_link;
use zonewatch::rules::{evaluate, GeometrySnapshot, RuleFacts};
use zonewatch::source::PositionSample;

use super::common::facts_label;
use crate::error::CliError;

/// Evaluate one point and print the facts.
pub fn run(
    geometry: &GeometrySnapshot,
    latitude: f64,
    longitude: f64,
    buffer_radius_meters: f64,
) -> Result<RuleFacts, CliError> {
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(CliError::Config(format!(
            "Coordinate out of range: {}, {}",
            latitude, longitude
        )));
    }

    let sample = PositionSample::new(latitude, longitude, 0.0, unix_now_ms());
    let facts = evaluate(&sample, &geometry.zones, &geometry.routes, buffer_radius_meters);

    println!("Position {:.6}, {:.6}", latitude, longitude);
    println!("  {}", maps_link(latitude, longitude));
    println!();
    println!(
        "  Zones:  {} active, inside any: {}",
        geometry.active_zone_count(),
        yes_no(facts.inside_any_active_zone)
    );
    println!(
        "  Routes: {} monitored, within {:.0} m: {}",
        geometry.monitored_route_count(),
        buffer_radius_meters,
        yes_no(facts.near_any_active_route)
    );
    println!();
    println!("  {}", facts_label(&facts));

    Ok(facts)
}

fn yes_no(value: bool) -> console::StyledObject<&'static str> {
    if value {
        style("yes").green()
    } else {
        style("no").red()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zonewatch::geo::GeoPoint;
    use zonewatch::rules::{Route, SafeZone};

    fn geometry() -> GeometrySnapshot {
        GeometrySnapshot::new(
            vec![SafeZone::new("home", 10.9589, 106.8554, 200.0)],
            vec![Route::new(
                "school",
                vec![GeoPoint::new(10.9589, 106.8554), GeoPoint::new(10.9689, 106.8554)],
            )],
        )
    }

    #[test]
    fn test_point_at_zone_center() {
        let facts = run(&geometry(), 10.9589, 106.8554, 100.0).unwrap();
        assert!(facts.inside_any_active_zone);
        assert!(facts.near_any_active_route);
    }

    #[test]
    fn test_point_far_away() {
        let facts = run(&geometry(), 11.5, 107.5, 100.0).unwrap();
        assert!(facts.is_out_of_zone());
        assert!(facts.is_off_route());
    }

    #[test]
    fn test_rejects_invalid_coordinate() {
        assert!(run(&geometry(), 95.0, 0.0, 100.0).is_err());
    }
}
