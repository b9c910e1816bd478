//! Geometry kernel
//!
//! Distance and projection primitives on the sphere used by the rule
//! evaluator and the simulation driver. Everything here is a pure function
//! over degrees; nothing holds state.
//!
//! # Precision
//!
//! [`great_circle_distance_meters`] uses the haversine formula and is exact on
//! a spherical Earth. [`distance_to_segment_meters`] projects into a local
//! planar frame (longitude scaled by `cos(latitude)`) and is only accurate for
//! segments up to a few kilometers. That trade-off is deliberate and the
//! expected values in the tests depend on it.

mod types;

pub use types::{GeoPoint, EARTH_RADIUS_METERS, KM_PER_DEGREE_LATITUDE};

/// Great-circle distance between two points in meters (haversine).
///
/// Symmetric and never negative.
#[inline]
pub fn great_circle_distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Returns true if the point lies within `radius_meters` of the center.
///
/// The boundary is inclusive.
#[inline]
pub fn is_within_circle(p_lat: f64, p_lon: f64, c_lat: f64, c_lon: f64, radius_meters: f64) -> bool {
    great_circle_distance_meters(p_lat, p_lon, c_lat, c_lon) <= radius_meters
}

/// Distance from a point to the segment A-B in meters.
///
/// Each coordinate is mapped into a local planar frame where
/// `x = lon * R * cos(lat)` and `y = lat * R` (both in radians), the point is
/// projected onto the segment with the projection parameter clamped to
/// `[0, 1]`, and the Euclidean distance to the projection is returned.
///
/// A zero-length segment degrades to the haversine distance to A.
pub fn distance_to_segment_meters(
    p_lat: f64,
    p_lon: f64,
    a_lat: f64,
    a_lon: f64,
    b_lat: f64,
    b_lon: f64,
) -> f64 {
    let (px, py) = project_local(p_lat, p_lon);
    let (ax, ay) = project_local(a_lat, a_lon);
    let (bx, by) = project_local(b_lat, b_lon);

    let dx = bx - ax;
    let dy = by - ay;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return great_circle_distance_meters(p_lat, p_lon, a_lat, a_lon);
    }

    let t = (((px - ax) * dx + (py - ay) * dy) / len_sq).clamp(0.0, 1.0);

    let proj_x = ax + t * dx;
    let proj_y = ay + t * dy;

    ((px - proj_x).powi(2) + (py - proj_y).powi(2)).sqrt()
}

/// Returns true if the point is within `buffer_meters` of any segment of the
/// polyline.
///
/// Polylines with fewer than two points never match.
pub fn is_near_polyline(p_lat: f64, p_lon: f64, points: &[GeoPoint], buffer_meters: f64) -> bool {
    if points.len() < 2 {
        return false;
    }

    points.windows(2).any(|pair| {
        let (a, b) = (pair[0], pair[1]);
        distance_to_segment_meters(p_lat, p_lon, a.lat, a.lng, b.lat, b.lng) <= buffer_meters
    })
}

/// Move a point `distance_deg` degrees along `bearing_deg` on a flat plane.
///
/// Bearing 0 is North, 90 is East. Latitude grows with `cos(bearing)` and
/// longitude with `sin(bearing)`, which is acceptable at city scale.
#[inline]
pub fn flat_offset(lat: f64, lon: f64, bearing_deg: f64, distance_deg: f64) -> (f64, f64) {
    let radians = bearing_deg.to_radians();
    (
        lat + distance_deg * radians.cos(),
        lon + distance_deg * radians.sin(),
    )
}

/// Map a coordinate into the local planar frame used for segment projection.
#[inline]
fn project_local(lat: f64, lon: f64) -> (f64, f64) {
    let meters_per_radian = EARTH_RADIUS_METERS;
    let x = lon.to_radians() * meters_per_radian * lat.to_radians().cos();
    let y = lat.to_radians() * meters_per_radian;
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ZONE_LAT: f64 = 10.9589;
    const ZONE_LON: f64 = 106.8554;

    #[test]
    fn test_distance_same_point_is_zero() {
        let d = great_circle_distance_meters(ZONE_LAT, ZONE_LON, ZONE_LAT, ZONE_LON);
        assert_eq!(d, 0.0);
    }

    #[test]
    fn test_distance_one_degree_latitude() {
        // One degree of latitude on a 6371 km sphere is ~111.19 km
        let d = great_circle_distance_meters(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111_194.9).abs() < 1.0, "got {}", d);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let d1 = great_circle_distance_meters(53.5, 10.0, 51.47, -0.46);
        let d2 = great_circle_distance_meters(51.47, -0.46, 53.5, 10.0);
        assert!((d1 - d2).abs() < 1e-6);
    }

    #[test]
    fn test_within_circle_boundary_inclusive() {
        let d = great_circle_distance_meters(ZONE_LAT, ZONE_LON, ZONE_LAT + 0.001, ZONE_LON);
        assert!(is_within_circle(ZONE_LAT + 0.001, ZONE_LON, ZONE_LAT, ZONE_LON, d));
        assert!(!is_within_circle(ZONE_LAT + 0.001, ZONE_LON, ZONE_LAT, ZONE_LON, d - 0.01));
    }

    #[test]
    fn test_within_circle_center_and_far_point() {
        assert!(is_within_circle(ZONE_LAT, ZONE_LON, ZONE_LAT, ZONE_LON, 200.0));
        // 0.0045 degrees of latitude is ~500m
        assert!(!is_within_circle(ZONE_LAT + 0.0045, ZONE_LON, ZONE_LAT, ZONE_LON, 200.0));
    }

    #[test]
    fn test_segment_distance_perpendicular() {
        // Segment along the equator, point 0.001 deg north of its middle
        let d = distance_to_segment_meters(0.001, 0.5, 0.0, 0.0, 0.0, 1.0);
        assert!((d - 111.19).abs() < 0.5, "got {}", d);
    }

    #[test]
    fn test_segment_distance_clamps_to_endpoint() {
        // Point beyond B along the segment direction
        let d = distance_to_segment_meters(0.0, 1.01, 0.0, 0.0, 0.0, 1.0);
        assert!((d - 1_111.9).abs() < 1.0, "got {}", d);
    }

    #[test]
    fn test_segment_distance_degenerate_segment() {
        let d = distance_to_segment_meters(0.001, 0.0, 0.0, 0.0, 0.0, 0.0);
        let expected = great_circle_distance_meters(0.001, 0.0, 0.0, 0.0);
        assert!((d - expected).abs() < 1e-9);
    }

    #[test]
    fn test_near_polyline_requires_two_points() {
        let single = [GeoPoint::new(0.0, 0.0)];
        assert!(!is_near_polyline(0.0, 0.0, &[], 100.0));
        assert!(!is_near_polyline(0.0, 0.0, &single, 100.0));
    }

    #[test]
    fn test_near_polyline_any_segment_matches() {
        let route = [
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.01),
            GeoPoint::new(0.01, 0.01),
        ];
        // Near the second segment only
        assert!(is_near_polyline(0.005, 0.0105, &route, 100.0));
        // Far from every segment
        assert!(!is_near_polyline(0.005, 0.005, &route, 100.0));
    }

    #[test]
    fn test_flat_offset_cardinal_directions() {
        let (lat, lon) = flat_offset(0.0, 0.0, 0.0, 1.0);
        assert!((lat - 1.0).abs() < 1e-12 && lon.abs() < 1e-12);

        let (lat, lon) = flat_offset(0.0, 0.0, 90.0, 1.0);
        assert!(lat.abs() < 1e-12 && (lon - 1.0).abs() < 1e-12);

        let (lat, lon) = flat_offset(0.0, 0.0, 180.0, 1.0);
        assert!((lat + 1.0).abs() < 1e-12 && lon.abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_within_circle_matches_distance(
            p_lat in -80.0f64..80.0,
            p_lon in -179.0f64..179.0,
            c_lat in -80.0f64..80.0,
            c_lon in -179.0f64..179.0,
            radius in 1.0f64..5_000_000.0,
        ) {
            let d = great_circle_distance_meters(p_lat, p_lon, c_lat, c_lon);
            prop_assert_eq!(is_within_circle(p_lat, p_lon, c_lat, c_lon, radius), d <= radius);
        }

        #[test]
        fn prop_distance_non_negative_and_symmetric(
            lat1 in -90.0f64..90.0,
            lon1 in -180.0f64..180.0,
            lat2 in -90.0f64..90.0,
            lon2 in -180.0f64..180.0,
        ) {
            let d1 = great_circle_distance_meters(lat1, lon1, lat2, lon2);
            let d2 = great_circle_distance_meters(lat2, lon2, lat1, lon1);
            prop_assert!(d1 >= 0.0);
            prop_assert!((d1 - d2).abs() < 1e-6);
        }

        #[test]
        fn prop_two_point_polyline_is_single_segment(
            p_lat in -60.0f64..60.0,
            p_lon in -170.0f64..170.0,
            d_lat in -0.02f64..0.02,
            d_lon in -0.02f64..0.02,
            buffer in 1.0f64..2_000.0,
        ) {
            let a = GeoPoint::new(p_lat + d_lat, p_lon);
            let b = GeoPoint::new(p_lat, p_lon + d_lon);
            let segment = distance_to_segment_meters(p_lat, p_lon, a.lat, a.lng, b.lat, b.lng);
            prop_assert_eq!(is_near_polyline(p_lat, p_lon, &[a, b], buffer), segment <= buffer);
        }
    }
}
