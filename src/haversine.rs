//! Great-circle distance helpers.
//!
//! Detour estimates use straight-line distance on a spherical Earth, not a
//! road network.

use crate::model::GeoPoint;

/// Earth radius in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Haversine distance between two points in miles.
///
/// Coordinates are expected to be validated (see [`GeoPoint::validate`]).
pub fn distance_miles(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_MILES * c
}

/// Convert a distance in miles to whole driving minutes at `speed_mph`.
pub fn drive_minutes(miles: f64, speed_mph: f64) -> i64 {
    if speed_mph <= 0.0 {
        return 0;
    }
    (miles / speed_mph * 60.0).round() as i64
}
