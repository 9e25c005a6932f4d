//! Real city locations along the I-80 / I-76 freight corridor.

use backhaul_alerts::model::GeoPoint;

/// A named location with coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

// ============================================================================
// Home bases
// ============================================================================

pub const CHICAGO: Location = Location::new("Chicago, IL", 41.8781, -87.6298);

// ============================================================================
// Outbound destinations and nearby pickups
// ============================================================================

pub const DENVER: Location = Location::new("Denver, CO", 39.7392, -104.9903);
pub const LITTLETON: Location = Location::new("Littleton, CO", 39.6612, -105.0178);
pub const COLORADO_SPRINGS: Location = Location::new("Colorado Springs, CO", 38.8339, -104.8214);
pub const NORTH_PLATTE: Location = Location::new("North Platte, NE", 41.1239, -100.7654);

// ============================================================================
// Return-leg deliveries
// ============================================================================

pub const DES_MOINES: Location = Location::new("Des Moines, IA", 41.5868, -93.6250);
pub const OMAHA: Location = Location::new("Omaha, NE", 41.2565, -95.9345);
pub const KANSAS_CITY: Location = Location::new("Kansas City, MO", 39.0997, -94.5786);
pub const LINCOLN: Location = Location::new("Lincoln, NE", 40.8136, -96.7026);

pub const RETURN_DELIVERIES: &[Location] = &[DES_MOINES, OMAHA, KANSAS_CITY, LINCOLN];
