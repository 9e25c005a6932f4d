//! In-memory load board.

use std::sync::RwLock;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::haversine::distance_miles;
use crate::model::{DriverTrajectory, LoadCandidate};
use crate::traits::LoadSource;

/// Posted loads, queried by distance from the driver's destination.
#[derive(Debug)]
pub struct LoadBoard {
    loads: RwLock<Vec<LoadCandidate>>,
    /// Pickups farther than this from the destination are not offered.
    pub corridor_radius_miles: f64,
}

impl LoadBoard {
    pub fn new(corridor_radius_miles: f64) -> Self {
        Self {
            loads: RwLock::new(Vec::new()),
            corridor_radius_miles,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.corridor_radius_miles)
    }

    pub fn with_loads(corridor_radius_miles: f64, loads: Vec<LoadCandidate>) -> Self {
        Self {
            loads: RwLock::new(loads),
            corridor_radius_miles,
        }
    }

    /// Replaces every posted load with a fresh feed.
    pub fn replace(&self, loads: Vec<LoadCandidate>) -> Result<(), EngineError> {
        let mut guard = self
            .loads
            .write()
            .map_err(|_| EngineError::Source("load board lock poisoned".to_string()))?;
        *guard = loads;
        Ok(())
    }

    pub fn post(&self, load: LoadCandidate) -> Result<(), EngineError> {
        let mut guard = self
            .loads
            .write()
            .map_err(|_| EngineError::Source("load board lock poisoned".to_string()))?;
        guard.retain(|existing| existing.load_id != load.load_id);
        guard.push(load);
        Ok(())
    }
}

impl LoadSource for LoadBoard {
    fn candidates_near(&self, trajectory: &DriverTrajectory) -> Result<Vec<LoadCandidate>, EngineError> {
        let guard = self
            .loads
            .read()
            .map_err(|_| EngineError::Source("load board lock poisoned".to_string()))?;
        Ok(guard
            .iter()
            .filter(|load| load.pickup.validate().is_ok())
            .filter(|load| distance_miles(trajectory.destination, load.pickup) <= self.corridor_radius_miles)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GeoPoint, RemainingCapacity, ReturnPolicy, TimeWindow, TrailerType};
    use crate::route::PlannedRoute;
    use chrono::{Duration, TimeZone, Utc};
    use std::collections::BTreeSet;

    fn load(id: &str, pickup: GeoPoint) -> LoadCandidate {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 14, 0, 0).unwrap();
        LoadCandidate {
            load_id: id.to_string(),
            pickup,
            pickup_address: "Pickup".to_string(),
            delivery: GeoPoint::new(41.5868, -93.6250),
            delivery_address: "Delivery".to_string(),
            pickup_window: TimeWindow { start, end: start + Duration::hours(4) },
            delivery_window: TimeWindow {
                start: start + Duration::hours(12),
                end: start + Duration::hours(20),
            },
            rate: 1500.0,
            distance_miles: 650.0,
            weight_lbs: 10000.0,
            equipment_type: TrailerType::DryVan,
            commodity: "general".to_string(),
            special_requirements: BTreeSet::new(),
        }
    }

    fn trajectory() -> DriverTrajectory {
        let eta = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
        DriverTrajectory {
            driver_id: "d1".to_string(),
            current: GeoPoint::new(41.0, -100.0),
            destination: GeoPoint::new(39.7392, -104.9903),
            route: PlannedRoute::default(),
            estimated_arrival: eta,
            capacity: RemainingCapacity {
                weight_lbs: 15000.0,
                volume_cuft: 2000.0,
                trailer_type: TrailerType::DryVan,
            },
            current_load_delivery: eta,
            unloading_minutes: 60,
            return_policy: ReturnPolicy {
                home_base: GeoPoint::new(41.8781, -87.6298),
                preferred_return: None,
                max_detour_miles: 100.0,
                min_load_value: 1000.0,
            },
        }
    }

    #[test]
    fn test_filters_by_corridor_radius() {
        let board = LoadBoard::with_loads(
            150.0,
            vec![
                load("near", GeoPoint::new(39.6612, -105.0178)),
                load("far", GeoPoint::new(33.4484, -112.0740)),
            ],
        );
        let ids: Vec<_> = board
            .candidates_near(&trajectory())
            .unwrap()
            .into_iter()
            .map(|load| load.load_id)
            .collect();
        assert_eq!(ids, vec!["near".to_string()]);
    }

    #[test]
    fn test_empty_board_is_not_an_error() {
        let board = LoadBoard::new(150.0);
        assert!(board.candidates_near(&trajectory()).unwrap().is_empty());
    }

    #[test]
    fn test_post_replaces_same_id() {
        let board = LoadBoard::new(150.0);
        board.post(load("l1", GeoPoint::new(39.6612, -105.0178))).unwrap();
        let mut updated = load("l1", GeoPoint::new(39.6612, -105.0178));
        updated.rate = 2000.0;
        board.post(updated).unwrap();

        let candidates = board.candidates_near(&trajectory()).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].rate, 2000.0);
    }
}
