//! Fake load feeds.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use backhaul_alerts::error::EngineError;
use backhaul_alerts::model::{DriverTrajectory, GeoPoint, LoadCandidate, TimeWindow, TrailerType};
use backhaul_alerts::source::LoadBoard;
use backhaul_alerts::traits::LoadSource;

use super::builders::{hours, t0};
use super::locations::{Location, RETURN_DELIVERIES};

const EQUIPMENT: &[TrailerType] = &[
    TrailerType::DryVan,
    TrailerType::DryVan,
    TrailerType::Reefer,
    TrailerType::Flatbed,
];

const COMMODITIES: &[&str] = &["general", "packaged_food", "produce", "steel", "electronics"];

/// Seeded pseudo-random loads picked up around `origin`, delivered to one
/// of the return-leg cities. The set is generated once so repeated queries
/// see the same loads.
#[derive(Debug, Clone)]
pub struct RandomLoadFeed {
    loads: Vec<LoadCandidate>,
}

impl RandomLoadFeed {
    pub fn new(seed: u64, count: usize, origin: Location) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let loads = (0..count)
            .map(|i| {
                let pickup = GeoPoint::new(
                    origin.lat + rng.random_range(-0.5..0.5),
                    origin.lng + rng.random_range(-0.5..0.5),
                );
                let delivery = RETURN_DELIVERIES[rng.random_range(0..RETURN_DELIVERIES.len())];
                let start_h = rng.random_range(3..12);
                LoadCandidate {
                    load_id: format!("RND-{:03}", i),
                    pickup,
                    pickup_address: format!("{} area", origin.name),
                    delivery: delivery.point(),
                    delivery_address: delivery.name.to_string(),
                    pickup_window: TimeWindow {
                        start: t0() + hours(start_h),
                        end: t0() + hours(start_h + 6),
                    },
                    delivery_window: TimeWindow {
                        start: t0() + hours(start_h + 12),
                        end: t0() + hours(start_h + 24),
                    },
                    rate: rng.random_range(800.0..3000.0),
                    distance_miles: rng.random_range(400.0..900.0),
                    weight_lbs: rng.random_range(2000.0..20000.0),
                    equipment_type: EQUIPMENT[rng.random_range(0..EQUIPMENT.len())],
                    commodity: COMMODITIES[rng.random_range(0..COMMODITIES.len())].to_string(),
                    special_requirements: BTreeSet::new(),
                }
            })
            .collect();
        Self { loads }
    }

    pub fn loads(&self) -> &[LoadCandidate] {
        &self.loads
    }
}

impl LoadSource for RandomLoadFeed {
    fn candidates_near(&self, _trajectory: &DriverTrajectory) -> Result<Vec<LoadCandidate>, EngineError> {
        Ok(self.loads.clone())
    }
}

/// Wraps a load board but fails for one driver.
#[derive(Debug)]
pub struct FlakySource {
    pub board: LoadBoard,
    pub failing_driver: String,
}

impl LoadSource for FlakySource {
    fn candidates_near(&self, trajectory: &DriverTrajectory) -> Result<Vec<LoadCandidate>, EngineError> {
        if trajectory.driver_id == self.failing_driver {
            return Err(EngineError::Source("load board timed out".to_string()));
        }
        self.board.candidates_near(trajectory)
    }
}
