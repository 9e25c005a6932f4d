//! In-memory repositories backed by sharded concurrent maps.
//!
//! Entries are locked per shard, never globally, so updates to different
//! drivers proceed independently. Contents are lost on restart.

use dashmap::DashMap;
use tracing::debug;

use crate::error::EngineError;
use crate::model::{AlertId, DriverAlert, DriverContactProfile, DriverId, DriverTrajectory, GeoPoint};
use crate::traits::{AlertRepository, ContactDirectory, TrajectoryStore};

#[derive(Debug, Default)]
pub struct InMemoryTrajectoryStore {
    trajectories: DashMap<DriverId, DriverTrajectory>,
}

impl InMemoryTrajectoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.trajectories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }
}

impl TrajectoryStore for InMemoryTrajectoryStore {
    fn get(&self, driver_id: &str) -> Option<DriverTrajectory> {
        self.trajectories.get(driver_id).map(|entry| entry.value().clone())
    }

    fn insert(&self, trajectory: DriverTrajectory) -> Result<(), EngineError> {
        trajectory.validate()?;
        self.trajectories.insert(trajectory.driver_id.clone(), trajectory);
        Ok(())
    }

    fn upsert_location(&self, driver_id: &str, point: GeoPoint) -> Result<(), EngineError> {
        point.validate()?;
        let mut entry = self
            .trajectories
            .get_mut(driver_id)
            .ok_or_else(|| EngineError::DriverNotFound(driver_id.to_string()))?;
        entry.current = point;
        debug!(driver_id, lat = point.lat, lng = point.lng, "location updated");
        Ok(())
    }

    fn driver_ids(&self) -> Vec<DriverId> {
        let mut ids: Vec<DriverId> = self.trajectories.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }
}

#[derive(Debug, Default)]
pub struct InMemoryContactDirectory {
    contacts: DashMap<DriverId, DriverContactProfile>,
}

impl InMemoryContactDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, contact: DriverContactProfile) {
        self.contacts.insert(contact.driver_id.clone(), contact);
    }
}

impl ContactDirectory for InMemoryContactDirectory {
    fn contact(&self, driver_id: &str) -> Option<DriverContactProfile> {
        self.contacts.get(driver_id).map(|entry| entry.value().clone())
    }
}

impl FromIterator<DriverContactProfile> for InMemoryContactDirectory {
    fn from_iter<I: IntoIterator<Item = DriverContactProfile>>(iter: I) -> Self {
        let directory = Self::new();
        for contact in iter {
            directory.insert(contact);
        }
        directory
    }
}

#[derive(Debug, Default)]
pub struct InMemoryAlertRepository {
    alerts: DashMap<AlertId, DriverAlert>,
}

impl InMemoryAlertRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AlertRepository for InMemoryAlertRepository {
    fn insert(&self, alert: DriverAlert) {
        self.alerts.insert(alert.id, alert);
    }

    fn get(&self, id: &AlertId) -> Option<DriverAlert> {
        self.alerts.get(id).map(|entry| entry.value().clone())
    }

    fn modify(&self, id: &AlertId, f: &mut dyn FnMut(&mut DriverAlert)) -> bool {
        match self.alerts.get_mut(id) {
            Some(mut entry) => {
                f(entry.value_mut());
                true
            }
            None => false,
        }
    }

    fn ids(&self) -> Vec<AlertId> {
        self.alerts.iter().map(|entry| *entry.key()).collect()
    }

    fn for_driver(&self, driver_id: &str) -> Vec<DriverAlert> {
        self.alerts
            .iter()
            .filter(|entry| entry.driver_id == driver_id)
            .map(|entry| entry.value().clone())
            .collect()
    }

    fn all(&self) -> Vec<DriverAlert> {
        self.alerts.iter().map(|entry| entry.value().clone()).collect()
    }

    fn remove_where(&self, predicate: &dyn Fn(&DriverAlert) -> bool) -> usize {
        let mut removed = 0;
        self.alerts.retain(|_, alert| {
            if predicate(alert) {
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }
}
