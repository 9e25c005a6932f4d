//! Seams between the engine and its collaborators.
//!
//! The engine only depends on these contracts. In-memory implementations
//! live in [`crate::store`] and [`crate::source`]; delivery adapters in
//! [`crate::gateway`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{ChannelError, EngineError};
use crate::model::{
    AlertId, DriverAlert, DriverContactProfile, DriverId, DriverTrajectory, GeoPoint, LoadCandidate,
};

/// Owns driver trajectories.
///
/// Reads may run concurrently. Writes to different drivers must not block
/// each other; writes to the same driver are last-write-wins.
pub trait TrajectoryStore: Send + Sync {
    fn get(&self, driver_id: &str) -> Option<DriverTrajectory>;

    /// Adds or replaces a full trajectory.
    fn insert(&self, trajectory: DriverTrajectory) -> Result<(), EngineError>;

    /// Updates only the current position of a known driver.
    fn upsert_location(&self, driver_id: &str, point: GeoPoint) -> Result<(), EngineError>;

    fn driver_ids(&self) -> Vec<DriverId>;
}

/// Read-only contact profiles, keyed by driver id.
pub trait ContactDirectory: Send + Sync {
    fn contact(&self, driver_id: &str) -> Option<DriverContactProfile>;
}

/// Supplies candidate loads around a driver's return corridor.
///
/// The returned set is scoped to a single scan. An empty set is a normal
/// outcome.
pub trait LoadSource: Send + Sync {
    fn candidates_near(&self, trajectory: &DriverTrajectory) -> Result<Vec<LoadCandidate>, EngineError>;
}

/// Storage for alerts owned by the lifecycle manager.
pub trait AlertRepository: Send + Sync {
    fn insert(&self, alert: DriverAlert);

    fn get(&self, id: &AlertId) -> Option<DriverAlert>;

    /// Applies `f` to the stored alert while holding its entry exclusively.
    /// Returns false if the alert does not exist.
    fn modify(&self, id: &AlertId, f: &mut dyn FnMut(&mut DriverAlert)) -> bool;

    /// Ids of every stored alert.
    fn ids(&self) -> Vec<AlertId>;

    fn for_driver(&self, driver_id: &str) -> Vec<DriverAlert>;

    fn all(&self) -> Vec<DriverAlert>;

    /// Removes alerts matching `predicate`, returning how many were removed.
    fn remove_where(&self, predicate: &dyn Fn(&DriverAlert) -> bool) -> usize;
}

/// A delivery channel (push service, SMS gateway, voice gateway, email).
#[async_trait]
pub trait ChannelSender: Send + Sync {
    async fn send(&self, contact: &DriverContactProfile, alert: &DriverAlert) -> Result<(), ChannelError>;
}

/// Source of "now". Injected so scans and expiry can be driven in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
