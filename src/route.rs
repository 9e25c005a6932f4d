//! Planned route of the outbound haul.
//!
//! Waypoints are stored decoded, in travel order. Any encoding for
//! transport belongs at the boundary, not in the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::model::GeoPoint;

/// A point on the planned route with its expected passing time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteWaypoint {
    pub point: GeoPoint,
    pub timestamp: DateTime<Utc>,
    /// Miles from the start of the haul to this waypoint.
    pub cumulative_miles: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlannedRoute {
    waypoints: Vec<RouteWaypoint>,
}

impl PlannedRoute {
    pub fn new(waypoints: Vec<RouteWaypoint>) -> Self {
        Self { waypoints }
    }

    pub fn waypoints(&self) -> &[RouteWaypoint] {
        &self.waypoints
    }

    /// Checks coordinates and that waypoints are ordered in time and distance.
    pub fn validate(&self) -> Result<(), EngineError> {
        for waypoint in &self.waypoints {
            waypoint.point.validate()?;
        }
        let ordered = self.waypoints.windows(2).all(|pair| {
            pair[0].timestamp <= pair[1].timestamp
                && pair[0].cumulative_miles <= pair[1].cumulative_miles
        });
        if ordered {
            Ok(())
        } else {
            Err(EngineError::InvalidRoute(
                "waypoints must be ordered by time and cumulative distance".to_string(),
            ))
        }
    }
}
