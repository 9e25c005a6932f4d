//! Builders with sensible defaults for trajectories, loads and contacts.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};

use backhaul_alerts::model::{
    AlertPreferences, Channel, ContactHours, DriverContactProfile, DriverTrajectory, LoadCandidate,
    RemainingCapacity, ReturnPolicy, TimeWindow, TrailerType, Urgency,
};
use backhaul_alerts::route::{PlannedRoute, RouteWaypoint};

use super::locations::{Location, CHICAGO, DENVER, NORTH_PLATTE};

/// Monday morning, the reference "now" for every scenario.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap()
}

pub fn hours(h: i64) -> Duration {
    Duration::hours(h)
}

pub fn minutes(m: i64) -> Duration {
    Duration::minutes(m)
}

/// Driver hauling Chicago -> Denver, two hours out, 15000 lbs free on a dry van.
#[derive(Clone, Debug)]
pub struct TrajectoryBuilder {
    inner: DriverTrajectory,
}

impl TrajectoryBuilder {
    pub fn new(driver_id: &str) -> Self {
        let eta = t0() + hours(2);
        let route = PlannedRoute::new(vec![
            RouteWaypoint {
                point: CHICAGO.point(),
                timestamp: t0() - hours(15),
                cumulative_miles: 0.0,
            },
            RouteWaypoint {
                point: NORTH_PLATTE.point(),
                timestamp: t0() - hours(2),
                cumulative_miles: 760.0,
            },
            RouteWaypoint {
                point: DENVER.point(),
                timestamp: eta,
                cumulative_miles: 1000.0,
            },
        ]);

        Self {
            inner: DriverTrajectory {
                driver_id: driver_id.to_string(),
                current: NORTH_PLATTE.point(),
                destination: DENVER.point(),
                route,
                estimated_arrival: eta,
                capacity: RemainingCapacity {
                    weight_lbs: 15000.0,
                    volume_cuft: 2400.0,
                    trailer_type: TrailerType::DryVan,
                },
                current_load_delivery: eta,
                unloading_minutes: 60,
                return_policy: ReturnPolicy {
                    home_base: CHICAGO.point(),
                    preferred_return: Some(t0() + hours(48)),
                    max_detour_miles: 100.0,
                    min_load_value: 1000.0,
                },
            },
        }
    }

    pub fn arriving_in(mut self, duration: Duration) -> Self {
        self.inner.estimated_arrival = t0() + duration;
        self.inner.current_load_delivery = t0() + duration;
        self
    }

    pub fn max_detour(mut self, miles: f64) -> Self {
        self.inner.return_policy.max_detour_miles = miles;
        self
    }

    pub fn available_weight(mut self, lbs: f64) -> Self {
        self.inner.capacity.weight_lbs = lbs;
        self
    }

    pub fn trailer(mut self, trailer_type: TrailerType) -> Self {
        self.inner.capacity.trailer_type = trailer_type;
        self
    }

    pub fn home(mut self, location: Location) -> Self {
        self.inner.return_policy.home_base = location.point();
        self
    }

    pub fn build(self) -> DriverTrajectory {
        self.inner
    }
}

/// Dry-van general freight, $1850 over 650 mi, pickup 4-10h from t0.
#[derive(Clone, Debug)]
pub struct LoadBuilder {
    inner: LoadCandidate,
}

impl LoadBuilder {
    pub fn new(load_id: &str, pickup: Location, delivery: Location) -> Self {
        Self {
            inner: LoadCandidate {
                load_id: load_id.to_string(),
                pickup: pickup.point(),
                pickup_address: pickup.name.to_string(),
                delivery: delivery.point(),
                delivery_address: delivery.name.to_string(),
                pickup_window: TimeWindow {
                    start: t0() + hours(4),
                    end: t0() + hours(10),
                },
                delivery_window: TimeWindow {
                    start: t0() + hours(16),
                    end: t0() + hours(24),
                },
                rate: 1850.0,
                distance_miles: 650.0,
                weight_lbs: 12000.0,
                equipment_type: TrailerType::DryVan,
                commodity: "general".to_string(),
                special_requirements: BTreeSet::new(),
            },
        }
    }

    pub fn rate(mut self, rate: f64) -> Self {
        self.inner.rate = rate;
        self
    }

    pub fn distance(mut self, miles: f64) -> Self {
        self.inner.distance_miles = miles;
        self
    }

    pub fn weight(mut self, lbs: f64) -> Self {
        self.inner.weight_lbs = lbs;
        self
    }

    pub fn equipment(mut self, trailer_type: TrailerType) -> Self {
        self.inner.equipment_type = trailer_type;
        self
    }

    pub fn commodity(mut self, commodity: &str) -> Self {
        self.inner.commodity = commodity.to_string();
        self
    }

    /// Pickup window relative to t0, in hours.
    pub fn pickup_window(mut self, start_h: i64, end_h: i64) -> Self {
        self.inner.pickup_window = TimeWindow {
            start: t0() + hours(start_h),
            end: t0() + hours(end_h),
        };
        self
    }

    pub fn requires(mut self, requirement: &str) -> Self {
        self.inner.special_requirements.insert(requirement.to_string());
        self
    }

    pub fn build(self) -> LoadCandidate {
        self.inner
    }
}

/// Reachable by SMS and email, $1200 minimum, hauls general freight.
#[derive(Clone, Debug)]
pub struct ContactBuilder {
    inner: DriverContactProfile,
}

impl ContactBuilder {
    pub fn new(driver_id: &str) -> Self {
        Self {
            inner: DriverContactProfile {
                driver_id: driver_id.to_string(),
                phone: Some("+13125550100".to_string()),
                email: Some(format!("{}@fleet.example", driver_id)),
                preferred_channel: Channel::Sms,
                contact_hours: None,
                preferences: AlertPreferences {
                    min_load_value: Some(1200.0),
                    max_detour_miles: None,
                    commodities: vec!["general".to_string()],
                    urgency_levels: Vec::new(),
                    auto_accept_score: None,
                },
            },
        }
    }

    pub fn preferred(mut self, channel: Channel) -> Self {
        self.inner.preferred_channel = channel;
        self
    }

    pub fn no_phone(mut self) -> Self {
        self.inner.phone = None;
        self
    }

    pub fn auto_accept(mut self, score: f64) -> Self {
        self.inner.preferences.auto_accept_score = Some(score);
        self
    }

    pub fn urgency_levels(mut self, levels: Vec<Urgency>) -> Self {
        self.inner.preferences.urgency_levels = levels;
        self
    }

    /// Contact window in UTC, whole hours.
    pub fn contact_hours(mut self, start_h: u32, end_h: u32) -> Self {
        self.inner.contact_hours = Some(ContactHours {
            start: NaiveTime::from_hms_opt(start_h, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(end_h, 0, 0).unwrap(),
            utc_offset_minutes: 0,
        });
        self
    }

    pub fn build(self) -> DriverContactProfile {
        self.inner
    }
}
