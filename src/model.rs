//! Domain records shared by the scorer, composer and alert lifecycle.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::route::PlannedRoute;

pub type DriverId = String;
pub type AlertId = Uuid;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Rejects NaN, infinities and out-of-range degrees.
    pub fn validate(&self) -> Result<(), EngineError> {
        let lat_ok = self.lat.is_finite() && (-90.0..=90.0).contains(&self.lat);
        let lng_ok = self.lng.is_finite() && (-180.0..=180.0).contains(&self.lng);
        if lat_ok && lng_ok {
            Ok(())
        } else {
            Err(EngineError::InvalidCoordinates {
                lat: self.lat,
                lng: self.lng,
            })
        }
    }
}

/// Trailer / equipment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailerType {
    DryVan,
    Reefer,
    Flatbed,
    StepDeck,
    Tanker,
}

impl TrailerType {
    /// Commodity families a trailer of this type can carry even when the
    /// load was posted for different equipment.
    pub fn compatible_commodities(&self) -> &'static [&'static str] {
        match self {
            TrailerType::DryVan => &[
                "general",
                "packaged_food",
                "consumer_goods",
                "electronics",
                "paper",
                "beverages",
            ],
            TrailerType::Reefer => &[
                "produce",
                "frozen",
                "dairy",
                "meat",
                "pharmaceutical",
                "packaged_food",
                "beverages",
            ],
            TrailerType::Flatbed => &["steel", "lumber", "machinery", "building_materials", "pipe"],
            TrailerType::StepDeck => &["machinery", "equipment", "building_materials"],
            TrailerType::Tanker => &["liquid_bulk", "chemicals", "fuel"],
        }
    }
}

impl fmt::Display for TrailerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrailerType::DryVan => "dry_van",
            TrailerType::Reefer => "reefer",
            TrailerType::Flatbed => "flatbed",
            TrailerType::StepDeck => "step_deck",
            TrailerType::Tanker => "tanker",
        };
        f.write_str(name)
    }
}

/// Capacity still free on the driver's trailer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemainingCapacity {
    pub weight_lbs: f64,
    pub volume_cuft: f64,
    pub trailer_type: TrailerType,
}

/// Constraints on the driver's trip home.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnPolicy {
    pub home_base: GeoPoint,
    pub preferred_return: Option<DateTime<Utc>>,
    pub max_detour_miles: f64,
    pub min_load_value: f64,
}

/// Current state of a driver's haul.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverTrajectory {
    pub driver_id: DriverId,
    pub current: GeoPoint,
    pub destination: GeoPoint,
    pub route: PlannedRoute,
    pub estimated_arrival: DateTime<Utc>,
    pub capacity: RemainingCapacity,
    /// When the current load is due at the destination.
    pub current_load_delivery: DateTime<Utc>,
    pub unloading_minutes: i64,
    pub return_policy: ReturnPolicy,
}

/// Upper bound on the unloading allowance, one week.
pub const MAX_UNLOADING_MINUTES: i64 = 7 * 24 * 60;

impl DriverTrajectory {
    /// Checks coordinates, route ordering and the numeric limits the scorer
    /// relies on.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.current.validate()?;
        self.destination.validate()?;
        self.return_policy.home_base.validate()?;
        self.route.validate()?;

        let non_negative = [
            ("return_policy.max_detour_miles", self.return_policy.max_detour_miles),
            ("return_policy.min_load_value", self.return_policy.min_load_value),
            ("capacity.weight_lbs", self.capacity.weight_lbs),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(self.invalid(format!("{} must be finite and non-negative, got {}", field, value)));
            }
        }
        if !(0..=MAX_UNLOADING_MINUTES).contains(&self.unloading_minutes) {
            return Err(self.invalid(format!(
                "unloading_minutes must be within 0..={}, got {}",
                MAX_UNLOADING_MINUTES, self.unloading_minutes
            )));
        }
        Ok(())
    }

    fn invalid(&self, reason: String) -> EngineError {
        EngineError::InvalidTrajectory {
            driver_id: self.driver_id.clone(),
            reason,
        }
    }

    /// Earliest moment the trailer is empty and the driver can take new freight.
    pub fn empty_at(&self) -> DateTime<Utc> {
        self.current_load_delivery + chrono::Duration::minutes(self.unloading_minutes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A load offered by a load board or broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadCandidate {
    pub load_id: String,
    pub pickup: GeoPoint,
    pub pickup_address: String,
    pub delivery: GeoPoint,
    pub delivery_address: String,
    pub pickup_window: TimeWindow,
    pub delivery_window: TimeWindow,
    pub rate: f64,
    pub distance_miles: f64,
    pub weight_lbs: f64,
    pub equipment_type: TrailerType,
    pub commodity: String,
    #[serde(default)]
    pub special_requirements: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyMetrics {
    pub revenue_per_mile: f64,
    pub time_efficiency: f64,
    pub route_optimization: f64,
}

/// A scored (driver, load) pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackhaulOpportunity {
    pub driver_id: DriverId,
    pub load: LoadCandidate,
    pub detour_miles: f64,
    pub added_minutes: i64,
    pub efficiency: EfficiencyMetrics,
    pub match_score: f64,
    pub urgency: Urgency,
    pub estimated_profit: f64,
    pub hours_to_pickup: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    BackhaulOpportunity,
    MultipleOpportunities,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPriority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Pending,
    Approved,
    Rejected,
    Responded,
    AutoExecuted,
    Expired,
}

impl AlertStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AlertStatus::Pending)
    }

    /// Whether the driver (not the engine) closed the alert.
    pub fn is_driver_response(&self) -> bool {
        matches!(
            self,
            AlertStatus::Approved | AlertStatus::Rejected | AlertStatus::Responded
        )
    }
}

/// Contact channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Push,
    Sms,
    Call,
    Email,
}

impl Channel {
    /// The address this channel delivers to for a given contact.
    pub fn destination<'a>(&self, contact: &'a DriverContactProfile) -> Option<&'a str> {
        match self {
            Channel::Push => Some(contact.driver_id.as_str()),
            Channel::Sms | Channel::Call => contact.phone.as_deref(),
            Channel::Email => contact.email.as_deref(),
        }
        .filter(|value| !value.is_empty())
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::Push => "push",
            Channel::Sms => "sms",
            Channel::Call => "call",
            Channel::Email => "email",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResponseAction {
    Accept { load_id: String },
    Decline,
    RequestCall,
}

/// A reply the driver can send back, e.g. `ACCEPT 2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseOption {
    pub code: String,
    pub label: String,
    pub action: ResponseAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Delivered,
    Failed,
    TimedOut,
    Skipped,
}

/// Outcome of one channel attempt for one alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDelivery {
    pub channel: Channel,
    pub status: DeliveryStatus,
    pub detail: Option<String>,
    pub attempted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverAlert {
    pub id: AlertId,
    pub driver_id: DriverId,
    pub alert_type: AlertType,
    pub opportunities: Vec<BackhaulOpportunity>,
    pub priority: AlertPriority,
    pub title: String,
    pub message: String,
    pub expires_at: DateTime<Utc>,
    pub channels: Vec<Channel>,
    pub response_options: Vec<ResponseOption>,
    pub created_at: DateTime<Utc>,
    pub status: AlertStatus,
    pub responded_at: Option<DateTime<Utc>>,
    pub response: Option<String>,
    #[serde(default)]
    pub deliveries: Vec<ChannelDelivery>,
}

impl DriverAlert {
    pub fn best(&self) -> Option<&BackhaulOpportunity> {
        self.opportunities.first()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Daily window in the driver's local time during which intrusive
/// channels may be used. `start > end` wraps past midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactHours {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub utc_offset_minutes: i32,
}

impl ContactHours {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let Some(offset) = FixedOffset::east_opt(self.utc_offset_minutes * 60) else {
            return true;
        };
        let local = at.with_timezone(&offset).time();
        if self.start <= self.end {
            local >= self.start && local < self.end
        } else {
            local >= self.start || local < self.end
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AlertPreferences {
    pub min_load_value: Option<f64>,
    pub max_detour_miles: Option<f64>,
    #[serde(default)]
    pub commodities: Vec<String>,
    /// Empty means every urgency is accepted.
    #[serde(default)]
    pub urgency_levels: Vec<Urgency>,
    /// Best-opportunity score at or above which the load is booked without
    /// waiting for a reply.
    pub auto_accept_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverContactProfile {
    pub driver_id: DriverId,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub preferred_channel: Channel,
    pub contact_hours: Option<ContactHours>,
    #[serde(default)]
    pub preferences: AlertPreferences,
}

impl DriverContactProfile {
    /// Profile for a driver with no contact record: in-app push only, no
    /// preferences.
    pub fn push_only(driver_id: &str) -> Self {
        Self {
            driver_id: driver_id.to_string(),
            phone: None,
            email: None,
            preferred_channel: Channel::Push,
            contact_hours: None,
            preferences: AlertPreferences::default(),
        }
    }
}
