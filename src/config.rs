//! Engine tuning knobs.
//!
//! Every field has a default, so a TOML file only needs the values it
//! overrides:
//!
//! ```
//! use backhaul_alerts::config::EngineConfig;
//!
//! let config = EngineConfig::from_toml_str(r#"
//!     cost_per_mile = 1.85
//!     cooldown_minutes = 45
//! "#).unwrap();
//!
//! assert_eq!(config.cooldown_minutes, 45);
//! assert_eq!(config.publish_threshold, 70.0);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One day.
const MAX_INTERVAL_SECS: u64 = 24 * 60 * 60;
/// Thirty days.
const MAX_WINDOW_MINUTES: i64 = 30 * 24 * 60;
/// One year.
const MAX_RETENTION_HOURS: i64 = 365 * 24;

fn check_non_negative(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{} must be finite and non-negative, got {}",
            field, value
        )))
    }
}

fn check_range<T>(field: &str, value: T, min: T, max: T) -> Result<(), ConfigError>
where
    T: PartialOrd + std::fmt::Display,
{
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{} must be within {}..={}, got {}",
            field, min, max, value
        )))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum match score for an opportunity to be published.
    pub publish_threshold: f64,
    /// Average cruising speed used for time estimates.
    pub cruising_speed_mph: f64,
    /// Fixed pickup + delivery allowance added to every detour.
    pub handling_minutes: i64,
    /// Operating cost charged against detour miles.
    pub cost_per_mile: f64,
    /// Lifetime of an alert before it expires.
    pub alert_ttl_minutes: i64,
    /// Minimum time between two alerts to the same driver.
    pub cooldown_minutes: i64,
    pub scan_interval_secs: u64,
    /// Drivers arriving within this horizon are scanned.
    pub arrival_horizon_minutes: i64,
    /// Bound on each channel send attempt.
    pub channel_timeout_secs: u64,
    /// Profit above which a voice call is added to the alert channels.
    pub call_profit_threshold: f64,
    /// Radius around the destination searched for pickups.
    pub corridor_radius_miles: f64,
    /// How long closed alerts are kept for metrics.
    pub retention_hours: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            publish_threshold: 70.0,
            cruising_speed_mph: 55.0,
            handling_minutes: 180,
            cost_per_mile: 1.50,
            alert_ttl_minutes: 120,
            cooldown_minutes: 30,
            scan_interval_secs: 300,
            arrival_horizon_minutes: 240,
            channel_timeout_secs: 5,
            call_profit_threshold: 1500.0,
            corridor_radius_miles: 150.0,
            retention_hours: 24,
        }
    }
}

impl EngineConfig {
    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=100.0).contains(&self.publish_threshold) {
            return Err(ConfigError::Invalid(format!(
                "publish_threshold must be within 0..=100, got {}",
                self.publish_threshold
            )));
        }
        if !self.cruising_speed_mph.is_finite() || self.cruising_speed_mph <= 0.0 {
            return Err(ConfigError::Invalid("cruising_speed_mph must be positive".to_string()));
        }
        if !self.corridor_radius_miles.is_finite() || self.corridor_radius_miles <= 0.0 {
            return Err(ConfigError::Invalid("corridor_radius_miles must be positive".to_string()));
        }
        check_non_negative("cost_per_mile", self.cost_per_mile)?;
        check_non_negative("call_profit_threshold", self.call_profit_threshold)?;

        check_range("scan_interval_secs", self.scan_interval_secs, 1, MAX_INTERVAL_SECS)?;
        check_range("channel_timeout_secs", self.channel_timeout_secs, 1, MAX_INTERVAL_SECS)?;

        check_range("handling_minutes", self.handling_minutes, 0, MAX_WINDOW_MINUTES)?;
        check_range("alert_ttl_minutes", self.alert_ttl_minutes, 1, MAX_WINDOW_MINUTES)?;
        check_range("cooldown_minutes", self.cooldown_minutes, 0, MAX_WINDOW_MINUTES)?;
        check_range("arrival_horizon_minutes", self.arrival_horizon_minutes, 0, MAX_WINDOW_MINUTES)?;
        check_range("retention_hours", self.retention_hours, 0, MAX_RETENTION_HOURS)?;
        Ok(())
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }

    pub fn channel_timeout(&self) -> Duration {
        Duration::from_secs(self.channel_timeout_secs)
    }

    pub fn alert_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.alert_ttl_minutes)
    }

    pub fn cooldown(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.cooldown_minutes)
    }

    pub fn arrival_horizon(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.arrival_horizon_minutes)
    }

    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::hours(self.retention_hours)
    }
}
