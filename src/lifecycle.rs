//! Alert state machine, duplicate suppression and expiry.
//!
//! ```text
//! pending -> approved | rejected | responded | auto_executed | expired
//! ```
//!
//! Every state except `pending` is terminal.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::model::{AlertId, AlertStatus, ChannelDelivery, DriverAlert, ResponseAction};
use crate::traits::AlertRepository;

/// Aggregates over the alerts currently held.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AlertStats {
    pub total: usize,
    pub pending: usize,
    pub driver_responses: usize,
    /// Opportunities attached to pending alerts.
    pub active_opportunities: usize,
    pub opportunities: usize,
    pub total_profit: f64,
}

pub struct AlertLifecycle {
    repository: Arc<dyn AlertRepository>,
    cooldown: Duration,
    retention: Duration,
}

impl AlertLifecycle {
    pub fn new(repository: Arc<dyn AlertRepository>, config: &EngineConfig) -> Self {
        Self {
            repository,
            cooldown: config.cooldown(),
            retention: config.retention(),
        }
    }

    /// Whether the driver got an alert within the cool-down window.
    pub fn has_recent(&self, driver_id: &str, now: DateTime<Utc>) -> bool {
        let since = now - self.cooldown;
        self.repository
            .for_driver(driver_id)
            .iter()
            .any(|alert| alert.created_at > since)
    }

    pub fn record(&self, alert: DriverAlert) {
        info!(
            alert_id = %alert.id,
            driver_id = %alert.driver_id,
            priority = ?alert.priority,
            opportunities = alert.opportunities.len(),
            "alert recorded"
        );
        self.repository.insert(alert);
    }

    pub fn record_deliveries(&self, id: &AlertId, deliveries: Vec<ChannelDelivery>) -> bool {
        let mut deliveries = Some(deliveries);
        self.repository.modify(id, &mut |alert| {
            if let Some(batch) = deliveries.take() {
                alert.deliveries.extend(batch);
            }
        })
    }

    /// Books the best load without waiting for a reply. Only pending
    /// alerts move.
    pub fn auto_execute(&self, id: &AlertId, now: DateTime<Utc>) -> bool {
        let mut moved = false;
        self.repository.modify(id, &mut |alert| {
            if alert.status == AlertStatus::Pending {
                alert.status = AlertStatus::AutoExecuted;
                alert.responded_at = Some(now);
                moved = true;
            }
        });
        if moved {
            info!(alert_id = %id, "alert auto-executed");
        }
        moved
    }

    /// Applies a driver reply to a pending alert.
    ///
    /// An alert already past its expiry is expired here instead of being
    /// answered.
    pub fn respond(&self, id: &AlertId, text: &str, now: DateTime<Utc>) -> Result<AlertStatus, EngineError> {
        let mut outcome = Err(EngineError::AlertNotFound(*id));
        let found = self.repository.modify(id, &mut |alert| {
            if alert.status.is_terminal() {
                outcome = Err(EngineError::AlertClosed(alert.id));
                return;
            }
            if alert.is_expired_at(now) {
                alert.status = AlertStatus::Expired;
                outcome = Err(EngineError::AlertClosed(alert.id));
                return;
            }
            let status = interpret_response(alert, text);
            alert.status = status;
            alert.responded_at = Some(now);
            alert.response = Some(text.trim().to_string());
            outcome = Ok(status);
        });
        if !found {
            return Err(EngineError::AlertNotFound(*id));
        }
        if let Ok(status) = &outcome {
            info!(alert_id = %id, ?status, "driver responded");
        }
        outcome
    }

    /// Moves every pending alert past its expiry to `expired`.
    pub fn expire_due(&self, now: DateTime<Utc>) -> usize {
        let mut expired = 0;
        for id in self.repository.ids() {
            self.repository.modify(&id, &mut |alert| {
                if alert.status == AlertStatus::Pending && alert.is_expired_at(now) {
                    alert.status = AlertStatus::Expired;
                    expired += 1;
                }
            });
        }
        if expired > 0 {
            info!(expired, "expired stale alerts");
        }
        expired
    }

    /// Drops closed alerts older than the retention window.
    pub fn prune(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - self.retention;
        let removed = self
            .repository
            .remove_where(&|alert| alert.status.is_terminal() && alert.created_at < cutoff);
        if removed > 0 {
            debug!(removed, "pruned closed alerts");
        }
        removed
    }

    pub fn get(&self, id: &AlertId) -> Option<DriverAlert> {
        self.repository.get(id)
    }

    /// Pending alerts, oldest first.
    pub fn active(&self, driver_id: Option<&str>) -> Vec<DriverAlert> {
        let alerts = match driver_id {
            Some(driver_id) => self.repository.for_driver(driver_id),
            None => self.repository.all(),
        };
        let mut active: Vec<DriverAlert> = alerts
            .into_iter()
            .filter(|alert| alert.status == AlertStatus::Pending)
            .collect();
        active.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        active
    }

    pub fn stats(&self) -> AlertStats {
        let mut stats = AlertStats::default();
        for alert in self.repository.all() {
            stats.total += 1;
            if alert.status == AlertStatus::Pending {
                stats.pending += 1;
                stats.active_opportunities += alert.opportunities.len();
            }
            if alert.status.is_driver_response() {
                stats.driver_responses += 1;
            }
            stats.opportunities += alert.opportunities.len();
            stats.total_profit += alert.opportunities.iter().map(|o| o.estimated_profit).sum::<f64>();
        }
        stats
    }
}

/// Maps free-text reply to the resulting state.
///
/// Reply codes offered on the alert win; common yes/no words are accepted
/// as well. Anything else counts as a plain response.
pub fn interpret_response(alert: &DriverAlert, text: &str) -> AlertStatus {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();

    let offered = alert
        .response_options
        .iter()
        .find(|option| option.code.eq_ignore_ascii_case(&normalized));
    if let Some(option) = offered {
        return match option.action {
            ResponseAction::Accept { .. } => AlertStatus::Approved,
            ResponseAction::Decline => AlertStatus::Rejected,
            ResponseAction::RequestCall => AlertStatus::Responded,
        };
    }

    match normalized.as_str() {
        "YES" | "Y" | "ACCEPT" | "OK" => AlertStatus::Approved,
        "NO" | "N" | "DECLINE" | "REJECT" => AlertStatus::Rejected,
        _ => AlertStatus::Responded,
    }
}

/// Load the driver picked, for approved alerts.
pub fn accepted_load<'a>(alert: &'a DriverAlert) -> Option<&'a str> {
    if alert.status != AlertStatus::Approved {
        return None;
    }
    let reply = alert.response.as_deref()?;
    let normalized = reply.split_whitespace().collect::<Vec<_>>().join(" ");
    let chosen = alert
        .response_options
        .iter()
        .find(|option| option.code.eq_ignore_ascii_case(&normalized))
        .and_then(|option| match &option.action {
            ResponseAction::Accept { load_id } => Some(load_id.as_str()),
            _ => None,
        });
    chosen.or_else(|| alert.best().map(|o| o.load.load_id.as_str()))
}
