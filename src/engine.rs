//! Service facade tying the scorer, composer, dispatcher and lifecycle
//! together behind the query/response API.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashSet;
use serde::Serialize;
use tracing::{Span, debug, info, instrument, warn};

use crate::clock::SystemClock;
use crate::composer::compose_alert;
use crate::config::EngineConfig;
use crate::dispatcher::AlertDispatcher;
use crate::error::EngineError;
use crate::lifecycle::AlertLifecycle;
use crate::model::{
    AlertId, BackhaulOpportunity, DriverAlert, DriverContactProfile, DriverId, DriverTrajectory, GeoPoint,
    LoadCandidate,
};
use crate::scorer::rank_opportunities;
use crate::store::{InMemoryAlertRepository, InMemoryContactDirectory, InMemoryTrajectoryStore};
use crate::traits::{AlertRepository, Clock, ContactDirectory, LoadSource, TrajectoryStore};

/// Everything the engine reads from or writes to.
pub struct Collaborators {
    pub trajectories: Arc<dyn TrajectoryStore>,
    pub contacts: Arc<dyn ContactDirectory>,
    pub loads: Arc<dyn LoadSource>,
    pub alerts: Arc<dyn AlertRepository>,
    pub clock: Arc<dyn Clock>,
}

impl Collaborators {
    /// In-memory stores and the system clock around the given load source.
    pub fn in_memory(loads: Arc<dyn LoadSource>) -> Self {
        Self {
            trajectories: Arc::new(InMemoryTrajectoryStore::new()),
            contacts: Arc::new(InMemoryContactDirectory::new()),
            loads,
            alerts: Arc::new(InMemoryAlertRepository::new()),
            clock: Arc::new(SystemClock),
        }
    }
}

/// Everything one ranking pass reads, owned so it can move to a blocking
/// thread.
struct ScoringInput {
    trajectory: DriverTrajectory,
    contact: Option<DriverContactProfile>,
    candidates: Vec<LoadCandidate>,
    now: DateTime<Utc>,
}

impl ScoringInput {
    fn rank(&self, config: &EngineConfig) -> Vec<BackhaulOpportunity> {
        rank_opportunities(
            &self.trajectory,
            self.contact.as_ref(),
            &self.candidates,
            self.now,
            config,
        )
    }
}

/// Result of running the alert pipeline for one driver.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Alerted(DriverAlert),
    NoOpportunities,
    /// The driver was alerted within the cool-down window.
    CoolingDown,
    /// Another scan for this driver is still running.
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EngineMetrics {
    pub drivers_monitored: usize,
    pub active_opportunities: usize,
    pub alerts_sent: usize,
    pub response_rate: f64,
    pub avg_profit_per_opportunity: f64,
}

pub struct BackhaulEngine {
    config: EngineConfig,
    trajectories: Arc<dyn TrajectoryStore>,
    contacts: Arc<dyn ContactDirectory>,
    loads: Arc<dyn LoadSource>,
    clock: Arc<dyn Clock>,
    dispatcher: AlertDispatcher,
    lifecycle: AlertLifecycle,
    in_flight: DashSet<DriverId>,
}

/// Marks a driver as being scanned until dropped.
struct InFlight<'a> {
    set: &'a DashSet<DriverId>,
    driver_id: DriverId,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.set.remove(&self.driver_id);
    }
}

impl BackhaulEngine {
    pub fn new(
        config: EngineConfig,
        collaborators: Collaborators,
        dispatcher: AlertDispatcher,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let lifecycle = AlertLifecycle::new(collaborators.alerts, &config);
        Ok(Self {
            config,
            trajectories: collaborators.trajectories,
            contacts: collaborators.contacts,
            loads: collaborators.loads,
            clock: collaborators.clock,
            dispatcher,
            lifecycle,
            in_flight: DashSet::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Ranked opportunities for a driver, best first. Read-only.
    pub fn find_opportunities(&self, driver_id: &str) -> Result<Vec<BackhaulOpportunity>, EngineError> {
        Ok(self.scoring_input(driver_id)?.rank(&self.config))
    }

    fn scoring_input(&self, driver_id: &str) -> Result<ScoringInput, EngineError> {
        let trajectory = self
            .trajectories
            .get(driver_id)
            .ok_or_else(|| EngineError::DriverNotFound(driver_id.to_string()))?;
        let contact = self.contacts.contact(driver_id);
        let candidates = self.loads.candidates_near(&trajectory)?;
        debug!(driver_id, candidates = candidates.len(), "loads near destination");

        Ok(ScoringInput {
            trajectory,
            contact,
            candidates,
            now: self.clock.now(),
        })
    }

    /// Runs score, compose, dispatch and record for one driver.
    ///
    /// The alert is recorded before dispatch so that a fast reply or an
    /// overlapping scan already sees it.
    #[instrument(skip(self))]
    pub async fn scan_driver(&self, driver_id: &str) -> Result<ScanOutcome, EngineError> {
        let Some(_guard) = self.claim(driver_id) else {
            debug!("scan already in flight");
            return Ok(ScanOutcome::Busy);
        };

        let now = self.clock.now();
        if self.lifecycle.has_recent(driver_id, now) {
            debug!("driver alerted recently, skipping");
            return Ok(ScanOutcome::CoolingDown);
        }

        // rayon scoring stays off the async worker threads
        let input = self.scoring_input(driver_id)?;
        let config = self.config.clone();
        let span = Span::current();
        let ranked = tokio::task::spawn_blocking(move || span.in_scope(|| input.rank(&config)))
            .await
            .map_err(|err| EngineError::Scoring(err.to_string()))?;
        if ranked.is_empty() {
            debug!("no backhaul opportunities");
            return Ok(ScanOutcome::NoOpportunities);
        }

        let contact = self
            .contacts
            .contact(driver_id)
            .unwrap_or_else(|| DriverContactProfile::push_only(driver_id));
        let Some(alert) = compose_alert(driver_id, Some(&contact), ranked, now, &self.config) else {
            debug!("no opportunities left after preference filtering");
            return Ok(ScanOutcome::NoOpportunities);
        };
        let alert_id = alert.id;
        let auto_accept = contact
            .preferences
            .auto_accept_score
            .zip(alert.best().map(|best| best.match_score))
            .is_some_and(|(threshold, score)| score >= threshold);

        self.lifecycle.record(alert.clone());
        let deliveries = self.dispatcher.dispatch(&contact, &alert, now).await;
        self.lifecycle.record_deliveries(&alert_id, deliveries);
        if auto_accept {
            self.lifecycle.auto_execute(&alert_id, self.clock.now());
        }

        let stored = self
            .lifecycle
            .get(&alert_id)
            .ok_or(EngineError::AlertNotFound(alert_id))?;
        Ok(ScanOutcome::Alerted(stored))
    }

    /// Pending alerts, optionally for one driver.
    pub fn active_alerts(&self, driver_id: Option<&str>) -> Vec<DriverAlert> {
        self.lifecycle.active(driver_id)
    }

    pub fn alert(&self, alert_id: &AlertId) -> Option<DriverAlert> {
        self.lifecycle.get(alert_id)
    }

    /// Records a driver reply. False when the alert is unknown or no
    /// longer pending.
    pub fn respond_to_alert(&self, alert_id: &AlertId, response: &str) -> bool {
        match self.lifecycle.respond(alert_id, response, self.clock.now()) {
            Ok(_) => true,
            Err(err) => {
                warn!(alert_id = %alert_id, error = %err, "response not applied");
                false
            }
        }
    }

    pub fn update_driver_location(&self, driver_id: &str, lat: f64, lng: f64) -> Result<(), EngineError> {
        self.trajectories.upsert_location(driver_id, GeoPoint::new(lat, lng))
    }

    /// Drivers whose estimated arrival falls within the arrival horizon.
    pub fn drivers_due(&self, now: DateTime<Utc>) -> Vec<DriverId> {
        let horizon = now + self.config.arrival_horizon();
        self.trajectories
            .driver_ids()
            .into_iter()
            .filter(|driver_id| {
                self.trajectories
                    .get(driver_id)
                    .is_some_and(|trajectory| trajectory.estimated_arrival <= horizon)
            })
            .collect()
    }

    /// Expires stale alerts and prunes old closed ones. Returns the number
    /// expired.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let expired = self.lifecycle.expire_due(now);
        self.lifecycle.prune(now);
        expired
    }

    pub fn metrics(&self) -> EngineMetrics {
        let stats = self.lifecycle.stats();
        let response_rate = if stats.total > 0 {
            stats.driver_responses as f64 / stats.total as f64
        } else {
            0.0
        };
        let avg_profit_per_opportunity = if stats.opportunities > 0 {
            stats.total_profit / stats.opportunities as f64
        } else {
            0.0
        };
        EngineMetrics {
            drivers_monitored: self.trajectories.driver_ids().len(),
            active_opportunities: stats.active_opportunities,
            alerts_sent: stats.total,
            response_rate,
            avg_profit_per_opportunity,
        }
    }

    fn claim(&self, driver_id: &str) -> Option<InFlight<'_>> {
        if self.in_flight.insert(driver_id.to_string()) {
            Some(InFlight {
                set: &self.in_flight,
                driver_id: driver_id.to_string(),
            })
        } else {
            None
        }
    }

    pub(crate) fn log_outcome(driver_id: &str, outcome: &ScanOutcome) {
        if let ScanOutcome::Alerted(alert) = outcome {
            info!(
                driver_id,
                alert_id = %alert.id,
                priority = ?alert.priority,
                channels = alert.channels.len(),
                "driver alerted"
            );
        }
    }
}
