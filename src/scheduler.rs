//! Periodic scan loop.
//!
//! Each tick sweeps expired alerts, then scans every driver arriving within
//! the horizon. Drivers are scanned as independent tasks; one failing or
//! panicking never stops the rest of the cycle.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, instrument, warn};

use crate::engine::{BackhaulEngine, ScanOutcome};

/// Counts from one scan cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanReport {
    pub expired: usize,
    pub due: usize,
    pub alerted: usize,
    pub no_opportunities: usize,
    pub cooling_down: usize,
    pub busy: usize,
    pub failed: usize,
}

pub struct ScanScheduler {
    engine: Arc<BackhaulEngine>,
    interval: Duration,
}

impl ScanScheduler {
    pub fn new(engine: Arc<BackhaulEngine>) -> Self {
        let interval = engine.config().scan_interval();
        Self { engine, interval }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Runs exactly one scan cycle.
    #[instrument(skip(self))]
    pub async fn tick(&self) -> ScanReport {
        let mut report = ScanReport {
            expired: self.engine.sweep(),
            ..ScanReport::default()
        };

        let drivers = self.engine.drivers_due(self.engine.now());
        report.due = drivers.len();

        let mut tasks = JoinSet::new();
        for driver_id in drivers {
            let engine = Arc::clone(&self.engine);
            tasks.spawn(async move {
                let outcome = engine.scan_driver(&driver_id).await;
                (driver_id, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((driver_id, Ok(outcome))) => {
                    BackhaulEngine::log_outcome(&driver_id, &outcome);
                    match outcome {
                        ScanOutcome::Alerted(_) => report.alerted += 1,
                        ScanOutcome::NoOpportunities => report.no_opportunities += 1,
                        ScanOutcome::CoolingDown => report.cooling_down += 1,
                        ScanOutcome::Busy => report.busy += 1,
                    }
                }
                Ok((driver_id, Err(err))) => {
                    warn!(driver_id = %driver_id, error = %err, "driver scan failed");
                    report.failed += 1;
                }
                Err(err) => {
                    error!(error = %err, "driver scan task aborted");
                    report.failed += 1;
                }
            }
        }

        info!(
            due = report.due,
            alerted = report.alerted,
            expired = report.expired,
            failed = report.failed,
            "scan cycle complete"
        );
        report
    }

    /// Ticks on the configured interval until `shutdown` flips to true or
    /// its sender is dropped.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(interval_secs = self.interval.as_secs(), "scan scheduler started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("scan scheduler stopped");
    }
}
