//! Multi-channel alert delivery.
//!
//! Channels are attempted concurrently and independently. Each attempt is
//! bounded by a timeout and its outcome is recorded on its own; one
//! channel failing never cancels or rolls back another.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::join_all;
use tracing::{info, instrument, warn};

use crate::config::EngineConfig;
use crate::model::{Channel, ChannelDelivery, DeliveryStatus, DriverAlert, DriverContactProfile};
use crate::traits::ChannelSender;

pub struct AlertDispatcher {
    senders: HashMap<Channel, Arc<dyn ChannelSender>>,
    timeout: Duration,
}

impl AlertDispatcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            senders: HashMap::new(),
            timeout,
        }
    }

    /// No senders yet, attempts bounded by the configured channel timeout.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.channel_timeout())
    }

    pub fn with_sender(mut self, channel: Channel, sender: Arc<dyn ChannelSender>) -> Self {
        self.register(channel, sender);
        self
    }

    pub fn register(&mut self, channel: Channel, sender: Arc<dyn ChannelSender>) {
        self.senders.insert(channel, sender);
    }

    /// Attempts every channel selected on the alert and waits for all of
    /// them to finish or time out.
    #[instrument(skip_all, fields(alert_id = %alert.id, driver_id = %alert.driver_id))]
    pub async fn dispatch(
        &self,
        contact: &DriverContactProfile,
        alert: &DriverAlert,
        now: DateTime<Utc>,
    ) -> Vec<ChannelDelivery> {
        let attempts = alert
            .channels
            .iter()
            .map(|&channel| self.attempt(channel, contact, alert, now));
        let deliveries = join_all(attempts).await;

        let delivered = deliveries
            .iter()
            .filter(|d| d.status == DeliveryStatus::Delivered)
            .count();
        info!(delivered, attempted = deliveries.len(), "alert dispatched");
        deliveries
    }

    async fn attempt(
        &self,
        channel: Channel,
        contact: &DriverContactProfile,
        alert: &DriverAlert,
        now: DateTime<Utc>,
    ) -> ChannelDelivery {
        let record = |status, detail: Option<String>| ChannelDelivery {
            channel,
            status,
            detail,
            attempted_at: now,
        };

        if channel.destination(contact).is_none() {
            warn!(%channel, "no destination for channel");
            return record(DeliveryStatus::Skipped, Some("no destination".to_string()));
        }
        let Some(sender) = self.senders.get(&channel) else {
            warn!(%channel, "no sender registered for channel");
            return record(DeliveryStatus::Skipped, Some("no sender registered".to_string()));
        };

        let send = AssertUnwindSafe(sender.send(contact, alert)).catch_unwind();
        match tokio::time::timeout(self.timeout, send).await {
            Ok(Ok(Ok(()))) => record(DeliveryStatus::Delivered, None),
            Ok(Ok(Err(err))) => {
                warn!(%channel, error = %err, "channel delivery failed");
                record(DeliveryStatus::Failed, Some(err.to_string()))
            }
            Ok(Err(_)) => {
                warn!(%channel, "channel sender panicked");
                record(DeliveryStatus::Failed, Some("sender panicked".to_string()))
            }
            Err(_) => {
                warn!(%channel, timeout_ms = self.timeout.as_millis() as u64, "channel delivery timed out");
                record(
                    DeliveryStatus::TimedOut,
                    Some(format!("timed out after {}ms", self.timeout.as_millis())),
                )
            }
        }
    }
}
