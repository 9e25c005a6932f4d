//! Fake channel senders.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use backhaul_alerts::error::ChannelError;
use backhaul_alerts::model::{AlertId, DriverAlert, DriverContactProfile};
use backhaul_alerts::traits::ChannelSender;

/// Remembers every alert it was asked to deliver.
#[derive(Debug, Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<(String, AlertId)>>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(String, AlertId)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl ChannelSender for RecordingSender {
    async fn send(&self, contact: &DriverContactProfile, alert: &DriverAlert) -> Result<(), ChannelError> {
        self.sent
            .lock()
            .unwrap()
            .push((contact.driver_id.clone(), alert.id));
        Ok(())
    }
}

/// Always fails with a transport error.
#[derive(Debug, Default)]
pub struct FailingSender;

#[async_trait]
impl ChannelSender for FailingSender {
    async fn send(&self, _contact: &DriverContactProfile, _alert: &DriverAlert) -> Result<(), ChannelError> {
        Err(ChannelError::Transport("connection refused".to_string()))
    }
}

/// Never answers within any reasonable timeout.
#[derive(Debug, Default)]
pub struct HangingSender;

#[async_trait]
impl ChannelSender for HangingSender {
    async fn send(&self, _contact: &DriverContactProfile, _alert: &DriverAlert) -> Result<(), ChannelError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }
}
