//! HTTP gateway adapter for alert delivery.
//!
//! Each channel (SMS, voice, push, email) is expected behind an HTTP
//! endpoint accepting a JSON message. The gateway itself is external.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ChannelError;
use crate::model::{AlertId, AlertPriority, Channel, DriverAlert, DriverContactProfile};
use crate::traits::ChannelSender;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Sent as a bearer token when present.
    pub api_key: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 5,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpGatewaySender {
    channel: Channel,
    config: GatewayConfig,
    client: reqwest::Client,
}

impl HttpGatewaySender {
    pub fn new(channel: Channel, config: GatewayConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { channel, config, client })
    }

    fn endpoint(&self) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), self.channel)
    }
}

/// Wire body posted to the gateway.
#[derive(Debug, Serialize)]
pub struct GatewayMessage<'a> {
    pub alert_id: AlertId,
    pub driver_id: &'a str,
    pub channel: Channel,
    pub to: &'a str,
    pub title: &'a str,
    pub body: &'a str,
    pub priority: AlertPriority,
    pub expires_at: DateTime<Utc>,
    pub reply_codes: Vec<&'a str>,
}

impl<'a> GatewayMessage<'a> {
    pub fn render(channel: Channel, to: &'a str, alert: &'a DriverAlert) -> Self {
        Self {
            alert_id: alert.id,
            driver_id: &alert.driver_id,
            channel,
            to,
            title: &alert.title,
            body: &alert.message,
            priority: alert.priority,
            expires_at: alert.expires_at,
            reply_codes: alert.response_options.iter().map(|o| o.code.as_str()).collect(),
        }
    }
}

#[async_trait]
impl ChannelSender for HttpGatewaySender {
    async fn send(&self, contact: &DriverContactProfile, alert: &DriverAlert) -> Result<(), ChannelError> {
        let to = self
            .channel
            .destination(contact)
            .ok_or_else(|| ChannelError::NoDestination(self.channel.to_string()))?;
        let message = GatewayMessage::render(self.channel, to, alert);

        let mut request = self.client.post(self.endpoint()).json(&message);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }
        request.send().await?.error_for_status()?;
        Ok(())
    }
}

/// Writes the alert to the log instead of delivering it. Useful where no
/// gateway is configured for a channel.
#[derive(Debug, Clone, Copy)]
pub struct LogSender {
    pub channel: Channel,
}

#[async_trait]
impl ChannelSender for LogSender {
    async fn send(&self, contact: &DriverContactProfile, alert: &DriverAlert) -> Result<(), ChannelError> {
        let to = self
            .channel
            .destination(contact)
            .ok_or_else(|| ChannelError::NoDestination(self.channel.to_string()))?;
        info!(
            channel = %self.channel,
            to,
            alert_id = %alert.id,
            title = %alert.title,
            "alert delivered to log"
        );
        Ok(())
    }
}
