//! Error types for the engine and its delivery channels.

use thiserror::Error;

use crate::model::AlertId;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid coordinates: lat={lat}, lng={lng}")]
    InvalidCoordinates { lat: f64, lng: f64 },

    #[error("invalid route: {0}")]
    InvalidRoute(String),

    #[error("invalid trajectory for {driver_id}: {reason}")]
    InvalidTrajectory { driver_id: String, reason: String },

    #[error("driver not found: {0}")]
    DriverNotFound(String),

    #[error("alert not found: {0}")]
    AlertNotFound(AlertId),

    #[error("alert {0} is no longer pending")]
    AlertClosed(AlertId),

    #[error("load source failed: {0}")]
    Source(String),

    #[error("scoring task failed: {0}")]
    Scoring(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Failure of a single channel delivery attempt.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("no {0} destination on contact profile")]
    NoDestination(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("gateway rejected message: status {0}")]
    Rejected(u16),
}

impl From<reqwest::Error> for ChannelError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ChannelError::Rejected(status.as_u16()),
            None => ChannelError::Transport(err.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
