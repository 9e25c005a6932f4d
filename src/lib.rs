//! backhaul-alerts
//!
//! Finds return-leg freight for drivers finishing an outbound haul, scores
//! it against the trip home and alerts drivers over several channels.

pub mod traits;
pub mod model;
pub mod route;
pub mod error;
pub mod config;
pub mod logging;
pub mod clock;
pub mod haversine;
pub mod store;
pub mod source;
pub mod scorer;
pub mod composer;
pub mod dispatcher;
pub mod gateway;
pub mod lifecycle;
pub mod engine;
pub mod scheduler;
