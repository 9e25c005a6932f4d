//! Test fixtures for backhaul-alerts.
//!
//! Provides:
//! - Real Midwest / Front Range freight locations
//! - Builders for trajectories, loads and contact profiles
//! - Fake channel senders and load feeds
//! - A wired engine over in-memory stores and a manual clock

#![allow(dead_code)]

pub mod builders;
pub mod feeds;
pub mod harness;
pub mod locations;
pub mod senders;

pub use builders::*;
pub use feeds::*;
pub use harness::*;
pub use locations::*;
pub use senders::*;
