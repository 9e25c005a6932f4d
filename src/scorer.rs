//! Backhaul match scoring.
//!
//! Every candidate is evaluated independently against the driver's
//! home-bound trajectory: detour estimate, time cost, efficiency metrics and
//! a weighted 0-100 match score. Survivors are ranked best first.

use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};
use rayon::prelude::*;
use tracing::{debug, instrument, warn};

use crate::config::EngineConfig;
use crate::haversine::{distance_miles, drive_minutes};
use crate::model::{
    BackhaulOpportunity, DriverContactProfile, DriverTrajectory, EfficiencyMetrics, LoadCandidate, Urgency,
};

/// Points for a load posted for the driver's exact trailer type.
const EQUIPMENT_EXACT: f64 = 30.0;
/// Points for a load whose commodity the driver's trailer can carry.
const EQUIPMENT_COMPATIBLE: f64 = 20.0;
const CAPACITY_WEIGHT: f64 = 25.0;
/// Utilization above this earns no extra capacity points.
const CAPACITY_UTILIZATION_CAP: f64 = 0.9;
const PREFERENCE_BONUS: f64 = 10.0;

/// Why a candidate did not become an opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// Bad coordinates or negative rate/distance/weight.
    MalformedLoad,
    DetourTooLong,
    /// Pickup window closes before the driver can get there empty.
    PickupUnreachable,
    BelowThreshold,
}

/// Extra miles to serve the load instead of driving straight home.
///
/// Clamped at zero: a load that shortens the way home costs nothing but
/// earns no bonus either.
pub fn detour_miles(trajectory: &DriverTrajectory, candidate: &LoadCandidate) -> f64 {
    let home = trajectory.return_policy.home_base;
    let routed = distance_miles(trajectory.destination, candidate.pickup)
        + candidate.distance_miles
        + distance_miles(candidate.delivery, home);
    let direct = distance_miles(trajectory.destination, home);
    (routed - direct).max(0.0)
}

/// Effective detour cap: the trajectory's policy, tightened by the contact
/// preference when one is set.
pub fn max_detour_miles(trajectory: &DriverTrajectory, contact: Option<&DriverContactProfile>) -> f64 {
    let policy = trajectory.return_policy.max_detour_miles;
    match contact.and_then(|c| c.preferences.max_detour_miles) {
        Some(preferred) => policy.min(preferred),
        None => policy,
    }
}

pub fn added_minutes(detour: f64, config: &EngineConfig) -> i64 {
    drive_minutes(detour, config.cruising_speed_mph) + config.handling_minutes
}

pub fn efficiency(candidate: &LoadCandidate, detour: f64, added_minutes: i64) -> EfficiencyMetrics {
    let loaded_miles = candidate.distance_miles + detour;
    let revenue_per_mile = if loaded_miles > 0.0 {
        candidate.rate / loaded_miles
    } else {
        0.0
    };
    EfficiencyMetrics {
        revenue_per_mile,
        time_efficiency: (100.0 - added_minutes as f64 / 10.0).max(0.0),
        route_optimization: (100.0 - detour * 2.0).max(0.0),
    }
}

fn equipment_score(trajectory: &DriverTrajectory, candidate: &LoadCandidate) -> f64 {
    let trailer = trajectory.capacity.trailer_type;
    if candidate.equipment_type == trailer {
        EQUIPMENT_EXACT
    } else if trailer
        .compatible_commodities()
        .iter()
        .any(|family| family.eq_ignore_ascii_case(&candidate.commodity))
    {
        EQUIPMENT_COMPATIBLE
    } else {
        0.0
    }
}

fn capacity_score(trajectory: &DriverTrajectory, candidate: &LoadCandidate) -> f64 {
    let available = trajectory.capacity.weight_lbs;
    if available <= 0.0 {
        return 0.0;
    }
    let utilization = (candidate.weight_lbs / available).min(CAPACITY_UTILIZATION_CAP);
    CAPACITY_WEIGHT * utilization
}

fn efficiency_score(metrics: &EfficiencyMetrics) -> f64 {
    metrics.revenue_per_mile / 4.0 * 0.1
        + metrics.time_efficiency / 100.0 * 15.0
        + metrics.route_optimization / 100.0 * 10.0
}

fn preference_score(
    trajectory: &DriverTrajectory,
    contact: Option<&DriverContactProfile>,
    candidate: &LoadCandidate,
) -> f64 {
    let min_value = contact
        .and_then(|c| c.preferences.min_load_value)
        .unwrap_or(trajectory.return_policy.min_load_value);

    let mut score = 0.0;
    if candidate.rate >= min_value {
        score += PREFERENCE_BONUS;
    }
    if let Some(contact) = contact {
        let accepted = contact
            .preferences
            .commodities
            .iter()
            .any(|commodity| commodity.eq_ignore_ascii_case(&candidate.commodity));
        if accepted {
            score += PREFERENCE_BONUS;
        }
    }
    score
}

/// Weighted compatibility score, clamped to [0, 100].
pub fn match_score(
    trajectory: &DriverTrajectory,
    contact: Option<&DriverContactProfile>,
    candidate: &LoadCandidate,
    metrics: &EfficiencyMetrics,
) -> f64 {
    let score = equipment_score(trajectory, candidate)
        + capacity_score(trajectory, candidate)
        + efficiency_score(metrics)
        + preference_score(trajectory, contact, candidate);
    score.clamp(0.0, 100.0)
}

pub fn classify_urgency(hours_to_pickup: f64, score: f64) -> Urgency {
    if hours_to_pickup < 4.0 && score > 85.0 {
        Urgency::High
    } else if hours_to_pickup < 8.0 && score > 75.0 {
        Urgency::Medium
    } else {
        Urgency::Low
    }
}

fn is_well_formed(candidate: &LoadCandidate) -> bool {
    candidate.pickup.validate().is_ok()
        && candidate.delivery.validate().is_ok()
        && candidate.rate.is_finite()
        && candidate.rate >= 0.0
        && candidate.distance_miles.is_finite()
        && candidate.distance_miles >= 0.0
        && candidate.weight_lbs.is_finite()
        && candidate.weight_lbs >= 0.0
        && candidate.pickup_window.start <= candidate.pickup_window.end
}

/// Evaluates one candidate for one driver.
pub fn evaluate_candidate(
    trajectory: &DriverTrajectory,
    contact: Option<&DriverContactProfile>,
    candidate: &LoadCandidate,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> Result<BackhaulOpportunity, Rejection> {
    if !is_well_formed(candidate) {
        return Err(Rejection::MalformedLoad);
    }

    let detour = detour_miles(trajectory, candidate);
    if detour > max_detour_miles(trajectory, contact) {
        return Err(Rejection::DetourTooLong);
    }

    let empty_at = trajectory.empty_at().max(now);
    let deadhead = distance_miles(trajectory.destination, candidate.pickup);
    let at_pickup = empty_at + Duration::minutes(drive_minutes(deadhead, config.cruising_speed_mph));
    if at_pickup > candidate.pickup_window.end {
        return Err(Rejection::PickupUnreachable);
    }

    let added = added_minutes(detour, config);
    let metrics = efficiency(candidate, detour, added);
    let score = match_score(trajectory, contact, candidate, &metrics);
    if score < config.publish_threshold {
        return Err(Rejection::BelowThreshold);
    }

    let hours_to_pickup = ((candidate.pickup_window.start - now).num_minutes() as f64 / 60.0).max(0.0);

    Ok(BackhaulOpportunity {
        driver_id: trajectory.driver_id.clone(),
        load: candidate.clone(),
        detour_miles: detour,
        added_minutes: added,
        efficiency: metrics,
        match_score: score,
        urgency: classify_urgency(hours_to_pickup, score),
        estimated_profit: candidate.rate - detour * config.cost_per_mile,
        hours_to_pickup,
    })
}

/// Scores every candidate and returns the publishable ones, best first.
///
/// Ties are broken by load id so repeated calls with the same inputs return
/// the same order.
#[instrument(skip_all, fields(driver_id = %trajectory.driver_id, candidates = candidates.len()))]
pub fn rank_opportunities(
    trajectory: &DriverTrajectory,
    contact: Option<&DriverContactProfile>,
    candidates: &[LoadCandidate],
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> Vec<BackhaulOpportunity> {
    let evaluated: Vec<(String, Result<BackhaulOpportunity, Rejection>)> = candidates
        .par_iter()
        .map(|candidate| {
            (
                candidate.load_id.clone(),
                evaluate_candidate(trajectory, contact, candidate, now, config),
            )
        })
        .collect();

    let mut ranked = Vec::with_capacity(evaluated.len());
    for (load_id, outcome) in evaluated {
        match outcome {
            Ok(opportunity) => ranked.push(opportunity),
            Err(Rejection::MalformedLoad) => {
                warn!(load_id = %load_id, "skipping malformed load candidate");
            }
            Err(reason) => debug!(load_id = %load_id, ?reason, "candidate rejected"),
        }
    }

    ranked.sort_by(|a, b| {
        b.match_score
            .partial_cmp(&a.match_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.load.load_id.cmp(&b.load.load_id))
    });

    debug!(published = ranked.len(), "ranking complete");
    ranked
}
