//! Builds a driver alert from a ranked opportunity list.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::model::{
    AlertPriority, AlertStatus, AlertType, BackhaulOpportunity, Channel, DriverAlert, DriverContactProfile,
    ResponseAction, ResponseOption, Urgency,
};

/// Opportunities offered as individual `ACCEPT n` replies.
const MAX_ACCEPT_OPTIONS: usize = 3;

pub fn classify_priority(opportunities: &[BackhaulOpportunity]) -> AlertPriority {
    let Some(top) = opportunities.first() else {
        return AlertPriority::Low;
    };
    let any_high = opportunities.iter().any(|o| o.urgency == Urgency::High);

    if any_high && top.match_score > 90.0 && top.estimated_profit > 1000.0 {
        AlertPriority::Critical
    } else if top.match_score > 85.0 && top.estimated_profit > 800.0 {
        AlertPriority::High
    } else if top.match_score > 75.0 {
        AlertPriority::Medium
    } else {
        AlertPriority::Low
    }
}

/// Push is always used. Outside the driver's contact hours nothing else is
/// added unless the alert is critical.
pub fn select_channels(
    contact: Option<&DriverContactProfile>,
    opportunities: &[BackhaulOpportunity],
    priority: AlertPriority,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> Vec<Channel> {
    let mut channels = vec![Channel::Push];
    let Some(contact) = contact else {
        return channels;
    };

    let quiet = contact
        .contact_hours
        .as_ref()
        .is_some_and(|hours| !hours.contains(now));
    if quiet && priority != AlertPriority::Critical {
        return channels;
    }

    if !channels.contains(&contact.preferred_channel) {
        channels.push(contact.preferred_channel);
    }
    let lucrative = opportunities
        .iter()
        .any(|o| o.estimated_profit > config.call_profit_threshold);
    if lucrative && !channels.contains(&Channel::Call) {
        channels.push(Channel::Call);
    }
    channels
}

fn response_options(opportunities: &[BackhaulOpportunity]) -> Vec<ResponseOption> {
    let mut options = Vec::new();
    if let Some(best) = opportunities.first() {
        options.push(ResponseOption {
            code: "ACCEPT".to_string(),
            label: format!("Accept load {}", best.load.load_id),
            action: ResponseAction::Accept {
                load_id: best.load.load_id.clone(),
            },
        });
    }
    if opportunities.len() > 1 {
        for (index, opportunity) in opportunities.iter().take(MAX_ACCEPT_OPTIONS).enumerate() {
            options.push(ResponseOption {
                code: format!("ACCEPT {}", index + 1),
                label: format!(
                    "Accept load {} ({} to {})",
                    opportunity.load.load_id, opportunity.load.pickup_address, opportunity.load.delivery_address
                ),
                action: ResponseAction::Accept {
                    load_id: opportunity.load.load_id.clone(),
                },
            });
        }
    }
    options.push(ResponseOption {
        code: "DECLINE".to_string(),
        label: "Not interested".to_string(),
        action: ResponseAction::Decline,
    });
    options.push(ResponseOption {
        code: "CALL".to_string(),
        label: "Call me to discuss".to_string(),
        action: ResponseAction::RequestCall,
    });
    options
}

fn render_message(opportunities: &[BackhaulOpportunity], best: &BackhaulOpportunity) -> (String, String) {
    let load = &best.load;
    let title = if opportunities.len() > 1 {
        format!("{} backhaul loads near {}", opportunities.len(), load.pickup_address)
    } else {
        format!("Backhaul load: {} to {}", load.pickup_address, load.delivery_address)
    };

    let mut message = format!(
        "Load {}: {} to {}. Detour {:.0} mi, est. profit ${:.0}, pickup in {:.1}h.",
        load.load_id,
        load.pickup_address,
        load.delivery_address,
        best.detour_miles,
        best.estimated_profit,
        best.hours_to_pickup
    );
    if opportunities.len() > 1 {
        let total: f64 = opportunities.iter().map(|o| o.estimated_profit).sum();
        message.push_str(&format!(
            " {} opportunities in total, combined est. profit ${:.0}.",
            opportunities.len(),
            total
        ));
    }
    message.push_str(" Reply ACCEPT, DECLINE or CALL.");
    (title, message)
}

/// Builds a pending alert from opportunities ranked best first.
///
/// Opportunities at urgency levels the driver opted out of are dropped;
/// returns `None` when nothing is left.
pub fn compose_alert(
    driver_id: &str,
    contact: Option<&DriverContactProfile>,
    ranked: Vec<BackhaulOpportunity>,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> Option<DriverAlert> {
    let opportunities: Vec<BackhaulOpportunity> = match contact {
        Some(contact) if !contact.preferences.urgency_levels.is_empty() => ranked
            .into_iter()
            .filter(|o| contact.preferences.urgency_levels.contains(&o.urgency))
            .collect(),
        _ => ranked,
    };
    let best = opportunities.first()?;

    let priority = classify_priority(&opportunities);
    let channels = select_channels(contact, &opportunities, priority, now, config);
    let (title, message) = render_message(&opportunities, best);
    let alert_type = if opportunities.len() > 1 {
        AlertType::MultipleOpportunities
    } else {
        AlertType::BackhaulOpportunity
    };

    Some(DriverAlert {
        id: Uuid::new_v4(),
        driver_id: driver_id.to_string(),
        alert_type,
        response_options: response_options(&opportunities),
        opportunities,
        priority,
        title,
        message,
        expires_at: now + config.alert_ttl(),
        channels,
        created_at: now,
        status: AlertStatus::Pending,
        responded_at: None,
        response: None,
        deliveries: Vec::new(),
    })
}
