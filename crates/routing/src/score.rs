//! Per-agent compatibility scoring.
//!
//! Hard filters short-circuit to the configured floor score so the caller
//! can drop the agent from the candidate list; everything else is additive
//! and explained by a reason tag per adjustment.

use lead_triage_config::domain::RoutingThresholds;
use lead_triage_core::{
    Agent, AgentTier, AssignmentRecord, MicroLocation, Operation, Temperature,
};

/// The slice of a triaged lead the router needs. Built by the orchestrator
/// from session state so this crate never sees the full session.
#[derive(Debug, Clone, Default)]
pub struct LeadProfile {
    pub session_id: String,
    pub operation: Option<Operation>,
    pub neighborhood: Option<String>,
    pub micro_location: Option<MicroLocation>,
    pub budget: Option<i64>,
    pub bedrooms: Option<u32>,
    pub pet: Option<bool>,
    pub temperature: Option<Temperature>,
}

fn norm(neighborhood: &str) -> String {
    neighborhood.trim().to_lowercase()
}

/// Literal coverage membership, wildcard excluded. The wildcard passes the
/// hard filter but never earns the match bonus.
pub(crate) fn covers_explicitly(agent: &Agent, neighborhood: &str) -> bool {
    let wanted = norm(neighborhood);
    agent
        .neighborhoods
        .iter()
        .any(|n| n != "*" && norm(n) == wanted)
}

/// Scores one agent for one lead. Returns the score and the reason tags in
/// evaluation order; a score at the hard-filter floor means excluded.
pub fn score_agent(
    agent: &Agent,
    lead: &LeadProfile,
    record: &AssignmentRecord,
    priority: bool,
    t: &RoutingThresholds,
) -> (i32, Vec<String>) {
    if !agent.active {
        return (t.hard_filter, vec!["agent_inactive".to_string()]);
    }

    if let Some(operation) = lead.operation {
        if !agent.supports(operation) {
            return (
                t.hard_filter,
                vec![format!("operation_incompatible_{}", operation.as_str())],
            );
        }
    }

    let lead_neighborhood = lead.neighborhood.as_deref().map(norm);
    if let Some(wanted) = &lead_neighborhood {
        if !agent.neighborhoods.is_empty()
            && !agent.covers_neighborhood(wanted)
            && !agent.is_generalist()
        {
            return (t.hard_filter, vec!["neighborhood_mismatch_hard".to_string()]);
        }
    }

    let mut score = 0i32;
    let mut reasons: Vec<String> = Vec::new();

    match &lead_neighborhood {
        Some(wanted) => {
            if covers_explicitly(agent, wanted) {
                score += t.neighborhood_match;
                reasons.push(format!("neighborhood_match_{}", wanted));
            } else if !agent.neighborhoods.is_empty() {
                score += t.neighborhood_mismatch;
                reasons.push("neighborhood_mismatch".to_string());
            }
        }
        None => {
            if agent.neighborhoods.is_empty()
                || agent.specialties.iter().any(|s| s == "generalista")
            {
                score += t.generalist_no_neighborhood;
                reasons.push("generalist_no_neighborhood".to_string());
            }
        }
    }

    if let Some(wanted) = lead.micro_location {
        let matched = agent
            .micro_tags
            .iter()
            .filter_map(|tag| MicroLocation::parse_tag(tag))
            .any(|tag| tag == wanted);
        if matched {
            score += t.micro_tag_match;
            reasons.push(format!("micro_location_match_{}", wanted.as_str()));
        }
    }

    if let Some(budget) = lead.budget {
        let min = agent.price_min.unwrap_or(0);
        let max = agent.price_max.unwrap_or(i64::MAX);
        if budget >= min && budget <= max {
            score += t.price_in_band;
            reasons.push("price_range_match".to_string());
        } else if budget < min {
            score += t.price_out_of_band;
            reasons.push("price_too_low".to_string());
        } else {
            score += t.price_out_of_band;
            reasons.push("price_too_high".to_string());
        }
    }

    match (lead.temperature, agent.tier) {
        (Some(Temperature::Hot), AgentTier::Senior) => {
            score += t.tier_hot_senior;
            reasons.push("hot_senior_match".to_string());
        }
        (Some(Temperature::Warm), AgentTier::Standard) => {
            score += t.tier_warm_standard;
            reasons.push("warm_standard_match".to_string());
        }
        (Some(Temperature::Cold), AgentTier::Junior) => {
            score += t.tier_cold_junior;
            reasons.push("cold_junior_match".to_string());
        }
        _ => {}
    }

    let has_specialty = |tag: &str| agent.specialties.iter().any(|s| s == tag);
    if has_specialty("alto_padrao") && lead.budget.map_or(false, |b| b >= t.premium_budget_floor) {
        score += t.specialty_premium;
        reasons.push("specialty_alto_padrao".to_string());
    }
    if has_specialty("familia") && lead.bedrooms.unwrap_or(0) >= t.family_min_bedrooms {
        score += t.specialty_family;
        reasons.push("specialty_familia".to_string());
    }
    if has_specialty("pet_friendly") && lead.pet == Some(true) {
        score += t.specialty_pet;
        reasons.push("specialty_pet".to_string());
    }

    if record.assigned_today >= agent.daily_capacity {
        if !priority {
            return (
                t.hard_filter,
                vec![format!(
                    "capacity_reached_{}/{}",
                    record.assigned_today, agent.daily_capacity
                )],
            );
        }
        score += t.over_capacity_penalty;
        reasons.push(format!(
            "priority_override_capacity_{}/{}",
            record.assigned_today, agent.daily_capacity
        ));
    }

    (score, reasons)
}
