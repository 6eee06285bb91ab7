//! Lead temperature scoring.
//!
//! Independent from the quality score: quality measures how well we know
//! the lead, temperature measures how likely they are to transact soon.

use lead_triage_config::{ScoreWeights, SlaThresholds};
use lead_triage_core::{EngagementStage, FieldId, FieldStatus, LeadScore};

use crate::session::SessionState;

pub fn score_lead(
    state: &SessionState,
    weights: &ScoreWeights,
    sla: &SlaThresholds,
) -> LeadScore {
    let mut points: i32 = 0;
    let mut reasons: Vec<String> = Vec::new();

    if state.has(FieldId::Budget) {
        points += weights.budget;
        reasons.push("budget_defined".into());
    }
    if state.has(FieldId::City) {
        points += weights.city;
        reasons.push("city_defined".into());
    }
    if state.has(FieldId::Neighborhood) {
        points += weights.neighborhood;
        reasons.push("neighborhood_defined".into());
    }
    if state
        .micro_location()
        .is_some_and(|micro| !micro.is_ambiguous())
    {
        points += weights.micro_location;
        reasons.push("micro_location_defined".into());
    }
    if state
        .count(FieldId::Bedrooms)
        .is_some_and(|n| n >= weights.min_bedrooms)
    {
        points += weights.bedrooms;
        reasons.push(format!("{}_plus_bedrooms", weights.min_bedrooms));
    }
    if state
        .count(FieldId::Parking)
        .is_some_and(|n| n >= weights.min_parking)
    {
        points += weights.parking;
        reasons.push(format!("{}_plus_parking", weights.min_parking));
    }
    if state
        .field(FieldId::Intent)
        .is_some_and(|f| f.status != FieldStatus::Inferred)
    {
        points += weights.intent;
        reasons.push("intent_confirmed".into());
    }

    let timeline = state.timeline();
    if let Some(timeline) = timeline {
        let bonus = weights.timeline_bonus(timeline);
        if bonus != 0 {
            points += bonus;
            reasons.push(format!("timeline_{}", timeline.as_str()));
        }
    }

    match state.stage() {
        EngagementStage::ReadyToVisit => {
            points += weights.stage_ready_to_visit;
            reasons.push("intent_stage_ready_to_visit".into());
        }
        EngagementStage::Negotiating => {
            points += weights.stage_negotiating;
            reasons.push("intent_stage_negotiating".into());
        }
        EngagementStage::Researching => {
            // Reason always recorded; the penalty only lands when no
            // short timeline contradicts the browsing signal.
            reasons.push("intent_stage_researching".into());
            if !timeline.is_some_and(|t| t.is_short()) {
                points += weights.stage_researching;
            }
        }
        EngagementStage::Unknown => {}
    }

    let score = points.clamp(0, 100) as u8;
    LeadScore {
        score,
        temperature: sla.temperature(score),
        reasons,
    }
}
