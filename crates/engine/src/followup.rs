//! Follow-up nudge selection for idle sessions.
//!
//! A nudge chases the single most valuable gap left in the profile.
//! Each nudge key fires at most once per session and the total is capped,
//! so an unresponsive lead gets two messages and then silence.

use chrono::{DateTime, Duration, Utc};
use lead_triage_config::{EngineConfig, FollowupConfig};
use lead_triage_core::{FieldId, Grade, Operation, SlaType, Temperature};
use serde::Serialize;

use crate::session::SessionState;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FollowupMessage {
    pub key: String,
    pub message: String,
}

/// Picks the follow-up due for this session, if any.
///
/// Hot grade-A leads are never nudged (an agent already owns them), and
/// completed sessions are only nudged while parked in the nurture queue.
pub fn followup_for(
    state: &SessionState,
    now: DateTime<Utc>,
    engine: &EngineConfig,
    nudges: &FollowupConfig,
    high_budget: i64,
) -> Option<FollowupMessage> {
    if state.followups_sent >= engine.max_followups {
        return None;
    }
    let temperature = state.lead_score.as_ref().map(|s| s.temperature);
    let grade = state.quality.as_ref().map(|q| q.grade);
    if temperature == Some(Temperature::Hot) && grade == Some(Grade::A) {
        return None;
    }
    if state.completed && state.sla != Some(SlaType::Nurture) {
        return None;
    }

    let idle_hours = match temperature {
        Some(Temperature::Warm) => engine.warm_idle_hours,
        _ => engine.cold_idle_hours,
    };
    if now - state.last_activity < Duration::hours(i64::from(idle_hours)) {
        return None;
    }

    for key in pending_keys(state, high_budget) {
        if state.followup_keys.contains(key) {
            continue;
        }
        if let Some(message) = nudges.pick(&state.session_id, key) {
            return Some(FollowupMessage {
                key: key.to_string(),
                message: message.to_string(),
            });
        }
    }
    None
}

/// Gap-chasing priority. The suggestion nudge only runs after the plain
/// neighborhood nudge went unanswered.
fn pending_keys(state: &SessionState, high_budget: i64) -> Vec<&'static str> {
    let mut keys = Vec::new();
    if !state.has(FieldId::Neighborhood) {
        keys.push("neighborhood");
    }
    if !state.has(FieldId::Timeline) {
        keys.push("timeline");
    }
    let high = state
        .money(FieldId::Budget)
        .is_some_and(|budget| budget > high_budget);
    if high && !state.has(FieldId::CondoFeeCap) {
        keys.push("condo_fee_cap");
    }
    if state.operation() == Some(Operation::Buy) && !state.has(FieldId::PaymentMethod) {
        keys.push("payment_method");
    }
    if state
        .micro_location()
        .is_some_and(|micro| micro.is_ambiguous())
    {
        keys.push("micro_location");
    }
    if !state.has(FieldId::Neighborhood) && state.followup_keys.contains("neighborhood") {
        keys.push("neighborhood_suggest");
    }
    keys
}
