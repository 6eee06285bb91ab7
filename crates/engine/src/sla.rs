//! SLA policy and the hot-lead notification event.

use lead_triage_core::{
    FieldId, Grade, LeadIdentity, RoutingResult, SlaType, Temperature,
};
use serde::Serialize;

use crate::session::SessionState;

/// Maps temperature and quality grade to a routing SLA.
///
/// Cold leads only get an agent when we know enough about them (grade A
/// or B); otherwise they go to the nurture queue.
pub fn sla_for(temperature: Temperature, grade: Grade) -> SlaType {
    match temperature {
        Temperature::Hot => SlaType::Immediate,
        Temperature::Warm => SlaType::Normal,
        Temperature::Cold => match grade {
            Grade::A | Grade::B => SlaType::Normal,
            Grade::C | Grade::D => SlaType::Nurture,
        },
    }
}

/// Payload pushed to the hot-leads stream, at most once per session.
#[derive(Debug, Clone, Serialize)]
pub struct HotLeadEvent {
    #[serde(rename = "type")]
    pub event_type: &'static str,
    /// Phone when known, session id otherwise.
    pub lead_id: String,
    pub session_id: String,
    /// Unix epoch seconds with fractional millis.
    pub timestamp: f64,
    pub lead_score: u8,
    pub lead_class: Temperature,
    pub quality_grade: Grade,
    pub sla: SlaType,
    pub lead_profile: LeadIdentity,
    pub criteria: serde_json::Value,
    pub assigned_agent: serde_json::Value,
}

impl HotLeadEvent {
    pub fn from_session(
        state: &SessionState,
        score: u8,
        grade: Grade,
        routing: Option<&RoutingResult>,
    ) -> Self {
        let assigned_agent = match routing {
            Some(result) => serde_json::json!({
                "agent_id": result.agent_id,
                "agent_name": result.agent_name,
            }),
            None => serde_json::json!({ "queue": "priority" }),
        };
        Self {
            event_type: "HOT_LEAD",
            lead_id: state
                .identity
                .phone
                .clone()
                .unwrap_or_else(|| state.session_id.clone()),
            session_id: state.session_id.clone(),
            timestamp: chrono::Utc::now().timestamp_millis() as f64 / 1000.0,
            lead_score: score,
            lead_class: Temperature::Hot,
            quality_grade: grade,
            sla: SlaType::Immediate,
            lead_profile: state.identity.clone(),
            criteria: criteria_snapshot(state),
            assigned_agent,
        }
    }
}

/// The routing-relevant criteria, flattened to plain JSON.
fn criteria_snapshot(state: &SessionState) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for field in [
        FieldId::Intent,
        FieldId::City,
        FieldId::Neighborhood,
        FieldId::MicroLocation,
        FieldId::PropertyType,
        FieldId::Bedrooms,
        FieldId::Parking,
        FieldId::Budget,
        FieldId::Timeline,
    ] {
        let value = state
            .value(field)
            .map(|v| v.to_plain_json())
            .unwrap_or(serde_json::Value::Null);
        map.insert(field.as_str().to_string(), value);
    }
    serde_json::Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lead_triage_config::VocabularyConfig;
    use lead_triage_core::FieldUpdate;
    use serde_json::json;

    #[test]
    fn sla_mapping_matches_the_policy_table() {
        assert_eq!(sla_for(Temperature::Hot, Grade::D), SlaType::Immediate);
        assert_eq!(sla_for(Temperature::Warm, Grade::C), SlaType::Normal);
        assert_eq!(sla_for(Temperature::Cold, Grade::A), SlaType::Normal);
        assert_eq!(sla_for(Temperature::Cold, Grade::B), SlaType::Normal);
        assert_eq!(sla_for(Temperature::Cold, Grade::C), SlaType::Nurture);
        assert_eq!(sla_for(Temperature::Cold, Grade::D), SlaType::Nurture);
    }

    #[test]
    fn hot_event_prefers_the_phone_as_lead_id() {
        let mut state = SessionState::new("s1");
        state.identity.phone = Some("+5583999990000".to_string());
        let event = HotLeadEvent::from_session(&state, 85, Grade::A, None);
        assert_eq!(event.lead_id, "+5583999990000");
        assert_eq!(event.event_type, "HOT_LEAD");
        assert_eq!(
            event.assigned_agent,
            json!({ "queue": "priority" })
        );
    }

    #[test]
    fn hot_event_serializes_the_wire_shape() {
        let mut state = SessionState::new("s1");
        let conflicts = state.apply_updates(
            &[
                FieldUpdate::confirmed(FieldId::Intent, json!("comprar")),
                FieldUpdate::confirmed(FieldId::Budget, json!(800_000)),
            ],
            &VocabularyConfig::default(),
        );
        assert!(conflicts.is_empty());
        let event = HotLeadEvent::from_session(&state, 90, Grade::B, None);
        let value = serde_json::to_value(&event).expect("serialize");
        assert_eq!(value["type"], "HOT_LEAD");
        assert_eq!(value["lead_id"], "s1");
        assert_eq!(value["lead_class"], "HOT");
        assert_eq!(value["quality_grade"], "B");
        assert_eq!(value["sla"], "immediate");
        assert_eq!(value["criteria"]["intent"], "buy");
        assert_eq!(value["criteria"]["budget"], 800_000);
        assert_eq!(value["criteria"]["city"], serde_json::Value::Null);
    }
}
