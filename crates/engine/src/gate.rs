//! Quality gate: decides when a session is good enough to hand off,
//! and which surgical question to spend a gate turn on when it is not.

use lead_triage_config::GateConfig;
use lead_triage_core::{AskTopic, FieldId, Grade, QualityReason, QualityReport};

use crate::session::SessionState;

/// Field-level gaps derived from the quality report's reasons.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct QualityGaps {
    pub missing_required: Vec<FieldId>,
    pub ambiguous: Vec<FieldId>,
    pub conflicting: Vec<FieldId>,
    pub low_confidence: Vec<FieldId>,
    pub dealbreakers: Vec<FieldId>,
}

impl QualityGaps {
    /// Gap count that can block a handoff. Low-confidence fields lower
    /// the score but never block on their own.
    pub fn blocking(&self) -> usize {
        self.missing_required.len() + self.ambiguous.len() + self.conflicting.len()
    }
}

pub fn identify_gaps(report: &QualityReport) -> QualityGaps {
    let mut gaps = QualityGaps::default();
    for reason in &report.reasons {
        match reason {
            QualityReason::MissingCritical(field) => {
                push_unique(&mut gaps.missing_required, *field);
            }
            QualityReason::InferredCritical(field) => {
                push_unique(&mut gaps.low_confidence, *field);
            }
            QualityReason::AmbiguousMicroLocation => {
                push_unique(&mut gaps.ambiguous, FieldId::MicroLocation);
                push_unique(&mut gaps.dealbreakers, FieldId::MicroLocation);
            }
            QualityReason::MissingCondoFeeCap => {
                push_unique(&mut gaps.missing_required, FieldId::CondoFeeCap);
                push_unique(&mut gaps.dealbreakers, FieldId::CondoFeeCap);
            }
            QualityReason::MissingPaymentMethod => {
                push_unique(&mut gaps.missing_required, FieldId::PaymentMethod);
                push_unique(&mut gaps.dealbreakers, FieldId::PaymentMethod);
            }
            QualityReason::NeighborhoodWithoutCity => {
                push_unique(&mut gaps.conflicting, FieldId::City);
            }
            QualityReason::BudgetRangeInverted => {
                push_unique(&mut gaps.conflicting, FieldId::Budget);
            }
            // The in-band conflict prompt already chases these; bonuses
            // and the urgency hint close no gap of their own.
            QualityReason::UnresolvedConflict(_)
            | QualityReason::UrgencyWithoutTimeline
            | QualityReason::ConfirmedMicroLocation
            | QualityReason::SuitesDefined
            | QualityReason::NameKnown
            | QualityReason::FirmTimeline => {}
        }
    }
    gaps
}

fn push_unique(fields: &mut Vec<FieldId>, field: FieldId) {
    if !fields.contains(&field) {
        fields.push(field);
    }
}

/// Whether the session may complete and route now.
pub fn may_handoff(state: &SessionState, report: &QualityReport, gate: &GateConfig) -> bool {
    if state.gate_turns >= gate.max_gate_turns {
        tracing::debug!(
            session_id = %state.session_id,
            turns = state.gate_turns,
            "gate turn cap reached, allowing handoff"
        );
        return true;
    }
    if matches!(report.grade, Grade::A | Grade::B) || report.score >= gate.min_score {
        return true;
    }
    identify_gaps(report).blocking() == 0
}

/// The single question most likely to lift the quality score.
///
/// Priority: dealbreakers, then missing criticals in critical order, then
/// other missing fields, then ambiguous fields, then low-confidence
/// fields (city routes to its confirmation variant), then consistency
/// conflicts. Refused fields and the topic just asked are skipped;
/// missing-field classes ask at most once, the rest up to the ask cap.
pub fn next_gate_question(
    state: &SessionState,
    report: &QualityReport,
    gate: &GateConfig,
) -> Option<AskTopic> {
    let gaps = identify_gaps(report);

    for &field in &gaps.dealbreakers {
        if let Some(topic) = askable(state, field, 1) {
            return Some(topic);
        }
    }
    for field in FieldId::CRITICAL {
        if gaps.missing_required.contains(&field) {
            if let Some(topic) = askable(state, field, 1) {
                return Some(topic);
            }
        }
    }
    for &field in &gaps.missing_required {
        if !field.is_critical() {
            if let Some(topic) = askable(state, field, 1) {
                return Some(topic);
            }
        }
    }
    for &field in &gaps.ambiguous {
        if let Some(topic) = askable(state, field, gate.max_asks_per_field) {
            return Some(topic);
        }
    }
    for &field in &gaps.low_confidence {
        let topic = if field == FieldId::City {
            Some(AskTopic::CityConfirm)
        } else {
            AskTopic::for_field(field)
        };
        if let Some(topic) = topic {
            if permitted(state, field, topic, gate.max_asks_per_field) {
                return Some(topic);
            }
        }
    }
    for &field in &gaps.conflicting {
        if let Some(topic) = askable(state, field, gate.max_asks_per_field) {
            return Some(topic);
        }
    }
    None
}

fn askable(state: &SessionState, field: FieldId, max_asks: u32) -> Option<AskTopic> {
    let topic = AskTopic::for_field(field)?;
    permitted(state, field, topic, max_asks).then_some(topic)
}

fn permitted(state: &SessionState, field: FieldId, topic: AskTopic, max_asks: u32) -> bool {
    state.refusal_count(field) == 0
        && state.last_asked != Some(topic)
        && state.asked_count(topic) < max_asks
}
