//! Quality scoring over session state.
//!
//! The score starts at 100 and each reason applies its own signed delta.
//! Reason order matters downstream: the gate walks the list to derive
//! gaps, and the audit log records it verbatim.

use lead_triage_config::QualityThresholds;
use lead_triage_core::{FieldId, FieldStatus, Operation, QualityReason, QualityReport, Timeline};

use crate::session::SessionState;

pub fn score_quality(state: &SessionState, thresholds: &QualityThresholds) -> QualityReport {
    let mut reasons = Vec::new();

    for field in FieldId::CRITICAL {
        match state.field(field) {
            None => reasons.push(QualityReason::MissingCritical(field)),
            Some(stored) if stored.status == FieldStatus::Inferred => {
                reasons.push(QualityReason::InferredCritical(field));
            }
            Some(_) => {}
        }
    }

    if let Some(micro) = state.field(FieldId::MicroLocation) {
        let ambiguous = micro
            .value
            .as_micro_location()
            .is_some_and(|m| m.is_ambiguous());
        if ambiguous || micro.status == FieldStatus::Inferred {
            reasons.push(QualityReason::AmbiguousMicroLocation);
        }
    }

    let high_budget = state
        .money(FieldId::Budget)
        .is_some_and(|budget| budget > thresholds.high_budget);
    if high_budget && !state.has(FieldId::CondoFeeCap) {
        reasons.push(QualityReason::MissingCondoFeeCap);
    }

    if state.operation() == Some(Operation::Buy) && !state.has(FieldId::PaymentMethod) {
        reasons.push(QualityReason::MissingPaymentMethod);
    }

    // One penalty regardless of how many conflicts are open; the first
    // unresolved field names the reason.
    if let Some(field) = state.open_conflicts.iter().next() {
        reasons.push(QualityReason::UnresolvedConflict(*field));
    }

    if state.has(FieldId::Neighborhood) && !state.has(FieldId::City) {
        reasons.push(QualityReason::NeighborhoodWithoutCity);
    }

    if let (Some(min), Some(max)) = (
        state.money(FieldId::BudgetMin),
        state.money(FieldId::Budget),
    ) {
        if min > max {
            reasons.push(QualityReason::BudgetRangeInverted);
        }
    }

    if state.urgency().is_some() && state.timeline().is_none() {
        reasons.push(QualityReason::UrgencyWithoutTimeline);
    }

    if let Some(micro) = state.field(FieldId::MicroLocation) {
        let ambiguous = micro
            .value
            .as_micro_location()
            .is_some_and(|m| m.is_ambiguous());
        if !ambiguous && micro.status != FieldStatus::Inferred {
            reasons.push(QualityReason::ConfirmedMicroLocation);
        }
    }

    if state.count(FieldId::Suites).is_some_and(|n| n > 0) {
        reasons.push(QualityReason::SuitesDefined);
    }

    if state.lead_name().is_some() {
        reasons.push(QualityReason::NameKnown);
    }

    if state
        .timeline()
        .is_some_and(|t| t != Timeline::Flexible)
    {
        reasons.push(QualityReason::FirmTimeline);
    }

    let raw: i32 = 100 + reasons.iter().map(QualityReason::delta).sum::<i32>();
    let score = raw.clamp(0, 100) as u8;
    QualityReport {
        score,
        grade: thresholds.grade(score),
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lead_triage_config::VocabularyConfig;
    use lead_triage_core::{FieldUpdate, Grade};
    use serde_json::json;

    fn thresholds() -> QualityThresholds {
        QualityThresholds::default()
    }

    fn confirmed(state: &mut SessionState, field: FieldId, value: serde_json::Value) {
        let conflicts = state.apply_updates(
            &[FieldUpdate::confirmed(field, value)],
            &VocabularyConfig::default(),
        );
        assert!(conflicts.is_empty());
    }

    fn full_session() -> SessionState {
        let mut state = SessionState::new("s1");
        confirmed(&mut state, FieldId::Intent, json!("alugar"));
        confirmed(&mut state, FieldId::City, json!("João Pessoa"));
        confirmed(&mut state, FieldId::Neighborhood, json!("Manaíra"));
        confirmed(&mut state, FieldId::PropertyType, json!("apartamento"));
        confirmed(&mut state, FieldId::Bedrooms, json!(3));
        confirmed(&mut state, FieldId::Parking, json!(2));
        confirmed(&mut state, FieldId::Budget, json!(400_000));
        confirmed(&mut state, FieldId::Timeline, json!("3_months"));
        state
    }

    #[test]
    fn empty_session_scores_zero() {
        let report = score_quality(&SessionState::new("s1"), &thresholds());
        // Eight missing criticals alone push the raw score below zero.
        assert_eq!(report.score, 0);
        assert_eq!(report.grade, Grade::D);
        assert_eq!(report.missing_critical().len(), 8);
    }

    #[test]
    fn complete_confirmed_session_grades_a() {
        let mut state = full_session();
        confirmed(&mut state, FieldId::LeadName, json!("Maria"));
        let report = score_quality(&state, &thresholds());
        // 100 + name bonus + firm timeline, clamped at 100.
        assert_eq!(report.score, 100);
        assert_eq!(report.grade, Grade::A);
        assert!(report.has(QualityReason::NameKnown));
        assert!(report.has(QualityReason::FirmTimeline));
    }

    #[test]
    fn inferred_critical_costs_less_than_missing() {
        let mut missing = full_session();
        missing.criteria.remove(&FieldId::City);
        let mut inferred = full_session();
        if let Some(city) = inferred.criteria.get_mut(&FieldId::City) {
            city.status = FieldStatus::Inferred;
        }
        let m = score_quality(&missing, &thresholds());
        let i = score_quality(&inferred, &thresholds());
        assert!(i.score > m.score);
        assert!(i.has(QualityReason::InferredCritical(FieldId::City)));
        assert!(m.has(QualityReason::MissingCritical(FieldId::City)));
    }

    #[test]
    fn resolving_a_missing_critical_never_lowers_the_score() {
        let mut state = full_session();
        state.criteria.remove(&FieldId::Timeline);
        let before = score_quality(&state, &thresholds());
        confirmed(&mut state, FieldId::Timeline, json!("30_days"));
        let after = score_quality(&state, &thresholds());
        assert!(after.score >= before.score);
    }

    #[test]
    fn ambiguous_micro_location_penalized_confirmed_rewarded() {
        let mut coastal = full_session();
        confirmed(&mut coastal, FieldId::MicroLocation, json!("orla"));
        let report = score_quality(&coastal, &thresholds());
        assert!(report.has(QualityReason::AmbiguousMicroLocation));

        let mut precise = full_session();
        confirmed(&mut precise, FieldId::MicroLocation, json!("beira-mar"));
        let report = score_quality(&precise, &thresholds());
        assert!(report.has(QualityReason::ConfirmedMicroLocation));
        assert!(!report.has(QualityReason::AmbiguousMicroLocation));
    }

    #[test]
    fn high_budget_without_condo_cap_is_flagged() {
        let mut state = full_session();
        confirmed(&mut state, FieldId::Budget, json!(900_000));
        let report = score_quality(&state, &thresholds());
        assert!(report.has(QualityReason::MissingCondoFeeCap));

        confirmed(&mut state, FieldId::CondoFeeCap, json!(1_500));
        let report = score_quality(&state, &thresholds());
        assert!(!report.has(QualityReason::MissingCondoFeeCap));
    }

    #[test]
    fn buy_without_payment_method_is_flagged() {
        let mut state = full_session();
        state.criteria.remove(&FieldId::Intent);
        confirmed(&mut state, FieldId::Intent, json!("comprar"));
        let report = score_quality(&state, &thresholds());
        assert!(report.has(QualityReason::MissingPaymentMethod));
    }

    #[test]
    fn open_conflict_is_penalized_once() {
        let mut state = full_session();
        state.open_conflicts.insert(FieldId::Budget);
        state.open_conflicts.insert(FieldId::City);
        let report = score_quality(&state, &thresholds());
        let conflict_reasons = report
            .reasons
            .iter()
            .filter(|r| matches!(r, QualityReason::UnresolvedConflict(_)))
            .count();
        assert_eq!(conflict_reasons, 1);
    }

    #[test]
    fn inverted_budget_range_is_flagged() {
        let mut state = full_session();
        confirmed(&mut state, FieldId::BudgetMin, json!(600_000));
        let report = score_quality(&state, &thresholds());
        assert!(report.has(QualityReason::BudgetRangeInverted));
    }

    #[test]
    fn urgency_without_timeline_is_flagged() {
        let mut state = full_session();
        state.criteria.remove(&FieldId::Timeline);
        confirmed(&mut state, FieldId::Urgency, json!("alta"));
        let report = score_quality(&state, &thresholds());
        assert!(report.has(QualityReason::UrgencyWithoutTimeline));
    }
}
