//! Quality report types: score, letter grade, and typed adjustment reasons.
//!
//! Reasons are a closed enum so the quality gate can match on them directly
//! instead of re-parsing reason strings.

use serde::{Deserialize, Serialize};

use crate::fields::FieldId;

/// Letter grade over the quality score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
}

impl Grade {
    pub fn from_score(score: u8) -> Grade {
        match score {
            85..=u8::MAX => Grade::A,
            70..=84 => Grade::B,
            50..=69 => Grade::C,
            _ => Grade::D,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One signed adjustment applied by the quality scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityReason {
    MissingCritical(FieldId),
    InferredCritical(FieldId),
    AmbiguousMicroLocation,
    MissingCondoFeeCap,
    MissingPaymentMethod,
    UnresolvedConflict(FieldId),
    NeighborhoodWithoutCity,
    BudgetRangeInverted,
    UrgencyWithoutTimeline,
    ConfirmedMicroLocation,
    SuitesDefined,
    NameKnown,
    FirmTimeline,
}

impl QualityReason {
    /// Signed score adjustment this reason contributes.
    pub fn delta(&self) -> i32 {
        match self {
            QualityReason::MissingCritical(_) => -15,
            QualityReason::InferredCritical(_) => -5,
            QualityReason::AmbiguousMicroLocation => -10,
            QualityReason::MissingCondoFeeCap => -8,
            QualityReason::MissingPaymentMethod => -5,
            QualityReason::UnresolvedConflict(_) => -20,
            QualityReason::NeighborhoodWithoutCity => -10,
            QualityReason::BudgetRangeInverted => -15,
            QualityReason::UrgencyWithoutTimeline => -5,
            QualityReason::ConfirmedMicroLocation => 5,
            QualityReason::SuitesDefined => 3,
            QualityReason::NameKnown => 2,
            QualityReason::FirmTimeline => 3,
        }
    }
}

impl std::fmt::Display for QualityReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QualityReason::MissingCritical(field) => write!(f, "missing_critical_{}", field),
            QualityReason::InferredCritical(field) => write!(f, "inferred_{}", field),
            QualityReason::AmbiguousMicroLocation => f.write_str("micro_location_ambiguous"),
            QualityReason::MissingCondoFeeCap => f.write_str("missing_condo_fee_cap_high_budget"),
            QualityReason::MissingPaymentMethod => f.write_str("missing_payment_method"),
            QualityReason::UnresolvedConflict(field) => {
                write!(f, "unresolved_conflict_{}", field)
            }
            QualityReason::NeighborhoodWithoutCity => f.write_str("neighborhood_without_city"),
            QualityReason::BudgetRangeInverted => f.write_str("budget_inconsistent"),
            QualityReason::UrgencyWithoutTimeline => f.write_str("timeline_missing_with_urgency"),
            QualityReason::ConfirmedMicroLocation => f.write_str("micro_location_confirmed"),
            QualityReason::SuitesDefined => f.write_str("suites_defined"),
            QualityReason::NameKnown => f.write_str("lead_name_known"),
            QualityReason::FirmTimeline => f.write_str("timeline_firm"),
        }
    }
}

impl Serialize for QualityReason {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Output of the quality scorer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub score: u8,
    pub grade: Grade,
    pub reasons: Vec<QualityReason>,
}

impl QualityReport {
    pub fn has(&self, reason: QualityReason) -> bool {
        self.reasons.contains(&reason)
    }

    pub fn missing_critical(&self) -> Vec<FieldId> {
        self.reasons
            .iter()
            .filter_map(|r| match r {
                QualityReason::MissingCritical(field) => Some(*field),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_boundaries() {
        assert_eq!(Grade::from_score(100), Grade::A);
        assert_eq!(Grade::from_score(85), Grade::A);
        assert_eq!(Grade::from_score(84), Grade::B);
        assert_eq!(Grade::from_score(70), Grade::B);
        assert_eq!(Grade::from_score(69), Grade::C);
        assert_eq!(Grade::from_score(50), Grade::C);
        assert_eq!(Grade::from_score(49), Grade::D);
        assert_eq!(Grade::from_score(0), Grade::D);
    }

    #[test]
    fn reasons_serialize_as_tags() {
        let reason = QualityReason::MissingCritical(FieldId::Budget);
        assert_eq!(
            serde_json::to_value(reason).unwrap(),
            serde_json::json!("missing_critical_budget")
        );
        assert_eq!(
            serde_json::to_value(QualityReason::AmbiguousMicroLocation).unwrap(),
            serde_json::json!("micro_location_ambiguous")
        );
    }

    #[test]
    fn report_lists_missing_criticals() {
        let report = QualityReport {
            score: 60,
            grade: Grade::C,
            reasons: vec![
                QualityReason::MissingCritical(FieldId::Budget),
                QualityReason::InferredCritical(FieldId::City),
                QualityReason::MissingCritical(FieldId::Timeline),
            ],
        };
        assert_eq!(
            report.missing_critical(),
            vec![FieldId::Budget, FieldId::Timeline]
        );
    }
}
