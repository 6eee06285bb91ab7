//! Scoring and Gate Thresholds
//!
//! Numeric knobs for the quality scorer, the lead temperature scorer,
//! the agent router and the quality gate. Every field has a canonical
//! default so the engine runs without any domain YAML present.

use lead_triage_core::{Grade, Temperature, Timeline};
use serde::{Deserialize, Serialize};

/// Quality score grading and dealbreaker triggers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityThresholds {
    /// Minimum score for grade A
    #[serde(default = "default_grade_a")]
    pub grade_a: u8,
    /// Minimum score for grade B
    #[serde(default = "default_grade_b")]
    pub grade_b: u8,
    /// Minimum score for grade C (below is D)
    #[serde(default = "default_grade_c")]
    pub grade_c: u8,
    /// Budget above which a missing condo fee cap counts as a dealbreaker
    #[serde(default = "default_high_budget")]
    pub high_budget: i64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            grade_a: default_grade_a(),
            grade_b: default_grade_b(),
            grade_c: default_grade_c(),
            high_budget: default_high_budget(),
        }
    }
}

fn default_grade_a() -> u8 {
    85
}

fn default_grade_b() -> u8 {
    70
}

fn default_grade_c() -> u8 {
    50
}

fn default_high_budget() -> i64 {
    500_000
}

impl QualityThresholds {
    pub fn grade(&self, score: u8) -> Grade {
        if score >= self.grade_a {
            Grade::A
        } else if score >= self.grade_b {
            Grade::B
        } else if score >= self.grade_c {
            Grade::C
        } else {
            Grade::D
        }
    }
}

/// Lead temperature cutoffs plus the point weights feeding the score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaThresholds {
    /// Score at or above which a lead is hot
    #[serde(default = "default_hot")]
    pub hot: u8,
    /// Score at or above which a lead is warm (below is cold)
    #[serde(default = "default_warm")]
    pub warm: u8,
    #[serde(default)]
    pub weights: ScoreWeights,
}

impl Default for SlaThresholds {
    fn default() -> Self {
        Self {
            hot: default_hot(),
            warm: default_warm(),
            weights: ScoreWeights::default(),
        }
    }
}

fn default_hot() -> u8 {
    80
}

fn default_warm() -> u8 {
    50
}

impl SlaThresholds {
    pub fn temperature(&self, score: u8) -> Temperature {
        if score >= self.hot {
            Temperature::Hot
        } else if score >= self.warm {
            Temperature::Warm
        } else {
            Temperature::Cold
        }
    }
}

/// Point weights for the lead temperature score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreWeights {
    #[serde(default = "default_w_budget")]
    pub budget: i32,
    #[serde(default = "default_w_city")]
    pub city: i32,
    #[serde(default = "default_w_neighborhood")]
    pub neighborhood: i32,
    /// Awarded only for a non-ambiguous micro-location
    #[serde(default = "default_w_micro_location")]
    pub micro_location: i32,
    #[serde(default = "default_w_bedrooms")]
    pub bedrooms: i32,
    /// Bedrooms needed before the bedrooms weight applies
    #[serde(default = "default_min_bedrooms")]
    pub min_bedrooms: u32,
    #[serde(default = "default_w_parking")]
    pub parking: i32,
    /// Parking spots needed before the parking weight applies
    #[serde(default = "default_min_parking")]
    pub min_parking: u32,
    #[serde(default = "default_w_intent")]
    pub intent: i32,
    #[serde(default = "default_w_timeline_30_days")]
    pub timeline_30_days: i32,
    #[serde(default = "default_w_timeline_3_months")]
    pub timeline_3_months: i32,
    #[serde(default = "default_w_timeline_6_months")]
    pub timeline_6_months: i32,
    #[serde(default = "default_w_timeline_12_months")]
    pub timeline_12_months: i32,
    #[serde(default = "default_w_stage_ready")]
    pub stage_ready_to_visit: i32,
    #[serde(default = "default_w_stage_negotiating")]
    pub stage_negotiating: i32,
    /// Applied only when no short timeline offsets it
    #[serde(default = "default_w_stage_researching")]
    pub stage_researching: i32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            budget: default_w_budget(),
            city: default_w_city(),
            neighborhood: default_w_neighborhood(),
            micro_location: default_w_micro_location(),
            bedrooms: default_w_bedrooms(),
            min_bedrooms: default_min_bedrooms(),
            parking: default_w_parking(),
            min_parking: default_min_parking(),
            intent: default_w_intent(),
            timeline_30_days: default_w_timeline_30_days(),
            timeline_3_months: default_w_timeline_3_months(),
            timeline_6_months: default_w_timeline_6_months(),
            timeline_12_months: default_w_timeline_12_months(),
            stage_ready_to_visit: default_w_stage_ready(),
            stage_negotiating: default_w_stage_negotiating(),
            stage_researching: default_w_stage_researching(),
        }
    }
}

fn default_w_budget() -> i32 {
    20
}

fn default_w_city() -> i32 {
    10
}

fn default_w_neighborhood() -> i32 {
    15
}

fn default_w_micro_location() -> i32 {
    10
}

fn default_w_bedrooms() -> i32 {
    10
}

fn default_min_bedrooms() -> u32 {
    3
}

fn default_w_parking() -> i32 {
    5
}

fn default_min_parking() -> u32 {
    2
}

fn default_w_intent() -> i32 {
    5
}

fn default_w_timeline_30_days() -> i32 {
    25
}

fn default_w_timeline_3_months() -> i32 {
    20
}

fn default_w_timeline_6_months() -> i32 {
    10
}

fn default_w_timeline_12_months() -> i32 {
    5
}

fn default_w_stage_ready() -> i32 {
    8
}

fn default_w_stage_negotiating() -> i32 {
    8
}

fn default_w_stage_researching() -> i32 {
    -5
}

impl ScoreWeights {
    pub fn timeline_bonus(&self, timeline: Timeline) -> i32 {
        match timeline {
            Timeline::ThirtyDays => self.timeline_30_days,
            Timeline::ThreeMonths => self.timeline_3_months,
            Timeline::SixMonths => self.timeline_6_months,
            Timeline::TwelveMonths => self.timeline_12_months,
            Timeline::Flexible => 0,
        }
    }
}

/// Agent router scoring weights and filters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingThresholds {
    /// Sentinel below which an agent is excluded outright
    #[serde(default = "default_hard_filter")]
    pub hard_filter: i32,
    #[serde(default = "default_r_neighborhood_match")]
    pub neighborhood_match: i32,
    /// Agent covers other neighborhoods but not the lead's
    #[serde(default = "default_r_neighborhood_mismatch")]
    pub neighborhood_mismatch: i32,
    /// Generalist bonus when the lead has no neighborhood yet
    #[serde(default = "default_r_generalist")]
    pub generalist_no_neighborhood: i32,
    #[serde(default = "default_r_micro_tag")]
    pub micro_tag_match: i32,
    #[serde(default = "default_r_price_in_band")]
    pub price_in_band: i32,
    #[serde(default = "default_r_price_out_of_band")]
    pub price_out_of_band: i32,
    #[serde(default = "default_r_tier_hot_senior")]
    pub tier_hot_senior: i32,
    #[serde(default = "default_r_tier_warm_standard")]
    pub tier_warm_standard: i32,
    #[serde(default = "default_r_tier_cold_junior")]
    pub tier_cold_junior: i32,
    /// "alto_padrao" specialty bonus
    #[serde(default = "default_r_specialty_premium")]
    pub specialty_premium: i32,
    /// Budget at or above which the premium specialty applies
    #[serde(default = "default_premium_budget_floor")]
    pub premium_budget_floor: i64,
    /// "familia" specialty bonus
    #[serde(default = "default_r_specialty_family")]
    pub specialty_family: i32,
    /// Bedrooms at or above which the family specialty applies
    #[serde(default = "default_family_min_bedrooms")]
    pub family_min_bedrooms: u32,
    /// "pet_friendly" specialty bonus
    #[serde(default = "default_r_specialty_pet")]
    pub specialty_pet: i32,
    /// Applied when a priority lead keeps an agent already at capacity
    #[serde(default = "default_r_over_capacity")]
    pub over_capacity_penalty: i32,
}

impl Default for RoutingThresholds {
    fn default() -> Self {
        Self {
            hard_filter: default_hard_filter(),
            neighborhood_match: default_r_neighborhood_match(),
            neighborhood_mismatch: default_r_neighborhood_mismatch(),
            generalist_no_neighborhood: default_r_generalist(),
            micro_tag_match: default_r_micro_tag(),
            price_in_band: default_r_price_in_band(),
            price_out_of_band: default_r_price_out_of_band(),
            tier_hot_senior: default_r_tier_hot_senior(),
            tier_warm_standard: default_r_tier_warm_standard(),
            tier_cold_junior: default_r_tier_cold_junior(),
            specialty_premium: default_r_specialty_premium(),
            premium_budget_floor: default_premium_budget_floor(),
            specialty_family: default_r_specialty_family(),
            family_min_bedrooms: default_family_min_bedrooms(),
            specialty_pet: default_r_specialty_pet(),
            over_capacity_penalty: default_r_over_capacity(),
        }
    }
}

fn default_hard_filter() -> i32 {
    -1000
}

fn default_r_neighborhood_match() -> i32 {
    30
}

fn default_r_neighborhood_mismatch() -> i32 {
    -10
}

fn default_r_generalist() -> i32 {
    5
}

fn default_r_micro_tag() -> i32 {
    15
}

fn default_r_price_in_band() -> i32 {
    20
}

fn default_r_price_out_of_band() -> i32 {
    -15
}

fn default_r_tier_hot_senior() -> i32 {
    10
}

fn default_r_tier_warm_standard() -> i32 {
    5
}

fn default_r_tier_cold_junior() -> i32 {
    5
}

fn default_r_specialty_premium() -> i32 {
    10
}

fn default_premium_budget_floor() -> i64 {
    900_000
}

fn default_r_specialty_family() -> i32 {
    10
}

fn default_family_min_bedrooms() -> u32 {
    3
}

fn default_r_specialty_pet() -> i32 {
    5
}

fn default_r_over_capacity() -> i32 {
    -5
}

/// Quality gate limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Clarifying questions spent on quality before handoff is forced
    #[serde(default = "default_max_gate_turns")]
    pub max_gate_turns: u32,
    /// Score at or above which the gate opens without further questions
    #[serde(default = "default_min_score")]
    pub min_score: u8,
    /// A field is never asked again once it reached this many asks
    #[serde(default = "default_max_asks_per_field")]
    pub max_asks_per_field: u32,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            max_gate_turns: default_max_gate_turns(),
            min_score: default_min_score(),
            max_asks_per_field: default_max_asks_per_field(),
        }
    }
}

fn default_max_gate_turns() -> u32 {
    3
}

fn default_min_score() -> u8 {
    70
}

fn default_max_asks_per_field() -> u32 {
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grades_match_cutoffs() {
        let q = QualityThresholds::default();
        assert_eq!(q.grade(90), Grade::A);
        assert_eq!(q.grade(85), Grade::A);
        assert_eq!(q.grade(75), Grade::B);
        assert_eq!(q.grade(55), Grade::C);
        assert_eq!(q.grade(49), Grade::D);
    }

    #[test]
    fn default_temperature_cutoffs() {
        let sla = SlaThresholds::default();
        assert_eq!(sla.temperature(80), Temperature::Hot);
        assert_eq!(sla.temperature(79), Temperature::Warm);
        assert_eq!(sla.temperature(50), Temperature::Warm);
        assert_eq!(sla.temperature(49), Temperature::Cold);
    }

    #[test]
    fn timeline_bonus_table() {
        let w = ScoreWeights::default();
        assert_eq!(w.timeline_bonus(Timeline::ThirtyDays), 25);
        assert_eq!(w.timeline_bonus(Timeline::ThreeMonths), 20);
        assert_eq!(w.timeline_bonus(Timeline::SixMonths), 10);
        assert_eq!(w.timeline_bonus(Timeline::TwelveMonths), 5);
        assert_eq!(w.timeline_bonus(Timeline::Flexible), 0);
    }

    #[test]
    fn thresholds_deserialize_with_partial_yaml() {
        let yaml = r#"
hot: 75
weights:
  budget: 25
"#;
        let sla: SlaThresholds = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(sla.hot, 75);
        assert_eq!(sla.warm, 50);
        assert_eq!(sla.weights.budget, 25);
        assert_eq!(sla.weights.city, 10);
    }

    #[test]
    fn gate_defaults() {
        let gate = GateConfig::default();
        assert_eq!(gate.max_gate_turns, 3);
        assert_eq!(gate.min_score, 70);
        assert_eq!(gate.max_asks_per_field, 2);
    }
}
