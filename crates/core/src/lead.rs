//! Lead domain enumerations and identity attributes.

use serde::{Deserialize, Serialize};

/// Operation the lead wants: purchase or rental. Investment interest is
/// collapsed to `Buy` at extraction time; "just looking" is an engagement
/// stage, not an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Buy,
    Rent,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Buy => "buy",
            Operation::Rent => "rent",
        }
    }

    pub fn label_pt(&self) -> &'static str {
        match self {
            Operation::Buy => "comprar",
            Operation::Rent => "alugar",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed timeline buckets. Free phrases that do not map to a bucket leave
/// the field unset rather than guessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeline {
    #[serde(rename = "30_days")]
    ThirtyDays,
    #[serde(rename = "3_months")]
    ThreeMonths,
    #[serde(rename = "6_months")]
    SixMonths,
    #[serde(rename = "12_months")]
    TwelveMonths,
    #[serde(rename = "flexible")]
    Flexible,
}

impl Timeline {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeline::ThirtyDays => "30_days",
            Timeline::ThreeMonths => "3_months",
            Timeline::SixMonths => "6_months",
            Timeline::TwelveMonths => "12_months",
            Timeline::Flexible => "flexible",
        }
    }

    pub fn label_pt(&self) -> &'static str {
        match self {
            Timeline::ThirtyDays => "até 30 dias",
            Timeline::ThreeMonths => "até 3 meses",
            Timeline::SixMonths => "até 6 meses",
            Timeline::TwelveMonths => "até 12 meses",
            Timeline::Flexible => "flexível",
        }
    }

    /// Short horizons that indicate real urgency.
    pub fn is_short(&self) -> bool {
        matches!(self, Timeline::ThirtyDays | Timeline::ThreeMonths)
    }
}

/// Distance-to-coast bucket. `CoastArea` is the ambiguous placeholder used
/// when the lead mentioned the coast without a distance; it always needs a
/// clarification question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MicroLocation {
    Beachfront,
    OneBlock,
    TwoToThreeBlocks,
    BeyondThreeBlocks,
    CoastArea,
}

impl MicroLocation {
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, MicroLocation::CoastArea)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MicroLocation::Beachfront => "beachfront",
            MicroLocation::OneBlock => "one_block",
            MicroLocation::TwoToThreeBlocks => "two_to_three_blocks",
            MicroLocation::BeyondThreeBlocks => "beyond_three_blocks",
            MicroLocation::CoastArea => "coast_area",
        }
    }

    pub fn label_pt(&self) -> &'static str {
        match self {
            MicroLocation::Beachfront => "beira-mar",
            MicroLocation::OneBlock => "1 quadra da praia",
            MicroLocation::TwoToThreeBlocks => "2-3 quadras da praia",
            MicroLocation::BeyondThreeBlocks => "mais de 3 quadras da praia",
            MicroLocation::CoastArea => "região da praia",
        }
    }

    /// Parses a roster coverage tag. Tags come from agent records written by
    /// operations staff, so legacy suffixes like "(praia)" and "_da_praia"
    /// are tolerated; unknown tags simply never match.
    pub fn parse_tag(tag: &str) -> Option<MicroLocation> {
        let mut t = tag.trim().to_lowercase().replace(' ', "_");
        for suffix in ["_(praia)", "(praia)", "_da_praia"] {
            if let Some(stripped) = t.strip_suffix(suffix) {
                t = stripped.to_string();
            }
        }
        let t = t.trim_matches('_');
        let micro = match t {
            "beira-mar" | "beira_mar" | "beachfront" => MicroLocation::Beachfront,
            "1_quadra" | "one_block" => MicroLocation::OneBlock,
            "2-3_quadras" | "2_3_quadras" | "two_to_three_blocks" => {
                MicroLocation::TwoToThreeBlocks
            }
            "3_quadras_mais" | "beyond_three_blocks" => MicroLocation::BeyondThreeBlocks,
            "orla" | "coast_area" => MicroLocation::CoastArea,
            _ => return None,
        };
        Some(micro)
    }
}

/// Urgency signal extracted from phrasing, separate from the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLevel {
    High,
    Medium,
    Low,
}

impl UrgencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyLevel::High => "high",
            UrgencyLevel::Medium => "medium",
            UrgencyLevel::Low => "low",
        }
    }
}

/// How far along the lead is, independent of their criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementStage {
    #[default]
    Unknown,
    Researching,
    ReadyToVisit,
    Negotiating,
}

impl EngagementStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngagementStage::Unknown => "unknown",
            EngagementStage::Researching => "researching",
            EngagementStage::ReadyToVisit => "ready_to_visit",
            EngagementStage::Negotiating => "negotiating",
        }
    }
}

/// Lead temperature class from the urgency/value scorer. Serialized
/// uppercase because downstream notification consumers key on `HOT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Temperature {
    Hot,
    Warm,
    Cold,
}

impl Temperature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Temperature::Hot => "HOT",
            Temperature::Warm => "WARM",
            Temperature::Cold => "COLD",
        }
    }
}

impl std::fmt::Display for Temperature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of the lead scorer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadScore {
    pub score: u8,
    pub temperature: Temperature,
    pub reasons: Vec<String>,
}

/// SLA action class mapped from (temperature, quality grade).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaType {
    Immediate,
    Normal,
    Nurture,
}

impl SlaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlaType::Immediate => "immediate",
            SlaType::Normal => "normal",
            SlaType::Nurture => "nurture",
        }
    }
}

/// Why the user asked to skip the bot. Any of these routes to a human
/// immediately, bypassing the quality gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandoffReason {
    HumanRequested,
    Negotiation,
    VisitRequest,
    Complaint,
    Legal,
}

impl HandoffReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandoffReason::HumanRequested => "human_requested",
            HandoffReason::Negotiation => "negotiation",
            HandoffReason::VisitRequest => "visit_request",
            HandoffReason::Complaint => "complaint",
            HandoffReason::Legal => "legal",
        }
    }
}

/// Lead identity attributes, independent of criteria. Set-once: the first
/// non-empty value wins and later writes are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadIdentity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl LeadIdentity {
    /// Returns true if the value was stored (first non-empty write).
    pub fn set_once(slot: &mut Option<String>, value: &str) -> bool {
        let trimmed = value.trim();
        if trimmed.is_empty() || slot.is_some() {
            return false;
        }
        *slot = Some(trimmed.to_string());
        true
    }
}

/// Formats whole reais the way reply templates and conflict prompts show
/// money: "R$ 800.000", "R$ 1 milhão", "R$ 1.2 milhões".
pub fn format_brl(amount: i64) -> String {
    if amount >= 1_000_000 {
        let millions = amount as f64 / 1_000_000.0;
        let rounded = (millions * 10.0).round() / 10.0;
        if (rounded - rounded.trunc()).abs() < f64::EPSILON {
            let whole = rounded.trunc() as i64;
            if whole == 1 {
                "R$ 1 milhão".to_string()
            } else {
                format!("R$ {} milhões", whole)
            }
        } else {
            format!("R$ {:.1} milhões", rounded)
        }
    } else {
        let digits = amount.abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(c);
        }
        if amount < 0 {
            format!("R$ -{}", grouped)
        } else {
            format!("R$ {}", grouped)
        }
    }
}
