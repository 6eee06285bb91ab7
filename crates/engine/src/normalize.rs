//! Field value normalization.
//!
//! Every update entering a session passes through [`normalize_value`],
//! whether it came from the rule extractor or from a caller-supplied
//! batch on the turn endpoint. The normalizer is strict: a value it
//! cannot interpret yields `None` and the update is dropped, it never
//! guesses. Free-text interpretation (stems, phrase scans) belongs to
//! the extraction crate, not here.

use lead_triage_config::VocabularyConfig;
use lead_triage_core::{
    EngagementStage, FieldId, FieldValue, MicroLocation, Operation, Timeline, UrgencyLevel,
};
use lead_triage_extraction::{fold, parse_budget_range};

/// Words accepted as an affirmative answer to a flag question.
const YES_WORDS: &[&str] = &[
    "sim",
    "claro",
    "com certeza",
    "pode ser",
    "isso",
    "quero",
    "aceito",
    "tem sim",
    "verdade",
    "positivo",
];

/// Words accepted as a negative answer to a flag question.
const NO_WORDS: &[&str] = &[
    "nao",
    "sem",
    "nunca",
    "nenhum",
    "nenhuma",
    "jamais",
    "negativo",
    "dispenso",
];

/// Converts a raw JSON value into the typed representation for `field`.
///
/// Returns `None` for nulls, empty strings and anything that does not
/// parse into the field's type.
pub fn normalize_value(
    field: FieldId,
    raw: &serde_json::Value,
    vocab: &VocabularyConfig,
) -> Option<FieldValue> {
    if raw.is_null() {
        return None;
    }
    match field {
        FieldId::Intent => operation(raw).map(FieldValue::Operation),
        FieldId::City => text(raw).map(|city| {
            let folded = fold(&city);
            match vocab.city_for(&folded) {
                Some(canonical) => FieldValue::Text(canonical.to_string()),
                None => FieldValue::Text(city),
            }
        }),
        FieldId::Neighborhood
        | FieldId::PropertyType
        | FieldId::PaymentMethod
        | FieldId::FloorPreference
        | FieldId::LeadName
        | FieldId::LeadPhone
        | FieldId::LeadEmail => text(raw).map(FieldValue::Text),
        FieldId::Bedrooms | FieldId::Suites | FieldId::Parking => {
            count(raw).map(FieldValue::Count)
        }
        FieldId::Budget | FieldId::BudgetMin | FieldId::CondoFeeCap => {
            money(raw).map(FieldValue::Money)
        }
        FieldId::Timeline => timeline(raw, vocab).map(FieldValue::Timeline),
        FieldId::MicroLocation => micro_location(raw, vocab).map(FieldValue::MicroLocation),
        FieldId::Pet | FieldId::Furnished => flag(raw).map(FieldValue::Flag),
        FieldId::Urgency => urgency(raw).map(FieldValue::Urgency),
        FieldId::EngagementStage => stage(raw).map(FieldValue::Stage),
    }
}

fn text(raw: &serde_json::Value) -> Option<String> {
    let s = raw.as_str()?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn operation(raw: &serde_json::Value) -> Option<Operation> {
    let folded = fold(raw.as_str()?);
    match folded.trim() {
        "buy" | "comprar" | "compra" | "venda" => Some(Operation::Buy),
        "rent" | "alugar" | "aluguel" | "locacao" => Some(Operation::Rent),
        _ => None,
    }
}

fn count(raw: &serde_json::Value) -> Option<u32> {
    if let Some(n) = raw.as_u64() {
        return u32::try_from(n).ok();
    }
    if let Some(f) = raw.as_f64() {
        if f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX) {
            return Some(f as u32);
        }
        return None;
    }
    raw.as_str()?.trim().parse().ok()
}

fn money(raw: &serde_json::Value) -> Option<i64> {
    if let Some(n) = raw.as_i64() {
        return (n > 0).then_some(n);
    }
    if let Some(f) = raw.as_f64() {
        let rounded = f.round();
        return (rounded > 0.0 && rounded <= i64::MAX as f64).then_some(rounded as i64);
    }
    // Strings go through the money parser so "800 mil" and "1,2 milhão"
    // arrive as the same integer the extractor would have produced.
    let range = parse_budget_range(raw.as_str()?);
    range.max.or(range.min).filter(|amount| *amount > 0)
}

fn timeline(raw: &serde_json::Value, vocab: &VocabularyConfig) -> Option<Timeline> {
    let folded = fold(raw.as_str()?);
    let tag = folded.trim();
    let canonical = match tag {
        "30_days" | "30d" => Some(Timeline::ThirtyDays),
        "3_months" | "3m" => Some(Timeline::ThreeMonths),
        "6_months" | "6m" => Some(Timeline::SixMonths),
        "12_months" | "12m" => Some(Timeline::TwelveMonths),
        "flexible" | "flexivel" => Some(Timeline::Flexible),
        _ => None,
    };
    canonical.or_else(|| vocab.timeline_for(tag))
}

fn micro_location(raw: &serde_json::Value, vocab: &VocabularyConfig) -> Option<MicroLocation> {
    let folded = fold(raw.as_str()?);
    let tag = folded.trim();
    MicroLocation::parse_tag(tag).or_else(|| vocab.micro_location_for(tag))
}

fn flag(raw: &serde_json::Value) -> Option<bool> {
    if let Some(b) = raw.as_bool() {
        return Some(b);
    }
    let folded = fold(raw.as_str()?);
    let answer = folded.trim();
    if YES_WORDS.contains(&answer) {
        Some(true)
    } else if NO_WORDS.contains(&answer) {
        Some(false)
    } else {
        None
    }
}

fn urgency(raw: &serde_json::Value) -> Option<UrgencyLevel> {
    let folded = fold(raw.as_str()?);
    match folded.trim() {
        "high" | "alta" => Some(UrgencyLevel::High),
        "medium" | "media" => Some(UrgencyLevel::Medium),
        "low" | "baixa" => Some(UrgencyLevel::Low),
        _ => None,
    }
}

fn stage(raw: &serde_json::Value) -> Option<EngagementStage> {
    let folded = fold(raw.as_str()?);
    match folded.trim() {
        "researching" | "pesquisando" => Some(EngagementStage::Researching),
        "ready_to_visit" | "pronto para visitar" => Some(EngagementStage::ReadyToVisit),
        "negotiating" | "negociando" => Some(EngagementStage::Negotiating),
        "unknown" => Some(EngagementStage::Unknown),
        _ => None,
    }
}
