//! Rule-based criteria extraction.
//!
//! Deterministic fallback for when no language-layer batch accompanies a
//! turn. Works entirely on the accent-folded utterance plus the known
//! neighborhood list; emits canonical tags the engine normalizer accepts.
//! Everything is marked `inferred` except signals the user stated in an
//! unambiguous surface form: intent keywords, counts with their unit
//! word, and money mentions.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;

use lead_triage_config::domain::{HandoffKeywords, VocabularyConfig};
use lead_triage_core::{
    CriteriaExtractor, FieldId, FieldStatus, FieldUpdate, HandoffReason, Operation,
};

use crate::money;
use crate::text;

static BEDROOMS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+)\s*(?:quartos?\b|qtos\b|qts\b|dormitorios?\b|dorm\b|q\b)").unwrap()
});

static SUITES: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*suites?\b").unwrap());

static PARKING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*vagas?\b").unwrap());

static CONDO_CAP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"condominio[^\d]{0,20}(\d+(?:[.,]\d+)*)\s*(mil|k)?\b").unwrap());

/// Runs on the original text so the captured name keeps its casing.
static NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:meu nome (?:é|e)|me chamo)\s+([^\s,.!?;]+(?:\s+[^\s,.!?;]+)?)").unwrap()
});

pub struct RuleBasedExtractor {
    vocabulary: VocabularyConfig,
    handoff: HandoffKeywords,
}

impl RuleBasedExtractor {
    pub fn new(vocabulary: VocabularyConfig, handoff: HandoffKeywords) -> Self {
        Self {
            vocabulary,
            handoff,
        }
    }

    fn detect_intent(&self, folded: &str) -> Option<Operation> {
        let vocab = &self.vocabulary;
        let rent = vocab.rent_keywords.iter().any(|k| folded.contains(k.as_str()));
        let buy = vocab.buy_keywords.iter().any(|k| folded.contains(k.as_str()));
        match (rent, buy) {
            (true, false) => Some(Operation::Rent),
            (false, true) => Some(Operation::Buy),
            (true, true) => None,
            (false, false) => {
                let rent_stem = !vocab.rent_stem.is_empty() && folded.contains(vocab.rent_stem.as_str());
                let buy_stem = !vocab.buy_stem.is_empty() && folded.contains(vocab.buy_stem.as_str());
                match (rent_stem, buy_stem) {
                    (true, false) => Some(Operation::Rent),
                    (false, true) => Some(Operation::Buy),
                    _ => None,
                }
            }
        }
    }

    fn detect_neighborhood<'a>(&self, folded: &str, known: &'a [String]) -> Option<&'a str> {
        known
            .iter()
            .filter(|n| !n.is_empty())
            .find(|n| folded.contains(text::fold(n).as_str()))
            .map(String::as_str)
    }

    fn push_budget(&self, folded_without_condo: &str, updates: &mut Vec<FieldUpdate>) {
        let budget = money::parse_budget_range(folded_without_condo);
        if budget.is_empty() {
            return;
        }
        let status = if budget.keyword_only {
            FieldStatus::Inferred
        } else {
            FieldStatus::Confirmed
        };
        let raw = budget.raw_matches.join(" / ");
        if let Some(max) = budget.max {
            updates.push(
                FieldUpdate::new(FieldId::Budget, json!(max))
                    .with_status(status)
                    .with_raw_text(raw.clone()),
            );
        }
        if let Some(min) = budget.min {
            updates.push(
                FieldUpdate::new(FieldId::BudgetMin, json!(min))
                    .with_status(status)
                    .with_raw_text(raw),
            );
        }
    }
}

fn capture_count(regex: &Regex, folded: &str) -> Option<u32> {
    regex
        .captures(folded)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
}

fn detect_flag(folded: &str, negatives: &[String], positives: &[String]) -> Option<bool> {
    if negatives.iter().any(|k| folded.contains(k.as_str())) {
        return Some(false);
    }
    if positives.iter().any(|k| folded.contains(k.as_str())) {
        return Some(true);
    }
    None
}

fn any_match(folded: &str, phrases: &[String]) -> bool {
    phrases.iter().any(|p| folded.contains(p.as_str()))
}

/// Drops a trailing one or two letter fragment, which is a connective
/// ("Ana e", "João da") rather than part of the name.
fn trim_name(raw: &str) -> String {
    let mut words: Vec<&str> = raw.split_whitespace().collect();
    if words.len() > 1 && words.last().map_or(false, |w| w.chars().count() <= 2) {
        words.pop();
    }
    words.join(" ")
}

impl CriteriaExtractor for RuleBasedExtractor {
    fn extract(&self, utterance: &str, neighborhoods: &[String]) -> Vec<FieldUpdate> {
        let folded = text::fold(utterance);
        let vocab = &self.vocabulary;
        let mut updates: Vec<FieldUpdate> = Vec::new();

        if let Some(operation) = self.detect_intent(&folded) {
            updates.push(
                FieldUpdate::new(FieldId::Intent, json!(operation.as_str()))
                    .with_status(FieldStatus::Confirmed),
            );
        }

        let city = vocab.city_for(&folded);
        if let Some(city) = city {
            updates.push(FieldUpdate::new(FieldId::City, json!(city)));
        }

        let neighborhood = self.detect_neighborhood(&folded, neighborhoods);
        if let Some(neighborhood) = neighborhood {
            updates.push(FieldUpdate::new(FieldId::Neighborhood, json!(neighborhood)));
            // A known neighborhood without a city implies the home market.
            if city.is_none() {
                updates.push(FieldUpdate::new(
                    FieldId::City,
                    json!(vocab.default_city.clone()),
                ));
            }
        }

        if let Some(property_type) = vocab.property_type_for(&folded) {
            updates.push(FieldUpdate::new(FieldId::PropertyType, json!(property_type)));
        } else if vocab.is_any_type(&folded) {
            updates.push(FieldUpdate::new(FieldId::PropertyType, json!("qualquer")));
        }

        if let Some(bedrooms) = capture_count(&BEDROOMS, &folded) {
            if bedrooms > 0 {
                updates.push(
                    FieldUpdate::new(FieldId::Bedrooms, json!(bedrooms))
                        .with_status(FieldStatus::Confirmed),
                );
            }
        }
        if let Some(suites) = capture_count(&SUITES, &folded) {
            updates.push(
                FieldUpdate::new(FieldId::Suites, json!(suites))
                    .with_status(FieldStatus::Confirmed),
            );
        }
        // Zero parking spots is a real answer, unlike zero bedrooms.
        if let Some(parking) = capture_count(&PARKING, &folded) {
            updates.push(
                FieldUpdate::new(FieldId::Parking, json!(parking))
                    .with_status(FieldStatus::Confirmed),
            );
        }

        // The condo cap mention is cut out before budget parsing so its
        // amount never lands in the purchase budget.
        let mut budget_input = folded.clone();
        if let Some(condo) = CONDO_CAP.captures(&folded) {
            if let (Some(whole), Some(fragment)) = (condo.get(0), condo.get(1)) {
                let suffix_mult = match condo.get(2).map(|m| m.as_str()) {
                    Some("mil") | Some("k") => 1_000.0,
                    _ => 1.0,
                };
                let cleaned = fragment.as_str().replace('.', "").replace(',', ".");
                if let Ok(base) = cleaned.parse::<f64>() {
                    let value = (base * suffix_mult).round() as i64;
                    if value > 0 {
                        updates.push(
                            FieldUpdate::new(FieldId::CondoFeeCap, json!(value))
                                .with_status(FieldStatus::Confirmed)
                                .with_raw_text(whole.as_str().to_string()),
                        );
                        budget_input.replace_range(whole.range(), "");
                    }
                }
            }
        }
        self.push_budget(&budget_input, &mut updates);

        if let Some(timeline) = vocab.timeline_for(&folded) {
            updates.push(FieldUpdate::new(FieldId::Timeline, json!(timeline.as_str())));
        }

        if let Some(micro) = vocab.micro_location_for(&folded) {
            let status = if micro.is_ambiguous() {
                FieldStatus::Inferred
            } else {
                FieldStatus::Confirmed
            };
            updates.push(
                FieldUpdate::new(FieldId::MicroLocation, json!(micro.as_str()))
                    .with_status(status),
            );
        }

        if let Some(payment) = vocab
            .payment_methods
            .iter()
            .find(|p| folded.contains(p.phrase.as_str()))
        {
            updates.push(FieldUpdate::new(
                FieldId::PaymentMethod,
                json!(payment.canonical.clone()),
            ));
        }

        if let Some(floor) = vocab
            .floor_preferences
            .iter()
            .find(|p| folded.contains(p.phrase.as_str()))
        {
            updates.push(FieldUpdate::new(
                FieldId::FloorPreference,
                json!(floor.canonical.clone()),
            ));
        }

        if let Some(pet) = detect_flag(&folded, &vocab.pet_false, &vocab.pet_true) {
            updates.push(FieldUpdate::new(FieldId::Pet, json!(pet)));
        }
        if let Some(furnished) = detect_flag(&folded, &vocab.furnished_false, &vocab.furnished_true)
        {
            updates.push(FieldUpdate::new(FieldId::Furnished, json!(furnished)));
        }

        if any_match(&folded, &vocab.urgency_high) {
            updates.push(FieldUpdate::new(FieldId::Urgency, json!("high")));
        } else if any_match(&folded, &vocab.urgency_medium) {
            updates.push(FieldUpdate::new(FieldId::Urgency, json!("medium")));
        }

        if any_match(&folded, &vocab.stage_ready_to_visit) {
            updates.push(FieldUpdate::new(FieldId::EngagementStage, json!("ready_to_visit")));
        } else if any_match(&folded, &vocab.stage_negotiating) {
            updates.push(FieldUpdate::new(FieldId::EngagementStage, json!("negotiating")));
        } else if any_match(&folded, &vocab.stage_researching) {
            updates.push(FieldUpdate::new(FieldId::EngagementStage, json!("researching")));
        }

        if let Some(name) = NAME.captures(utterance).and_then(|c| c.get(1)) {
            let name = trim_name(name.as_str());
            if !name.is_empty() {
                updates.push(FieldUpdate::new(FieldId::LeadName, json!(name)));
            }
        }

        if !updates.is_empty() {
            tracing::debug!(
                fields = updates.len(),
                "rule extraction produced updates"
            );
        }
        updates
    }

    fn detect_handoff_request(&self, utterance: &str) -> Option<HandoffReason> {
        self.handoff.classify(&text::fold(utterance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lead_triage_core::UpdateSource;

    fn extractor() -> RuleBasedExtractor {
        RuleBasedExtractor::new(VocabularyConfig::default(), HandoffKeywords::default())
    }

    fn find(updates: &[FieldUpdate], field: FieldId) -> Option<&FieldUpdate> {
        updates.iter().find(|u| u.field == field)
    }

    #[test]
    fn extracts_intent_from_keywords() {
        let updates = extractor().extract("quero comprar um apartamento", &[]);
        let intent = find(&updates, FieldId::Intent).unwrap();
        assert_eq!(intent.value, json!("buy"));
        assert_eq!(intent.status, FieldStatus::Confirmed);
        assert_eq!(intent.source, UpdateSource::LanguageLayer);

        let updates = extractor().extract("procuro aluguel em manaira", &[]);
        assert_eq!(find(&updates, FieldId::Intent).unwrap().value, json!("rent"));
    }

    #[test]
    fn ambiguous_intent_is_skipped() {
        let updates = extractor().extract("não sei se quero comprar ou alugar", &[]);
        assert!(find(&updates, FieldId::Intent).is_none());
    }

    #[test]
    fn neighborhood_implies_default_city() {
        let known = vec!["Manaíra".to_string(), "Tambaú".to_string()];
        let updates = extractor().extract("quero morar em manaíra", &known);
        assert_eq!(find(&updates, FieldId::Neighborhood).unwrap().value, json!("Manaíra"));
        assert_eq!(find(&updates, FieldId::City).unwrap().value, json!("João Pessoa"));
        assert_eq!(find(&updates, FieldId::City).unwrap().status, FieldStatus::Inferred);
    }

    #[test]
    fn explicit_city_suppresses_inference() {
        let known = vec!["Manaíra".to_string()];
        let updates = extractor().extract("em manaira ou algo em recife", &known);
        assert_eq!(find(&updates, FieldId::City).unwrap().value, json!("Recife"));
        assert_eq!(
            updates.iter().filter(|u| u.field == FieldId::City).count(),
            1
        );
    }

    #[test]
    fn counts_require_their_unit_word() {
        let updates = extractor().extract("3 quartos sendo 1 suíte e 2 vagas", &[]);
        assert_eq!(find(&updates, FieldId::Bedrooms).unwrap().value, json!(3));
        assert_eq!(find(&updates, FieldId::Suites).unwrap().value, json!(1));
        assert_eq!(find(&updates, FieldId::Parking).unwrap().value, json!(2));
        assert_eq!(
            find(&updates, FieldId::Bedrooms).unwrap().status,
            FieldStatus::Confirmed
        );
        assert!(find(&updates, FieldId::Budget).is_none());
    }

    #[test]
    fn zero_parking_is_kept_zero_bedrooms_is_not() {
        let updates = extractor().extract("0 vagas serve, 0 quartos não faz sentido", &[]);
        assert_eq!(find(&updates, FieldId::Parking).unwrap().value, json!(0));
        assert!(find(&updates, FieldId::Bedrooms).is_none());
    }

    #[test]
    fn budget_range_sets_min_and_max() {
        let updates = extractor().extract("entre 800 mil e 1 milhão e 200 mil", &[]);
        let max = find(&updates, FieldId::Budget).unwrap();
        let min = find(&updates, FieldId::BudgetMin).unwrap();
        assert_eq!(max.value, json!(1_200_000));
        assert_eq!(min.value, json!(800_000));
        assert_eq!(max.status, FieldStatus::Confirmed);
    }

    #[test]
    fn min_only_budget_leaves_max_unset() {
        let updates = extractor().extract("a partir de 700 mil", &[]);
        assert!(find(&updates, FieldId::Budget).is_none());
        assert_eq!(find(&updates, FieldId::BudgetMin).unwrap().value, json!(700_000));
    }

    #[test]
    fn condo_cap_does_not_pollute_budget() {
        let updates = extractor().extract("condomínio até 800 e orçamento de 900 mil", &[]);
        assert_eq!(find(&updates, FieldId::CondoFeeCap).unwrap().value, json!(800));
        assert_eq!(find(&updates, FieldId::Budget).unwrap().value, json!(900_000));
    }

    #[test]
    fn condo_cap_with_mil_suffix() {
        let updates = extractor().extract("teto de condomínio de 1.2 mil", &[]);
        assert_eq!(find(&updates, FieldId::CondoFeeCap).unwrap().value, json!(1_200));
    }

    #[test]
    fn timeline_and_micro_location_tags() {
        let updates = extractor().extract("mudar em até 6 meses, de preferência beira-mar", &[]);
        assert_eq!(find(&updates, FieldId::Timeline).unwrap().value, json!("6_months"));
        let micro = find(&updates, FieldId::MicroLocation).unwrap();
        assert_eq!(micro.value, json!("beachfront"));
        assert_eq!(micro.status, FieldStatus::Confirmed);
    }

    #[test]
    fn coastal_mention_stays_inferred() {
        let updates = extractor().extract("algo perto da praia", &[]);
        let micro = find(&updates, FieldId::MicroLocation).unwrap();
        assert_eq!(micro.value, json!("coast_area"));
        assert_eq!(micro.status, FieldStatus::Inferred);
    }

    #[test]
    fn negated_flags_win_over_positive_words() {
        let updates = extractor().extract("sem pet e sem mobília", &[]);
        assert_eq!(find(&updates, FieldId::Pet).unwrap().value, json!(false));
        assert_eq!(find(&updates, FieldId::Furnished).unwrap().value, json!(false));

        let updates = extractor().extract("tenho um gato, mobiliado de preferência", &[]);
        assert_eq!(find(&updates, FieldId::Pet).unwrap().value, json!(true));
        assert_eq!(find(&updates, FieldId::Furnished).unwrap().value, json!(true));
    }

    #[test]
    fn urgency_and_stage_lexicons() {
        let updates = extractor().extract("é urgente, quero visitar essa semana", &[]);
        assert_eq!(find(&updates, FieldId::Urgency).unwrap().value, json!("high"));
        assert_eq!(
            find(&updates, FieldId::EngagementStage).unwrap().value,
            json!("ready_to_visit")
        );
    }

    #[test]
    fn name_capture_keeps_casing() {
        let updates = extractor().extract("Meu nome é Ana Luiza", &[]);
        assert_eq!(find(&updates, FieldId::LeadName).unwrap().value, json!("Ana Luiza"));

        let updates = extractor().extract("me chamo João e procuro apto", &[]);
        assert_eq!(find(&updates, FieldId::LeadName).unwrap().value, json!("João"));
    }

    #[test]
    fn payment_method_is_canonicalized() {
        let updates = extractor().extract("pretendo financiar pelo banco", &[]);
        assert_eq!(
            find(&updates, FieldId::PaymentMethod).unwrap().value,
            json!("financiamento")
        );
    }

    #[test]
    fn empty_message_extracts_nothing() {
        assert!(extractor().extract("", &[]).is_empty());
        assert!(extractor().extract("ok", &[]).is_empty());
    }

    #[test]
    fn handoff_detection_delegates_to_keywords() {
        let extractor = extractor();
        assert_eq!(
            extractor.detect_handoff_request("quero falar com atendente"),
            Some(HandoffReason::HumanRequested)
        );
        assert_eq!(extractor.detect_handoff_request("quero um studio"), None);
    }
}
