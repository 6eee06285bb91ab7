//! Extraction Vocabulary
//!
//! Keyword and phrase lexicons driving the rule-based extractor and the
//! refusal/handoff detectors. Every phrase is stored lowercase and
//! accent-folded; callers must fold the utterance the same way before
//! matching. Matching is first-entry-wins, so more specific phrases come
//! before generic ones in each list.

use lead_triage_core::{HandoffReason, MicroLocation, Timeline};
use serde::{Deserialize, Serialize};

/// A canonical property type with its spoken aliases
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyTypeEntry {
    pub canonical: String,
    pub aliases: Vec<String>,
}

/// A folded city alias mapped to its display form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityAlias {
    pub alias: String,
    pub canonical: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelinePhrases {
    pub timeline: Timeline,
    pub phrases: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MicroLocationPhrases {
    pub location: MicroLocation,
    pub phrases: Vec<String>,
}

/// A spoken phrase mapped to a canonical stored value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhraseAlias {
    pub phrase: String,
    pub canonical: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyConfig {
    #[serde(default = "default_city")]
    pub default_city: String,
    #[serde(default = "default_rent_keywords")]
    pub rent_keywords: Vec<String>,
    #[serde(default = "default_buy_keywords")]
    pub buy_keywords: Vec<String>,
    /// Stem fallback when no full rent keyword matched
    #[serde(default = "default_rent_stem")]
    pub rent_stem: String,
    /// Stem fallback when no full buy keyword matched
    #[serde(default = "default_buy_stem")]
    pub buy_stem: String,
    #[serde(default = "default_refusal_phrases")]
    pub refusal_phrases: Vec<String>,
    #[serde(default = "default_greetings")]
    pub greetings: Vec<String>,
    #[serde(default = "default_property_types")]
    pub property_types: Vec<PropertyTypeEntry>,
    /// Spoken forms meaning "any property type works"
    #[serde(default = "default_any_type_phrases")]
    pub any_type_phrases: Vec<String>,
    #[serde(default = "default_city_aliases")]
    pub city_aliases: Vec<CityAlias>,
    #[serde(default = "default_timeline_phrases")]
    pub timeline_phrases: Vec<TimelinePhrases>,
    #[serde(default = "default_micro_location_phrases")]
    pub micro_location_phrases: Vec<MicroLocationPhrases>,
    #[serde(default = "default_payment_methods")]
    pub payment_methods: Vec<PhraseAlias>,
    #[serde(default = "default_floor_preferences")]
    pub floor_preferences: Vec<PhraseAlias>,
    /// Checked before `pet_true`; negations contain the positive words
    #[serde(default = "default_pet_false")]
    pub pet_false: Vec<String>,
    #[serde(default = "default_pet_true")]
    pub pet_true: Vec<String>,
    /// Checked before `furnished_true`
    #[serde(default = "default_furnished_false")]
    pub furnished_false: Vec<String>,
    #[serde(default = "default_furnished_true")]
    pub furnished_true: Vec<String>,
    #[serde(default = "default_urgency_high")]
    pub urgency_high: Vec<String>,
    #[serde(default = "default_urgency_medium")]
    pub urgency_medium: Vec<String>,
    #[serde(default = "default_stage_researching")]
    pub stage_researching: Vec<String>,
    #[serde(default = "default_stage_ready_to_visit")]
    pub stage_ready_to_visit: Vec<String>,
    #[serde(default = "default_stage_negotiating")]
    pub stage_negotiating: Vec<String>,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            default_city: default_city(),
            rent_keywords: default_rent_keywords(),
            buy_keywords: default_buy_keywords(),
            rent_stem: default_rent_stem(),
            buy_stem: default_buy_stem(),
            refusal_phrases: default_refusal_phrases(),
            greetings: default_greetings(),
            property_types: default_property_types(),
            any_type_phrases: default_any_type_phrases(),
            city_aliases: default_city_aliases(),
            timeline_phrases: default_timeline_phrases(),
            micro_location_phrases: default_micro_location_phrases(),
            payment_methods: default_payment_methods(),
            floor_preferences: default_floor_preferences(),
            pet_false: default_pet_false(),
            pet_true: default_pet_true(),
            furnished_false: default_furnished_false(),
            furnished_true: default_furnished_true(),
            urgency_high: default_urgency_high(),
            urgency_medium: default_urgency_medium(),
            stage_researching: default_stage_researching(),
            stage_ready_to_visit: default_stage_ready_to_visit(),
            stage_negotiating: default_stage_negotiating(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn default_city() -> String {
    "João Pessoa".to_string()
}

fn default_rent_keywords() -> Vec<String> {
    strings(&["alugar", "aluguel", "locacao", "alugo", "para alugar"])
}

fn default_buy_keywords() -> Vec<String> {
    strings(&["comprar", "compra", "adquirir", "investir", "investimento"])
}

fn default_rent_stem() -> String {
    "alug".to_string()
}

fn default_buy_stem() -> String {
    "venda".to_string()
}

fn default_refusal_phrases() -> Vec<String> {
    strings(&[
        "nao sei",
        "nao tenho certeza",
        "nao informo",
        "prefiro nao",
        "nao quero",
        "pular",
        "proxima",
        "nao importa",
        "tanto faz",
        "qualquer",
        "depois",
        "ainda nao",
    ])
}

fn default_greetings() -> Vec<String> {
    strings(&["oi", "ola", "bom dia", "boa tarde", "boa noite", "e ai", "opa"])
}

fn default_property_types() -> Vec<PropertyTypeEntry> {
    let entry = |canonical: &str, aliases: &[&str]| PropertyTypeEntry {
        canonical: canonical.to_string(),
        aliases: strings(aliases),
    };
    vec![
        entry("apartamento", &["apartamento", "apto", "ape", "ap"]),
        entry("casa", &["casa", "sobrado"]),
        entry("cobertura", &["cobertura"]),
        entry("studio", &["studio", "st"]),
        entry("flat", &["flat"]),
        entry("kitnet", &["kitnet", "kitinete", "kit"]),
        entry("terreno", &["terreno", "lote"]),
    ]
}

fn default_any_type_phrases() -> Vec<String> {
    strings(&["qualquer tipo", "qualquer um", "tanto faz"])
}

fn default_city_aliases() -> Vec<CityAlias> {
    let alias = |alias: &str, canonical: &str| CityAlias {
        alias: alias.to_string(),
        canonical: canonical.to_string(),
    };
    vec![
        alias("joao pessoa", "João Pessoa"),
        alias("campina grande", "Campina Grande"),
        alias("recife", "Recife"),
        alias("natal", "Natal"),
        alias("cabedelo", "Cabedelo"),
    ]
}

fn default_timeline_phrases() -> Vec<TimelinePhrases> {
    let phrases = |timeline: Timeline, list: &[&str]| TimelinePhrases {
        timeline,
        phrases: strings(list),
    };
    vec![
        phrases(
            Timeline::ThirtyDays,
            &["30 dias", "trinta dias", "imediato", "este mes", "esse mes", "mes que vem"],
        ),
        phrases(
            Timeline::ThreeMonths,
            &["3 meses", "tres meses", "90 dias", "trimestre"],
        ),
        phrases(Timeline::SixMonths, &["6 meses", "seis meses", "semestre"]),
        phrases(
            Timeline::TwelveMonths,
            &["12 meses", "doze meses", "1 ano", "um ano", "ano que vem"],
        ),
        phrases(
            Timeline::Flexible,
            &["flexivel", "sem pressa", "sem prazo", "nao tenho pressa"],
        ),
    ]
}

fn default_micro_location_phrases() -> Vec<MicroLocationPhrases> {
    let phrases = |location: MicroLocation, list: &[&str]| MicroLocationPhrases {
        location,
        phrases: strings(list),
    };
    vec![
        phrases(
            MicroLocation::Beachfront,
            &["beira-mar", "beira mar", "beiramar", "frente mar", "frente para o mar", "pe na areia"],
        ),
        phrases(
            MicroLocation::OneBlock,
            &["1 quadra", "uma quadra", "primeira quadra"],
        ),
        phrases(
            MicroLocation::TwoToThreeBlocks,
            &["2-3 quadras", "2 a 3 quadras", "2 quadras", "duas quadras", "3 quadras", "tres quadras"],
        ),
        phrases(
            MicroLocation::BeyondThreeBlocks,
            &["mais de 3 quadras", "longe da praia", "afastado da praia"],
        ),
        phrases(
            MicroLocation::CoastArea,
            &["orla", "perto da praia", "proximo da praia", "proximo a praia", "perto do mar"],
        ),
    ]
}

fn default_payment_methods() -> Vec<PhraseAlias> {
    let alias = |phrase: &str, canonical: &str| PhraseAlias {
        phrase: phrase.to_string(),
        canonical: canonical.to_string(),
    };
    vec![
        alias("financiamento", "financiamento"),
        alias("financiar", "financiamento"),
        alias("financiado", "financiamento"),
        alias("a vista", "a_vista"),
        alias("fgts", "fgts"),
        alias("misto", "misto"),
        alias("consorcio", "consorcio"),
    ]
}

fn default_floor_preferences() -> Vec<PhraseAlias> {
    let alias = |phrase: &str, canonical: &str| PhraseAlias {
        phrase: phrase.to_string(),
        canonical: canonical.to_string(),
    };
    vec![
        alias("andar alto", "alto"),
        alias("andar baixo", "baixo"),
        alias("terreo", "terreo"),
    ]
}

fn default_pet_false() -> Vec<String> {
    strings(&["nao aceita pet", "sem pet", "nao tenho pet"])
}

fn default_pet_true() -> Vec<String> {
    strings(&["aceita pet", "pet friendly", "pet", "cachorro", "gato"])
}

fn default_furnished_false() -> Vec<String> {
    strings(&["sem mobilia", "nao mobiliado", "sem moveis"])
}

fn default_furnished_true() -> Vec<String> {
    strings(&["mobiliado", "mobiliada", "mobilia", "moveis"])
}

fn default_urgency_high() -> Vec<String> {
    strings(&["urgente", "hoje", "agora", "esse mes", "o quanto antes"])
}

fn default_urgency_medium() -> Vec<String> {
    strings(&["proximo mes", "duas semanas", "em breve"])
}

fn default_stage_researching() -> Vec<String> {
    strings(&["so pesquisando", "pesquisando", "so olhando", "dando uma olhada", "curiosidade"])
}

fn default_stage_ready_to_visit() -> Vec<String> {
    strings(&["quero visitar", "agendar visita", "marcar visita", "posso visitar"])
}

fn default_stage_negotiating() -> Vec<String> {
    strings(&["fazer proposta", "fazer uma proposta", "negociar valor", "fechar negocio"])
}

impl VocabularyConfig {
    /// Canonical property type when any alias appears as a whole word,
    /// singular or plural. Entries are checked in declaration order.
    pub fn property_type_for(&self, folded: &str) -> Option<&str> {
        let tokens: Vec<&str> = folded
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();
        for entry in &self.property_types {
            for alias in &entry.aliases {
                let hit = tokens.iter().any(|t| {
                    *t == alias.as_str()
                        || t.strip_suffix('s').is_some_and(|stem| stem == alias.as_str())
                });
                if hit {
                    return Some(&entry.canonical);
                }
            }
        }
        None
    }

    pub fn is_any_type(&self, folded: &str) -> bool {
        self.any_type_phrases.iter().any(|p| folded.contains(p.as_str()))
    }

    pub fn city_for(&self, folded: &str) -> Option<&str> {
        self.city_aliases
            .iter()
            .find(|c| folded.contains(c.alias.as_str()))
            .map(|c| c.canonical.as_str())
    }

    pub fn timeline_for(&self, folded: &str) -> Option<Timeline> {
        for entry in &self.timeline_phrases {
            if entry.phrases.iter().any(|p| folded.contains(p.as_str())) {
                return Some(entry.timeline);
            }
        }
        None
    }

    pub fn micro_location_for(&self, folded: &str) -> Option<MicroLocation> {
        for entry in &self.micro_location_phrases {
            if entry.phrases.iter().any(|p| folded.contains(p.as_str())) {
                return Some(entry.location);
            }
        }
        None
    }

    pub fn is_refusal(&self, folded: &str) -> bool {
        self.refusal_phrases.iter().any(|p| folded.contains(p.as_str()))
    }

    /// Greeting check for the post-completion reset. Exact match on the
    /// trimmed message, so "oi" resets but "oi, e sobre o contrato?" does
    /// not.
    pub fn is_greeting(&self, folded: &str) -> bool {
        let trimmed = folded.trim().trim_end_matches(['!', '.', ',']);
        self.greetings.iter().any(|g| g == trimmed)
    }
}

/// Keyword classes that request an immediate human handoff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandoffKeywords {
    #[serde(default = "default_human")]
    pub human: Vec<String>,
    #[serde(default = "default_negotiation")]
    pub negotiation: Vec<String>,
    #[serde(default = "default_visit")]
    pub visit: Vec<String>,
    #[serde(default = "default_complaint")]
    pub complaint: Vec<String>,
    #[serde(default = "default_legal")]
    pub legal: Vec<String>,
}

impl Default for HandoffKeywords {
    fn default() -> Self {
        Self {
            human: default_human(),
            negotiation: default_negotiation(),
            visit: default_visit(),
            complaint: default_complaint(),
            legal: default_legal(),
        }
    }
}

fn default_human() -> Vec<String> {
    strings(&[
        "falar com humano",
        "falar com pessoa",
        "atendente",
        "corretor humano",
        "pessoa real",
    ])
}

fn default_negotiation() -> Vec<String> {
    strings(&["desconto", "negociar", "baixar preco", "consegue baixar"])
}

fn default_visit() -> Vec<String> {
    strings(&[
        "agendar visita",
        "marcar visita",
        "quero visitar",
        "visita presencial",
        "visita virtual",
    ])
}

fn default_complaint() -> Vec<String> {
    strings(&["reclamacao", "pessimo", "muito ruim", "horrivel"])
}

fn default_legal() -> Vec<String> {
    strings(&["contrato", "juridico", "advogado", "documentacao"])
}

impl HandoffKeywords {
    /// First matching class wins, in escalation-priority order.
    pub fn classify(&self, folded: &str) -> Option<HandoffReason> {
        let groups = [
            (&self.human, HandoffReason::HumanRequested),
            (&self.negotiation, HandoffReason::Negotiation),
            (&self.visit, HandoffReason::VisitRequest),
            (&self.complaint, HandoffReason::Complaint),
            (&self.legal, HandoffReason::Legal),
        ];
        for (keywords, reason) in groups {
            if keywords.iter().any(|k| folded.contains(k.as_str())) {
                return Some(reason);
            }
        }
        None
    }
}
