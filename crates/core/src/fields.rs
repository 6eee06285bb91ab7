//! Criteria fields: closed identifiers, typed values, and provenance.
//!
//! Fields are a closed enumeration rather than a string-keyed bag so the
//! critical/preference orderings are checked exhaustively at compile time.

use serde::{Deserialize, Serialize};

use crate::lead::{EngagementStage, MicroLocation, Operation, Timeline, UrgencyLevel};

/// Identifier of a criteria slot tracked per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldId {
    Intent,
    City,
    Neighborhood,
    PropertyType,
    Bedrooms,
    Suites,
    Parking,
    Budget,
    BudgetMin,
    Timeline,
    MicroLocation,
    CondoFeeCap,
    PaymentMethod,
    Pet,
    Furnished,
    FloorPreference,
    Urgency,
    EngagementStage,
    LeadName,
    LeadPhone,
    LeadEmail,
}

impl FieldId {
    /// Fields required before a lead can be routed, in ask order.
    pub const CRITICAL: [FieldId; 8] = [
        FieldId::Intent,
        FieldId::City,
        FieldId::Neighborhood,
        FieldId::PropertyType,
        FieldId::Bedrooms,
        FieldId::Parking,
        FieldId::Budget,
        FieldId::Timeline,
    ];

    /// Secondary fields asked once the critical set is resolved, in ask order.
    pub const PREFERENCE: [FieldId; 5] = [
        FieldId::MicroLocation,
        FieldId::LeadName,
        FieldId::BudgetMin,
        FieldId::CondoFeeCap,
        FieldId::FloorPreference,
    ];

    pub fn is_critical(&self) -> bool {
        Self::CRITICAL.contains(self)
    }

    pub fn is_identity(&self) -> bool {
        matches!(
            self,
            FieldId::LeadName | FieldId::LeadPhone | FieldId::LeadEmail
        )
    }

    /// Canonical snake_case name, stable across the wire and the logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldId::Intent => "intent",
            FieldId::City => "city",
            FieldId::Neighborhood => "neighborhood",
            FieldId::PropertyType => "property_type",
            FieldId::Bedrooms => "bedrooms",
            FieldId::Suites => "suites",
            FieldId::Parking => "parking",
            FieldId::Budget => "budget",
            FieldId::BudgetMin => "budget_min",
            FieldId::Timeline => "timeline",
            FieldId::MicroLocation => "micro_location",
            FieldId::CondoFeeCap => "condo_fee_cap",
            FieldId::PaymentMethod => "payment_method",
            FieldId::Pet => "pet",
            FieldId::Furnished => "furnished",
            FieldId::FloorPreference => "floor_preference",
            FieldId::Urgency => "urgency",
            FieldId::EngagementStage => "engagement_stage",
            FieldId::LeadName => "lead_name",
            FieldId::LeadPhone => "lead_phone",
            FieldId::LeadEmail => "lead_email",
        }
    }

    /// Resolves a caller-supplied field name, including the aliases the
    /// language layer and older clients use, to a canonical identifier.
    pub fn resolve(name: &str) -> Option<FieldId> {
        let key: String = name
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '-' || c == ' ' { '_' } else { c })
            .collect();
        let id = match key.as_str() {
            "intent" | "operation" | "operacao" | "operação" => FieldId::Intent,
            "city" | "cidade" => FieldId::City,
            "neighborhood" | "bairro" => FieldId::Neighborhood,
            "property_type" | "tipo" | "tipo_imovel" => FieldId::PropertyType,
            "bedrooms" | "quartos" => FieldId::Bedrooms,
            "suites" | "suite" | "suíte" | "suítes" => FieldId::Suites,
            "parking" | "vagas" | "garagem" => FieldId::Parking,
            "budget" | "budget_max" | "orcamento" | "orçamento" | "valor" => FieldId::Budget,
            "budget_min" | "orcamento_minimo" => FieldId::BudgetMin,
            "timeline" | "prazo" => FieldId::Timeline,
            "micro_location" | "distancia_praia" => FieldId::MicroLocation,
            "condo_fee_cap" | "condo_max" | "condominio" | "condomínio" => FieldId::CondoFeeCap,
            "payment_method" | "payment_type" | "pagamento" => FieldId::PaymentMethod,
            "pet" | "pets" | "animal" => FieldId::Pet,
            "furnished" | "mobiliado" => FieldId::Furnished,
            "floor_preference" | "andar" => FieldId::FloorPreference,
            "urgency" | "urgencia" | "urgência" => FieldId::Urgency,
            "engagement_stage" | "intent_stage" | "estagio" => FieldId::EngagementStage,
            "lead_name" | "name" | "nome" => FieldId::LeadName,
            "lead_phone" | "phone" | "telefone" => FieldId::LeadPhone,
            "lead_email" | "email" => FieldId::LeadEmail,
            _ => return None,
        };
        Some(id)
    }
}

impl std::fmt::Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Topic the question selector can ask about. Most topics map 1:1 to a
/// field; `CityConfirm` is the confirmation sub-question for an inferred
/// city and has no field of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AskTopic {
    Intent,
    City,
    CityConfirm,
    Neighborhood,
    MicroLocation,
    PropertyType,
    Bedrooms,
    Suites,
    Parking,
    Budget,
    BudgetMin,
    Timeline,
    CondoFeeCap,
    PaymentMethod,
    FloorPreference,
    LeadName,
}

impl AskTopic {
    pub fn for_field(field: FieldId) -> Option<AskTopic> {
        let topic = match field {
            FieldId::Intent => AskTopic::Intent,
            FieldId::City => AskTopic::City,
            FieldId::Neighborhood => AskTopic::Neighborhood,
            FieldId::MicroLocation => AskTopic::MicroLocation,
            FieldId::PropertyType => AskTopic::PropertyType,
            FieldId::Bedrooms => AskTopic::Bedrooms,
            FieldId::Suites => AskTopic::Suites,
            FieldId::Parking => AskTopic::Parking,
            FieldId::Budget => AskTopic::Budget,
            FieldId::BudgetMin => AskTopic::BudgetMin,
            FieldId::Timeline => AskTopic::Timeline,
            FieldId::CondoFeeCap => AskTopic::CondoFeeCap,
            FieldId::PaymentMethod => AskTopic::PaymentMethod,
            FieldId::FloorPreference => AskTopic::FloorPreference,
            FieldId::LeadName => AskTopic::LeadName,
            _ => return None,
        };
        Some(topic)
    }

    /// The field this topic fills, if any (`CityConfirm` re-targets city).
    pub fn field(&self) -> Option<FieldId> {
        let field = match self {
            AskTopic::Intent => FieldId::Intent,
            AskTopic::City | AskTopic::CityConfirm => FieldId::City,
            AskTopic::Neighborhood => FieldId::Neighborhood,
            AskTopic::MicroLocation => FieldId::MicroLocation,
            AskTopic::PropertyType => FieldId::PropertyType,
            AskTopic::Bedrooms => FieldId::Bedrooms,
            AskTopic::Suites => FieldId::Suites,
            AskTopic::Parking => FieldId::Parking,
            AskTopic::Budget => FieldId::Budget,
            AskTopic::BudgetMin => FieldId::BudgetMin,
            AskTopic::Timeline => FieldId::Timeline,
            AskTopic::CondoFeeCap => FieldId::CondoFeeCap,
            AskTopic::PaymentMethod => FieldId::PaymentMethod,
            AskTopic::FloorPreference => FieldId::FloorPreference,
            AskTopic::LeadName => FieldId::LeadName,
        };
        Some(field)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AskTopic::Intent => "intent",
            AskTopic::City => "city",
            AskTopic::CityConfirm => "city_confirm",
            AskTopic::Neighborhood => "neighborhood",
            AskTopic::MicroLocation => "micro_location",
            AskTopic::PropertyType => "property_type",
            AskTopic::Bedrooms => "bedrooms",
            AskTopic::Suites => "suites",
            AskTopic::Parking => "parking",
            AskTopic::Budget => "budget",
            AskTopic::BudgetMin => "budget_min",
            AskTopic::Timeline => "timeline",
            AskTopic::CondoFeeCap => "condo_fee_cap",
            AskTopic::PaymentMethod => "payment_method",
            AskTopic::FloorPreference => "floor_preference",
            AskTopic::LeadName => "lead_name",
        }
    }
}

impl std::fmt::Display for AskTopic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confidence status carried by every stored field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    Confirmed,
    Inferred,
    Override,
}

/// Where an update came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateSource {
    User,
    LanguageLayer,
    System,
}

/// Canonical typed value of a criteria field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Count(u32),
    Money(i64),
    Flag(bool),
    Operation(Operation),
    Timeline(Timeline),
    MicroLocation(MicroLocation),
    Urgency(UrgencyLevel),
    Stage(EngagementStage),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_count(&self) -> Option<u32> {
        match self {
            FieldValue::Count(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_money(&self) -> Option<i64> {
        match self {
            FieldValue::Money(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_operation(&self) -> Option<Operation> {
        match self {
            FieldValue::Operation(op) => Some(*op),
            _ => None,
        }
    }

    pub fn as_timeline(&self) -> Option<Timeline> {
        match self {
            FieldValue::Timeline(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_micro_location(&self) -> Option<MicroLocation> {
        match self {
            FieldValue::MicroLocation(m) => Some(*m),
            _ => None,
        }
    }

    /// Untagged JSON rendering for summaries and audit records.
    pub fn to_plain_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Text(s) => serde_json::Value::String(s.clone()),
            FieldValue::Count(n) => serde_json::Value::from(*n),
            FieldValue::Money(v) => serde_json::Value::from(*v),
            FieldValue::Flag(b) => serde_json::Value::Bool(*b),
            FieldValue::Operation(op) => serde_json::Value::String(op.as_str().to_string()),
            FieldValue::Timeline(t) => serde_json::Value::String(t.as_str().to_string()),
            FieldValue::MicroLocation(m) => serde_json::Value::String(m.as_str().to_string()),
            FieldValue::Urgency(u) => serde_json::Value::String(u.as_str().to_string()),
            FieldValue::Stage(s) => serde_json::Value::String(s.as_str().to_string()),
        }
    }
}

impl std::fmt::Display for FieldValue {
    /// Human-readable Portuguese rendering, used in clarification prompts.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Count(n) => write!(f, "{}", n),
            FieldValue::Money(v) => f.write_str(&crate::lead::format_brl(*v)),
            FieldValue::Flag(b) => f.write_str(if *b { "sim" } else { "não" }),
            FieldValue::Operation(op) => f.write_str(op.label_pt()),
            FieldValue::Timeline(t) => f.write_str(t.label_pt()),
            FieldValue::MicroLocation(m) => f.write_str(m.label_pt()),
            FieldValue::Urgency(u) => f.write_str(u.as_str()),
            FieldValue::Stage(s) => f.write_str(s.as_str()),
        }
    }
}

/// A stored criteria slot with provenance.
///
/// `updated_at_turn` is the session turn counter, not wall clock, so update
/// ordering stays deterministic in tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriteriaField {
    pub value: FieldValue,
    pub status: FieldStatus,
    pub source: UpdateSource,
    pub updated_at_turn: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
}

/// One incoming field update, before normalization. `value` is raw JSON as
/// received from the language layer or the API caller; the engine's
/// normalizer converts it to a `FieldValue` or drops it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldUpdate {
    pub field: FieldId,
    pub value: serde_json::Value,
    #[serde(default = "default_status")]
    pub status: FieldStatus,
    #[serde(default = "default_source")]
    pub source: UpdateSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
}

fn default_status() -> FieldStatus {
    FieldStatus::Inferred
}

fn default_source() -> UpdateSource {
    UpdateSource::LanguageLayer
}

impl FieldUpdate {
    pub fn new(field: FieldId, value: serde_json::Value) -> Self {
        Self {
            field,
            value,
            status: FieldStatus::Inferred,
            source: UpdateSource::LanguageLayer,
            raw_text: None,
        }
    }

    pub fn confirmed(field: FieldId, value: serde_json::Value) -> Self {
        Self {
            field,
            value,
            status: FieldStatus::Confirmed,
            source: UpdateSource::User,
            raw_text: None,
        }
    }

    pub fn with_status(mut self, status: FieldStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_source(mut self, source: UpdateSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_raw_text(mut self, raw: impl Into<String>) -> Self {
        self.raw_text = Some(raw.into());
        self
    }
}

/// A rejected overwrite of a confirmed field. Not an error: the caller is
/// expected to issue a clarification turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldConflict {
    pub field: FieldId,
    pub previous: FieldValue,
    pub new: FieldValue,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_canonical_names() {
        for field in FieldId::CRITICAL {
            assert_eq!(FieldId::resolve(field.as_str()), Some(field));
        }
        for field in FieldId::PREFERENCE {
            assert_eq!(FieldId::resolve(field.as_str()), Some(field));
        }
    }

    #[test]
    fn resolve_aliases() {
        assert_eq!(FieldId::resolve("operation"), Some(FieldId::Intent));
        assert_eq!(FieldId::resolve("budget-max"), Some(FieldId::Budget));
        assert_eq!(FieldId::resolve("orcamento"), Some(FieldId::Budget));
        assert_eq!(FieldId::resolve("bairro"), Some(FieldId::Neighborhood));
        assert_eq!(FieldId::resolve("condo_max"), Some(FieldId::CondoFeeCap));
        assert_eq!(FieldId::resolve("payment_type"), Some(FieldId::PaymentMethod));
        assert_eq!(FieldId::resolve("Nome"), Some(FieldId::LeadName));
        assert_eq!(FieldId::resolve("unknown_field"), None);
    }

    #[test]
    fn critical_order_is_fixed() {
        let names: Vec<&str> = FieldId::CRITICAL.iter().map(|f| f.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "intent",
                "city",
                "neighborhood",
                "property_type",
                "bedrooms",
                "parking",
                "budget",
                "timeline"
            ]
        );
    }

    #[test]
    fn topic_field_round_trip() {
        assert_eq!(AskTopic::for_field(FieldId::City), Some(AskTopic::City));
        assert_eq!(AskTopic::CityConfirm.field(), Some(FieldId::City));
        assert_eq!(AskTopic::for_field(FieldId::Urgency), None);
    }

    #[test]
    fn field_value_serde_is_tagged() {
        let v = FieldValue::Money(800_000);
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["type"], "money");
        assert_eq!(json["value"], 800_000);
        let back: FieldValue = serde_json::from_value(json).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn plain_json_rendering() {
        assert_eq!(
            FieldValue::Operation(Operation::Buy).to_plain_json(),
            serde_json::json!("buy")
        );
        assert_eq!(
            FieldValue::Count(3).to_plain_json(),
            serde_json::json!(3)
        );
    }
}
