//! Triage summary: the structured handoff record and its short
//! human-readable rendering.

use lead_triage_core::{EngagementStage, FieldId, LeadIdentity, LeadScore};
use serde::Serialize;

use crate::session::SessionState;

/// Field order of the structured summary and the bullet rendering.
const SUMMARY_ORDER: [FieldId; 11] = [
    FieldId::Intent,
    FieldId::City,
    FieldId::Neighborhood,
    FieldId::MicroLocation,
    FieldId::PropertyType,
    FieldId::Bedrooms,
    FieldId::Suites,
    FieldId::Parking,
    FieldId::Budget,
    FieldId::BudgetMin,
    FieldId::Timeline,
];

/// Structured record handed to the CRM/dispatch side on completion.
#[derive(Debug, Clone, Serialize)]
pub struct TriageSummary {
    pub session_id: String,
    pub lead_profile: LeadIdentity,
    pub critical: serde_json::Value,
    pub preferences: serde_json::Value,
    pub lead_score: LeadScore,
    pub status: &'static str,
    pub intent_stage: &'static str,
}

impl TriageSummary {
    pub fn build(state: &SessionState, lead_score: LeadScore) -> Self {
        let mut critical = serde_json::Map::new();
        for field in SUMMARY_ORDER {
            let value = state
                .value(field)
                .map(|v| v.to_plain_json())
                .unwrap_or(serde_json::Value::Null);
            critical.insert(field.as_str().to_string(), value);
        }

        let mut preferences = serde_json::Map::new();
        for (field, stored) in &state.criteria {
            if SUMMARY_ORDER.contains(field)
                || field.is_identity()
                || *field == FieldId::EngagementStage
            {
                continue;
            }
            preferences.insert(field.as_str().to_string(), stored.value.to_plain_json());
        }

        Self {
            session_id: state.session_id.clone(),
            lead_profile: state.identity.clone(),
            critical: serde_json::Value::Object(critical),
            preferences: serde_json::Value::Object(preferences),
            lead_score,
            status: "triage_completed",
            intent_stage: state.stage().as_str(),
        }
    }
}

/// Bullet summary shown to the lead before the handoff line. Unset
/// fields are skipped; the minimum budget stays payload-only.
pub fn render_summary_text(state: &SessionState, header: &str) -> String {
    let mut bullets: Vec<String> = Vec::new();
    for field in SUMMARY_ORDER {
        if field == FieldId::BudgetMin {
            continue;
        }
        let Some(value) = state.value(field) else {
            continue;
        };
        bullets.push(format!("{}: {}", bullet_label(field), value));
    }
    match state.stage() {
        EngagementStage::Unknown => {}
        stage => bullets.push(format!("Fase: {}", stage_label_pt(stage))),
    }
    if bullets.is_empty() {
        return String::new();
    }
    format!("{}\n- {}", header, bullets.join("\n- "))
}

fn bullet_label(field: FieldId) -> &'static str {
    match field {
        FieldId::Intent => "Operação",
        FieldId::City => "Cidade",
        FieldId::Neighborhood => "Bairro",
        FieldId::MicroLocation => "Micro-localização",
        FieldId::PropertyType => "Tipo",
        FieldId::Bedrooms => "Quartos",
        FieldId::Suites => "Suítes",
        FieldId::Parking => "Vagas",
        FieldId::Budget => "Orçamento máx.",
        FieldId::Timeline => "Prazo",
        _ => field.as_str(),
    }
}

fn stage_label_pt(stage: EngagementStage) -> &'static str {
    match stage {
        EngagementStage::Unknown => "desconhecida",
        EngagementStage::Researching => "pesquisando",
        EngagementStage::ReadyToVisit => "pronto para visitar",
        EngagementStage::Negotiating => "negociando",
    }
}

/// Portuguese field label used in clarification prompts.
pub fn field_label_pt(field: FieldId) -> &'static str {
    match field {
        FieldId::Intent => "a operação",
        FieldId::City => "a cidade",
        FieldId::Neighborhood => "o bairro",
        FieldId::MicroLocation => "a distância da praia",
        FieldId::PropertyType => "o tipo de imóvel",
        FieldId::Bedrooms => "o número de quartos",
        FieldId::Suites => "o número de suítes",
        FieldId::Parking => "as vagas",
        FieldId::Budget => "o orçamento",
        FieldId::BudgetMin => "o valor mínimo",
        FieldId::CondoFeeCap => "o teto de condomínio",
        FieldId::PaymentMethod => "a forma de pagamento",
        FieldId::FloorPreference => "a preferência de andar",
        FieldId::Timeline => "o prazo",
        FieldId::Pet => "a questão do pet",
        FieldId::Furnished => "a mobília",
        FieldId::Urgency => "a urgência",
        FieldId::EngagementStage => "a fase da busca",
        FieldId::LeadName => "o nome",
        FieldId::LeadPhone => "o telefone",
        FieldId::LeadEmail => "o e-mail",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lead_triage_config::VocabularyConfig;
    use lead_triage_core::{FieldUpdate, Temperature};
    use serde_json::json;

    fn confirmed(state: &mut SessionState, field: FieldId, value: serde_json::Value) {
        let conflicts = state.apply_updates(
            &[FieldUpdate::confirmed(field, value)],
            &VocabularyConfig::default(),
        );
        assert!(conflicts.is_empty());
    }

    fn score() -> LeadScore {
        LeadScore {
            score: 90,
            temperature: Temperature::Hot,
            reasons: vec!["budget_defined".to_string()],
        }
    }

    fn session() -> SessionState {
        let mut state = SessionState::new("s1");
        confirmed(&mut state, FieldId::Intent, json!("comprar"));
        confirmed(&mut state, FieldId::City, json!("João Pessoa"));
        confirmed(&mut state, FieldId::Neighborhood, json!("Manaíra"));
        confirmed(&mut state, FieldId::MicroLocation, json!("beira-mar"));
        confirmed(&mut state, FieldId::PropertyType, json!("apartamento"));
        confirmed(&mut state, FieldId::Bedrooms, json!(3));
        confirmed(&mut state, FieldId::Parking, json!(2));
        confirmed(&mut state, FieldId::Budget, json!(800_000));
        confirmed(&mut state, FieldId::Timeline, json!("3_months"));
        confirmed(&mut state, FieldId::PaymentMethod, json!("financiamento"));
        confirmed(&mut state, FieldId::LeadName, json!("Maria"));
        state
    }

    #[test]
    fn payload_splits_critical_and_preferences() {
        let summary = TriageSummary::build(&session(), score());
        let value = serde_json::to_value(&summary).expect("serialize");
        assert_eq!(value["status"], "triage_completed");
        assert_eq!(value["critical"]["intent"], "buy");
        assert_eq!(value["critical"]["budget"], 800_000);
        assert_eq!(value["critical"]["suites"], serde_json::Value::Null);
        assert_eq!(value["preferences"]["payment_method"], "financiamento");
        // Identity lives in the profile, not in preferences.
        assert!(value["preferences"].get("lead_name").is_none());
        assert_eq!(value["lead_profile"]["name"], "Maria");
        assert_eq!(value["lead_score"]["score"], 90);
        assert_eq!(value["intent_stage"], "unknown");
    }

    #[test]
    fn text_renders_set_fields_in_order() {
        let text = render_summary_text(&session(), "Resumo da triagem:");
        let expected = "Resumo da triagem:\n\
            - Operação: comprar\n\
            - Cidade: João Pessoa\n\
            - Bairro: Manaíra\n\
            - Micro-localização: beira-mar\n\
            - Tipo: apartamento\n\
            - Quartos: 3\n\
            - Vagas: 2\n\
            - Orçamento máx.: R$ 800.000\n\
            - Prazo: até 3 meses";
        assert_eq!(text, expected);
    }

    #[test]
    fn budget_min_never_appears_in_the_text() {
        let mut state = session();
        confirmed(&mut state, FieldId::BudgetMin, json!(500_000));
        let text = render_summary_text(&state, "Resumo da triagem:");
        assert!(!text.contains("mínimo"));
        let summary = TriageSummary::build(&state, score());
        let value = serde_json::to_value(&summary).expect("serialize");
        assert_eq!(value["critical"]["budget_min"], 500_000);
    }

    #[test]
    fn stage_bullet_uses_the_friendly_label() {
        let mut state = session();
        confirmed(&mut state, FieldId::EngagementStage, json!("ready_to_visit"));
        let text = render_summary_text(&state, "Resumo da triagem:");
        assert!(text.ends_with("- Fase: pronto para visitar"));
        let summary = TriageSummary::build(&state, score());
        assert_eq!(summary.intent_stage, "ready_to_visit");
    }

    #[test]
    fn empty_session_renders_nothing() {
        let state = SessionState::new("s1");
        assert_eq!(render_summary_text(&state, "Resumo da triagem:"), "");
    }
}
