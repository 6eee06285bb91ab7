//! End-to-end conversation flows against an engine wired with in-memory
//! collaborators and the default domain configuration.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use serde_json::json;

use lead_triage_config::{DomainConfig, EngineConfig};
use lead_triage_core::{
    Agent, AskTopic, AssignmentRecord, CounterStore, EventSink, EventStream, FieldId, FieldStatus,
    FieldUpdate, NeighborhoodDirectory, Operation, RosterStore, SlaType, StoreError, Temperature,
};
use lead_triage_engine::TriageEngine;
use lead_triage_extraction::RuleBasedExtractor;
use lead_triage_routing::AgentRouter;

struct StaticDirectory(Vec<String>);

impl NeighborhoodDirectory for StaticDirectory {
    fn neighborhoods(&self) -> Vec<String> {
        self.0.clone()
    }
}

struct MemoryRoster(Vec<Agent>);

impl RosterStore for MemoryRoster {
    fn load(&self) -> Result<Vec<Agent>, StoreError> {
        Ok(self.0.clone())
    }
}

#[derive(Default)]
struct MemoryCounters(Mutex<BTreeMap<String, AssignmentRecord>>);

impl CounterStore for MemoryCounters {
    fn snapshot(&self) -> Result<BTreeMap<String, AssignmentRecord>, StoreError> {
        Ok(self.0.lock().clone())
    }

    fn record_assignment(&self, agent_id: &str) -> Result<AssignmentRecord, StoreError> {
        let mut counters = self.0.lock();
        let record = counters.entry(agent_id.to_string()).or_default();
        record.assigned_today += 1;
        record.last_assigned_at = Some(Utc::now());
        Ok(record.clone())
    }
}

#[derive(Default)]
struct MemorySink(Mutex<Vec<(EventStream, serde_json::Value)>>);

impl MemorySink {
    fn count(&self, stream: EventStream) -> usize {
        self.0.lock().iter().filter(|(s, _)| *s == stream).count()
    }

    fn records(&self, stream: EventStream) -> Vec<serde_json::Value> {
        self.0
            .lock()
            .iter()
            .filter(|(s, _)| *s == stream)
            .map(|(_, record)| record.clone())
            .collect()
    }
}

impl EventSink for MemorySink {
    fn append(&self, stream: EventStream, record: &serde_json::Value) -> Result<(), StoreError> {
        self.0.lock().push((stream, record.clone()));
        Ok(())
    }
}

fn agents() -> Vec<Agent> {
    serde_json::from_value(json!([
        {
            "id": "a1",
            "name": "Ana Costa",
            "contact": "(83) 99999-0001",
            "operations": ["buy", "rent"],
            "neighborhoods": ["Manaíra", "Tambaú"],
            "micro_tags": ["beira-mar"],
            "price_min": 300_000,
            "price_max": 2_000_000,
            "tier": "senior"
        },
        {
            "id": "a2",
            "name": "Bruno Lima",
            "operations": ["buy", "rent"],
            "neighborhoods": ["*"],
            "specialties": ["generalista"],
            "tier": "standard"
        }
    ]))
    .expect("valid roster fixture")
}

fn engine_with(expose_contact: bool) -> (TriageEngine, Arc<MemorySink>) {
    let domain = Arc::new(DomainConfig::default());
    let sink = Arc::new(MemorySink::default());
    let router = Arc::new(AgentRouter::new(
        Arc::new(MemoryRoster(agents())),
        Arc::new(MemoryCounters::default()),
        sink.clone(),
        domain.routing.clone(),
    ));
    let extractor = Arc::new(RuleBasedExtractor::new(
        domain.vocabulary.clone(),
        domain.handoff.clone(),
    ));
    let directory = Arc::new(StaticDirectory(vec![
        "Manaíra".to_string(),
        "Tambaú".to_string(),
        "Bessa".to_string(),
    ]));
    let options = EngineConfig {
        expose_agent_contact: expose_contact,
        ..EngineConfig::default()
    };
    let engine = TriageEngine::new(domain, options, extractor, directory, router, sink.clone());
    (engine, sink)
}

fn confirmed(field: FieldId, value: serde_json::Value) -> FieldUpdate {
    FieldUpdate::new(field, value).with_status(FieldStatus::Confirmed)
}

/// Complete hot-buyer profile: every critical and preference slot answered.
fn hot_profile() -> Vec<FieldUpdate> {
    vec![
        confirmed(FieldId::Intent, json!("comprar")),
        confirmed(FieldId::City, json!("João Pessoa")),
        confirmed(FieldId::Neighborhood, json!("Manaíra")),
        confirmed(FieldId::PropertyType, json!("apartamento")),
        confirmed(FieldId::Bedrooms, json!(3)),
        confirmed(FieldId::Parking, json!(2)),
        confirmed(FieldId::Budget, json!(800_000)),
        confirmed(FieldId::Timeline, json!("30_days")),
        confirmed(FieldId::MicroLocation, json!("beira-mar")),
        confirmed(FieldId::LeadName, json!("Marina Souza")),
        confirmed(FieldId::BudgetMin, json!(600_000)),
        confirmed(FieldId::CondoFeeCap, json!(1_200)),
        confirmed(FieldId::FloorPreference, json!("alto")),
        confirmed(FieldId::PaymentMethod, json!("financiamento")),
    ]
}

/// Modest but complete rental profile that lands in the warm band.
fn warm_profile() -> Vec<FieldUpdate> {
    vec![
        confirmed(FieldId::Intent, json!("alugar")),
        confirmed(FieldId::City, json!("João Pessoa")),
        confirmed(FieldId::Neighborhood, json!("Bessa")),
        confirmed(FieldId::PropertyType, json!("apartamento")),
        confirmed(FieldId::Bedrooms, json!(2)),
        confirmed(FieldId::Parking, json!(1)),
        confirmed(FieldId::Budget, json!(2_500)),
        confirmed(FieldId::Timeline, json!("6_months")),
        confirmed(FieldId::MicroLocation, json!("3_quadras_mais")),
        confirmed(FieldId::LeadName, json!("Léo Martins")),
        confirmed(FieldId::BudgetMin, json!(1_500)),
        confirmed(FieldId::CondoFeeCap, json!(600)),
        confirmed(FieldId::FloorPreference, json!("baixo")),
    ]
}

#[test]
fn complete_profile_finishes_hot_and_routes_to_the_senior() {
    let (engine, sink) = engine_with(false);

    let first = engine.handle_turn("s-hot", "oi", None);
    assert!(!first.completed);
    assert_eq!(first.asked, Some(AskTopic::Intent));

    let outcome = engine.handle_turn("s-hot", "meu perfil", Some(hot_profile()));
    assert!(outcome.completed);
    assert!(outcome.asked.is_none());
    assert!(outcome.reply.contains("Resumo da triagem:"));
    assert!(outcome.reply.contains("Ana Costa"));
    // Contact exposure is off, so the handle never reaches the lead.
    assert!(!outcome.reply.contains("(83) 99999-0001"));

    let summary = outcome.summary.expect("summary on completion");
    assert_eq!(summary.status, "triage_completed");
    assert_eq!(summary.lead_score.score, 100);
    assert_eq!(summary.lead_score.temperature, Temperature::Hot);
    assert_eq!(summary.critical["intent"], json!("buy"));
    assert_eq!(summary.critical["budget"], json!(800_000));

    let handoff = outcome.handoff.expect("agent assigned");
    assert_eq!(handoff.agent_id, "a1");
    assert_eq!(handoff.contact, None);

    let snapshot = engine.session_snapshot("s-hot").unwrap();
    assert_eq!(snapshot.sla, Some(SlaType::Immediate));
    assert!(snapshot.completed);

    assert_eq!(sink.count(EventStream::HotLeads), 1);
    assert_eq!(sink.count(EventStream::Leads), 1);
    assert_eq!(sink.count(EventStream::RoutingDecisions), 1);

    let event = &sink.records(EventStream::HotLeads)[0];
    assert_eq!(event["type"], json!("HOT_LEAD"));
    assert_eq!(event["lead_class"], json!("HOT"));
    assert_eq!(event["sla"], json!("immediate"));
    assert_eq!(event["assigned_agent"]["agent_name"], json!("Ana Costa"));
}

#[test]
fn summary_and_hot_event_fire_exactly_once() {
    let (engine, sink) = engine_with(false);
    engine.handle_turn("s-once", "oi", None);
    let done = engine.handle_turn("s-once", "meu perfil", Some(hot_profile()));
    assert!(done.summary.is_some());

    let again = engine.handle_turn("s-once", "obrigado", None);
    assert!(again.completed);
    assert!(again.summary.is_none());
    assert!(again.reply.contains("Vou repassar essas informações"));

    assert_eq!(sink.count(EventStream::HotLeads), 1);
    assert_eq!(sink.count(EventStream::Leads), 1);
}

#[test]
fn warm_profile_gets_the_normal_sla_and_a_warm_reply() {
    let (engine, _sink) = engine_with(false);
    engine.handle_turn("s-warm", "oi", None);
    let outcome = engine.handle_turn("s-warm", "procuro para alugar", Some(warm_profile()));

    assert!(outcome.completed);
    assert!(outcome.reply.contains("Bruno Lima"));
    assert!(outcome.reply.contains("em breve com opções"));

    let snapshot = engine.session_snapshot("s-warm").unwrap();
    assert_eq!(snapshot.sla, Some(SlaType::Normal));
    assert_eq!(
        snapshot.lead_score.as_ref().map(|s| s.temperature),
        Some(Temperature::Warm)
    );
}

#[test]
fn contradicting_a_confirmed_field_prompts_and_keeps_the_stored_value() {
    let (engine, _sink) = engine_with(false);
    engine.handle_turn("s-conflict", "oi", None);
    engine.handle_turn(
        "s-conflict",
        "ate 800 mil",
        Some(vec![confirmed(FieldId::Budget, json!(800_000))]),
    );

    let outcome = engine.handle_turn(
        "s-conflict",
        "na verdade 400 mil",
        Some(vec![confirmed(FieldId::Budget, json!(400_000))]),
    );
    assert!(!outcome.completed);
    assert_eq!(outcome.conflicts.len(), 1);
    assert!(outcome.reply.contains("Só para confirmar"));
    assert!(outcome.reply.contains("R$ 800.000"));
    assert!(outcome.reply.contains("R$ 400.000"));

    let snapshot = engine.session_snapshot("s-conflict").unwrap();
    assert_eq!(snapshot.money(FieldId::Budget), Some(800_000));
    assert!(snapshot.open_conflicts.contains(&FieldId::Budget));

    // An explicit override resolves the conflict and replaces the value.
    let resolved = engine.handle_turn(
        "s-conflict",
        "vale 400 mil",
        Some(vec![
            FieldUpdate::new(FieldId::Budget, json!(400_000)).with_status(FieldStatus::Override),
        ]),
    );
    assert!(resolved.conflicts.is_empty());

    let snapshot = engine.session_snapshot("s-conflict").unwrap();
    assert_eq!(snapshot.money(FieldId::Budget), Some(400_000));
    assert!(snapshot.open_conflicts.is_empty());
}

#[test]
fn silent_lead_is_released_to_nurture_without_repeating_questions() {
    let (engine, sink) = engine_with(false);
    let mut asked = Vec::new();
    let mut final_outcome = None;

    for _ in 0..20 {
        let outcome = engine.handle_turn("s-silent", "hmm", None);
        if let Some(topic) = outcome.asked {
            asked.push(topic);
        }
        let done = outcome.completed;
        final_outcome = Some(outcome);
        if done {
            break;
        }
    }

    let outcome = final_outcome.expect("at least one turn ran");
    assert!(outcome.completed, "session must finish within the ask budget");
    assert!(outcome.handoff.is_none());
    assert!(outcome.reply.contains("Vou te mantendo informado"));

    // Every topic was asked at most once and never twice in a row.
    for pair in asked.windows(2) {
        assert_ne!(pair[0], pair[1]);
    }
    let mut unique = asked.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), asked.len());

    let snapshot = engine.session_snapshot("s-silent").unwrap();
    assert_eq!(snapshot.sla, Some(SlaType::Nurture));
    assert_eq!(sink.count(EventStream::RoutingDecisions), 0);
    assert_eq!(sink.count(EventStream::HotLeads), 0);
}

#[test]
fn handoff_request_bypasses_the_gate() {
    let (engine, sink) = engine_with(false);
    engine.handle_turn("s-human", "oi", None);

    let outcome = engine.handle_turn("s-human", "quero falar com humano por favor", None);
    assert!(outcome.completed);
    assert!(outcome.reply.contains("vou te passar para um corretor"));
    assert!(outcome.handoff.is_some());

    let snapshot = engine.session_snapshot("s-human").unwrap();
    assert_eq!(snapshot.sla, Some(SlaType::Immediate));
    assert!(snapshot.completed);
    assert!(snapshot.quality.is_some());

    // A bypass is not a hot classification; only the lead audit line lands.
    assert_eq!(sink.count(EventStream::HotLeads), 0);
    assert_eq!(sink.count(EventStream::Leads), 1);
    assert_eq!(sink.count(EventStream::RoutingDecisions), 1);
}

#[test]
fn refusing_a_question_releases_the_field_and_moves_on() {
    let (engine, _sink) = engine_with(false);
    let first = engine.handle_turn("s-refuse", "oi", None);
    assert_eq!(first.asked, Some(AskTopic::Intent));

    let second = engine.handle_turn("s-refuse", "prefiro nao dizer", None);
    assert_eq!(second.asked, Some(AskTopic::City));

    let snapshot = engine.session_snapshot("s-refuse").unwrap();
    assert_eq!(snapshot.refusal_count(FieldId::Intent), 1);
}

#[test]
fn greeting_after_completion_restarts_but_keeps_identity() {
    let (engine, _sink) = engine_with(false);
    engine.handle_turn("s-again", "oi", None);
    let done = engine.handle_turn("s-again", "meu perfil", Some(hot_profile()));
    assert!(done.completed);

    let outcome = engine.handle_turn("s-again", "oi", None);
    assert!(!outcome.completed);
    assert_eq!(outcome.asked, Some(AskTopic::Intent));

    let snapshot = engine.session_snapshot("s-again").unwrap();
    assert_eq!(snapshot.turn, 1);
    assert!(snapshot.criteria.is_empty());
    assert_eq!(snapshot.identity.name.as_deref(), Some("Marina Souza"));
}

#[test]
fn inferred_city_is_confirmed_before_completion() {
    let (engine, _sink) = engine_with(false);
    engine.handle_turn("s-city", "oi", None);

    let mut batch = hot_profile();
    batch.retain(|update| update.field != FieldId::City);
    // City arrives inferred, as when only a neighborhood was mentioned.
    batch.push(FieldUpdate::new(FieldId::City, json!("João Pessoa")));

    let outcome = engine.handle_turn("s-city", "meu perfil", Some(batch));
    assert_eq!(outcome.asked, Some(AskTopic::CityConfirm));

    let done = engine.handle_turn(
        "s-city",
        "isso mesmo",
        Some(vec![confirmed(FieldId::City, json!("João Pessoa"))]),
    );
    assert!(done.completed);
}

#[test]
fn contact_exposure_reveals_the_agent_handle() {
    let (engine, _sink) = engine_with(true);
    engine.handle_turn("s-contact", "oi", None);
    let outcome = engine.handle_turn("s-contact", "meu perfil", Some(hot_profile()));

    assert!(outcome.reply.contains("(83) 99999-0001"));
    let handoff = outcome.handoff.expect("agent assigned");
    assert_eq!(handoff.contact.as_deref(), Some("(83) 99999-0001"));
}

#[test]
fn rule_extraction_fills_fields_from_raw_text() {
    let (engine, _sink) = engine_with(false);
    engine.handle_turn("s-rules", "oi", None);

    let outcome = engine.handle_turn(
        "s-rules",
        "quero comprar um apartamento em manaira",
        None,
    );
    // Known neighborhood implies the home market, so the city comes back
    // inferred and the selector asks for confirmation.
    assert_eq!(outcome.asked, Some(AskTopic::CityConfirm));

    let snapshot = engine.session_snapshot("s-rules").unwrap();
    assert_eq!(snapshot.operation(), Some(Operation::Buy));
    assert_eq!(snapshot.text(FieldId::Neighborhood), Some("Manaíra"));
    assert_eq!(snapshot.text(FieldId::City), Some("João Pessoa"));
    assert_eq!(snapshot.text(FieldId::PropertyType), Some("apartamento"));
}

#[test]
fn question_variant_is_stable_for_a_session() {
    let (first_engine, _s1) = engine_with(false);
    let (second_engine, _s2) = engine_with(false);

    let a = first_engine.handle_turn("variant-id", "oi", None);
    let b = second_engine.handle_turn("variant-id", "oi", None);
    assert_eq!(a.reply, b.reply);
}

#[test]
fn followup_claim_burns_the_key_and_appends_an_event() {
    let (engine, sink) = engine_with(false);
    engine.handle_turn("s-nudge", "oi", None);

    // Fresh activity: nothing is due yet.
    assert_eq!(engine.followup_preview("s-nudge").unwrap(), None);

    engine.record_followup("s-nudge", "neighborhood").unwrap();
    assert_eq!(sink.count(EventStream::Followups), 1);

    let snapshot = engine.session_snapshot("s-nudge").unwrap();
    assert_eq!(snapshot.followups_sent, 1);
    assert!(snapshot.followup_keys.contains("neighborhood"));
}

#[test]
fn unknown_sessions_error_instead_of_materializing() {
    let (engine, _sink) = engine_with(false);
    assert!(engine.session_snapshot("ghost").is_err());
    assert!(engine.reset_session("ghost").is_err());
    assert!(engine.followup_preview("ghost").is_err());

    engine.handle_turn("s-reset", "oi", None);
    engine.reset_session("s-reset").unwrap();
    assert!(engine.session_snapshot("s-reset").is_err());
}
