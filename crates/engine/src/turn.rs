//! Turn orchestration.
//!
//! `handle_turn` is the single write path into a session: it folds the
//! utterance, applies extracted or caller-supplied field updates, then walks
//! the decision ladder (handoff request, unresolved conflict, next question,
//! quality gate, completion). Scoring, SLA mapping, routing and the audit
//! events all happen inside the same session lock, so a concurrent reader
//! never observes a half-finished turn.

use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use serde::Serialize;
use serde_json::json;

use lead_triage_config::{DomainConfig, EngineConfig};
use lead_triage_core::{
    AskTopic, CriteriaExtractor, EventSink, EventStream, FieldConflict, FieldId, FieldUpdate,
    HandoffReason, LeadScore, NeighborhoodDirectory, QualityReport, RoutingResult, SlaType,
    Temperature,
};
use lead_triage_extraction::fold;
use lead_triage_routing::{AgentRouter, LeadProfile};

use crate::error::EngineError;
use crate::followup::{followup_for, FollowupMessage};
use crate::quality::score_quality;
use crate::scoring::score_lead;
use crate::session::{SessionState, SessionStore};
use crate::sla::{sla_for, HotLeadEvent};
use crate::summary::{field_label_pt, render_summary_text, TriageSummary};
use crate::{gate, questions};

/// Assigned-agent details surfaced to the caller. `contact` is withheld
/// unless contact exposure is enabled in the engine options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandoffInfo {
    pub agent_id: String,
    pub agent_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

/// Everything one turn produced.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub session_id: String,
    /// Portuguese reply to send back to the lead.
    pub reply: String,
    pub completed: bool,
    /// Question asked this turn, while the engine is still collecting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asked: Option<AskTopic>,
    /// Contradictions of confirmed fields that triggered a clarification.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<FieldConflict>,
    /// Structured triage result, present exactly once per completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<TriageSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handoff: Option<HandoffInfo>,
}

pub struct TriageEngine {
    domain: Arc<DomainConfig>,
    options: EngineConfig,
    sessions: SessionStore,
    extractor: Arc<dyn CriteriaExtractor>,
    directory: Arc<dyn NeighborhoodDirectory>,
    router: Arc<AgentRouter>,
    events: Arc<dyn EventSink>,
}

impl TriageEngine {
    pub fn new(
        domain: Arc<DomainConfig>,
        options: EngineConfig,
        extractor: Arc<dyn CriteriaExtractor>,
        directory: Arc<dyn NeighborhoodDirectory>,
        router: Arc<AgentRouter>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            domain,
            options,
            sessions: SessionStore::new(),
            extractor,
            directory,
            router,
            events,
        }
    }

    pub fn domain(&self) -> &DomainConfig {
        &self.domain
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Runs one conversation turn. `updates` carries the language layer's
    /// structured batch when one accompanied the message; without it the
    /// rule-based extractor recovers what it can from the raw text.
    pub fn handle_turn(
        &self,
        session_id: &str,
        message: &str,
        updates: Option<Vec<FieldUpdate>>,
    ) -> TurnOutcome {
        let session = self.sessions.get_or_create(session_id);
        let mut state = session.lock();
        let folded = fold(message);

        // A greeting on a finished session starts the triage over for the
        // same person.
        if state.completed && self.domain.vocabulary.is_greeting(&folded) {
            tracing::info!(session_id = %state.session_id, "greeting after completion, restarting");
            state.reset_keeping_identity();
        }

        state.turn += 1;
        state.last_activity = Utc::now();
        counter!("lead_triage_turns_total").increment(1);

        // Refusing the pending question releases its field so the selector
        // and the gate stop chasing it.
        if self.domain.vocabulary.is_refusal(&folded) {
            if let Some(field) = state.last_asked.and_then(|topic| topic.field()) {
                tracing::debug!(session_id = %state.session_id, field = %field, "question refused");
                state.record_refusal(field);
            }
        }

        let updates = updates.unwrap_or_else(|| {
            self.extractor
                .extract(message, &self.directory.neighborhoods())
        });

        if let Some(reason) = self.extractor.detect_handoff_request(message) {
            return self.bypass(&mut state, reason, &updates);
        }

        let conflicts = state.apply_updates(&updates, &self.domain.vocabulary);
        if let Some(first) = conflicts.first() {
            counter!("lead_triage_conflicts_total").increment(conflicts.len() as u64);
            let reply = self.domain.replies.render_conflict(
                field_label_pt(first.field),
                &first.previous.to_string(),
                &first.new.to_string(),
            );
            return TurnOutcome {
                session_id: state.session_id.clone(),
                reply,
                completed: false,
                asked: None,
                conflicts,
                summary: None,
                handoff: None,
            };
        }

        // Already triaged and not restarting: absorb the facts and repeat
        // the closing word without re-scoring anything.
        if state.completed {
            let reply = self.final_line(&state);
            let handoff = self.handoff_info(state.routing.as_ref());
            return TurnOutcome {
                session_id: state.session_id.clone(),
                reply,
                completed: true,
                asked: None,
                conflicts: Vec::new(),
                summary: None,
                handoff,
            };
        }

        if let Some(topic) = questions::next_topic(&state, self.domain.gate.max_asks_per_field) {
            return self.ask(&mut state, topic);
        }

        let report = score_quality(&state, &self.domain.quality);
        tracing::debug!(
            session_id = %state.session_id,
            score = report.score,
            grade = %report.grade,
            "quality scored"
        );
        if !gate::may_handoff(&state, &report, &self.domain.gate) {
            if let Some(topic) = gate::next_gate_question(&state, &report, &self.domain.gate) {
                state.gate_turns += 1;
                state.quality = Some(report);
                return self.ask(&mut state, topic);
            }
            // Every remaining gap is refused or already chased to its ask
            // cap. Holding the lead gains nothing, release with what we have.
            tracing::info!(
                session_id = %state.session_id,
                score = report.score,
                "gate has no askable gap left, releasing"
            );
        }
        state.quality = Some(report);
        self.complete(&mut state)
    }

    /// Read-only copy of a session for the snapshot endpoint.
    pub fn session_snapshot(&self, session_id: &str) -> Result<SessionState, EngineError> {
        let session = self
            .sessions
            .get(session_id)
            .ok_or_else(|| EngineError::UnknownSession(session_id.to_string()))?;
        let state = session.lock();
        Ok(state.clone())
    }

    pub fn reset_session(&self, session_id: &str) -> Result<(), EngineError> {
        if self.sessions.remove(session_id) {
            tracing::info!(session_id, "session reset");
            Ok(())
        } else {
            Err(EngineError::UnknownSession(session_id.to_string()))
        }
    }

    /// The follow-up nudge currently due for a session, without claiming it.
    pub fn followup_preview(
        &self,
        session_id: &str,
    ) -> Result<Option<FollowupMessage>, EngineError> {
        let session = self
            .sessions
            .get(session_id)
            .ok_or_else(|| EngineError::UnknownSession(session_id.to_string()))?;
        let state = session.lock();
        Ok(followup_for(
            &state,
            Utc::now(),
            &self.options,
            &self.domain.followup,
            self.domain.quality.high_budget,
        ))
    }

    /// Marks a nudge as sent. The engine never sends messages itself; the
    /// caller confirms delivery and the key is burned for the session.
    pub fn record_followup(&self, session_id: &str, key: &str) -> Result<(), EngineError> {
        let session = self
            .sessions
            .get(session_id)
            .ok_or_else(|| EngineError::UnknownSession(session_id.to_string()))?;
        let mut state = session.lock();
        state.followups_sent += 1;
        state.followup_keys.insert(key.to_string());
        let record = json!({
            "session_id": state.session_id,
            "followup_key": key,
            "sent_at": Utc::now().to_rfc3339(),
        });
        if let Err(err) = self.events.append(EventStream::Followups, &record) {
            tracing::warn!(session_id = %state.session_id, error = %err, "failed to append followup record");
        }
        Ok(())
    }

    fn ask(&self, state: &mut SessionState, topic: AskTopic) -> TurnOutcome {
        state.record_asked(topic);
        let reply = self
            .domain
            .questions
            .pick(&state.session_id, topic)
            .unwrap_or("Pode me dar mais detalhes?")
            .to_string();
        tracing::debug!(
            session_id = %state.session_id,
            topic = topic.as_str(),
            turn = state.turn,
            "asking"
        );
        TurnOutcome {
            session_id: state.session_id.clone(),
            reply,
            completed: false,
            asked: Some(topic),
            conflicts: Vec::new(),
            summary: None,
            handoff: None,
        }
    }

    /// Explicit "skip the bot" request: score what is known, route with
    /// priority and close the session under the immediate SLA.
    fn bypass(
        &self,
        state: &mut SessionState,
        reason: HandoffReason,
        updates: &[FieldUpdate],
    ) -> TurnOutcome {
        tracing::info!(
            session_id = %state.session_id,
            reason = reason.as_str(),
            "handoff requested, skipping remaining questions"
        );
        // Facts that arrived with the request still land. Conflicts are not
        // chased: the user asked to stop answering.
        let _ = state.apply_updates(updates, &self.domain.vocabulary);

        let report = score_quality(state, &self.domain.quality);
        let lead = score_lead(state, &self.domain.sla.weights, &self.domain.sla);
        let profile = self.routing_profile(state, lead.temperature);
        state.routing = match self.router.assign(&profile, true) {
            Ok(result) => result,
            Err(err) => {
                tracing::error!(session_id = %state.session_id, error = %err, "routing failed");
                None
            }
        };
        state.sla = Some(SlaType::Immediate);
        state.completed = true;
        counter!("lead_triage_completions_total", "sla" => SlaType::Immediate.as_str()).increment(1);

        self.persist_lead(state, &report, &lead, SlaType::Immediate);
        state.quality = Some(report);
        state.lead_score = Some(lead);

        let mut reply = self.domain.replies.handoff_reason_reply(reason).to_string();
        reply.push_str("\n\n");
        reply.push_str(&self.final_line(state));

        let handoff = self.handoff_info(state.routing.as_ref());
        TurnOutcome {
            session_id: state.session_id.clone(),
            reply,
            completed: true,
            asked: None,
            conflicts: Vec::new(),
            summary: None,
            handoff,
        }
    }

    fn complete(&self, state: &mut SessionState) -> TurnOutcome {
        let report = match state.quality.clone() {
            Some(report) => report,
            None => score_quality(state, &self.domain.quality),
        };
        let lead = score_lead(state, &self.domain.sla.weights, &self.domain.sla);
        let sla = sla_for(lead.temperature, report.grade);
        tracing::info!(
            session_id = %state.session_id,
            lead_score = lead.score,
            temperature = %lead.temperature,
            grade = %report.grade,
            sla = sla.as_str(),
            "triage complete"
        );

        state.routing = if sla == SlaType::Nurture {
            None
        } else {
            let profile = self.routing_profile(state, lead.temperature);
            match self.router.assign(&profile, sla == SlaType::Immediate) {
                Ok(result) => result,
                Err(err) => {
                    tracing::error!(session_id = %state.session_id, error = %err, "routing failed");
                    None
                }
            }
        };
        state.sla = Some(sla);
        state.completed = true;
        counter!("lead_triage_completions_total", "sla" => sla.as_str()).increment(1);

        let summary = if state.summary_emitted {
            None
        } else {
            state.summary_emitted = true;
            Some(TriageSummary::build(state, lead.clone()))
        };

        if lead.temperature == Temperature::Hot && !state.hot_event_emitted {
            state.hot_event_emitted = true;
            counter!("lead_triage_hot_leads_total").increment(1);
            let event =
                HotLeadEvent::from_session(state, lead.score, report.grade, state.routing.as_ref());
            match serde_json::to_value(&event) {
                Ok(record) => {
                    if let Err(err) = self.events.append(EventStream::HotLeads, &record) {
                        tracing::warn!(session_id = %state.session_id, error = %err, "failed to append hot lead event");
                    }
                }
                Err(err) => {
                    tracing::warn!(session_id = %state.session_id, error = %err, "failed to serialize hot lead event");
                }
            }
        }

        self.persist_lead(state, &report, &lead, sla);
        state.quality = Some(report);
        state.lead_score = Some(lead.clone());

        let summary_text = render_summary_text(state, &self.domain.replies.summary_header);
        let sla_line = match (sla, state.routing.as_ref()) {
            (SlaType::Immediate, Some(routing)) => {
                let contact = routing
                    .contact
                    .as_deref()
                    .filter(|_| self.options.expose_agent_contact);
                self.domain.replies.render_hot(&routing.agent_name, contact)
            }
            (SlaType::Normal, Some(routing)) => match lead.temperature {
                Temperature::Warm => self.domain.replies.render_warm(&routing.agent_name),
                _ => self.domain.replies.cold_handoff.clone(),
            },
            (SlaType::Nurture, _) => self.domain.replies.cold_nurture.clone(),
            (_, None) => self.domain.replies.no_agent_available.clone(),
        };
        let reply = if summary_text.is_empty() {
            sla_line
        } else {
            format!("{summary_text}\n\n{sla_line}")
        };

        let handoff = self.handoff_info(state.routing.as_ref());
        TurnOutcome {
            session_id: state.session_id.clone(),
            reply,
            completed: true,
            asked: None,
            conflicts: Vec::new(),
            summary,
            handoff,
        }
    }

    fn routing_profile(&self, state: &SessionState, temperature: Temperature) -> LeadProfile {
        LeadProfile {
            session_id: state.session_id.clone(),
            operation: state.operation(),
            neighborhood: state.text(FieldId::Neighborhood).map(str::to_string),
            micro_location: state.micro_location(),
            budget: state.money(FieldId::Budget),
            bedrooms: state.count(FieldId::Bedrooms),
            pet: state.flag(FieldId::Pet),
            temperature: Some(temperature),
        }
    }

    /// Closing line of a finished triage. Names the agent only when contact
    /// exposure is enabled.
    fn final_line(&self, state: &SessionState) -> String {
        let name = state
            .routing
            .as_ref()
            .filter(|_| self.options.expose_agent_contact)
            .map(|routing| routing.agent_name.as_str());
        self.domain.replies.render_final(name)
    }

    fn handoff_info(&self, routing: Option<&RoutingResult>) -> Option<HandoffInfo> {
        routing.map(|routing| HandoffInfo {
            agent_id: routing.agent_id.clone(),
            agent_name: routing.agent_name.clone(),
            contact: if self.options.expose_agent_contact {
                routing.contact.clone()
            } else {
                None
            },
        })
    }

    /// One audit line per completed triage, best effort.
    fn persist_lead(
        &self,
        state: &SessionState,
        report: &QualityReport,
        lead: &LeadScore,
        sla: SlaType,
    ) {
        let record = json!({
            "timestamp": Utc::now().timestamp_millis() as f64 / 1000.0,
            "session_id": state.session_id,
            "lead_profile": state.identity,
            "triage_fields": state.criteria,
            "quality": report,
            "lead_score": lead,
            "sla": sla,
            "completed": true,
        });
        if let Err(err) = self.events.append(EventStream::Leads, &record) {
            tracing::warn!(session_id = %state.session_id, error = %err, "failed to append lead record");
        }
    }
}
