//! Per-lead session state and the confirmed-field conflict resolver.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use lead_triage_config::VocabularyConfig;
use lead_triage_core::{
    AskTopic, CriteriaField, EngagementStage, FieldConflict, FieldId, FieldStatus, FieldUpdate,
    FieldValue, LeadIdentity, LeadScore, MicroLocation, Operation, QualityReport, RoutingResult,
    SlaType, Timeline, UrgencyLevel,
};
use parking_lot::Mutex;
use serde::Serialize;

use crate::normalize::normalize_value;

/// Everything the engine knows about one lead conversation.
///
/// Serialized as-is by the session snapshot endpoint, so field names are
/// part of the API surface.
#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    pub session_id: String,
    pub criteria: BTreeMap<FieldId, CriteriaField>,
    pub identity: LeadIdentity,
    pub turn: u32,
    /// How many times each topic has been asked this session.
    pub asked: BTreeMap<AskTopic, u32>,
    pub asked_order: Vec<AskTopic>,
    pub last_asked: Option<AskTopic>,
    /// Refusal count per field, fed by the refusal phrase detector.
    pub refusals: BTreeMap<FieldId, u32>,
    /// Clarifying turns already spent inside the quality gate.
    pub gate_turns: u32,
    /// Fields whose confirmed value was contradicted and not yet resolved.
    pub open_conflicts: BTreeSet<FieldId>,
    pub completed: bool,
    pub summary_emitted: bool,
    pub hot_event_emitted: bool,
    pub followups_sent: u32,
    pub followup_keys: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<QualityReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_score: Option<LeadScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sla: Option<SlaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing: Option<RoutingResult>,
}

impl SessionState {
    pub fn new(session_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            criteria: BTreeMap::new(),
            identity: LeadIdentity::default(),
            turn: 0,
            asked: BTreeMap::new(),
            asked_order: Vec::new(),
            last_asked: None,
            refusals: BTreeMap::new(),
            gate_turns: 0,
            open_conflicts: BTreeSet::new(),
            completed: false,
            summary_emitted: false,
            hot_event_emitted: false,
            followups_sent: 0,
            followup_keys: BTreeSet::new(),
            created_at: now,
            last_activity: now,
            quality: None,
            lead_score: None,
            sla: None,
            routing: None,
        }
    }

    /// Starts the triage over for a returning lead. Identity survives, all
    /// criteria and derived state are dropped.
    pub fn reset_keeping_identity(&mut self) {
        let identity = std::mem::take(&mut self.identity);
        let session_id = std::mem::take(&mut self.session_id);
        let created_at = self.created_at;
        *self = SessionState::new(session_id);
        self.identity = identity;
        self.created_at = created_at;
    }

    pub fn field(&self, id: FieldId) -> Option<&CriteriaField> {
        self.criteria.get(&id)
    }

    pub fn has(&self, id: FieldId) -> bool {
        self.criteria.contains_key(&id)
    }

    pub fn value(&self, id: FieldId) -> Option<&FieldValue> {
        self.field(id).map(|f| &f.value)
    }

    pub fn status(&self, id: FieldId) -> Option<FieldStatus> {
        self.field(id).map(|f| f.status)
    }

    pub fn text(&self, id: FieldId) -> Option<&str> {
        self.value(id).and_then(FieldValue::as_text)
    }

    pub fn money(&self, id: FieldId) -> Option<i64> {
        self.value(id).and_then(FieldValue::as_money)
    }

    pub fn count(&self, id: FieldId) -> Option<u32> {
        self.value(id).and_then(FieldValue::as_count)
    }

    pub fn flag(&self, id: FieldId) -> Option<bool> {
        self.value(id).and_then(FieldValue::as_flag)
    }

    pub fn operation(&self) -> Option<Operation> {
        self.value(FieldId::Intent).and_then(FieldValue::as_operation)
    }

    pub fn timeline(&self) -> Option<Timeline> {
        self.value(FieldId::Timeline).and_then(FieldValue::as_timeline)
    }

    pub fn micro_location(&self) -> Option<MicroLocation> {
        self.value(FieldId::MicroLocation)
            .and_then(FieldValue::as_micro_location)
    }

    pub fn urgency(&self) -> Option<UrgencyLevel> {
        match self.value(FieldId::Urgency) {
            Some(FieldValue::Urgency(level)) => Some(*level),
            _ => None,
        }
    }

    pub fn stage(&self) -> EngagementStage {
        match self.value(FieldId::EngagementStage) {
            Some(FieldValue::Stage(stage)) => *stage,
            _ => EngagementStage::Unknown,
        }
    }

    /// Lead name from identity, falling back to the criteria map for
    /// sessions fed by caller batches that skipped identity capture.
    pub fn lead_name(&self) -> Option<&str> {
        self.identity
            .name
            .as_deref()
            .or_else(|| self.text(FieldId::LeadName))
    }

    pub fn asked_count(&self, topic: AskTopic) -> u32 {
        self.asked.get(&topic).copied().unwrap_or(0)
    }

    pub fn refusal_count(&self, field: FieldId) -> u32 {
        self.refusals.get(&field).copied().unwrap_or(0)
    }

    pub fn record_asked(&mut self, topic: AskTopic) {
        *self.asked.entry(topic).or_insert(0) += 1;
        self.asked_order.push(topic);
        self.last_asked = Some(topic);
    }

    pub fn record_refusal(&mut self, field: FieldId) {
        *self.refusals.entry(field).or_insert(0) += 1;
    }

    pub fn missing_critical(&self) -> Vec<FieldId> {
        FieldId::CRITICAL
            .iter()
            .copied()
            .filter(|f| !self.has(*f))
            .collect()
    }

    pub fn all_critical_set(&self) -> bool {
        FieldId::CRITICAL.iter().all(|f| self.has(*f))
    }

    /// Applies a batch of updates, returning the conflicts it refused.
    ///
    /// Rules, in order per update:
    /// - unparseable values are dropped;
    /// - identity fields are set-once: the first non-empty value wins and
    ///   is mirrored into the criteria map, later writes are ignored
    ///   without conflict;
    /// - `Override` always writes;
    /// - a differing non-null value against a confirmed field is rejected
    ///   and recorded as a [`FieldConflict`];
    /// - everything else writes. A successful write clears any open
    ///   conflict mark on the field, and an identical re-confirmation
    ///   never downgrades `Confirmed` to `Inferred`.
    pub fn apply_updates(
        &mut self,
        updates: &[FieldUpdate],
        vocab: &VocabularyConfig,
    ) -> Vec<FieldConflict> {
        let mut conflicts = Vec::new();
        for update in updates {
            let Some(value) = normalize_value(update.field, &update.value, vocab) else {
                tracing::debug!(
                    session_id = %self.session_id,
                    field = update.field.as_str(),
                    "dropping unparseable field update"
                );
                continue;
            };
            if update.field.is_identity() {
                self.apply_identity(update, value);
                continue;
            }
            match self.criteria.get(&update.field) {
                Some(prev)
                    if prev.status == FieldStatus::Confirmed
                        && update.status != FieldStatus::Override
                        && prev.value != value =>
                {
                    tracing::info!(
                        session_id = %self.session_id,
                        field = update.field.as_str(),
                        previous = %prev.value,
                        new = %value,
                        "conflicting update rejected"
                    );
                    self.open_conflicts.insert(update.field);
                    conflicts.push(FieldConflict {
                        field: update.field,
                        previous: prev.value.clone(),
                        new: value,
                    });
                }
                _ => self.write_field(update, value),
            }
        }
        conflicts
    }

    fn apply_identity(&mut self, update: &FieldUpdate, value: FieldValue) {
        let Some(text) = value.as_text().map(str::to_string) else {
            return;
        };
        let slot = match update.field {
            FieldId::LeadName => &mut self.identity.name,
            FieldId::LeadPhone => &mut self.identity.phone,
            FieldId::LeadEmail => &mut self.identity.email,
            _ => return,
        };
        if LeadIdentity::set_once(slot, &text) {
            self.write_field(update, FieldValue::Text(text));
        }
    }

    fn write_field(&mut self, update: &FieldUpdate, value: FieldValue) {
        // Reachable with a confirmed predecessor only when the value is
        // identical or the update is an override, so the status keep below
        // cannot mask a real change.
        let status = match self.criteria.get(&update.field) {
            Some(prev)
                if prev.status == FieldStatus::Confirmed
                    && update.status == FieldStatus::Inferred =>
            {
                FieldStatus::Confirmed
            }
            _ => update.status,
        };
        self.open_conflicts.remove(&update.field);
        self.criteria.insert(
            update.field,
            CriteriaField {
                value,
                status,
                source: update.source,
                updated_at_turn: self.turn,
                raw_text: update.raw_text.clone(),
            },
        );
    }
}

/// Concurrent in-memory session registry.
///
/// Each session sits behind its own mutex so one slow turn never blocks
/// unrelated sessions, while two turns for the same session serialize.
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<String, Arc<Mutex<SessionState>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&self, session_id: &str) -> Arc<Mutex<SessionState>> {
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(SessionState::new(session_id))))
            .clone()
    }

    pub fn get(&self, session_id: &str) -> Option<Arc<Mutex<SessionState>>> {
        self.sessions.get(session_id).map(|entry| entry.clone())
    }

    pub fn remove(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
