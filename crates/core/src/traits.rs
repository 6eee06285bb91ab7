//! Collaborator traits at the engine's seams.
//!
//! The language layer, the roster, and the counters are all injected so the
//! decision engine stays pure and testable. Every trait is synchronous: no
//! operation in the core suspends, and an async collaborator (an LLM
//! extraction service) participates by precomputing updates and passing them
//! into `handle_turn` instead of implementing `CriteriaExtractor`.

use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::fields::FieldUpdate;
use crate::lead::HandoffReason;
use crate::roster::{Agent, AssignmentRecord};

/// Best-effort extraction of field updates from one utterance. May return an
/// empty batch; a failing or absent collaborator must be representable as
/// "no updates this turn".
pub trait CriteriaExtractor: Send + Sync {
    fn extract(&self, utterance: &str, neighborhoods: &[String]) -> Vec<FieldUpdate>;

    /// Detects an explicit request to skip the bot (human, visit,
    /// negotiation, complaint, legal). Default: never.
    fn detect_handoff_request(&self, _utterance: &str) -> Option<HandoffReason> {
        None
    }
}

/// Known-neighborhood list used only to help extraction, never by the
/// decision logic itself.
pub trait NeighborhoodDirectory: Send + Sync {
    fn neighborhoods(&self) -> Vec<String>;
}

/// Read access to the agent roster. Loaded fresh per routing decision.
pub trait RosterStore: Send + Sync {
    fn load(&self) -> Result<Vec<Agent>, StoreError>;
}

/// Per-agent daily assignment counters. `record_assignment` is the only
/// mutation path; implementations persist before returning. The router
/// serializes its read-check-increment sequence around these calls.
pub trait CounterStore: Send + Sync {
    fn snapshot(&self) -> Result<BTreeMap<String, AssignmentRecord>, StoreError>;

    fn record_assignment(&self, agent_id: &str) -> Result<AssignmentRecord, StoreError>;
}

/// Audit stream a record belongs to. Each stream is an append-only log; the
/// file-backed implementation keeps one JSONL file per stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStream {
    Leads,
    HotLeads,
    RoutingDecisions,
    Followups,
}

impl EventStream {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStream::Leads => "leads",
            EventStream::HotLeads => "hot_leads",
            EventStream::RoutingDecisions => "routing_decisions",
            EventStream::Followups => "followups",
        }
    }
}

/// Append-only audit sink. Best effort: callers log a failed append and
/// keep going, a lost audit line must never fail a turn.
pub trait EventSink: Send + Sync {
    fn append(&self, stream: EventStream, record: &serde_json::Value) -> Result<(), StoreError>;
}

/// Sink that drops every record, for tests and audit-less deployments.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn append(&self, _stream: EventStream, _record: &serde_json::Value) -> Result<(), StoreError> {
        Ok(())
    }
}
